use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use climate_categories_core::{
    AnyCategorization, CategorizationError, CategorizationLibrary, CategorySystem, Config,
    HierarchicalCategorization, Result,
};

mod args;
use args::{Cli, Commands, ConfigAction, Shell};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let base_dir = resolve_base_dir(cli.base_dir);
    let extra = cli.library;

    let result = match cli.command {
        Some(Commands::List) => handle_list(&base_dir, &extra),
        Some(Commands::Show { name, json }) => handle_show(&base_dir, &extra, &name, json),
        Some(Commands::Keys { name, filter }) => {
            handle_keys(&base_dir, &extra, &name, filter.as_ref())
        }
        Some(Commands::Lookup { name, code }) => handle_lookup(&base_dir, &extra, &name, &code),
        Some(Commands::Tree {
            name,
            code,
            max_level,
        }) => handle_tree(&base_dir, &extra, &name, code.as_deref(), max_level),
        Some(Commands::Export {
            name,
            output,
            no_level,
        }) => handle_export(&base_dir, &extra, &name, output.as_deref(), no_level),
        Some(Commands::Config { action }) => handle_config(action, &base_dir),
        Some(Commands::Completions { shell }) => {
            handle_completions(shell);
            Ok(())
        }
        None => {
            Cli::command().print_help().ok();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red().bold(), e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn handle_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let shell = match shell {
        Shell::Bash => clap_complete::Shell::Bash,
        Shell::Zsh => clap_complete::Shell::Zsh,
        Shell::Fish => clap_complete::Shell::Fish,
        Shell::PowerShell => clap_complete::Shell::PowerShell,
        Shell::Elvish => clap_complete::Shell::Elvish,
    };
    generate(shell, &mut cmd, "climate-categories", &mut io::stdout());
}

fn resolve_base_dir(cli_base: Option<PathBuf>) -> PathBuf {
    if let Some(base) = cli_base {
        return base;
    }

    if let Ok(base) = std::env::var("CLIMATE_CATEGORIES_BASE") {
        return PathBuf::from(base);
    }

    dirs::home_dir()
        .map(|h| h.join(".climate-categories"))
        .unwrap_or_else(|| PathBuf::from(".climate-categories"))
}

/// Configured library paths followed by the ones given with `--library`
fn open_library(base_dir: &Path, extra: &[PathBuf]) -> Result<CategorizationLibrary> {
    let config = Config::load(base_dir)?;
    let mut paths = config.library.resolved_paths();
    paths.extend(extra.iter().cloned());
    tracing::debug!(base_dir = %base_dir.display(), paths = ?paths, "scanning library");
    Ok(CategorizationLibrary::scan(&paths))
}

fn require_hierarchical<'a>(
    categorization: &'a AnyCategorization,
) -> Result<&'a HierarchicalCategorization> {
    categorization.as_hierarchical().ok_or_else(|| {
        CategorizationError::MetadataInvalid {
            key: "hierarchical".to_string(),
            value: "false".to_string(),
            message: format!("{} has no hierarchy", categorization.name()),
        }
    })
}

fn handle_list(base_dir: &Path, extra: &[PathBuf]) -> Result<()> {
    let library = open_library(base_dir, extra)?;

    if library.is_empty() {
        println!("No categorizations found.");
        println!(
            "Add a directory with: climate-categories config set library.paths <DIR> (or pass -L <DIR>)"
        );
        return Ok(());
    }

    println!();
    for categorization in library.iter() {
        let kind = if categorization.is_hierarchical() {
            "hierarchical".yellow()
        } else {
            "flat".dimmed()
        };
        println!(
            "  {:<20} {:>6} codes  {:<12} {}",
            categorization.name().cyan(),
            categorization.len(),
            kind,
            categorization.metadata().title
        );
    }
    println!();
    println!("Total: {} categorization(s)", library.len());
    Ok(())
}

fn handle_show(base_dir: &Path, extra: &[PathBuf], name: &str, json: bool) -> Result<()> {
    let library = open_library(base_dir, extra)?;
    let categorization = library.get(name)?;
    let metadata = categorization.metadata();
    let hierarchical = categorization.as_hierarchical();

    if json {
        let value = serde_json::json!({
            "metadata": metadata,
            "hierarchical": hierarchical.is_some(),
            "total_sum": hierarchical.map(|h| h.total_sum()),
            "max_level": hierarchical.map(|h| h.max_level()),
            "codes": categorization.len(),
        });
        let rendered = serde_json::to_string_pretty(&value).map_err(io::Error::from)?;
        println!("{}", rendered);
        return Ok(());
    }

    println!();
    println!("{}", metadata.name.cyan().bold());
    println!("  {:<12} {}", "Title:", metadata.title);
    if !metadata.comment.is_empty() {
        println!("  {:<12} {}", "Comment:", metadata.comment);
    }
    if !metadata.references.is_empty() {
        println!("  {:<12} {}", "References:", metadata.references);
    }
    if let Some(institution) = &metadata.institution {
        println!("  {:<12} {}", "Institution:", institution);
    }
    if let Some(version) = &metadata.version {
        println!("  {:<12} {}", "Version:", version);
    }
    println!("  {:<12} {}", "Updated:", metadata.last_update);
    println!("  {:<12} {}", "Codes:", categorization.len());
    if let Some(h) = hierarchical {
        println!("  {:<12} {}", "Levels:", h.max_level());
        println!("  {:<12} {}", "Roots:", h.roots().join(", "));
        println!("  {:<12} {}", "Total sum:", h.total_sum());
    }
    println!();
    Ok(())
}

fn handle_keys(
    base_dir: &Path,
    extra: &[PathBuf],
    name: &str,
    filter: Option<&glob::Pattern>,
) -> Result<()> {
    let library = open_library(base_dir, extra)?;
    let categorization = library.get(name)?;

    for code in categorization
        .keys()
        .filter(|code| filter.map_or(true, |p| p.matches(code)))
    {
        println!("{}", code);
    }
    Ok(())
}

fn handle_lookup(base_dir: &Path, extra: &[PathBuf], name: &str, code: &str) -> Result<()> {
    let library = open_library(base_dir, extra)?;
    let categorization = library.get(name)?;
    let meaning = categorization.lookup(code)?;

    match categorization.as_hierarchical() {
        Some(h) => println!("{} {} (level {})", code.cyan(), meaning, h.level(code)?),
        None => println!("{} {}", code.cyan(), meaning),
    }
    Ok(())
}

fn handle_tree(
    base_dir: &Path,
    extra: &[PathBuf],
    name: &str,
    code: Option<&str>,
    max_level: Option<usize>,
) -> Result<()> {
    let library = open_library(base_dir, extra)?;
    let categorization = library.get(name)?;
    let hierarchy = require_hierarchical(categorization)?;

    if let Some(code) = code {
        return print_relations(hierarchy, code);
    }

    let max_level = max_level.unwrap_or(usize::MAX);
    for root in hierarchy.roots() {
        print_subtree(hierarchy, root, max_level)?;
    }
    Ok(())
}

fn print_relations(hierarchy: &HierarchicalCategorization, code: &str) -> Result<()> {
    let meaning = hierarchy.lookup(code)?;
    println!();
    println!("{} {}", code.cyan().bold(), meaning);
    println!("  {:<10} {}", "Level:", hierarchy.level(code)?);
    println!("  {:<10} {}", "Parents:", hierarchy.parents(code)?.join(", "));
    println!("  {:<10} {}", "Children:", hierarchy.children(code)?.join(", "));
    println!("  {:<10} {}", "Ancestors:", hierarchy.ancestors(code)?.join(", "));
    println!();
    Ok(())
}

fn print_subtree(hierarchy: &HierarchicalCategorization, code: &str, max_level: usize) -> Result<()> {
    let level = hierarchy.level(code)?;
    if level > max_level {
        return Ok(());
    }

    let indent = "  ".repeat(level - 1);
    println!("{}{} {}", indent, code.cyan(), hierarchy.lookup(code)?.dimmed());

    for child in hierarchy.children(code)? {
        print_subtree(hierarchy, child, max_level)?;
    }
    Ok(())
}

fn handle_export(
    base_dir: &Path,
    extra: &[PathBuf],
    name: &str,
    output: Option<&Path>,
    no_level: bool,
) -> Result<()> {
    let config = Config::load(base_dir)?;
    let delimiter = config.export.delimiter_byte()?;

    let library = open_library(base_dir, extra)?;
    let categorization = library.get(name)?;

    let mut table = categorization.to_table();
    if no_level || !config.export.include_level {
        table = table.without_level();
    }

    match output {
        Some(path) => {
            let file = BufWriter::new(File::create(path)?);
            table.write_csv(file, delimiter)?;
            eprintln!(
                "{} {} rows -> {}",
                "Exported:".green(),
                table.len(),
                path.display()
            );
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            table.write_csv(&mut lock, delimiter)?;
            lock.flush()?;
        }
    }
    Ok(())
}

fn handle_config(action: ConfigAction, base_dir: &Path) -> Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load(base_dir)?;
            match config.get(&key) {
                Some(value) => {
                    println!("{}", value);
                }
                None => {
                    return Err(CategorizationError::ConfigKeyNotFound { key });
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load(base_dir)?;
            config.set(&key, &value)?;
            config.save(base_dir)?;
            println!("{} {} = {}", "Set:".green(), key, value);
        }
        ConfigAction::List => {
            let config = Config::load(base_dir)?;
            println!();
            for (key, value) in config.list() {
                println!("{} = {}", key.cyan(), value);
            }
            println!();
        }
        ConfigAction::Path => {
            println!("{}", Config::path(base_dir).display());
        }
        ConfigAction::Init => {
            let path = Config::init(base_dir)?;
            println!("{} {}", "Config:".green(), path.display());
        }
    }
    Ok(())
}
