use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "climate-categories")]
#[command(about = "Inspect and export categorization systems")]
#[command(version)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Base directory (default: ~/.climate-categories)
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,

    /// Additional library directory, scanned after the configured ones
    #[arg(short = 'L', long = "library", global = true, value_name = "DIR")]
    pub library: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List categorizations found in the library
    List,

    /// Show metadata of a categorization
    Show {
        /// Categorization name (e.g., IPCC2006)
        name: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List all codes of a categorization
    Keys {
        /// Categorization name
        name: String,

        /// Only codes matching this glob pattern (e.g., "1.A*")
        #[arg(short, long, value_parser = parse_pattern)]
        filter: Option<glob::Pattern>,
    },

    /// Show the meaning of a code
    Lookup {
        /// Categorization name
        name: String,

        /// Category code
        code: String,
    },

    /// Show the hierarchy, or the relations of one code
    Tree {
        /// Categorization name
        name: String,

        /// Show parents, children and ancestors of this code
        code: Option<String>,

        /// Deepest level to print
        #[arg(long)]
        max_level: Option<usize>,
    },

    /// Export codes and meanings as CSV
    Export {
        /// Categorization name
        name: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Leave out the level column for hierarchical categorizations
        #[arg(long)]
        no_level: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g., library.paths)
        key: String,
    },

    /// Set a config value
    Set {
        /// Config key (e.g., library.paths)
        key: String,

        /// Value to set (e.g., "/data/a,/data/b" or "[/data/a, /data/b]")
        value: String,
    },

    /// List all config values
    List,

    /// Show config file path
    Path,

    /// Initialize config file with defaults
    Init,
}

fn parse_pattern(s: &str) -> Result<glob::Pattern, String> {
    glob::Pattern::new(s).map_err(|e| e.to_string())
}
