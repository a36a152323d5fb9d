use std::collections::BTreeMap;

use crate::codes::CodeStore;
use crate::error::{CategorizationError, Result};
use crate::extension::Extension;
use crate::hierarchy::{HierarchyGraph, Relations};
use crate::metadata::Metadata;
use crate::table::{Table, TableRow};

use super::{CategorySystem, Categorization};

/// A categorization whose codes form a parent → child hierarchy.
///
/// `total_sum` declares whether, for extensive quantities, a parent's value
/// equals the sum of its direct children's values. It is carried through
/// extensions but not checked here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchicalCategorization {
    base: Categorization,
    graph: HierarchyGraph,
    total_sum: bool,
}

impl HierarchicalCategorization {
    /// Build from metadata, `(code, meaning)` pairs and relations.
    ///
    /// # Errors
    /// - `DuplicateCode`, `EmptyCategorization` as for [`Categorization::new`]
    /// - `InvalidEdge` if a relation names an unknown code
    /// - `CyclicHierarchy`, `InconsistentLevel` if the relations do not form
    ///   a levelled hierarchy
    pub fn new<I, K, V>(
        metadata: Metadata,
        categories: I,
        relations: Relations,
        total_sum: bool,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::from_parts(metadata, CodeStore::new(categories)?, &relations, total_sum)
    }

    pub(crate) fn from_parts(
        metadata: Metadata,
        codes: CodeStore,
        relations: &Relations,
        total_sum: bool,
    ) -> Result<Self> {
        let graph = HierarchyGraph::build(&codes, relations)?;
        Ok(Self {
            base: Categorization::from_parts(metadata, codes)?,
            graph,
            total_sum,
        })
    }

    pub fn total_sum(&self) -> bool {
        self.total_sum
    }

    pub fn graph(&self) -> &HierarchyGraph {
        &self.graph
    }

    /// The codes and metadata without the hierarchy
    pub fn as_categorization(&self) -> &Categorization {
        &self.base
    }

    fn require(&self, code: &str) -> Result<()> {
        if self.contains(code) {
            Ok(())
        } else {
            Err(CategorizationError::not_found(code))
        }
    }

    /// Level of `code`; top-level codes are level 1
    pub fn level(&self, code: &str) -> Result<usize> {
        self.graph
            .level(code)
            .ok_or_else(|| CategorizationError::not_found(code))
    }

    /// Direct parents, in edge insertion order
    pub fn parents(&self, code: &str) -> Result<&[String]> {
        self.require(code)?;
        Ok(self.graph.parents(code))
    }

    /// Direct children, in edge insertion order
    pub fn children(&self, code: &str) -> Result<&[String]> {
        self.require(code)?;
        Ok(self.graph.children(code))
    }

    /// Every code with children, mapped to its direct children
    pub fn hierarchy(&self) -> BTreeMap<&str, &[String]> {
        self.graph.hierarchy()
    }

    pub fn ancestors(&self, code: &str) -> Result<Vec<&str>> {
        self.require(code)?;
        Ok(self.graph.ancestors(code))
    }

    pub fn descendants(&self, code: &str) -> Result<Vec<&str>> {
        self.require(code)?;
        Ok(self.graph.descendants(code))
    }

    /// Codes without parents
    pub fn roots(&self) -> Vec<&str> {
        self.keys()
            .filter(|code| self.graph.parents(code).is_empty())
            .collect()
    }

    /// Codes without children
    pub fn leaves(&self) -> Vec<&str> {
        self.keys()
            .filter(|code| self.graph.children(code).is_empty())
            .collect()
    }

    pub fn max_level(&self) -> usize {
        self.graph.max_level()
    }

    /// Parent → child edges in insertion order
    pub fn edges(&self) -> impl ExactSizeIterator<Item = (&str, &str)> + '_ {
        self.graph.edges()
    }

    /// Derive a new categorization with additional codes and relations.
    ///
    /// `children` maps parents to children; both may be existing or new codes.
    /// The relations are added to the existing ones, never replacing them.
    /// Use [`Self::extend_with_hierarchy`] to drop or reorder relations.
    pub fn extend(&self, extension: Extension, children: Option<Relations>) -> Result<Self> {
        let (metadata, codes) = self.base.extended_parts(&extension)?;
        let additions = children.unwrap_or_default();
        let graph = self.graph.extended(&codes, &additions)?;
        tracing::debug!(
            base = %self.name(),
            name = %metadata.name,
            added_codes = extension.categories().len(),
            added_edges = additions.len(),
            "extended hierarchical categorization"
        );
        self.derive(metadata, codes, graph)
    }

    /// Derive a new categorization whose hierarchy is exactly `hierarchy`.
    ///
    /// The existing relations are discarded; `hierarchy` may use any code of
    /// the combined code set.
    pub fn extend_with_hierarchy(&self, extension: Extension, hierarchy: Relations) -> Result<Self> {
        let (metadata, codes) = self.base.extended_parts(&extension)?;
        let graph = HierarchyGraph::build(&codes, &hierarchy)?;
        tracing::debug!(
            base = %self.name(),
            name = %metadata.name,
            added_codes = extension.categories().len(),
            edges = graph.edge_count(),
            "replaced hierarchy"
        );
        self.derive(metadata, codes, graph)
    }

    fn derive(&self, metadata: Metadata, codes: CodeStore, graph: HierarchyGraph) -> Result<Self> {
        Ok(Self {
            base: Categorization::from_parts(metadata, codes)?,
            graph,
            total_sum: self.total_sum,
        })
    }

    /// Same categorization with a known institution
    pub fn with_institution(mut self, institution: impl Into<String>) -> Self {
        self.base = self.base.with_institution(institution);
        self
    }
}

impl CategorySystem for HierarchicalCategorization {
    fn metadata(&self) -> &Metadata {
        self.base.metadata()
    }

    fn codes(&self) -> &CodeStore {
        self.base.codes()
    }

    fn is_hierarchical(&self) -> bool {
        true
    }

    /// One row per code with code, meaning and level
    fn to_table(&self) -> Table {
        Table::new(
            self.codes()
                .iter()
                .map(|(code, meaning)| TableRow {
                    code: code.to_string(),
                    meaning: meaning.to_string(),
                    level: self.graph.level(code),
                })
                .collect(),
        )
    }
}

impl std::fmt::Display for HierarchicalCategorization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<HierarchicalCategorization {}>", self.name())
    }
}
