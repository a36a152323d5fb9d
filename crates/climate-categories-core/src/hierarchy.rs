//! Hierarchy Graph
//!
//! Parent → child relations between the codes of one categorization.
//!
//! # Invariants
//! - Both endpoints of every edge are known codes.
//! - The edge set is acyclic.
//! - Every code has exactly one level: codes without parents are level 1,
//!   every other code is one deeper than each of its direct parents.
//!
//! Levels are assigned once, when the graph is built, by a topological pass.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use crate::codes::CodeStore;
use crate::error::{CategorizationError, Result};

/// Ordered parent → children relations, as supplied by callers.
///
/// Keeps insertion order and collapses repeated edges.
#[derive(Debug, Clone, Default)]
pub struct Relations {
    edges: Vec<(String, String)>,
    seen: HashSet<(String, String)>,
}

impl Relations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `children` under `parent`
    pub fn with<P, I>(mut self, parent: P, children: I) -> Self
    where
        P: Into<String>,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let parent = parent.into();
        for child in children {
            self.add(parent.clone(), child);
        }
        self
    }

    /// Add one edge. Returns false if it was already present.
    pub fn add<P: Into<String>, C: Into<String>>(&mut self, parent: P, child: C) -> bool {
        let edge = (parent.into(), child.into());
        if !self.seen.insert(edge.clone()) {
            return false;
        }
        self.edges.push(edge);
        true
    }

    pub fn edges(&self) -> impl ExactSizeIterator<Item = (&str, &str)> + '_ {
        self.edges.iter().map(|(p, c)| (p.as_str(), c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

impl PartialEq for Relations {
    fn eq(&self, other: &Self) -> bool {
        self.edges == other.edges
    }
}

impl Eq for Relations {}

impl<P, I> FromIterator<(P, I)> for Relations
where
    P: Into<String>,
    I: IntoIterator,
    I::Item: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (P, I)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::new(), |relations, (parent, children)| {
                relations.with(parent, children)
            })
    }
}

/// Validated hierarchy over a [`CodeStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyGraph {
    edges: Vec<(String, String)>,
    parents: HashMap<String, Vec<String>>,
    children: HashMap<String, Vec<String>>,
    levels: HashMap<String, usize>,
}

impl HierarchyGraph {
    /// Build and validate the graph for `codes`.
    ///
    /// # Errors
    /// - `InvalidEdge` if an endpoint is not in `codes`
    /// - `CyclicHierarchy` if the edges contain a cycle
    /// - `InconsistentLevel` if a code's parents sit on different levels
    pub fn build(codes: &CodeStore, relations: &Relations) -> Result<Self> {
        let mut edges = Vec::with_capacity(relations.len());
        let mut parents: HashMap<String, Vec<String>> = HashMap::new();
        let mut children: HashMap<String, Vec<String>> = HashMap::new();

        for (parent, child) in relations.edges() {
            if let Some(unknown) = [parent, child].into_iter().find(|c| !codes.contains(c)) {
                return Err(CategorizationError::InvalidEdge {
                    parent: parent.to_string(),
                    child: child.to_string(),
                    unknown: unknown.to_string(),
                });
            }
            edges.push((parent.to_string(), child.to_string()));
            parents
                .entry(child.to_string())
                .or_default()
                .push(parent.to_string());
            children
                .entry(parent.to_string())
                .or_default()
                .push(child.to_string());
        }

        let levels = assign_levels(codes, &parents, &children)?;
        tracing::debug!(
            codes = codes.len(),
            edges = edges.len(),
            "hierarchy validated"
        );

        Ok(Self {
            edges,
            parents,
            children,
            levels,
        })
    }

    /// Graph over `codes` holding the current edges followed by `additions`
    pub(crate) fn extended(&self, codes: &CodeStore, additions: &Relations) -> Result<Self> {
        let mut relations = self.relations();
        for (parent, child) in additions.edges() {
            relations.add(parent, child);
        }
        Self::build(codes, &relations)
    }

    /// Current edges as [`Relations`]
    pub fn relations(&self) -> Relations {
        let mut relations = Relations::new();
        for (parent, child) in &self.edges {
            relations.add(parent.as_str(), child.as_str());
        }
        relations
    }

    pub fn parents(&self, code: &str) -> &[String] {
        self.parents.get(code).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn children(&self, code: &str) -> &[String] {
        self.children.get(code).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn level(&self, code: &str) -> Option<usize> {
        self.levels.get(code).copied()
    }

    pub fn max_level(&self) -> usize {
        self.levels.values().copied().max().unwrap_or(0)
    }

    /// Edges in insertion order
    pub fn edges(&self) -> impl ExactSizeIterator<Item = (&str, &str)> + '_ {
        self.edges.iter().map(|(p, c)| (p.as_str(), c.as_str()))
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Parent → direct children, for every code that has children
    pub fn hierarchy(&self) -> BTreeMap<&str, &[String]> {
        self.children
            .iter()
            .map(|(parent, children)| (parent.as_str(), children.as_slice()))
            .collect()
    }

    /// Transitive parents of `code`, nearest first
    pub fn ancestors(&self, code: &str) -> Vec<&str> {
        walk(code, |c| self.parents(c))
    }

    /// Transitive children of `code`, nearest first
    pub fn descendants(&self, code: &str) -> Vec<&str> {
        walk(code, |c| self.children(c))
    }
}

/// Breadth-first walk from `start`, each reached code once, `start` excluded
fn walk<'a, F>(start: &str, next: F) -> Vec<&'a str>
where
    F: Fn(&str) -> &'a [String],
{
    let mut seen: HashSet<&str> = HashSet::new();
    let mut found = Vec::new();
    let mut queue: VecDeque<&str> = next(start).iter().map(String::as_str).collect();

    while let Some(code) = queue.pop_front() {
        if !seen.insert(code) {
            continue;
        }
        found.push(code);
        queue.extend(next(code).iter().map(String::as_str));
    }
    found
}

/// Kahn-style pass: a code is levelled once all of its parents are.
fn assign_levels(
    codes: &CodeStore,
    parents: &HashMap<String, Vec<String>>,
    children: &HashMap<String, Vec<String>>,
) -> Result<HashMap<String, usize>> {
    let mut pending: HashMap<&str, usize> = codes
        .keys()
        .map(|code| (code, parents.get(code).map_or(0, Vec::len)))
        .collect();
    let mut levels: HashMap<&str, usize> = HashMap::with_capacity(codes.len());
    let mut queue: VecDeque<&str> = VecDeque::new();

    for code in codes.keys() {
        if pending[code] == 0 {
            levels.insert(code, 1);
            queue.push_back(code);
        }
    }

    let mut conflict = None;
    let mut processed = 0;

    while let Some(code) = queue.pop_front() {
        processed += 1;
        let proposed = levels[code] + 1;

        for child in children.get(code).into_iter().flatten() {
            let child = child.as_str();
            match levels.get(child) {
                Some(&existing) if existing != proposed => {
                    conflict.get_or_insert(CategorizationError::InconsistentLevel {
                        code: child.to_string(),
                        first: existing,
                        second: proposed,
                    });
                }
                Some(_) => {}
                None => {
                    levels.insert(child, proposed);
                }
            }

            if let Some(remaining) = pending.get_mut(child) {
                *remaining -= 1;
                if *remaining == 0 {
                    queue.push_back(child);
                }
            }
        }
    }

    if processed < codes.len() {
        let stuck = codes
            .keys()
            .filter(|code| pending[code] > 0)
            .map(str::to_string)
            .collect();
        return Err(CategorizationError::CyclicHierarchy { codes: stuck });
    }
    if let Some(err) = conflict {
        return Err(err);
    }

    Ok(levels
        .into_iter()
        .map(|(code, level)| (code.to_string(), level))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(codes: &[&str]) -> CodeStore {
        CodeStore::new(codes.iter().map(|c| (*c, *c))).unwrap()
    }

    #[test]
    fn test_levels_follow_depth() {
        let codes = store(&["ROOT", "A", "B", "A1"]);
        let relations = Relations::new()
            .with("ROOT", ["A", "B"])
            .with("A", ["A1"]);
        let graph = HierarchyGraph::build(&codes, &relations).unwrap();

        assert_eq!(graph.level("ROOT"), Some(1));
        assert_eq!(graph.level("A"), Some(2));
        assert_eq!(graph.level("B"), Some(2));
        assert_eq!(graph.level("A1"), Some(3));
        assert_eq!(graph.level("nope"), None);
        assert_eq!(graph.max_level(), 3);
    }

    #[test]
    fn test_isolated_code_is_top_level() {
        let codes = store(&["ROOT", "A", "LONE"]);
        let graph = HierarchyGraph::build(&codes, &Relations::new().with("ROOT", ["A"])).unwrap();
        assert_eq!(graph.level("LONE"), Some(1));
        assert!(graph.parents("LONE").is_empty());
        assert!(graph.children("LONE").is_empty());
    }

    #[test]
    fn test_two_parents_on_same_level() {
        let codes = store(&["ROOT", "A", "B", "X"]);
        let relations = Relations::new()
            .with("ROOT", ["A", "B"])
            .with("A", ["X"])
            .with("B", ["X"]);
        let graph = HierarchyGraph::build(&codes, &relations).unwrap();

        assert_eq!(graph.level("X"), Some(3));
        assert_eq!(graph.parents("X"), ["A", "B"]);
    }

    #[test]
    fn test_parents_on_different_levels_rejected() {
        let codes = store(&["ROOT", "A", "X", "OTHER"]);
        let relations = Relations::new()
            .with("ROOT", ["A"])
            .with("A", ["X"])
            .with("OTHER", ["X"]);
        let result = HierarchyGraph::build(&codes, &relations);

        match result {
            Err(CategorizationError::InconsistentLevel {
                code,
                first,
                second,
            }) => {
                assert_eq!(code, "X");
                let mut seen = [first, second];
                seen.sort_unstable();
                assert_eq!(seen, [2, 3]);
            }
            other => panic!("expected InconsistentLevel, got {:?}", other),
        }
    }

    #[test]
    fn test_cycle_rejected() {
        let codes = store(&["A", "B"]);
        let relations = Relations::new().with("A", ["B"]).with("B", ["A"]);
        let result = HierarchyGraph::build(&codes, &relations);

        match result {
            Err(CategorizationError::CyclicHierarchy { codes }) => {
                assert_eq!(codes, vec!["A", "B"]);
            }
            other => panic!("expected CyclicHierarchy, got {:?}", other),
        }
    }

    #[test]
    fn test_cycle_below_a_root_rejected() {
        let codes = store(&["ROOT", "A", "B"]);
        let relations = Relations::new()
            .with("ROOT", ["A"])
            .with("A", ["B"])
            .with("B", ["A"]);
        assert!(matches!(
            HierarchyGraph::build(&codes, &relations),
            Err(CategorizationError::CyclicHierarchy { .. })
        ));
    }

    #[test]
    fn test_self_loop_rejected() {
        let codes = store(&["A"]);
        let relations = Relations::new().with("A", ["A"]);
        assert!(matches!(
            HierarchyGraph::build(&codes, &relations),
            Err(CategorizationError::CyclicHierarchy { .. })
        ));
    }

    #[test]
    fn test_unknown_endpoint_rejected() {
        let codes = store(&["A"]);
        let relations = Relations::new().with("A", ["Z"]);
        match HierarchyGraph::build(&codes, &relations) {
            Err(CategorizationError::InvalidEdge {
                parent,
                child,
                unknown,
            }) => {
                assert_eq!((parent.as_str(), child.as_str()), ("A", "Z"));
                assert_eq!(unknown, "Z");
            }
            other => panic!("expected InvalidEdge, got {:?}", other),
        }
    }

    #[test]
    fn test_parent_child_symmetry() {
        let codes = store(&["ROOT", "A", "B", "X"]);
        let relations = Relations::new()
            .with("ROOT", ["A", "B"])
            .with("A", ["X"])
            .with("B", ["X"]);
        let graph = HierarchyGraph::build(&codes, &relations).unwrap();

        for p in codes.keys() {
            for c in codes.keys() {
                let down = graph.children(p).iter().any(|x| x == c);
                let up = graph.parents(c).iter().any(|x| x == p);
                assert_eq!(down, up, "asymmetry between {} and {}", p, c);
            }
        }
    }

    #[test]
    fn test_ancestors_and_descendants() {
        let codes = store(&["ROOT", "A", "B", "X"]);
        let relations = Relations::new()
            .with("ROOT", ["A", "B"])
            .with("A", ["X"])
            .with("B", ["X"]);
        let graph = HierarchyGraph::build(&codes, &relations).unwrap();

        assert_eq!(graph.ancestors("X"), vec!["A", "B", "ROOT"]);
        assert_eq!(graph.descendants("ROOT"), vec!["A", "B", "X"]);
        assert!(graph.ancestors("ROOT").is_empty());
    }

    #[test]
    fn test_hierarchy_groups_by_parent() {
        let codes = store(&["ROOT", "A", "B", "A1"]);
        let relations = Relations::new()
            .with("ROOT", ["A", "B"])
            .with("A", ["A1"]);
        let graph = HierarchyGraph::build(&codes, &relations).unwrap();
        let hierarchy = graph.hierarchy();

        assert_eq!(hierarchy.len(), 2);
        assert_eq!(hierarchy["ROOT"], ["A", "B"]);
        assert_eq!(hierarchy["A"], ["A1"]);
        assert!(!hierarchy.contains_key("B"));
    }

    #[test]
    fn test_extended_appends_edges() {
        let codes = store(&["ROOT", "A"]);
        let graph = HierarchyGraph::build(&codes, &Relations::new().with("ROOT", ["A"])).unwrap();

        let bigger = codes.merged(&[("B".to_string(), "B".to_string())]).unwrap();
        let extended = graph
            .extended(&bigger, &Relations::new().with("ROOT", ["B"]))
            .unwrap();

        assert_eq!(extended.children("ROOT"), ["A", "B"]);
        assert_eq!(graph.children("ROOT"), ["A"]);
    }

    #[test]
    fn test_relations_collapse_repeats() {
        let mut relations = Relations::new().with("A", ["B", "B"]);
        assert!(!relations.add("A", "B"));
        assert!(relations.add("A", "C"));
        assert_eq!(relations.len(), 2);

        let collected: Relations = vec![("A", vec!["B", "C"])].into_iter().collect();
        assert_eq!(collected, relations);
    }
}
