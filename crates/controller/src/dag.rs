//! Intent dependency graph.
//!
//! A [`DependencyTable`] maps an intent name to the intent names whose
//! results it needs. The [`DependencyAnalyzer`] applies the table to one
//! turn's intents and splits them into an independent group and an ordered
//! chain.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use concierge_core::{
    config::OrchestratorConfig,
    types::{ExecutionPlan, Intent},
    Error, Result,
};

/// Validated, immutable intent -> dependencies table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyTable {
    edges: BTreeMap<String, Vec<String>>,
}

impl DependencyTable {
    /// Build a table, rejecting cycles (including self-dependencies).
    pub fn new(edges: BTreeMap<String, Vec<String>>) -> Result<Self> {
        let table = Self { edges };
        table.check_acyclic()?;
        Ok(table)
    }

    /// Table with no edges: every intent is independent.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_config(config: &OrchestratorConfig) -> Result<Self> {
        Self::new(config.dependencies.clone())
    }

    /// Declared dependencies of `intent_name`.
    pub fn dependencies_of(&self, intent_name: &str) -> &[String] {
        self.edges.get(intent_name).map(Vec::as_slice).unwrap_or(&[])
    }

    fn check_acyclic(&self) -> Result<()> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        fn visit<'a>(
            table: &'a DependencyTable,
            name: &'a str,
            marks: &mut BTreeMap<&'a str, Mark>,
            path: &mut Vec<&'a str>,
        ) -> Result<()> {
            match marks.get(name) {
                Some(Mark::Done) => return Ok(()),
                Some(Mark::Visiting) => {
                    path.push(name);
                    return Err(Error::invalid_graph(format!(
                        "dependency cycle: {}",
                        path.join(" -> ")
                    )));
                }
                None => {}
            }

            marks.insert(name, Mark::Visiting);
            path.push(name);
            for dep in table.dependencies_of(name) {
                visit(table, dep, marks, path)?;
            }
            path.pop();
            marks.insert(name, Mark::Done);
            Ok(())
        }

        let mut marks = BTreeMap::new();
        for name in self.edges.keys() {
            let mut path = Vec::new();
            visit(self, name, &mut marks, &mut path)?;
        }
        Ok(())
    }
}

/// Partitions a turn's intents using a [`DependencyTable`].
#[derive(Debug, Clone)]
pub struct DependencyAnalyzer {
    table: DependencyTable,
}

impl DependencyAnalyzer {
    pub fn new(table: DependencyTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &DependencyTable {
        &self.table
    }

    /// Split intents into an independent group and a topologically ordered chain.
    ///
    /// An intent joins the chain when one of its dependencies is present in
    /// this turn, or when it is itself a present dependency of another
    /// intent. Everything else is independent. Both lists keep detection
    /// order; chain ties are broken by detection order too.
    pub fn analyze(&self, intents: Vec<Intent>) -> Result<ExecutionPlan> {
        let n = intents.len();

        // Edges by position so repeated intent names stay distinct.
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut in_degree = vec![0usize; n];
        let mut in_chain = vec![false; n];

        for (i, intent) in intents.iter().enumerate() {
            let deps: HashSet<&str> = self
                .table
                .dependencies_of(&intent.name)
                .iter()
                .map(String::as_str)
                .collect();
            if deps.is_empty() {
                continue;
            }
            for (j, other) in intents.iter().enumerate() {
                if i != j && deps.contains(other.name.as_str()) {
                    dependents[j].push(i);
                    in_degree[i] += 1;
                    in_chain[i] = true;
                    in_chain[j] = true;
                }
            }
        }

        // Kahn's algorithm, lowest detection index first.
        let mut ready: BTreeSet<usize> = (0..n).filter(|&i| in_chain[i] && in_degree[i] == 0).collect();
        let mut order = Vec::with_capacity(n);
        while let Some(next) = ready.pop_first() {
            order.push(next);
            for &dependent in &dependents[next] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }

        let chain_len = in_chain.iter().filter(|c| **c).count();
        if order.len() != chain_len {
            return Err(Error::invalid_graph("cycle among this turn's intents"));
        }

        let mut slots: Vec<Option<Intent>> = intents.into_iter().map(Some).collect();
        let sequential_chain = order.iter().filter_map(|&i| slots[i].take()).collect();
        let independent = slots
            .into_iter()
            .zip(in_chain)
            .filter(|(_, chained)| !chained)
            .filter_map(|(slot, _)| slot)
            .collect();

        Ok(ExecutionPlan {
            independent,
            sequential_chain,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(edges: &[(&str, &[&str])]) -> Result<DependencyTable> {
        DependencyTable::new(
            edges
                .iter()
                .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
                .collect(),
        )
    }

    fn default_analyzer() -> DependencyAnalyzer {
        DependencyAnalyzer::new(DependencyTable::new(OrchestratorConfig::default_dependencies()).unwrap())
    }

    fn intents(names: &[&str]) -> Vec<Intent> {
        names.iter().map(|n| Intent::new(*n, 0.9)).collect()
    }

    fn names(list: &[Intent]) -> Vec<&str> {
        list.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn test_no_edges_all_independent() {
        let plan = default_analyzer()
            .analyze(intents(&["policy_lookup", "service_discovery", "data_query"]))
            .unwrap();
        assert_eq!(names(&plan.independent), vec!["policy_lookup", "service_discovery", "data_query"]);
        assert!(plan.sequential_chain.is_empty());
    }

    #[test]
    fn test_dependency_precedes_dependent() {
        // Detected in the "wrong" order on purpose.
        let plan = default_analyzer()
            .analyze(intents(&["complaint", "policy_lookup", "booking_status"]))
            .unwrap();
        assert_eq!(names(&plan.independent), vec!["policy_lookup"]);
        assert_eq!(names(&plan.sequential_chain), vec!["booking_status", "complaint"]);
    }

    #[test]
    fn test_absent_dependency_means_independent() {
        let plan = default_analyzer().analyze(intents(&["complaint", "policy_lookup"])).unwrap();
        assert_eq!(names(&plan.independent), vec!["complaint", "policy_lookup"]);
        assert!(plan.sequential_chain.is_empty());
    }

    #[test]
    fn test_shared_dependency_ties_keep_detection_order() {
        let plan = default_analyzer()
            .analyze(intents(&["booking_cancel", "booking_status", "complaint"]))
            .unwrap();
        assert_eq!(
            names(&plan.sequential_chain),
            vec!["booking_status", "booking_cancel", "complaint"]
        );
        assert!(plan.independent.is_empty());
    }

    #[test]
    fn test_every_intent_placed_exactly_once() {
        let input = intents(&["booking_status", "complaint", "data_query", "booking_reschedule", "policy_lookup"]);
        let plan = default_analyzer().analyze(input).unwrap();
        assert_eq!(plan.len(), 5);
        assert_eq!(names(&plan.independent), vec!["data_query", "policy_lookup"]);
        assert_eq!(
            names(&plan.sequential_chain),
            vec!["booking_status", "complaint", "booking_reschedule"]
        );
    }

    #[test]
    fn test_transitive_chain() {
        let analyzer = DependencyAnalyzer::new(table(&[("c", &["b"]), ("b", &["a"])]).unwrap());
        let plan = analyzer.analyze(intents(&["c", "a", "b"])).unwrap();
        assert_eq!(names(&plan.sequential_chain), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_cycle_rejected_at_construction() {
        let err = table(&[("a", &["b"]), ("b", &["c"]), ("c", &["a"])]).unwrap_err();
        assert!(matches!(err, Error::InvalidDependencyGraph(_)));

        let err = table(&[("a", &["a"])]).unwrap_err();
        assert!(matches!(err, Error::InvalidDependencyGraph(_)));
    }

    #[test]
    fn test_empty_turn() {
        let plan = default_analyzer().analyze(Vec::new()).unwrap();
        assert!(plan.is_empty());
    }
}
