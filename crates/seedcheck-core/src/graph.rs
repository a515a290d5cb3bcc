use std::collections::VecDeque;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ddl::TableDependency;
use crate::error::CycleError;

/// Summary of the dependency graph built from DDL facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyGraphSummary {
    pub nodes: usize,
    pub edges: usize,
}

/// Dependency graph with edges pointing from a referenced table to its dependents.
///
/// Nodes keep the order in which they were first discovered while scanning
/// the facts, which is the tie-break order for independent tables.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    dependents: IndexMap<String, Vec<String>>,
    indegree: IndexMap<String, usize>,
}

impl DependencyGraph {
    /// Build the graph. Duplicate references yield duplicate edges.
    pub fn build(deps: &[TableDependency]) -> Self {
        let mut graph = Self::default();

        for dep in deps {
            graph.add_node(&dep.name);
            for referenced in &dep.dependencies {
                graph.add_node(referenced);
            }
        }

        for dep in deps {
            for referenced in &dep.dependencies {
                graph
                    .dependents
                    .entry(referenced.clone())
                    .or_default()
                    .push(dep.name.clone());
                *graph.indegree.entry(dep.name.clone()).or_insert(0) += 1;
            }
        }

        graph
    }

    fn add_node(&mut self, name: &str) {
        if !self.indegree.contains_key(name) {
            self.indegree.insert(name.to_string(), 0);
            self.dependents.insert(name.to_string(), Vec::new());
        }
    }

    pub fn summary(&self) -> DependencyGraphSummary {
        DependencyGraphSummary {
            nodes: self.indegree.len(),
            edges: self.dependents.values().map(Vec::len).sum(),
        }
    }

    /// Kahn's algorithm over a FIFO queue seeded in discovery order.
    ///
    /// Fails with the unresolved tables when the graph is not a DAG; no
    /// partial order is returned.
    pub fn toposort(&self) -> Result<Vec<String>, CycleError> {
        let mut indegree = self.indegree.clone();
        let mut queue: VecDeque<&str> = self
            .indegree
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(node, _)| node.as_str())
            .collect();

        let mut order = Vec::with_capacity(indegree.len());

        while let Some(node) = queue.pop_front() {
            order.push(node.to_string());

            let Some(dependents) = self.dependents.get(node) else {
                continue;
            };
            for dependent in dependents {
                if let Some(count) = indegree.get_mut(dependent) {
                    *count -= 1;
                    if *count == 0 {
                        queue.push_back(dependent);
                    }
                }
            }
        }

        if order.len() == indegree.len() {
            Ok(order)
        } else {
            let tables = indegree
                .into_iter()
                .filter_map(|(node, count)| (count > 0).then_some(node))
                .collect();
            Err(CycleError { tables })
        }
    }
}

/// Order tables so that every referenced table precedes the tables referencing it.
pub fn order_tables(deps: &[TableDependency]) -> Result<Vec<String>, CycleError> {
    DependencyGraph::build(deps).toposort()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dep(name: &str, deps: &[&str]) -> TableDependency {
        TableDependency {
            name: name.to_string(),
            dependencies: deps.iter().map(|d| d.to_string()).collect(),
        }
    }

    fn assert_dependencies_first(deps: &[TableDependency], order: &[String]) {
        let position = |table: &str| {
            order
                .iter()
                .position(|item| item == table)
                .unwrap_or_else(|| panic!("{table} missing from order"))
        };
        for fact in deps {
            for referenced in &fact.dependencies {
                assert!(
                    position(referenced) < position(&fact.name),
                    "{referenced} should precede {}",
                    fact.name
                );
            }
        }
    }

    #[test]
    fn orders_dependencies_before_dependents() {
        let deps = vec![dep("orders", &["users"]), dep("users", &[])];
        assert_eq!(order_tables(&deps).unwrap(), vec!["users", "orders"]);
    }

    #[test]
    fn independent_tables_keep_discovery_order() {
        let deps = vec![dep("zeta", &[]), dep("alpha", &[]), dep("mid", &[])];
        assert_eq!(order_tables(&deps).unwrap(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn undeclared_referenced_tables_become_nodes() {
        let deps = vec![dep("orders", &["customers"])];
        let graph = DependencyGraph::build(&deps);
        assert_eq!(graph.summary(), DependencyGraphSummary { nodes: 2, edges: 1 });
        assert_eq!(graph.toposort().unwrap(), vec!["customers", "orders"]);
    }

    #[test]
    fn duplicate_references_are_counted_per_edge() {
        let deps = vec![
            dep("transfers", &["accounts", "accounts"]),
            dep("accounts", &[]),
        ];
        let graph = DependencyGraph::build(&deps);
        assert_eq!(graph.summary().edges, 2);
        assert_eq!(graph.toposort().unwrap(), vec!["accounts", "transfers"]);
    }

    #[test]
    fn diamond_respects_every_edge() {
        let deps = vec![
            dep("line_items", &["orders", "products"]),
            dep("orders", &["users", "addresses"]),
            dep("addresses", &["users"]),
            dep("products", &["vendors"]),
            dep("users", &[]),
            dep("vendors", &[]),
            dep("audit", &[]),
        ];
        let order = order_tables(&deps).unwrap();
        assert_eq!(order.len(), 7);
        assert_dependencies_first(&deps, &order);
    }

    #[test]
    fn two_table_cycle_is_rejected() {
        let deps = vec![dep("a", &["b"]), dep("b", &["a"])];
        let err = order_tables(&deps).unwrap_err();
        assert_eq!(err.tables, vec!["a", "b"]);
    }

    #[test]
    fn cycle_reports_only_unresolved_tables() {
        let deps = vec![
            dep("users", &[]),
            dep("a", &["users", "c"]),
            dep("b", &["a"]),
            dep("c", &["b"]),
            dep("reports", &["a"]),
        ];
        let err = order_tables(&deps).unwrap_err();
        assert_eq!(err.tables, vec!["a", "c", "b", "reports"]);
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let deps = vec![dep("employees", &["employees"])];
        let err = order_tables(&deps).unwrap_err();
        assert_eq!(err.tables, vec!["employees"]);
    }

    #[test]
    fn empty_input_orders_nothing() {
        assert!(order_tables(&[]).unwrap().is_empty());
    }
}
