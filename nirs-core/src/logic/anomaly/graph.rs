//! Counterparty Graph
//!
//! Node ids are assigned first-seen-wins, starting at 1, in transaction order.
//! `AddressIndex` is an append-only arena; keep it across calls to keep ids stable.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::transaction::Transaction;

// ============================================================================
// ADDRESS INDEX
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct AddressIndex {
    ids: HashMap<String, u32>,
    addresses: Vec<String>,
}

impl AddressIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing id, or the next sequential one
    pub fn intern(&mut self, address: &str) -> u32 {
        if let Some(&id) = self.ids.get(address) {
            return id;
        }
        self.addresses.push(address.to_string());
        let id = self.addresses.len() as u32;
        self.ids.insert(address.to_string(), id);
        id
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

// ============================================================================
// GRAPH
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: u32,
    pub address: String,
    /// Address appears in a flagged transaction
    pub implicated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: u32,
    pub to: u32,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,
    /// This transaction was flagged
    pub anomalous: bool,
    /// Either endpoint is implicated
    pub implicated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl Graph {
    pub fn node(&self, address: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.address == address)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    index: AddressIndex,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue numbering from an earlier call
    pub fn with_index(index: AddressIndex) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &AddressIndex {
        &self.index
    }

    pub fn into_index(self) -> AddressIndex {
        self.index
    }

    /// One edge per transaction; `anomalous` holds positions into `transactions`
    pub fn build(&mut self, transactions: &[Transaction], anomalous: &HashSet<usize>) -> Graph {
        let implicated: HashSet<&str> = anomalous
            .iter()
            .filter_map(|&i| transactions.get(i))
            .flat_map(|tx| [tx.from.as_str(), tx.to.as_str()])
            .collect();

        let mut graph = Graph::default();
        let mut emitted = HashSet::new();

        for (position, tx) in transactions.iter().enumerate() {
            let from = self.index.intern(&tx.from);
            let to = self.index.intern(&tx.to);

            for (id, address) in [(from, tx.from.as_str()), (to, tx.to.as_str())] {
                if emitted.insert(id) {
                    graph.nodes.push(GraphNode {
                        id,
                        address: address.to_string(),
                        implicated: implicated.contains(address),
                    });
                }
            }

            graph.edges.push(GraphEdge {
                from,
                to,
                value: tx.value,
                asset: tx.asset.clone(),
                anomalous: anomalous.contains(&position),
                implicated: implicated.contains(tx.from.as_str()) || implicated.contains(tx.to.as_str()),
            });
        }

        graph
    }
}
