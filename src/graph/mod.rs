//! Wait-for graph of blocked and blocking lock owners.
//!
//! Nodes live in a table owned by [`LockGraph`]; holder and waiter links are
//! [`NodeIndex`] values into that table. A graph is built once per fetch by
//! [`build`] and is read-only afterwards.
//!
//! The graph may contain cycles, including a node that is its own holder.
//! Anything that walks holder or waiter links must go through the helpers in
//! this module or track visited nodes itself.

mod builder;
mod record;
mod walk;

use std::collections::HashMap;

pub use builder::build;
pub use record::{LockDetail, LockId, LockItem, LockRecord};
pub use walk::Visit;

/// Position of a node in its graph's node table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(usize);

/// Which side of a wait a detail lookup is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockKeyRole {
    /// The owner holding what the selected node waits on.
    Holder,
    /// The selected node itself.
    Waiter,
}

impl LockKeyRole {
    pub fn as_str(self) -> &'static str {
        match self {
            LockKeyRole::Holder => "holder",
            LockKeyRole::Waiter => "waiter",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "holder" | "hold" => Some(LockKeyRole::Holder),
            "waiter" | "wait" => Some(LockKeyRole::Waiter),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockNode {
    id: LockId,
    holder: Option<NodeIndex>,
    waiters: Vec<NodeIndex>,
    detail: Option<LockDetail>,
}

impl LockNode {
    fn placeholder(id: LockId) -> Self {
        Self {
            id,
            holder: None,
            waiters: Vec::new(),
            detail: None,
        }
    }

    pub fn id(&self) -> LockId {
        self.id
    }

    pub fn holder(&self) -> Option<NodeIndex> {
        self.holder
    }

    pub fn waiters(&self) -> &[NodeIndex] {
        &self.waiters
    }

    /// Row metadata, or `None` for a node only ever named as someone's holder.
    pub fn detail(&self) -> Option<&LockDetail> {
        self.detail.as_ref()
    }

    pub fn is_placeholder(&self) -> bool {
        self.detail.is_none()
    }

    pub fn is_waiting(&self) -> bool {
        self.holder.is_some()
    }

    pub fn is_blocking(&self) -> bool {
        !self.waiters.is_empty()
    }

    /// Key for fetching the locks this node itself requests or holds.
    pub fn waiter_key(&self) -> LockId {
        self.id
    }

    /// Key for fetching the locks of the owner this node is waiting on.
    pub fn holder_key(&self, graph: &LockGraph) -> Option<LockId> {
        self.holder.map(|idx| graph.node(idx).id)
    }

    pub fn key(&self, role: LockKeyRole, graph: &LockGraph) -> Option<LockId> {
        match role {
            LockKeyRole::Holder => self.holder_key(graph),
            LockKeyRole::Waiter => Some(self.waiter_key()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LockGraph {
    nodes: Vec<LockNode>,
    index: HashMap<LockId, NodeIndex>,
}

impl LockGraph {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &LockNode> {
        self.nodes.iter()
    }

    pub fn contains(&self, id: LockId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn index_of(&self, id: LockId) -> Option<NodeIndex> {
        self.index.get(&id).copied()
    }

    pub fn get(&self, id: LockId) -> Option<&LockNode> {
        self.index_of(id).map(|idx| self.node(idx))
    }

    /// Panics if `idx` did not come from this graph.
    pub(crate) fn node(&self, idx: NodeIndex) -> &LockNode {
        &self.nodes[idx.0]
    }

    pub fn holder_of(&self, id: LockId) -> Option<&LockNode> {
        let holder = self.get(id)?.holder?;
        Some(self.node(holder))
    }

    pub fn waiters_of(&self, id: LockId) -> impl Iterator<Item = &LockNode> {
        self.get(id)
            .map(|node| node.waiters.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|idx| self.node(*idx))
    }

    pub fn waiting_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_waiting()).count()
    }

    fn get_or_insert(&mut self, id: LockId) -> NodeIndex {
        if let Some(idx) = self.index.get(&id) {
            return *idx;
        }
        let idx = NodeIndex(self.nodes.len());
        self.nodes.push(LockNode::placeholder(id));
        self.index.insert(id, idx);
        idx
    }

    fn node_mut(&mut self, idx: NodeIndex) -> &mut LockNode {
        &mut self.nodes[idx.0]
    }

    /// Sets `waiter.holder` and appends to `holder.waiters` in one step.
    /// Returns `false` and leaves both nodes untouched if the waiter already
    /// has a holder.
    fn link(&mut self, waiter: NodeIndex, holder: NodeIndex) -> bool {
        if self.node(waiter).holder.is_some() {
            return false;
        }
        self.node_mut(waiter).holder = Some(holder);
        let waiters = &mut self.node_mut(holder).waiters;
        if !waiters.contains(&waiter) {
            waiters.push(waiter);
        }
        true
    }
}
