use std::collections::HashSet;

use super::{LockGraph, LockId, LockNode, NodeIndex};

/// One step of a waiter-tree traversal.
#[derive(Debug, Clone, Copy)]
pub struct Visit<'a> {
    pub node: &'a LockNode,
    pub depth: usize,
    /// The node was already visited on this walk; its waiters are not expanded.
    pub closes_cycle: bool,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Fresh,
    OnPath,
    Done,
}

impl LockGraph {
    /// Head blockers: nodes that block someone without waiting themselves,
    /// plus the first-seen member of every cycle. Every waiting node is
    /// reachable from one of these through waiter links.
    pub fn roots(&self) -> Vec<NodeIndex> {
        let mut roots: Vec<NodeIndex> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.holder.is_none() && node.is_blocking())
            .map(|(idx, _)| NodeIndex(idx))
            .collect();
        roots.extend(self.cycle_indices().into_iter().filter_map(|c| c.first().copied()));
        roots.sort();
        roots.dedup();
        roots
    }

    /// Ids from `id` up through its holders, ending at the head blocker or
    /// just before the first repeated node.
    pub fn blocking_chain(&self, id: LockId) -> Vec<LockId> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.index_of(id);
        while let Some(idx) = current {
            if !seen.insert(idx) {
                break;
            }
            let node = self.node(idx);
            chain.push(node.id);
            current = node.holder;
        }
        chain
    }

    /// Every wait cycle once, starting at its first-seen member and following
    /// holder links. A self-wait is a cycle of one.
    pub fn cycles(&self) -> Vec<Vec<LockId>> {
        self.cycle_indices()
            .into_iter()
            .map(|cycle| cycle.into_iter().map(|idx| self.node(idx).id).collect())
            .collect()
    }

    fn cycle_indices(&self) -> Vec<Vec<NodeIndex>> {
        let mut marks = vec![Mark::Fresh; self.nodes.len()];
        let mut cycles = Vec::new();

        for start in 0..self.nodes.len() {
            if marks[start] != Mark::Fresh {
                continue;
            }
            let mut path = Vec::new();
            let mut current = Some(start);
            while let Some(idx) = current {
                match marks[idx] {
                    Mark::Done => break,
                    Mark::OnPath => {
                        if let Some(pos) = path.iter().position(|p| *p == idx) {
                            cycles.push(rotate_to_min(&path[pos..]));
                        }
                        break;
                    }
                    Mark::Fresh => {
                        marks[idx] = Mark::OnPath;
                        path.push(idx);
                        current = self.nodes[idx].holder.map(|h| h.0);
                    }
                }
            }
            for idx in path {
                marks[idx] = Mark::Done;
            }
        }

        cycles.sort();
        cycles
    }

    /// Depth-first pre-order walk of the waiters below `root`, never expanding
    /// a node twice.
    pub fn walk<F>(&self, root: NodeIndex, mut visit: F)
    where
        F: FnMut(Visit<'_>),
    {
        let mut seen = HashSet::new();
        let mut stack = vec![(root, 0usize)];
        while let Some((idx, depth)) = stack.pop() {
            let node = self.node(idx);
            let first = seen.insert(idx);
            visit(Visit {
                node,
                depth,
                closes_cycle: !first,
            });
            if !first {
                continue;
            }
            for waiter in node.waiters.iter().rev() {
                stack.push((*waiter, depth + 1));
            }
        }
    }
}

fn rotate_to_min(cycle: &[usize]) -> Vec<NodeIndex> {
    let start = cycle
        .iter()
        .enumerate()
        .min_by_key(|(_, idx)| **idx)
        .map(|(pos, _)| pos)
        .unwrap_or(0);
    cycle[start..]
        .iter()
        .chain(cycle[..start].iter())
        .map(|idx| NodeIndex(*idx))
        .collect()
}
