use tracing::debug;

use super::{LockGraph, LockRecord};

/// Build a wait-for graph from flat lock rows.
///
/// Every id mentioned anywhere in `records` resolves to exactly one node. A
/// holder id with no row of its own becomes a placeholder node. Rows sharing an
/// id enrich the node's detail, and the first holder link established for a
/// node is kept. A row naming itself as holder is linked as-is.
pub fn build<'a, I>(records: I) -> LockGraph
where
    I: IntoIterator<Item = &'a LockRecord>,
    I::IntoIter: Clone,
{
    let records = records.into_iter();
    let mut graph = LockGraph::default();

    for record in records.clone() {
        let idx = graph.get_or_insert(record.id);
        let node = graph.node_mut(idx);
        match &mut node.detail {
            Some(detail) => detail.enrich(&record.detail),
            None => node.detail = Some(record.detail.clone()),
        }
    }

    for record in records {
        let Some(holder_id) = record.holder_id else {
            continue;
        };
        let waiter = graph.get_or_insert(record.id);
        let holder = graph.get_or_insert(holder_id);
        if !graph.link(waiter, holder) {
            let kept = graph.node(waiter).holder().map(|idx| graph.node(idx).id());
            if kept != Some(holder_id) {
                debug!(
                    id = %record.id,
                    holder = %holder_id,
                    kept = ?kept.map(|id| id.get()),
                    "ignoring second holder for lock owner"
                );
            }
        }
        if record.id == holder_id {
            debug!(id = %record.id, "lock owner waits on itself");
        }
    }

    debug!(
        nodes = graph.len(),
        waiting = graph.waiting_count(),
        "built lock graph"
    );
    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{LockDetail, LockId, LockKeyRole};

    fn rec(id: i64, holder: Option<i64>) -> LockRecord {
        LockRecord::new(id, holder.map(LockId))
    }

    fn ids(graph: &LockGraph, id: i64) -> Vec<i64> {
        graph.waiters_of(LockId(id)).map(|n| n.id().get()).collect()
    }

    fn holder(graph: &LockGraph, id: i64) -> Option<i64> {
        graph.holder_of(LockId(id)).map(|n| n.id().get())
    }

    #[test]
    fn builds_example_chain() {
        let records = vec![
            rec(1, None),
            rec(2, Some(1)),
            rec(3, Some(1)),
            rec(4, Some(2)),
        ];
        let graph = build(&records);

        assert_eq!(graph.len(), 4);
        assert_eq!(holder(&graph, 1), None);
        assert_eq!(ids(&graph, 1), vec![2, 3]);
        assert_eq!(holder(&graph, 2), Some(1));
        assert_eq!(ids(&graph, 2), vec![4]);
        assert_eq!(holder(&graph, 3), Some(1));
        assert!(ids(&graph, 3).is_empty());
        assert_eq!(holder(&graph, 4), Some(2));
        assert!(ids(&graph, 4).is_empty());
    }

    #[test]
    fn empty_input_gives_empty_graph() {
        let graph = build(&Vec::<LockRecord>::new());
        assert!(graph.is_empty());
        assert_eq!(graph, LockGraph::default());
    }

    #[test]
    fn unknown_ids_resolve_to_nothing() {
        let graph = build(&vec![rec(2, Some(1))]);
        assert!(graph.get(LockId(42)).is_none());
        assert_eq!(holder(&graph, 42), None);
        assert!(ids(&graph, 42).is_empty());
        assert_eq!(holder(&graph, 1), None);
    }

    #[test]
    fn dangling_holder_becomes_placeholder() {
        let records = vec![rec(7, Some(99))];
        let graph = build(&records);

        let placeholder = graph.get(LockId(99)).expect("placeholder node");
        assert!(placeholder.is_placeholder());
        assert_eq!(placeholder.holder(), None);
        assert_eq!(ids(&graph, 99), vec![7]);
        assert!(!graph.get(LockId(7)).expect("node").is_placeholder());
    }

    #[test]
    fn holder_row_arriving_later_is_not_a_placeholder() {
        let records = vec![rec(2, Some(1)), rec(1, None)];
        let graph = build(&records);
        assert!(!graph.get(LockId(1)).expect("node").is_placeholder());
        assert_eq!(ids(&graph, 1), vec![2]);
    }

    #[test]
    fn every_link_is_mirrored_exactly_once() {
        let records = vec![
            rec(1, None),
            rec(2, Some(1)),
            rec(2, Some(1)),
            rec(3, Some(2)),
            rec(5, Some(4)),
            rec(3, Some(2)),
        ];
        let graph = build(&records);

        for node in graph.iter() {
            if let Some(holder) = node.holder() {
                let idx = graph.index_of(node.id()).expect("index");
                let count = graph
                    .node(holder)
                    .waiters()
                    .iter()
                    .filter(|w| **w == idx)
                    .count();
                assert_eq!(count, 1, "node {} mirrored {} times", node.id(), count);
            }
        }
        for record in &records {
            if let Some(holder_id) = record.holder_id {
                assert!(graph.contains(holder_id));
            }
        }
    }

    #[test]
    fn duplicate_ids_enrich_without_relinking() {
        let first = rec(2, Some(1)).with_detail(LockDetail {
            lock_mode: Some("X".to_string()),
            ..LockDetail::default()
        });
        let second = rec(2, Some(3)).with_detail(LockDetail {
            lock_mode: Some("S".to_string()),
            object_name: Some("dbo.orders".to_string()),
            ..LockDetail::default()
        });
        let graph = build(&vec![rec(1, None), first, second]);

        let node = graph.get(LockId(2)).expect("node");
        let detail = node.detail().expect("detail");
        assert_eq!(detail.lock_mode.as_deref(), Some("X"));
        assert_eq!(detail.object_name.as_deref(), Some("dbo.orders"));
        assert_eq!(holder(&graph, 2), Some(1));
        assert_eq!(ids(&graph, 1), vec![2]);
        assert!(ids(&graph, 3).is_empty());
        assert!(graph.get(LockId(3)).expect("placeholder").is_placeholder());
    }

    #[test]
    fn self_wait_links_node_to_itself() {
        let graph = build(&vec![rec(5, Some(5))]);
        assert_eq!(graph.len(), 1);
        assert_eq!(holder(&graph, 5), Some(5));
        assert_eq!(ids(&graph, 5), vec![5]);
    }

    #[test]
    fn rebuilds_are_equal_and_independent() {
        let records = vec![rec(1, None), rec(2, Some(1))];
        let first = build(&records);
        let mut second = build(&records);
        assert_eq!(first, second);

        second.link(
            second.index_of(LockId(1)).expect("index"),
            second.index_of(LockId(2)).expect("index"),
        );
        assert_eq!(holder(&second, 1), Some(2));
        assert_eq!(holder(&first, 1), None);
    }

    #[test]
    fn keys_expose_both_roles() {
        let graph = build(&vec![rec(1, None), rec(2, Some(1)), rec(3, Some(2))]);
        let middle = graph.get(LockId(2)).expect("node");

        assert_eq!(middle.waiter_key(), LockId(2));
        assert_eq!(middle.holder_key(&graph), Some(LockId(1)));
        assert_eq!(middle.key(LockKeyRole::Holder, &graph), Some(LockId(1)));
        assert_eq!(middle.key(LockKeyRole::Waiter, &graph), Some(LockId(2)));

        let head = graph.get(LockId(1)).expect("node");
        assert_eq!(head.key(LockKeyRole::Holder, &graph), None);
    }
}
