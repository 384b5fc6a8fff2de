use crate::graph::{LockGraph, LockNode};
use crate::output::table::{format_number, truncate_output};

const BRANCH: &str = "└─ ";
const INDENT: &str = "   ";

/// One line per node below each head blocker, waiters indented under their
/// holder. A node reached a second time is marked and not expanded.
pub fn render_wait_tree(graph: &LockGraph, max_output_chars: usize) -> String {
    let mut lines = Vec::new();
    for root in graph.roots() {
        graph.walk(root, |visit| {
            let mut line = String::new();
            if visit.depth > 0 {
                line.push_str(&INDENT.repeat(visit.depth - 1));
                line.push_str(BRANCH);
            }
            if visit.closes_cycle {
                line.push_str(&format!("{} (cycle)", visit.node.id()));
            } else {
                line.push_str(&node_label(visit.node));
            }
            lines.push(line);
        });
    }
    if lines.is_empty() {
        return "No blocking detected.".to_string();
    }
    truncate_output(lines.join("\n"), max_output_chars)
}

pub fn node_label(node: &LockNode) -> String {
    let mut parts = vec![node.id().to_string()];
    let Some(detail) = node.detail() else {
        parts.push("(no detail)".to_string());
        return parts.join(" ");
    };
    match (&detail.login, &detail.host) {
        (Some(login), Some(host)) => parts.push(format!("{}@{}", login, host)),
        (Some(login), None) => parts.push(login.clone()),
        (None, Some(host)) => parts.push(format!("@{}", host)),
        (None, None) => {}
    }
    if let Some(wait_type) = &detail.wait_type {
        match detail.wait_time_ms {
            Some(ms) => parts.push(format!("{} {} ms", wait_type, format_number(ms))),
            None => parts.push(wait_type.clone()),
        }
    }
    if let Some(mode) = &detail.lock_mode {
        parts.push(mode.clone());
    }
    if let Some(object) = &detail.object_name {
        parts.push(object.clone());
    }
    parts.join(" ")
}
