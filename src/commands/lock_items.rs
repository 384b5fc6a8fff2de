use anyhow::Result;
use serde_json::json;

use crate::cli::{CliArgs, LockItemsArgs};
use crate::commands::common;
use crate::config::OutputFormat;
use crate::error::AppError;
use crate::graph::{self, LockGraph, LockId, LockKeyRole};
use crate::output::{table, TableOptions};

const ITEM_HEADERS: &[&str] = &["Session", "Resource Type", "Resource", "Mode", "Status", "Object"];

pub fn run(args: &CliArgs, cmd: &LockItemsArgs) -> Result<()> {
    let resolved = common::load_config(args)?;
    let format = common::output_format(args, &resolved);

    let mut source = common::open_lock_source(&resolved, cmd.input.as_deref(), None)?;
    let records = source.fetch_locks()?;
    let graph = graph::build(&records);
    let key = resolve_key(&graph, cmd.id, cmd.role)?;
    let items = source.fetch_lock_items(key)?;

    if matches!(format, OutputFormat::Json) {
        let payload = json!({
            "id": cmd.id,
            "role": cmd.role.as_str(),
            "key": key,
            "count": items.len(),
            "items": items,
        });
        return common::print_json(args, &resolved, &payload);
    }

    if args.quiet {
        return Ok(());
    }

    if items.is_empty() {
        println!("No locks for session {}.", key);
        return Ok(());
    }
    let rows = items
        .iter()
        .map(|item| {
            vec![
                Some(item.session_id.to_string()),
                item.resource_type.clone(),
                item.resource_description.clone(),
                item.request_mode.clone(),
                item.request_status.clone(),
                item.object_name.clone(),
            ]
        })
        .collect::<Vec<_>>();
    let rendered = table::render_rows(ITEM_HEADERS, &rows, format, &TableOptions::default());
    println!("{}", rendered);
    Ok(())
}

/// Session id whose locks answer "what does this node hold or wait on" for `role`.
fn resolve_key(graph: &LockGraph, id: LockId, role: LockKeyRole) -> Result<LockId> {
    let node = graph
        .get(id)
        .ok_or_else(|| AppError::input(format!("Unknown node id: {}", id)))?;
    node.key(role, graph).ok_or_else(|| {
        AppError::input(format!("Node {} is not waiting on any holder", id)).into()
    })
}
