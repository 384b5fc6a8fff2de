use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use tracing::info;

use crate::cli::{CliArgs, LocksArgs};
use crate::commands::common;
use crate::config::{LockView, OutputFormat};
use crate::graph::{self, LockDetail, LockGraph};
use crate::output::table::{self, format_number};
use crate::output::{csv as csv_out, json as json_out, tree, TableOptions};

const NODE_HEADERS: &[&str] = &[
    "Id", "Holder", "Waiters", "Login", "Host", "Database", "Wait Type", "Wait ms", "Mode",
    "Object",
];

pub fn run(args: &CliArgs, cmd: &LocksArgs) -> Result<()> {
    let resolved = common::load_config(args)?;
    let format = common::output_format(args, &resolved);

    let mut source =
        common::open_lock_source(&resolved, cmd.input.as_deref(), cmd.database_filter.clone())?;
    let records = source.fetch_locks()?;
    let captured_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let graph = graph::build(&records);

    if let Some(path) = &cmd.csv {
        csv_out::write_lock_records(path, &records)?;
        info!(path = %path.display(), rows = records.len(), "wrote lock snapshot");
    }

    if matches!(format, OutputFormat::Json) {
        let payload = json_out::graph_to_json(&graph, &records, &source.describe(), &captured_at);
        return common::print_json(args, &resolved, &payload);
    }

    if args.quiet {
        return Ok(());
    }

    let options = TableOptions::default();
    let rendered = if cmd.table || resolved.settings.lock_view == LockView::Table {
        table::render_rows(NODE_HEADERS, &node_rows(&graph), format, &options)
    } else {
        tree::render_wait_tree(&graph, options.max_output_chars)
    };
    println!("{}", rendered);

    let cycles = graph.cycles();
    if !cycles.is_empty() {
        println!();
        for cycle in cycles {
            let ids = cycle.iter().map(ToString::to_string).collect::<Vec<_>>();
            println!("Deadlock: {}", ids.join(" -> "));
        }
    }

    Ok(())
}

fn node_rows(graph: &LockGraph) -> Vec<Vec<Option<String>>> {
    graph
        .iter()
        .map(|node| {
            let waiters = node
                .waiters()
                .iter()
                .map(|idx| graph.node(*idx).id().to_string())
                .collect::<Vec<_>>();
            let detail = node.detail();
            let field = |pick: fn(&LockDetail) -> Option<String>| detail.and_then(pick);
            vec![
                Some(node.id().to_string()),
                node.holder_key(graph).map(|id| id.to_string()),
                Some(waiters.join(",")).filter(|w| !w.is_empty()),
                field(|d| d.login.clone()),
                field(|d| d.host.clone()),
                field(|d| d.database.clone()),
                field(|d| d.wait_type.clone()),
                detail.and_then(|d| d.wait_time_ms).map(format_number),
                field(|d| d.lock_mode.clone()),
                field(|d| d.object_name.clone()),
            ]
        })
        .collect()
}
