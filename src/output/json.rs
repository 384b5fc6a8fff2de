use serde::Serialize;
use serde_json::json;

use crate::config::ResolvedConfig;
use crate::graph::{LockGraph, LockId, LockRecord};
use crate::source::SnapshotRow;

pub fn emit_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<String> {
    if pretty {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        Ok(serde_json::to_string(value)?)
    }
}

pub fn emit_json_value(value: &serde_json::Value, pretty: bool) -> anyhow::Result<String> {
    emit_json(value, pretty)
}

pub fn error_json(message: &str, kind: &str) -> serde_json::Value {
    json!({
        "error": {
            "message": message,
            "kind": kind,
        }
    })
}

/// Nodes with their links resolved to ids, in first-seen order.
pub fn graph_nodes_to_json(graph: &LockGraph) -> Vec<serde_json::Value> {
    graph
        .iter()
        .map(|node| {
            let waiters = node
                .waiters()
                .iter()
                .map(|idx| graph.node(*idx).id())
                .collect::<Vec<_>>();
            json!({
                "id": node.id(),
                "holderId": node.holder_key(graph),
                "waiterIds": waiters,
                "placeholder": node.is_placeholder(),
                "blockingChain": graph.blocking_chain(node.id()),
                "detail": node.detail(),
            })
        })
        .collect()
}

pub fn graph_to_json(
    graph: &LockGraph,
    records: &[LockRecord],
    source: &str,
    captured_at: &str,
) -> serde_json::Value {
    let roots = graph
        .roots()
        .into_iter()
        .map(|idx| graph.node(idx).id())
        .collect::<Vec<LockId>>();
    let rows = records.iter().map(SnapshotRow::from).collect::<Vec<_>>();
    json!({
        "source": source,
        "capturedAt": captured_at,
        "nodeCount": graph.len(),
        "waitingCount": graph.waiting_count(),
        "roots": roots,
        "cycles": graph.cycles(),
        "nodes": graph_nodes_to_json(graph),
        "records": rows,
    })
}

pub fn config_to_json(resolved: &ResolvedConfig) -> serde_json::Value {
    json!({
        "configPath": resolved.config_path.as_ref().map(|p| p.display().to_string()),
        "profileName": resolved.profile_name,
        "connection": {
            "server": resolved.connection.server,
            "port": resolved.connection.port,
            "database": resolved.connection.database,
            "user": resolved.connection.user,
            "password": resolved.connection.password.as_ref().map(|_| "********"),
            "encrypt": resolved.connection.encrypt,
            "trustCert": resolved.connection.trust_cert,
            "timeoutMs": resolved.connection.timeout_ms,
        },
        "settings": {
            "allowWriteDefault": resolved.settings.allow_write_default,
            "output": {
                "defaultFormat": resolved.settings.output.default_format.as_str(),
                "json": {
                    "pretty": resolved.settings.output.json.pretty,
                },
            },
            "locks": {
                "view": resolved.settings.lock_view.as_str(),
            },
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConnectionSettings, SettingsResolved};
    use crate::graph::build;

    #[test]
    fn emits_error_json() {
        let value = error_json("boom", "Internal");
        assert_eq!(value["error"]["message"], "boom");
        assert_eq!(value["error"]["kind"], "Internal");
    }

    #[test]
    fn config_json_masks_password() {
        let resolved = ResolvedConfig {
            config_path: None,
            profile_name: "default".to_string(),
            connection: ConnectionSettings {
                password: Some("secret".to_string()),
                ..ConnectionSettings::default()
            },
            settings: SettingsResolved::default(),
        };
        let value = config_to_json(&resolved);
        assert_eq!(value["profileName"], "default");
        assert_eq!(value["connection"]["password"], "********");
        assert_eq!(value["settings"]["output"]["defaultFormat"], "pretty");
        assert_eq!(value["settings"]["locks"]["view"], "tree");
    }

    #[test]
    fn graph_json_resolves_links_to_ids() {
        let records = vec![
            LockRecord::new(1, None),
            LockRecord::new(2, Some(LockId(1))),
            LockRecord::new(3, Some(LockId(9))),
        ];
        let graph = build(&records);
        let value = graph_to_json(&graph, &records, "test", "2026-01-01T00:00:00Z");

        assert_eq!(value["nodeCount"], 4);
        assert_eq!(value["roots"], json!([1, 9]));
        assert_eq!(value["nodes"][0]["waiterIds"], json!([2]));
        assert_eq!(value["nodes"][1]["holderId"], 1);
        assert_eq!(value["nodes"][1]["blockingChain"], json!([2, 1]));
        assert_eq!(value["nodes"][3]["id"], 9);
        assert_eq!(value["nodes"][3]["placeholder"], true);
        assert_eq!(value["records"].as_array().map(Vec::len), Some(3));
    }
}
