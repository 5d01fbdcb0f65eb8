//! JSON export of the current table.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use serde_json::{json, Map, Value};

use super::columns::COLUMNS;
use super::display::{DisplayState, NodeStatus, RowKey};

/// Build a JSON document describing every configured node and its row.
///
/// Nodes without a successful fetch are included with `"values": null`.
pub fn export_table(state: &DisplayState) -> Value {
    let (ok, stale, pending) = state.status_counts();

    let nodes: Vec<Value> = state
        .node_health()
        .iter()
        .enumerate()
        .map(|(index, health)| {
            let values = state
                .row(RowKey::new(index))
                .map(|row| {
                    let mut map = Map::new();
                    for (column, value) in row.values.with_columns() {
                        map.insert(column.key.to_string(), json!(value));
                    }
                    Value::Object(map)
                })
                .unwrap_or(Value::Null);

            json!({
                "name": health.name,
                "status": status_label(health.status()),
                "last_error": health.last_error,
                "consecutive_failures": health.consecutive_failures,
                "values": values,
            })
        })
        .collect();

    json!({
        "ready": state.is_ready(),
        "summary": {
            "total": state.node_health().len(),
            "ok": ok,
            "stale": stale,
            "pending": pending,
        },
        "columns": COLUMNS.iter().map(|c| json!({ "key": c.key, "title": c.title })).collect::<Vec<_>>(),
        "nodes": nodes,
    })
}

/// Write [`export_table`] to `path` as pretty-printed JSON.
pub fn write_export(state: &DisplayState, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&export_table(state))?;
    let mut file = std::fs::File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

fn status_label(status: NodeStatus) -> &'static str {
    match status {
        NodeStatus::Ok => "ok",
        NodeStatus::Stale => "stale",
        NodeStatus::Pending => "pending",
    }
}
