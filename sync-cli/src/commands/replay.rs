//! Replay a recorded delta stream on a local collection.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;
use tidesync_client::{DeltaError, DeltaProcessor, DeltaSink};
use tidesync_core::{SequenceCollection, SharedVec};
use tidesync_types::Delta;

/// Outcome of replaying a delta stream.
#[derive(Debug)]
pub struct Replay {
    /// Collection contents after the last delta.
    pub items: Vec<Value>,
    /// Number of deltas applied.
    pub applied: usize,
    /// Deltas that could not be applied, by position in the stream.
    pub failures: Vec<(usize, DeltaError)>,
}

/// Two objects denote the same item when their `id_field` values are equal.
///
/// Objects lacking the field are compared whole.
fn same_item(id_field: &str, item: &Value, raw: &Value) -> bool {
    match (item.get(id_field), raw.get(id_field)) {
        (Some(a), Some(b)) => a == b,
        _ => item == raw,
    }
}

/// Apply `deltas` in order to a sequence holding `initial`.
pub fn replay(deltas: &[Delta], initial: Vec<Value>, id_field: &str) -> Replay {
    let store = SharedVec::from_vec(initial);
    let field = id_field.to_string();
    let processor = DeltaProcessor::new(
        Box::new(SequenceCollection::new(store.clone())),
        move |item: &Value, raw: &Value| same_item(&field, item, raw),
    );

    let mut applied = 0;
    let mut failures = Vec::new();
    for (index, delta) in deltas.iter().enumerate() {
        match processor.apply(delta) {
            Ok(()) => applied += 1,
            Err(e) => {
                tracing::warn!(index, model = delta.model(), error = %e, "delta not applied");
                failures.push((index, e));
            }
        }
    }

    Replay {
        items: store.snapshot(),
        applied,
        failures,
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {} file {}", what, path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Invalid {} file {}", what, path.display()))
}

/// Run the replay command.
pub async fn run(deltas_path: &Path, initial_path: Option<&Path>, id_field: &str) -> Result<()> {
    let deltas: Vec<Delta> = read_json(deltas_path, "delta").await?;
    let initial: Vec<Value> = match initial_path {
        Some(path) => read_json(path, "initial collection").await?,
        None => Vec::new(),
    };
    tracing::debug!(deltas = deltas.len(), items = initial.len(), "replaying");

    let outcome = replay(&deltas, initial, id_field);

    for (index, error) in &outcome.failures {
        eprintln!("delta #{}: {}", index, error);
    }
    eprintln!(
        "{} applied, {} failed",
        outcome.applied,
        outcome.failures.len()
    );
    println!("{}", serde_json::to_string_pretty(&outcome.items)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn deltas(value: Value) -> Vec<Delta> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn replays_insert_update_delete() {
        let stream = deltas(json!([
            {"type": "insert", "model": "Player", "data": {"id": 1, "name": "Alice"}},
            {"type": "insert", "model": "Player", "data": {"id": 2, "name": "Bob"}},
            {"type": "update", "model": "Player",
             "oldData": {"id": 1, "name": "Alice"}, "newData": {"id": 1, "name": "Alicia"}},
            {"type": "delete", "model": "Player", "data": {"id": 2, "name": "Bob"}}
        ]));

        let outcome = replay(&stream, Vec::new(), "id");
        assert_eq!(outcome.applied, 4);
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.items, vec![json!({"id": 1, "name": "Alicia"})]);
    }

    #[test]
    fn matches_by_id_field_not_whole_object() {
        let stream = deltas(json!([
            {"type": "delete", "model": "Player", "data": {"id": 7, "name": "stale name"}}
        ]));
        let initial = vec![json!({"id": 7, "name": "current name"})];

        let outcome = replay(&stream, initial, "id");
        assert!(outcome.items.is_empty());
    }

    #[test]
    fn custom_id_field() {
        let stream = deltas(json!([
            {"type": "update", "model": "Team",
             "oldData": {"slug": "red"}, "newData": {"slug": "red", "size": 3}}
        ]));
        let initial = vec![json!({"slug": "blue"}), json!({"slug": "red"})];

        let outcome = replay(&stream, initial, "slug");
        assert_eq!(
            outcome.items,
            vec![json!({"slug": "blue"}), json!({"slug": "red", "size": 3})]
        );
    }

    #[test]
    fn failures_are_counted_and_skipped() {
        let stream = deltas(json!([
            {"type": "delete", "model": "Player", "data": {"id": 9}},
            {"type": "insert", "model": "Player", "data": {"id": 1}}
        ]));

        let outcome = replay(&stream, Vec::new(), "id");
        assert_eq!(outcome.applied, 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].0, 0);
        assert!(matches!(outcome.failures[0].1, DeltaError::NoMatch { .. }));
        assert_eq!(outcome.items, vec![json!({"id": 1})]);
    }

    #[test]
    fn items_without_id_compare_whole() {
        assert!(same_item("id", &json!("red"), &json!("red")));
        assert!(!same_item("id", &json!({"name": "a"}), &json!({"name": "b"})));
        assert!(same_item("id", &json!({"id": 1, "x": 1}), &json!({"id": 1, "x": 2})));
    }
}
