//! In-process document store.

use super::service::{QueryOptions, Store, StoreError, StoreResult, key_order};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::debug;

/// A JSON tree with the read, write and query semantics of the REST store.
///
/// Empty objects are pruned on delete, so a collection whose last child was
/// removed reads as absent. [`MemoryStore::set_available`] makes every call
/// fail with [`StoreError::Unavailable`].
pub struct MemoryStore {
    root: Mutex<Value>,
    available: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        debug!("Using in-memory document store");
        Self {
            root: Mutex::new(Value::Object(Map::new())),
            available: AtomicBool::new(true),
        }
    }

    /// Toggles simulated store outages.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> StoreResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable)
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn is_empty_node(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn lookup<'a>(root: &'a Value, segs: &[&str]) -> Option<&'a Value> {
    segs.iter()
        .try_fold(root, |node, seg| node.as_object()?.get(*seg))
}

fn lookup_or_create<'a>(node: &'a mut Value, segs: &[&str]) -> &'a mut Value {
    let Some((first, rest)) = segs.split_first() else {
        return node;
    };
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => {
            let child = map
                .entry(first.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            lookup_or_create(child, rest)
        }
        other => other,
    }
}

fn remove_at(node: &mut Value, segs: &[&str]) {
    let Some((first, rest)) = segs.split_first() else {
        *node = Value::Object(Map::new());
        return;
    };
    let Value::Object(map) = node else {
        return;
    };

    if rest.is_empty() {
        map.remove(*first);
        return;
    }

    if let Some(child) = map.get_mut(*first) {
        remove_at(child, rest);
        if is_empty_node(child) {
            map.remove(*first);
        }
    }
}

fn write_at(root: &mut Value, segs: &[&str], value: Value) {
    if is_empty_node(&value) {
        remove_at(root, segs);
    } else {
        *lookup_or_create(root, segs) = value;
    }
}

fn apply_query(node: &Value, query: &QueryOptions) -> Value {
    let Value::Object(map) = node else {
        return node.clone();
    };

    let mut keys: Vec<&String> = map.keys().collect();
    if query.order_by_key {
        keys.sort_by(|a, b| key_order(a, b));
    }

    let limit = query.limit_to_first.unwrap_or(usize::MAX);
    let selected = keys
        .into_iter()
        .filter(|key| match &query.start_after {
            Some(after) => key_order(key, after).is_gt(),
            None => true,
        })
        .take(limit);

    let mut result = Map::new();
    for key in selected {
        let child = &map[key.as_str()];
        let value = if query.shallow && child.is_object() {
            Value::Bool(true)
        } else {
            child.clone()
        };
        result.insert(key.clone(), value);
    }

    Value::Object(result)
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, path: &str, query: Option<QueryOptions>) -> StoreResult<Option<Value>> {
        self.ensure_available()?;
        let root = self.root.lock().await;

        let Some(node) = lookup(&root, &segments(path)).filter(|n| !is_empty_node(n)) else {
            return Ok(None);
        };

        Ok(Some(match query {
            Some(query) => apply_query(node, &query),
            None => node.clone(),
        }))
    }

    async fn put(&self, path: &str, value: Value) -> StoreResult<()> {
        self.ensure_available()?;
        let mut root = self.root.lock().await;
        write_at(&mut root, &segments(path), value);
        Ok(())
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        self.ensure_available()?;
        let mut root = self.root.lock().await;
        remove_at(&mut root, &segments(path));
        Ok(())
    }

    async fn patch(&self, path: &str, partial: Value) -> StoreResult<()> {
        self.ensure_available()?;
        let Value::Object(fields) = partial else {
            return Err(StoreError::Status(400));
        };

        let mut root = self.root.lock().await;
        let base = segments(path);
        for (field, value) in fields {
            let mut segs = base.clone();
            segs.extend(segments(&field));
            write_at(&mut root, &segs, value);
        }
        Ok(())
    }

    async fn apply_delta(&self, path: &str, field: &str, delta: i64) -> StoreResult<()> {
        self.ensure_available()?;
        let mut root = self.root.lock().await;

        let mut segs = segments(path);
        segs.extend(segments(field));
        let node = lookup_or_create(&mut root, &segs);
        let current = node.as_i64().unwrap_or(0);
        *node = Value::from(current + delta);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        self.ensure_available().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        for id in ["c", "a", "d", "b"] {
            store
                .put(&format!("urls/{}", id), json!({ "long_url": id }))
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_get_absent_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("urls/missing", None).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_page_query_orders_and_limits() {
        let store = seeded().await;

        let page = store
            .get("urls", Some(QueryOptions::page(Some("a".to_string()), 2)))
            .await
            .unwrap()
            .unwrap();

        let keys: Vec<&String> = page.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_page_query_puts_integer_keys_first() {
        let store = MemoryStore::new();
        for id in ["b", "10", "a", "9"] {
            store
                .put(&format!("urls/{}", id), json!({ "long_url": id }))
                .await
                .unwrap();
        }

        let first = store
            .get("urls", Some(QueryOptions::page(None, 2)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first, json!({ "9": { "long_url": "9" }, "10": { "long_url": "10" } }));

        let next = store
            .get("urls", Some(QueryOptions::page(Some("10".to_string()), 1)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(next, json!({ "a": { "long_url": "a" } }));
    }

    #[tokio::test]
    async fn test_shallow_query_returns_keys_only() {
        let store = seeded().await;

        let keys = store
            .get("urls", Some(QueryOptions::shallow()))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(keys, json!({ "a": true, "b": true, "c": true, "d": true }));
    }

    #[tokio::test]
    async fn test_delete_prunes_empty_parents() {
        let store = MemoryStore::new();
        store.put("urls/a", json!({ "x": 1 })).await.unwrap();

        store.delete("urls/a").await.unwrap();

        assert_eq!(store.get("urls", None).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_patch_merges_fields() {
        let store = MemoryStore::new();
        store
            .put("urls/a", json!({ "long_url": "u", "is_verified": false }))
            .await
            .unwrap();

        store
            .patch("urls/a", json!({ "is_verified": true }))
            .await
            .unwrap();

        let value = store.get("urls/a", None).await.unwrap().unwrap();
        assert_eq!(value, json!({ "long_url": "u", "is_verified": true }));
    }

    #[tokio::test]
    async fn test_apply_delta_creates_and_increments() {
        let store = MemoryStore::new();

        store.apply_delta("meta", "_url_counter", 0).await.unwrap();
        assert_eq!(
            store.get("meta/_url_counter", None).await.unwrap(),
            Some(json!(0))
        );

        store.apply_delta("meta", "_url_counter", 3).await.unwrap();
        store.apply_delta("meta", "_url_counter", -1).await.unwrap();
        assert_eq!(
            store.get("meta/_url_counter", None).await.unwrap(),
            Some(json!(2))
        );
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_every_call() {
        let store = seeded().await;
        store.set_available(false);

        assert!(matches!(
            store.get("urls/a", None).await,
            Err(StoreError::Unavailable)
        ));
        assert!(store.put("urls/e", json!({})).await.is_err());
        assert!(!store.health_check().await);

        store.set_available(true);
        assert!(store.get("urls/a", None).await.unwrap().is_some());
    }
}
