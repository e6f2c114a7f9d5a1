//! Document store implementation of the link repository.
//!
//! Layout:
//!
//! ```text
//! urls/<id>          { "long_url", "post_date", "is_verified" }
//! meta/_url_counter  integer
//! ```
//!
//! Pages follow the store's key order, so all-digit ids that fit in 32 bits
//! list before every other id (see [`key_order`]).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::domain::entities::ShortLink;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::store::{QueryOptions, Store, key_order};

const LINKS_PATH: &str = "urls";
const META_PATH: &str = "meta";
const COUNTER_FIELD: &str = "_url_counter";

/// Stored shape of a link. The id is the key, not a field.
#[derive(Debug, Serialize, Deserialize)]
struct LinkDocument {
    long_url: String,
    post_date: DateTime<Utc>,
    #[serde(default)]
    is_verified: bool,
}

impl LinkDocument {
    fn into_link(self, id: String) -> ShortLink {
        ShortLink {
            id,
            long_url: self.long_url,
            post_date: self.post_date,
            is_verified: self.is_verified,
        }
    }
}

impl From<&ShortLink> for LinkDocument {
    fn from(link: &ShortLink) -> Self {
        Self {
            long_url: link.long_url.clone(),
            post_date: link.post_date,
            is_verified: link.is_verified,
        }
    }
}

fn decode(id: String, value: Value) -> Result<ShortLink, AppError> {
    serde_json::from_value::<LinkDocument>(value)
        .map(|doc| doc.into_link(id.clone()))
        .map_err(|e| {
            AppError::internal(
                "Stored link record is malformed",
                json!({ "id": id, "reason": e.to_string() }),
            )
        })
}

/// Link repository over any [`Store`].
pub struct StoreLinkRepository {
    store: Arc<dyn Store>,
}

impl StoreLinkRepository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    fn link_path(id: &str) -> String {
        format!("{}/{}", LINKS_PATH, id)
    }
}

#[async_trait]
impl LinkRepository for StoreLinkRepository {
    async fn find(&self, id: &str) -> Result<Option<ShortLink>, AppError> {
        let value = self.store.get(&Self::link_path(id), None).await?;
        value.map(|v| decode(id.to_string(), v)).transpose()
    }

    async fn create(&self, link: &ShortLink) -> Result<(), AppError> {
        let document = serde_json::to_value(LinkDocument::from(link)).map_err(|e| {
            AppError::internal("Failed to encode link", json!({ "reason": e.to_string() }))
        })?;

        self.store.put(&Self::link_path(&link.id), document).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.store.delete(&Self::link_path(id)).await?;
        Ok(())
    }

    async fn mark_verified(&self, id: &str) -> Result<(), AppError> {
        self.store
            .patch(&Self::link_path(id), json!({ "is_verified": true }))
            .await?;
        Ok(())
    }

    async fn list_after(
        &self,
        after: Option<String>,
        limit: usize,
    ) -> Result<Vec<ShortLink>, AppError> {
        let page = self
            .store
            .get(LINKS_PATH, Some(QueryOptions::page(after, limit)))
            .await?;

        let Some(Value::Object(entries)) = page else {
            return Ok(Vec::new());
        };

        // Object key order is not guaranteed by the wire format.
        let mut entries: Vec<(String, Value)> = entries.into_iter().collect();
        entries.sort_by(|a, b| key_order(&a.0, &b.0));

        entries
            .into_iter()
            .map(|(id, value)| decode(id, value))
            .collect()
    }

    async fn exists(&self, id: &str) -> Result<bool, AppError> {
        let value = self
            .store
            .get(&Self::link_path(id), Some(QueryOptions::shallow()))
            .await?;
        Ok(value.is_some())
    }

    async fn count_ids(&self) -> Result<u64, AppError> {
        let keys = self
            .store
            .get(LINKS_PATH, Some(QueryOptions::shallow()))
            .await?;

        Ok(match keys {
            Some(Value::Object(map)) => map.len() as u64,
            _ => 0,
        })
    }

    async fn read_counter(&self) -> Result<Option<i64>, AppError> {
        let path = format!("{}/{}", META_PATH, COUNTER_FIELD);

        match self.store.get(&path, None).await? {
            None => Ok(None),
            // An unreadable counter blocks writes until it is repaired.
            Some(value) => value.as_i64().map(Some).ok_or_else(|| {
                AppError::upstream_unavailable(format!(
                    "link counter is not an integer: {}",
                    value
                ))
            }),
        }
    }

    async fn adjust_counter(&self, delta: i64) -> Result<(), AppError> {
        self.store
            .apply_delta(META_PATH, COUNTER_FIELD, delta)
            .await?;
        Ok(())
    }

    async fn set_counter(&self, value: u64) -> Result<(), AppError> {
        self.store
            .patch(META_PATH, json!({ COUNTER_FIELD: value }))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::store::{MockStore, StoreError};
    use mockall::predicate::eq;

    #[tokio::test]
    async fn test_find_decodes_document() {
        let mut store = MockStore::new();
        store
            .expect_get()
            .with(eq("urls/abcdefghij"), eq(None))
            .times(1)
            .returning(|_, _| {
                Ok(Some(json!({
                    "long_url": "https://example.com/",
                    "post_date": "2026-01-02T03:04:05.000Z"
                })))
            });

        let repo = StoreLinkRepository::new(Arc::new(store));
        let link = repo.find("abcdefghij").await.unwrap().unwrap();

        assert_eq!(link.id, "abcdefghij");
        assert_eq!(link.long_url, "https://example.com/");
        assert!(!link.is_verified);
    }

    #[tokio::test]
    async fn test_find_store_failure_is_not_absence() {
        let mut store = MockStore::new();
        store
            .expect_get()
            .times(1)
            .returning(|_, _| Err(StoreError::Timeout));

        let repo = StoreLinkRepository::new(Arc::new(store));
        let result = repo.find("abcdefghij").await;

        assert!(matches!(result, Err(AppError::UpstreamUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_adjust_counter_uses_atomic_delta() {
        let mut store = MockStore::new();
        store
            .expect_apply_delta()
            .with(eq("meta"), eq("_url_counter"), eq(-1))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let repo = StoreLinkRepository::new(Arc::new(store));
        assert!(repo.adjust_counter(-1).await.is_ok());
    }

    #[tokio::test]
    async fn test_set_counter_patches_absolute_value() {
        let mut store = MockStore::new();
        store
            .expect_patch()
            .withf(|path, body| path == "meta" && body == &json!({ "_url_counter": 7 }))
            .times(1)
            .returning(|_, _| Ok(()));

        let repo = StoreLinkRepository::new(Arc::new(store));
        assert!(repo.set_counter(7).await.is_ok());
    }

    #[tokio::test]
    async fn test_list_after_sorts_keys() {
        let mut store = MockStore::new();
        store
            .expect_get()
            .withf(|path, query| {
                path == "urls"
                    && query
                        == &Some(QueryOptions::page(Some("a".to_string()), 3))
            })
            .times(1)
            .returning(|_, _| {
                Ok(Some(json!({
                    "c": { "long_url": "https://c.example.com/", "post_date": "2026-01-01T00:00:00Z" },
                    "b": { "long_url": "https://b.example.com/", "post_date": "2026-01-01T00:00:00Z", "is_verified": true }
                })))
            });

        let repo = StoreLinkRepository::new(Arc::new(store));
        let links = repo.list_after(Some("a".to_string()), 3).await.unwrap();

        let ids: Vec<&str> = links.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
        assert!(links[0].is_verified);
    }

    #[tokio::test]
    async fn test_count_ids_empty_store() {
        let mut store = MockStore::new();
        store.expect_get().times(1).returning(|_, _| Ok(None));

        let repo = StoreLinkRepository::new(Arc::new(store));
        assert_eq!(repo.count_ids().await.unwrap(), 0);
    }
}
