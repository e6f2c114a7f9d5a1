//! Cursor pagination over the key-ordered link collection.

use serde_json::json;
use std::sync::Arc;

use crate::domain::entities::ShortLink;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// One page of links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPage {
    pub items: Vec<ShortLink>,
    /// Key of the last returned item when more items follow.
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

/// Forward pagination by "peek one ahead".
///
/// Each page asks the store for `count + 1` items after the cursor. The extra
/// item only signals that another page exists and is dropped. Pages are not a
/// consistent snapshot: keys inserted or deleted between calls may or may not
/// be seen.
pub struct PaginationService<R: LinkRepository> {
    repository: Arc<R>,
}

impl<R: LinkRepository> PaginationService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Returns up to `count` links strictly after `cursor`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `cursor` names a key that does not exist.
    /// Returns [`AppError::UpstreamUnavailable`] on store failure.
    pub async fn page(&self, cursor: Option<String>, count: usize) -> Result<LinkPage, AppError> {
        if let Some(cursor) = cursor.as_deref()
            && !self.repository.exists(cursor).await?
        {
            return Err(AppError::bad_request(
                "Invalid cursor",
                json!({ "cursor": cursor }),
            ));
        }

        let mut items = self.repository.list_after(cursor, count + 1).await?;

        let has_more = items.len() > count;
        if has_more {
            items.truncate(count);
        }

        let next_cursor = if has_more {
            items.last().map(|link| link.id.clone())
        } else {
            None
        };

        Ok(LinkPage {
            items,
            next_cursor,
            has_more,
        })
    }
}
