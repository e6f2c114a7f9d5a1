//! Query parameters and response of the link listing endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::application::services::LinkPage;
use crate::domain::entities::ShortLink;
use crate::error::AppError;

/// Query parameters of `GET /urls`.
///
/// `count` is kept as a string so that a malformed value reaches
/// [`ListQuery::page_size`] and is answered like an out-of-range one.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub count: Option<String>,
    pub cursor: Option<String>,
}

impl ListQuery {
    /// Resolves the requested page size.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] unless `count` is absent or an integer
    /// in `1..=max`.
    pub fn page_size(&self, default: usize, max: usize) -> Result<usize, AppError> {
        let Some(raw) = self.count.as_deref() else {
            return Ok(default);
        };

        match raw.trim().parse::<usize>() {
            Ok(n) if (1..=max).contains(&n) => Ok(n),
            _ => Err(AppError::bad_request(
                format!("Count must be 1-{}", max),
                json!({ "max_count": max }),
            )),
        }
    }

    /// Cursor with empty values treated as absent.
    pub fn cursor(&self) -> Option<String> {
        self.cursor.clone().filter(|c| !c.is_empty())
    }
}

/// One link in a listing.
#[derive(Debug, Serialize)]
pub struct LinkItem {
    pub id: String,
    pub long_url: String,
    pub post_date: DateTime<Utc>,
    pub is_verified: bool,
}

impl From<ShortLink> for LinkItem {
    fn from(link: ShortLink) -> Self {
        Self {
            id: link.id,
            long_url: link.long_url,
            post_date: link.post_date,
            is_verified: link.is_verified,
        }
    }
}

/// Response of `GET /urls`.
#[derive(Debug, Serialize)]
pub struct LinksResponse {
    pub urls: Vec<LinkItem>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<LinkPage> for LinksResponse {
    fn from(page: LinkPage) -> Self {
        let message = page
            .items
            .is_empty()
            .then(|| "No URLs are available".to_string());

        Self {
            urls: page.items.into_iter().map(LinkItem::from).collect(),
            next_cursor: page.next_cursor,
            has_more: page.has_more,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(count: Option<&str>) -> ListQuery {
        ListQuery {
            count: count.map(String::from),
            cursor: None,
        }
    }

    #[test]
    fn test_default_page_size() {
        assert_eq!(query(None).page_size(15, 50).unwrap(), 15);
    }

    #[test]
    fn test_page_size_bounds() {
        assert_eq!(query(Some("1")).page_size(15, 50).unwrap(), 1);
        assert_eq!(query(Some("50")).page_size(15, 50).unwrap(), 50);

        for bad in ["0", "51", "-3", "abc", ""] {
            assert!(query(Some(bad)).page_size(15, 50).is_err(), "{bad}");
        }
    }

    #[test]
    fn test_out_of_range_message_names_max() {
        match query(Some("99")).page_size(15, 50) {
            Err(AppError::Validation { message, .. }) => assert_eq!(message, "Count must be 1-50"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_empty_cursor_is_absent() {
        let q = ListQuery {
            count: None,
            cursor: Some(String::new()),
        };
        assert_eq!(q.cursor(), None);
    }

    #[test]
    fn test_empty_page_carries_message() {
        let response = LinksResponse::from(LinkPage {
            items: Vec::new(),
            next_cursor: None,
            has_more: false,
        });

        assert!(response.urls.is_empty());
        assert_eq!(response.message.as_deref(), Some("No URLs are available"));
    }
}
