//! Content item model
//!
//! This module provides:
//! - `ContentKind` for the three bundled content types
//! - `NewContentItem`, the builder the importer fills from a CSV row
//! - `ContentItem`, the persisted entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Text format applied to every imported body
pub const FULL_HTML: &str = "full_html";

/// Content item kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Article,
    Video,
    Page,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Article => "article",
            ContentKind::Video => "video",
            ContentKind::Page => "page",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "article" => Some(ContentKind::Article),
            "video" => Some(ContentKind::Video),
            "page" => Some(ContentKind::Page),
            _ => None,
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rich-text body with its rendering format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Body {
    pub value: String,
    pub format: String,
}

impl Body {
    pub fn full_html(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            format: FULL_HTML.to_string(),
        }
    }
}

/// Image reference attached to an article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub file_id: i64,
    pub alt: String,
}

/// Creation request for a content item.
///
/// Every optional field stays `None` (or empty) unless set through one of
/// the `with_*` methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContentItem {
    pub kind: ContentKind,
    pub title: String,
    pub body: Option<Body>,
    pub alias: Option<String>,
    pub tag_ids: Vec<i64>,
    pub owner_id: Option<i64>,
    pub image: Option<ImageRef>,
    pub video: Option<String>,
}

impl NewContentItem {
    pub fn new(kind: ContentKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            body: None,
            alias: None,
            tag_ids: Vec::new(),
            owner_id: None,
            image: None,
            video: None,
        }
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    /// Set the URL alias from a slug, prefixing it with `/`
    pub fn with_slug(mut self, slug: &str) -> Self {
        self.alias = Some(format!("/{}", slug));
        self
    }

    /// Attach tag term ids; repeated ids keep their first position
    pub fn with_tags(mut self, tag_ids: impl IntoIterator<Item = i64>) -> Self {
        for id in tag_ids {
            if !self.tag_ids.contains(&id) {
                self.tag_ids.push(id);
            }
        }
        self
    }

    pub fn with_owner(mut self, user_id: i64) -> Self {
        self.owner_id = Some(user_id);
        self
    }

    pub fn with_image(mut self, file_id: i64, alt: impl Into<String>) -> Self {
        self.image = Some(ImageRef {
            file_id,
            alt: alt.into(),
        });
        self
    }

    pub fn with_video(mut self, video: impl Into<String>) -> Self {
        self.video = Some(video.into());
        self
    }
}

/// Persisted content item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: i64,
    pub uuid: String,
    pub kind: ContentKind,
    pub title: String,
    pub body: Option<Body>,
    pub alias: Option<String>,
    pub tag_ids: Vec<i64>,
    pub owner_id: Option<i64>,
    pub image: Option<ImageRef>,
    pub video: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_content_item_has_no_optional_fields() {
        let item = NewContentItem::new(ContentKind::Page, "About");

        assert_eq!(item.title, "About");
        assert!(item.body.is_none());
        assert!(item.alias.is_none());
        assert!(item.tag_ids.is_empty());
        assert!(item.owner_id.is_none());
        assert!(item.image.is_none());
        assert!(item.video.is_none());
    }

    #[test]
    fn test_with_slug_prefixes_alias() {
        let item = NewContentItem::new(ContentKind::Article, "Hello").with_slug("hello-world");
        assert_eq!(item.alias.as_deref(), Some("/hello-world"));
    }

    #[test]
    fn test_with_body_uses_full_html() {
        let item = NewContentItem::new(ContentKind::Article, "Hello")
            .with_body(Body::full_html("<p>Hi</p>"));
        let body = item.body.unwrap();
        assert_eq!(body.value, "<p>Hi</p>");
        assert_eq!(body.format, "full_html");
    }

    #[test]
    fn test_with_tags_collapses_duplicates() {
        let item = NewContentItem::new(ContentKind::Article, "Hello").with_tags([3, 1, 3, 2]);
        assert_eq!(item.tag_ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_content_kind_from_str() {
        assert_eq!(ContentKind::from_str("video"), Some(ContentKind::Video));
        assert_eq!(ContentKind::from_str("blog"), None);
    }
}
