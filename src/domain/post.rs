use chrono::NaiveDateTime;
use html_escape::decode_html_entities;
use serde::{Deserialize, Serialize};

/// A post as returned by `/wp-json/wp/v2/posts`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPost {
    pub id: u64,
    pub date: String,
    pub title: Rendered,
    pub excerpt: Rendered,
    pub content: Rendered,
    pub slug: String,
    #[serde(rename = "_links", default)]
    pub links: Links,
    #[serde(default)]
    pub featured_media: u64,
}

/// WordPress wraps every HTML field as `{"rendered": "..."}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Rendered {
    #[serde(default)]
    pub rendered: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Links {
    #[serde(rename = "wp:featuredmedia", default)]
    pub featured_media: Option<Vec<FeaturedMedia>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeaturedMedia {
    pub href: String,
}

impl RawPost {
    /// First featured-media link, if the post carries a non-empty one.
    pub fn featured_media_href(&self) -> Option<&str> {
        self.links
            .featured_media
            .as_ref()
            .and_then(|media| media.first())
            .map(|m| m.href.as_str())
            .filter(|href| !href.is_empty())
    }
}

/// Flattened, UI-ready post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayPost {
    pub id: u64,
    pub title: String,
    pub excerpt: String,
    pub date: String,
    pub image_url: String,
    pub slug: String,
    pub content: String,
}

const API_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

impl DisplayPost {
    /// Title with HTML entities decoded (`&#8217;` and friends).
    pub fn display_title(&self) -> String {
        decode_html_entities(&self.title).to_string()
    }

    /// `Mar 01, 2024` when the date parses, otherwise the raw string.
    pub fn formatted_date(&self) -> String {
        NaiveDateTime::parse_from_str(&self.date, API_DATE_FORMAT)
            .map(|dt| dt.format("%b %d, %Y").to_string())
            .unwrap_or_else(|_| self.date.clone())
    }

    pub fn has_image(&self) -> bool {
        !self.image_url.is_empty()
    }

    /// Case-insensitive title match. An empty query matches everything.
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return true;
        }
        self.display_title()
            .to_lowercase()
            .contains(&query.to_lowercase())
    }

    pub fn permalink(&self, base_url: &str) -> String {
        post_url(base_url, &self.slug)
    }
}

/// `<base>/<slug>`, with at most one slash between the two.
pub fn post_url(base_url: &str, slug: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), slug)
}
