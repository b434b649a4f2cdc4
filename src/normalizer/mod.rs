use scraper::{Html, Node, Selector};

use crate::domain::{DisplayPost, RawPost};

/// Elements that separate words when an HTML fragment is flattened to text.
const BREAKING_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main",
    "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Elements whose contents are never readable text.
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Maps API records to display posts.
#[derive(Clone)]
pub struct Normalizer {
    img_selector: Selector,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self {
            // Static selector, always valid.
            img_selector: Selector::parse("img[src]").expect("valid img selector"),
        }
    }

    pub fn normalize(&self, posts: Vec<RawPost>) -> Vec<DisplayPost> {
        posts.iter().map(|post| self.to_display_post(post)).collect()
    }

    pub fn to_display_post(&self, post: &RawPost) -> DisplayPost {
        DisplayPost {
            id: post.id,
            title: post.title.rendered.clone(),
            excerpt: html_to_text(&post.excerpt.rendered),
            date: post.date.clone(),
            image_url: self.resolve_image_url(post),
            slug: post.slug.clone(),
            content: post.content.rendered.clone(),
        }
    }

    /// Featured media link, else the first `<img src>` in the body, else "".
    pub fn resolve_image_url(&self, post: &RawPost) -> String {
        if let Some(href) = post.featured_media_href() {
            return href.to_string();
        }
        self.first_image_src(&post.content.rendered)
            .unwrap_or_default()
    }

    fn first_image_src(&self, html: &str) -> Option<String> {
        let fragment = Html::parse_fragment(html);
        fragment
            .select(&self.img_selector)
            .filter_map(|img| img.value().attr("src"))
            .map(str::trim)
            .find(|src| !src.is_empty())
            .map(String::from)
    }
}

/// Flatten an HTML fragment to plain text: entities decoded, whitespace
/// collapsed, block elements acting as word breaks.
pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut raw = String::with_capacity(html.len());

    for node in fragment.root_element().descendants() {
        match node.value() {
            Node::Text(text) => {
                let hidden = node.ancestors().any(|parent| {
                    parent
                        .value()
                        .as_element()
                        .is_some_and(|element| HIDDEN_TAGS.contains(&element.name()))
                });
                if !hidden {
                    raw.push_str(text);
                }
            }
            Node::Element(element)
                if BREAKING_TAGS.contains(&element.name())
                    || HIDDEN_TAGS.contains(&element.name()) =>
            {
                raw.push(' ')
            }
            _ => {}
        }
    }

    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
