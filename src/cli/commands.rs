use serde::Serialize;

use crate::app::{AppContext, Result, WpError};
use crate::domain::{post_url, DisplayPost};
use crate::normalizer::html_to_text;

pub async fn list_posts(ctx: &AppContext, page: u32, json: bool) -> Result<()> {
    let raw = ctx.source.fetch_page(page, ctx.site.per_page).await?;
    let posts = ctx.normalizer.normalize(raw);

    if json {
        println!("{}", to_json(&posts)?);
        return Ok(());
    }

    if posts.is_empty() {
        println!("No posts on page {}", page);
        return Ok(());
    }

    for post in &posts {
        println!("{}", list_line(post));
    }

    Ok(())
}

pub async fn show_post(ctx: &AppContext, slug: &str) -> Result<()> {
    let post = find_post(ctx, slug).await?;
    println!("{}", post_details(&post, &ctx.site.base_url));
    Ok(())
}

pub fn open_post(ctx: &AppContext, slug: &str) -> Result<()> {
    let url = post_url(&ctx.site.base_url, slug);
    open::that(&url)?;
    println!("Opened {}", url);
    Ok(())
}

/// Page through the site until a post with `slug` turns up.
pub async fn find_post(ctx: &AppContext, slug: &str) -> Result<DisplayPost> {
    let feed = ctx.feed();

    loop {
        feed.load_next().await;
        let state = feed.snapshot();

        if let Some(error) = state.error {
            return Err(WpError::Other(error));
        }
        if let Some(post) = state.posts.iter().find(|p| p.slug == slug) {
            return Ok(post.clone());
        }
        if !state.has_more_posts {
            return Err(WpError::PostNotFound(slug.to_string()));
        }
        tracing::debug!("{} not in the first {} posts", slug, state.posts.len());
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| WpError::Other(format!("Failed to encode output as JSON: {}", e)))
}

fn list_line(post: &DisplayPost) -> String {
    format!("{:<12}  {}", post.formatted_date(), post.display_title())
}

fn post_details(post: &DisplayPost, base_url: &str) -> String {
    let mut out = String::new();
    out.push_str(&post.display_title());
    out.push('\n');
    out.push_str(&format!("Date:  {}\n", post.formatted_date()));
    if post.has_image() {
        out.push_str(&format!("Image: {}\n", post.image_url));
    }
    out.push_str(&format!("Link:  {}\n", post.permalink(base_url)));

    if !post.excerpt.is_empty() {
        out.push('\n');
        out.push_str(&post.excerpt);
        out.push('\n');
    }

    let body = html_to_text(&post.content);
    if !body.is_empty() {
        out.push('\n');
        out.push_str(&body);
        out.push('\n');
    }
    out
}
