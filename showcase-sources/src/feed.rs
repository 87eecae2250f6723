//! RSS 2.0 and Atom feed adapter.
//!
//! Fetches the feed over HTTP and normalizes each `<item>` (RSS) or
//! `<entry>` (Atom) into a [`BlogPost`]. Elements are matched by local name
//! so namespaced extensions like `content:encoded` and `dc:creator` work
//! without namespace bookkeeping.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use roxmltree::{Document, Node, ParsingOptions};
use showcase_core::blog::{BlogPost, extract_tags, find_youtube_url};
use showcase_core::{ShowcaseError, ShowcaseResult, Source};
use tracing::{info, warn};
use url::Url;

use crate::http;

/// Title given to entries that carry none.
pub const UNTITLED: &str = "Untitled";

const FEED_ACCEPT: &str = "application/rss+xml, application/atom+xml, application/xml;q=0.9, */*;q=0.8";

pub struct FeedSource {
    client: reqwest::Client,
    url: Url,
}

impl FeedSource {
    pub fn new(client: reqwest::Client, url: Url) -> Self {
        FeedSource { client, url }
    }
}

#[async_trait]
impl Source for FeedSource {
    type Item = BlogPost;

    fn name(&self) -> &str {
        "blog feed"
    }

    async fn fetch(&self) -> ShowcaseResult<Vec<BlogPost>> {
        info!("Fetching feed from {}", self.url);
        let body = http::get_text(&self.client, &self.url, FEED_ACCEPT).await?;
        let posts = parse_feed(&body, &self.url)?;
        info!("Parsed {} posts from feed", posts.len());
        Ok(posts)
    }
}

/// Parse an RSS or Atom document. Relative links are resolved against
/// `base`. Entries without a title are kept as [`UNTITLED`]. Legacy feeds
/// that declare a DTD are accepted.
pub fn parse_feed(xml: &str, base: &Url) -> ShowcaseResult<Vec<BlogPost>> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(xml, options).map_err(|e| ShowcaseError::Parse(format!("Invalid feed XML: {e}")))?;
    let root = doc.root_element();

    match root.tag_name().name() {
        "rss" | "RDF" | "feed" => {}
        other => {
            return Err(ShowcaseError::Parse(format!(
                "Not an RSS or Atom feed (root element <{}>)",
                other
            )));
        }
    }

    let posts = root
        .descendants()
        .filter(|n| n.is_element() && matches!(n.tag_name().name(), "item" | "entry"))
        .map(|entry| parse_entry(entry, base))
        .collect();

    Ok(posts)
}

fn parse_entry(entry: Node, base: &Url) -> BlogPost {
    let title = child_text(entry, "title")
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| {
            warn!("Feed entry has no title");
            UNTITLED.to_string()
        });

    let raw_link = entry_link(entry).unwrap_or_default();
    let link = base
        .join(&raw_link)
        .map(|u| u.to_string())
        .unwrap_or(raw_link);

    let id = child_text(entry, "guid")
        .or_else(|| child_text(entry, "id"))
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| link.clone());

    let description = child_text(entry, "description")
        .or_else(|| child_text(entry, "summary"))
        .unwrap_or_default();
    let content = child_text(entry, "encoded")
        .or_else(|| child_text(entry, "content"))
        .unwrap_or_default();

    let published_at = ["pubDate", "published", "date", "updated"]
        .iter()
        .find_map(|name| child_text(entry, name))
        .and_then(|raw| {
            let parsed = parse_feed_date(&raw);
            if parsed.is_none() {
                warn!("Could not parse feed date '{}' for '{}'", raw, title);
            }
            parsed
        });

    let author = child(entry, "author")
        .map(|a| child_text(a, "name").unwrap_or_else(|| all_text(a).trim().to_string()))
        .or_else(|| child_text(entry, "creator"))
        .filter(|a| !a.is_empty());

    let categories: Vec<String> = entry
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "category")
        .filter_map(|n| n.attribute("term").map(String::from).or_else(|| n.text().map(String::from)))
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();
    let tags = if categories.is_empty() {
        extract_tags(&title, &description)
    } else {
        categories
    };

    let youtube_url = find_youtube_url(&description).or_else(|| find_youtube_url(&content));

    BlogPost {
        id,
        title,
        link,
        description,
        published_at,
        author,
        tags,
        youtube_url,
    }
}

/// RSS uses the element text; Atom uses `href`, preferring `rel="alternate"`.
fn entry_link(entry: Node) -> Option<String> {
    let links: Vec<Node> = entry
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "link")
        .collect();

    links
        .iter()
        .find(|l| l.attribute("href").is_some() && l.attribute("rel").is_none_or(|r| r == "alternate"))
        .or_else(|| links.iter().find(|l| l.attribute("href").is_some()))
        .and_then(|l| l.attribute("href"))
        .map(String::from)
        .or_else(|| links.iter().find_map(|l| l.text()).map(|t| t.trim().to_string()))
}

/// RFC 2822 (RSS) or RFC 3339 (Atom, Dublin Core).
pub fn parse_feed_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn child_text(node: Node, name: &str) -> Option<String> {
    child(node, name).map(|c| all_text(c).trim().to_string())
}

// Concatenate text and CDATA below `node`.
fn all_text(node: Node) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}
