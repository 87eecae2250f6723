//! Blog integration: feed posts, queries and statistics.

mod post;
mod service;

pub use post::{BlogPost, TECH_TERMS, extract_tags, find_youtube_url};
pub use service::{BlogService, BlogStats};
