//! Remote source adapters for showcase.
//!
//! Each adapter implements [`showcase_core::Source`]: one `fetch` call
//! performs the HTTP round trips and returns normalized items. Parsing is
//! kept in plain functions so it can be exercised on fixture documents.

pub mod engagements;
pub mod feed;
pub mod http;
pub mod youtube;

pub use engagements::EngagementSource;
pub use feed::FeedSource;
pub use youtube::{ChannelSource, VideoSource, YoutubeApi};
