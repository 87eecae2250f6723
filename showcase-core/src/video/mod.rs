//! Video integration: uploads, channel metadata and rankings.

mod model;
mod service;

pub use model::{ChannelInfo, TopRange, Video, compact_count};
pub use service::{ChannelStats, VideoService, VideoStats, top_viewed};
