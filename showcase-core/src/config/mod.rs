//! Configuration for showcase.

mod settings;
mod showcase_config;

pub use settings::{BlogSettings, SpeakingSettings, YoutubeSettings};
pub use showcase_config::{BlogSection, ShowcaseConfig, SpeakingSection, YoutubeSection};
