//! Speaking integration: engagements, their classification and statistics.

mod engagement;
mod service;

pub use engagement::{DEFAULT_EVENT_DURATION, Engagement, EventType, TOPIC_TERMS};
pub use service::{SpeakingService, SpeakingStats};
