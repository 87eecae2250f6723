//! The config file at ~/.config/showcase/config.toml.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::error::{ShowcaseError, ShowcaseResult};

use super::settings::{BlogSettings, SpeakingSettings, YoutubeSettings};

/// Environment variables named `SHOWCASE__<SECTION>__<KEY>` override the file.
pub const ENV_PREFIX: &str = "SHOWCASE";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogSection {
    pub rss_url: Option<String>,
    pub cache_duration: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpeakingSection {
    pub api_url: Option<String>,
    pub cache_duration: Option<String>,
}

#[derive(Clone, Default, Deserialize)]
pub struct YoutubeSection {
    pub api_key: Option<String>,
    pub channel_id: Option<String>,
    pub application_name: Option<String>,
    pub cache_duration: Option<String>,
}

impl std::fmt::Debug for YoutubeSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoutubeSection")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("channel_id", &self.channel_id)
            .field("application_name", &self.application_name)
            .field("cache_duration", &self.cache_duration)
            .finish()
    }
}

/// Raw, unvalidated configuration.
///
/// Each section is optional. A missing section means the integration is
/// switched off; a present but invalid one is reported when its settings are
/// requested, so one bad section never takes the others down with it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShowcaseConfig {
    pub blog: Option<BlogSection>,
    pub speaking: Option<SpeakingSection>,
    pub youtube: Option<YoutubeSection>,
}

impl ShowcaseConfig {
    pub fn config_path() -> ShowcaseResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ShowcaseError::Config("Could not determine config directory".into()))?
            .join("showcase");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from `path`, or from the default location when `None`.
    ///
    /// A missing default file is created with every option commented out.
    /// An explicit path that does not exist is read as empty.
    pub fn load(path: Option<&Path>) -> ShowcaseResult<Self> {
        let path = match path {
            Some(p) => PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).into_owned()),
            None => {
                let default_path = Self::config_path()?;
                if !default_path.exists() {
                    Self::create_default_config(&default_path)?;
                }
                default_path
            }
        };

        Self::from_sources(
            File::from(path).format(FileFormat::Toml).required(false),
            Environment::with_prefix(ENV_PREFIX).separator(ENV_SEPARATOR),
        )
    }

    /// Merge a file source with environment overrides. Later sources win.
    pub fn from_sources<F>(file: F, env: Environment) -> ShowcaseResult<Self>
    where
        F: config::Source + Send + Sync + 'static,
    {
        Config::builder()
            .add_source(file)
            .add_source(env)
            .build()
            .map_err(|e| ShowcaseError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| ShowcaseError::Config(e.to_string()))
    }

    /// `None` when the blog section is absent.
    pub fn blog_settings(&self) -> Option<ShowcaseResult<BlogSettings>> {
        self.blog.as_ref().map(BlogSettings::from_section)
    }

    pub fn speaking_settings(&self) -> Option<ShowcaseResult<SpeakingSettings>> {
        self.speaking.as_ref().map(SpeakingSettings::from_section)
    }

    pub fn youtube_settings(&self) -> Option<ShowcaseResult<YoutubeSettings>> {
        self.youtube.as_ref().map(YoutubeSettings::from_section)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> ShowcaseResult<()> {
        let contents = "\
# showcase configuration
#
# Every section is optional. Leave one out to disable that integration.
# Values can be overridden with SHOWCASE__<SECTION>__<KEY>, for example
# SHOWCASE__YOUTUBE__API_KEY.

# [blog]
# rss_url = \"https://example.com/rss.xml\"
# cache_duration = \"30m\"

# [speaking]
# api_url = \"https://example.com/api/speaking\"
# cache_duration = \"1h\"

# [youtube]
# api_key = \"...\"
# channel_id = \"UCxxxxxxxxxxxxxxxxxxxxxx\"
# application_name = \"showcase\"
# cache_duration = \"30m\"
";

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ShowcaseError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| ShowcaseError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
