mod app;
mod protocol;
mod tools;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use showcase_core::Freshness;
use showcase_core::config::ShowcaseConfig;
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::tools::Params;

#[derive(Parser)]
#[command(name = "showcase")]
#[command(about = "Query a creator's blog posts, talks and videos, or serve them as tools")]
struct Cli {
    /// Config file (defaults to ~/.config/showcase/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Blog posts from the configured feed
    Blog {
        #[command(subcommand)]
        command: BlogCommand,
    },
    /// Speaking engagements
    Speaking {
        #[command(subcommand)]
        command: SpeakingCommand,
    },
    /// Videos and channel statistics
    Youtube {
        #[command(subcommand)]
        command: YoutubeCommand,
    },
    /// Call a tool by name, e.g. `showcase call blog-get-latest-posts count=3`
    Call {
        tool: String,

        /// Parameters as key=value
        params: Vec<String>,
    },
    /// List the available tools
    Tools,
    /// Fetch every enabled integration and report its cache
    Status,
    /// Answer JSON tool requests on stdin, one per line
    Serve,
}

#[derive(Subcommand)]
enum BlogCommand {
    Latest {
        #[arg(short, long)]
        count: Option<String>,
    },
    Search {
        keyword: String,
        #[arg(short, long)]
        count: Option<String>,
    },
    /// Posts within a range: "2024", "2023-01-01 to 2023-06-30" or a single day
    Range {
        range: String,
        #[arg(short, long)]
        count: Option<String>,
    },
    Stats,
}

#[derive(Subcommand)]
enum SpeakingCommand {
    Latest {
        #[arg(short, long)]
        count: Option<String>,
    },
    Upcoming {
        #[arg(short, long)]
        count: Option<String>,
    },
    Past {
        #[arg(short, long)]
        count: Option<String>,
    },
    Search {
        topic: String,
        #[arg(short, long)]
        count: Option<String>,
    },
    Range {
        range: String,
        #[arg(short, long)]
        count: Option<String>,
    },
    Stats,
}

#[derive(Subcommand)]
enum YoutubeCommand {
    Latest {
        #[arg(short, long)]
        count: Option<String>,
    },
    Top {
        #[arg(short, long)]
        count: Option<String>,

        /// recent, month, year or all
        #[arg(short, long)]
        range: Option<String>,
    },
    Search {
        topic: String,
        #[arg(short, long)]
        count: Option<String>,
    },
    Range {
        range: String,
        #[arg(short, long)]
        count: Option<String>,
    },
    Stats,
    Channel,
}

fn counted(count: Option<String>) -> Params {
    match count {
        Some(count) => Params::new().with("count", count),
        None => Params::new(),
    }
}

impl BlogCommand {
    fn into_call(self) -> (&'static str, Params) {
        match self {
            BlogCommand::Latest { count } => ("blog-get-latest-posts", counted(count)),
            BlogCommand::Search { keyword, count } => {
                ("blog-search-posts-by-keyword", counted(count).with("keyword", keyword))
            }
            BlogCommand::Range { range, count } => {
                ("blog-get-posts-by-date-range", counted(count).with("dateRange", range))
            }
            BlogCommand::Stats => ("blog-get-stats", Params::new()),
        }
    }
}

impl SpeakingCommand {
    fn into_call(self) -> (&'static str, Params) {
        match self {
            SpeakingCommand::Latest { count } => ("speaking-get-latest-engagements", counted(count)),
            SpeakingCommand::Upcoming { count } => ("speaking-get-upcoming-events", counted(count)),
            SpeakingCommand::Past { count } => ("speaking-get-past-events", counted(count)),
            SpeakingCommand::Search { topic, count } => {
                ("speaking-search-by-topic", counted(count).with("topic", topic))
            }
            SpeakingCommand::Range { range, count } => (
                "speaking-get-engagements-by-date-range",
                counted(count).with("dateRange", range),
            ),
            SpeakingCommand::Stats => ("speaking-get-stats", Params::new()),
        }
    }
}

impl YoutubeCommand {
    fn into_call(self) -> (&'static str, Params) {
        match self {
            YoutubeCommand::Latest { count } => ("youtube-get-latest-videos", counted(count)),
            YoutubeCommand::Top { count, range } => {
                let params = counted(count);
                let params = match range {
                    Some(range) => params.with("timeRange", range),
                    None => params,
                };
                ("youtube-get-top-videos", params)
            }
            YoutubeCommand::Search { topic, count } => {
                ("youtube-search-videos-by-topic", counted(count).with("topic", topic))
            }
            YoutubeCommand::Range { range, count } => {
                ("youtube-get-videos-by-date-range", counted(count).with("dateRange", range))
            }
            YoutubeCommand::Stats => ("youtube-get-video-stats", Params::new()),
            YoutubeCommand::Channel => ("youtube-get-channel-stats", Params::new()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays clean for tool output.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = ShowcaseConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let app = App::from_config(&config);

    match cli.command {
        Commands::Blog { command } => {
            let (tool, params) = command.into_call();
            run_tool(&app, tool, params).await
        }
        Commands::Speaking { command } => {
            let (tool, params) = command.into_call();
            run_tool(&app, tool, params).await
        }
        Commands::Youtube { command } => {
            let (tool, params) = command.into_call();
            run_tool(&app, tool, params).await
        }
        Commands::Call { tool, params } => {
            let params = parse_params(&params)?;
            run_tool(&app, &tool, params).await
        }
        Commands::Tools => run_tool(&app, "list-tools", Params::new()).await,
        Commands::Status => print_status(&app).await,
        Commands::Serve => protocol::serve(Arc::new(app)).await,
    }
}

async fn run_tool(app: &App, tool: &str, params: Params) -> Result<()> {
    let value = tools::call(app, tool, &params).await?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn parse_params(raw: &[String]) -> Result<Params> {
    raw.iter().try_fold(Params::new(), |params, pair| {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("Expected key=value, got '{}'", pair))?;
        Ok(params.with(key.trim(), value))
    })
}

async fn print_status(app: &App) -> Result<()> {
    for status in app.status().await {
        let name = format!("{:<10}", status.feature.as_str());
        let state = match status.freshness {
            None => "disabled".dimmed().to_string(),
            Some(Freshness::Fresh) => format!("{} ({} items)", "ok".green(), status.items),
            Some(Freshness::Stale) => format!("{} ({} items)", "stale".yellow(), status.items),
            Some(Freshness::Empty) => "unavailable".red().to_string(),
        };
        println!("{} {}", name.bold(), state);
    }

    if app.enabled().is_empty() {
        let path = ShowcaseConfig::config_path()?;
        println!(
            "\nNo integrations configured. Add a [blog], [speaking] or [youtube] section to {}",
            path.display()
        );
    }

    Ok(())
}
