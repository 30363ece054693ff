use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use gitinsight::models::GitInsight;
use gitinsight::{create_router, AppState, Config, GitHubClient, InsightPipeline, Storage};

#[derive(Parser, Debug)]
#[command(name = "gitinsight")]
#[command(version = "0.1.0")]
#[command(about = "API-key gated GitHub repository insights")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server
    Serve {
        /// Address to bind (overrides HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Database path for users and API keys (overrides DATABASE_PATH)
        #[arg(long)]
        database: Option<String>,
    },

    /// Analyze one repository and print the result
    Analyze {
        /// GitHub repository URL
        #[arg(short, long)]
        url: String,

        /// Output format (json, text, markdown)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("gitinsight=info".parse()?)
                .add_directive("tower_http=info".parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let mut config = Config::from_env()?;

    let github = GitHubClient::with_base_url(config.github_token.as_deref(), &config.github_api_url)?;
    let llm = gitinsight::llm::provider_from_config(&config.llm)?;
    let pipeline = InsightPipeline::new(github, llm);

    match args.command {
        Command::Serve {
            host,
            port,
            database,
        } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(database) = database {
                config.database_path = database;
            }
            serve(config, pipeline).await
        }
        Command::Analyze {
            url,
            format,
            output,
        } => analyze(pipeline, &url, &format, output.as_deref()).await,
    }
}

async fn serve(config: Config, pipeline: InsightPipeline) -> anyhow::Result<()> {
    let storage = Storage::new(&config.database_path)?;
    tracing::info!("Using database at {}", config.database_path);

    let app = create_router(AppState::new(storage, pipeline));

    let addr = SocketAddr::new(config.host.parse()?, config.port);
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

async fn analyze(
    pipeline: InsightPipeline,
    url: &str,
    format: &str,
    output: Option<&str>,
) -> anyhow::Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message(format!("Analyzing {}", url));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = pipeline.analyze(url).await;
    spinner.finish_and_clear();
    let insight = result?;

    let rendered = match format {
        "json" => serde_json::to_string_pretty(&insight)?,
        "markdown" => format_markdown(&insight),
        _ => format_text(&insight),
    };

    if let Some(path) = output {
        std::fs::write(path, &rendered)?;
        tracing::info!("Output written to: {}", path);
    } else {
        println!("{}", rendered);
    }

    Ok(())
}

fn format_text(insight: &GitInsight) -> String {
    let repo = &insight.repository;
    let stats = &repo.stats;
    let mut output = String::new();

    output.push_str(&format!("\n=== {}/{} ===\n\n", repo.owner, repo.repo));
    output.push_str(&format!("{}\n\n", insight.analysis.summary));

    output.push_str("Cool facts:\n");
    for fact in &insight.analysis.cool_facts {
        output.push_str(&format!("  - {}\n", fact));
    }

    output.push_str(&format!(
        "\nStars: {}  Forks: {}  Watchers: {}  Open issues: {}\n",
        stats.stars, stats.forks, stats.watchers, stats.open_issues
    ));
    if let Some(ref language) = stats.language {
        output.push_str(&format!("Language: {}\n", language));
    }
    if let Some(ref license) = stats.license {
        output.push_str(&format!("License: {}\n", license.name));
    }
    if stats.is_archived {
        output.push_str("Archived: yes\n");
    }
    if let Some(ref release) = repo.latest_release {
        output.push_str(&format!("Latest release: {}\n", release.tag_name));
    }

    if !repo.contributors.is_empty() {
        output.push_str("\nTop contributors:\n");
        for c in &repo.contributors {
            output.push_str(&format!("  {} ({} commits)\n", c.username, c.contributions));
        }
    }

    output.push_str(&format!(
        "\nLast updated: {}\n",
        stats.last_update.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    output
}

fn format_markdown(insight: &GitInsight) -> String {
    let repo = &insight.repository;
    let stats = &repo.stats;
    let mut output = String::new();

    output.push_str(&format!("# [{}/{}]({})\n\n", repo.owner, repo.repo, repo.url));
    output.push_str(&format!("> {}\n\n", insight.analysis.summary));

    output.push_str("## Cool Facts\n\n");
    for fact in &insight.analysis.cool_facts {
        output.push_str(&format!("- {}\n", fact));
    }

    output.push_str("\n## Stats\n\n");
    output.push_str("| Metric | Value |\n|--------|-------|\n");
    output.push_str(&format!("| Stars | {} |\n", stats.stars));
    output.push_str(&format!("| Forks | {} |\n", stats.forks));
    output.push_str(&format!("| Watchers | {} |\n", stats.watchers));
    output.push_str(&format!("| Open Issues | {} |\n", stats.open_issues));
    output.push_str(&format!("| Default Branch | {} |\n", stats.default_branch));
    if let Some(ref language) = stats.language {
        output.push_str(&format!("| Language | {} |\n", language));
    }
    if !stats.topics.is_empty() {
        output.push_str(&format!("| Topics | {} |\n", stats.topics.join(", ")));
    }
    if let Some(ref release) = repo.latest_release {
        output.push_str(&format!(
            "| Latest Release | [{}]({}) |\n",
            release.tag_name, release.url
        ));
    }

    if !repo.contributors.is_empty() {
        output.push_str("\n## Top Contributors\n\n");
        output.push_str("| Contributor | Contributions |\n|-------------|---------------|\n");
        for c in &repo.contributors {
            output.push_str(&format!(
                "| [{}]({}) | {} |\n",
                c.username, c.profile_url, c.contributions
            ));
        }
    }

    output.push_str(&format!(
        "\n---\n*Created {}, last updated {}*\n",
        stats.created_at.format("%Y-%m-%d"),
        stats.last_update.format("%Y-%m-%d")
    ));

    output
}
