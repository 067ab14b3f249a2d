use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use tracing_subscriber::EnvFilter;

mod commands;
mod facts;
mod settings;

use commands::BuildOptions;

#[derive(Parser)]
#[command(name = "omnigraph")]
#[command(about = "Cross-language code relationship graph with confidence-scored edges", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to configuration file (default: ./omnigraph.toml, then user config)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a graph from extractor facts and print it as Omni-Schema JSON
    Build {
        /// Facts document produced by the language extractors
        input: PathBuf,

        /// Write the graph here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override the project name
        #[arg(long)]
        project: Option<String>,

        /// Edge-to-missing-node policy: reject or placeholder
        #[arg(long)]
        missing_nodes: Option<String>,

        /// Skip HTTP client/endpoint linking
        #[arg(long)]
        no_http_links: bool,
    },
    /// Show what a node depends on, split at a confidence threshold
    Deps {
        /// Omni-Schema graph file
        graph: PathBuf,

        /// Canonical node id
        node: String,

        /// Trust threshold (default: configured approval threshold)
        #[arg(long)]
        min_confidence: Option<f64>,

        /// Show dependents (impact) instead of dependencies
        #[arg(long)]
        reverse: bool,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// List edges that need human approval
    Review {
        /// Omni-Schema graph file
        graph: PathBuf,

        /// Trust threshold (default: configured approval threshold)
        #[arg(long)]
        threshold: Option<f64>,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Explain how a relationship would be scored
    Score {
        /// Edge type tag, e.g. http_call
        edge_type: String,

        /// Scoring context as JSON, e.g. '{"match_count": 2}'
        #[arg(long)]
        context: Option<String>,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Decode a canonical node id
    ParseId {
        id: String,
    },
    /// Print the effective configuration as TOML
    Config,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    let (mut config, source) = settings::load(cli.config.as_deref())?;
    match &source {
        Some(path) => tracing::debug!(path = %path.display(), "using config file"),
        None => tracing::debug!("using default config"),
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Build {
            input,
            output,
            project,
            missing_nodes,
            no_http_links,
        } => {
            if let Some(policy) = missing_nodes {
                config.graph.missing_nodes = settings::parse_missing_nodes(&policy)?;
            }
            let graph = commands::build(
                BuildOptions {
                    input: &input,
                    output: output.as_deref(),
                    project: project.as_deref(),
                    detect_http: !no_http_links,
                },
                &config,
                &mut out,
                &mut io::stderr(),
            )?;
            let stats = graph.stats();
            tracing::info!(
                nodes = stats.nodes,
                edges = stats.edges,
                placeholders = stats.placeholder_nodes,
                "build finished"
            );
        }
        Commands::Deps {
            graph,
            node,
            min_confidence,
            reverse,
            json,
        } => {
            let graph = commands::load_graph(&graph)?;
            let threshold = min_confidence.unwrap_or(config.confidence.approval_threshold);
            commands::deps(&graph, &node, threshold, reverse, json, &mut out)?;
        }
        Commands::Review {
            graph,
            threshold,
            json,
        } => {
            let graph = commands::load_graph(&graph)?;
            let threshold = threshold.unwrap_or(config.confidence.approval_threshold);
            commands::review(&graph, threshold, json, &mut out)?;
        }
        Commands::Score {
            edge_type,
            context,
            json,
        } => {
            commands::score(&config, &edge_type, context.as_deref(), json, &mut out)?;
        }
        Commands::ParseId { id } => {
            commands::parse_id(&id, &mut out)?;
        }
        Commands::Config => {
            write!(out, "{}", config.to_toml_string()?)?;
        }
    }

    Ok(())
}
