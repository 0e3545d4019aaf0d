//! agentweave CLI: one subcommand per composition pattern demo.
//!
//! Commands:
//! - `chain`         Recipe pipeline (idea, ingredients, shopping list)
//! - `route`         Support-ticket routing
//! - `scatter`       Parallel perspectives (or `--consensus`) plus synthesis
//! - `orchestrate`   Planner, workers, compiled document
//! - `refine`        Draft / judge / revise loop
//! - `agent`         Native tool-calling agent (market, returns or claims)
//! - `react`         Text-protocol ReAct agent
//! - `secure`        Cached, traced, PII-filtered call

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "agentweave",
    about = "agentweave: LLM composition pattern demos",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ~/.agentweave/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the three-stage recipe chain
    Chain {
        /// Input for the first stage
        input: Option<String>,
    },

    /// Classify support queries and dispatch them
    Route {
        /// Queries to route (the demo set when empty)
        queries: Vec<String>,

        /// Answer with fixed replies instead of persona calls
        #[arg(long)]
        canned: bool,
    },

    /// Fan out to personas, then synthesize
    Scatter {
        /// Topic to discuss
        topic: Option<String>,

        /// Three identical agents and a judge instead of three personas
        #[arg(long)]
        consensus: bool,
    },

    /// Plan sub-tasks, delegate them to workers, compile the result
    Orchestrate {
        task: Option<String>,

        /// Run workers concurrently
        #[arg(long)]
        concurrent: bool,
    },

    /// Generate and refine a draft until the judge approves it
    Refine {
        request: Option<String>,

        /// Override the iteration ceiling
        #[arg(short = 'n', long)]
        max_iterations: Option<u32>,
    },

    /// Tool-calling agent over the demo tools
    Agent {
        query: Option<String>,

        /// Which demo to run
        #[arg(long, value_enum, default_value_t = commands::agent::Scenario::Market)]
        scenario: commands::agent::Scenario,

        /// Image URL attached to a returns or claims request
        #[arg(long)]
        image: Option<String>,
    },

    /// ReAct agent over the market tools
    React { query: Option<String> },

    /// Cached and traced call with the PII output filter
    Secure {
        query: Option<String>,

        /// Number of times to send the query
        #[arg(long, default_value_t = 2)]
        repeat: u32,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let ctx = commands::Context::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Chain { input } => commands::chain::run(&ctx, input).await?,
        Commands::Route { queries, canned } => commands::route::run(&ctx, queries, canned).await?,
        Commands::Scatter { topic, consensus } => {
            commands::scatter::run(&ctx, topic, consensus).await?
        }
        Commands::Orchestrate { task, concurrent } => {
            commands::orchestrate::run(&ctx, task, concurrent).await?
        }
        Commands::Refine {
            request,
            max_iterations,
        } => commands::refine::run(&ctx, request, max_iterations).await?,
        Commands::Agent {
            query,
            scenario,
            image,
        } => commands::agent::run(&ctx, query, scenario, image).await?,
        Commands::React { query } => commands::react::run(&ctx, query).await?,
        Commands::Secure { query, repeat } => commands::secure::run(&ctx, query, repeat).await?,
    }

    Ok(())
}
