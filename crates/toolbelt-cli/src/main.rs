//! Toolbelt CLI - runs and inspects the MCP adapters.

use clap::{Parser, Subcommand, ValueEnum};
use toolbelt_core::{EnvSource, ProcessEnv, ToolFilter};
use toolbelt_mcp::McpServer;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "toolbelt")]
#[command(author, version, about = "Toolbelt - MCP adapters for third-party APIs", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve an adapter over stdio
    Serve {
        #[arg(value_enum)]
        adapter: Adapter,
    },

    /// List the tools an adapter exposes with the current environment
    Tools {
        #[arg(value_enum)]
        adapter: Adapter,
    },

    /// Print an adapter's config resource
    Config {
        #[arg(value_enum)]
        adapter: Adapter,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Adapter {
    Appsignal,
    Langfuse,
}

impl Adapter {
    fn build_server(self, env: &dyn EnvSource) -> toolbelt_core::Result<McpServer> {
        match self {
            Adapter::Appsignal => toolbelt_appsignal::build_server(env),
            Adapter::Langfuse => toolbelt_langfuse::build_server(env),
        }
    }

    fn config_uri(self) -> &'static str {
        match self {
            Adapter::Appsignal => toolbelt_appsignal::CONFIG_URI,
            Adapter::Langfuse => toolbelt_langfuse::CONFIG_URI,
        }
    }

    /// `(name, group, description)` of every enabled tool.
    fn enabled_tools(
        self,
        env: &dyn EnvSource,
    ) -> toolbelt_core::Result<Vec<(&'static str, &'static str, &'static str)>> {
        fn pick<C: ?Sized>(
            filter: &ToolFilter,
            tools: Vec<toolbelt_mcp::ToolDescriptor<C>>,
        ) -> Vec<(&'static str, &'static str, &'static str)> {
            tools
                .iter()
                .filter(|t| filter.allows(t.group(), t.name()))
                .map(|t| (t.name(), t.group(), t.description()))
                .collect()
        }

        Ok(match self {
            Adapter::Appsignal => {
                let config = toolbelt_appsignal::AppSignalConfig::from_env(env)?;
                pick(&config.filter, toolbelt_appsignal::all_tools())
            }
            Adapter::Langfuse => {
                let config = toolbelt_langfuse::LangfuseConfig::from_env(env)?;
                pick(&config.filter, toolbelt_langfuse::all_tools())
            }
        })
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // stdout carries the protocol; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let env = ProcessEnv;

    match cli.command {
        Commands::Serve { adapter } => {
            tracing::info!(adapter = ?adapter, "Starting MCP server on stdio");
            let mut server = adapter.build_server(&env)?;
            server.run_stdio().await?;
        }
        Commands::Tools { adapter } => {
            for (name, group, description) in adapter.enabled_tools(&env)? {
                println!("{:<28} {:<14} {}", name, group, description);
            }
        }
        Commands::Config { adapter } => {
            let server = adapter.build_server(&env)?;
            let contents = server.resources().read(adapter.config_uri())?;
            println!("{}", contents.text);
        }
    }

    Ok(())
}
