use care_navigator::{lifecycle, McpClient, Orchestrator, QueryContext};

use clap::Parser;
use std::process::ExitCode;
use std::time::Duration;

/// Ask the care navigator a question through the MCP tool bridge
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Free-text question
    #[arg(default_value = "Why was this authorization denied?")]
    query: String,

    /// Member the question is about (e.g. MBR-001)
    #[arg(short, long)]
    member: Option<String>,

    /// Authorization the question is about (e.g. AUTH-002)
    #[arg(short, long)]
    authorization: Option<String>,

    /// MCP endpoint of the tool bridge
    #[arg(long, env = "CARE_BRIDGE_URL", default_value = "http://localhost:3333/mcp")]
    bridge_url: String,

    /// Per-request timeout against the bridge
    #[arg(long, default_value = "45")]
    timeout_secs: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let log_filter = if args.verbose {
        "care_navigator=debug"
    } else {
        "care_navigator=warn"
    };
    lifecycle::init_tracing(log_filter);

    let client = McpClient::new(&args.bridge_url, Duration::from_secs(args.timeout_secs))?;
    let orchestrator = Orchestrator::new(client);

    let context = QueryContext::new(args.member, args.authorization);
    match orchestrator.respond(&args.query, context).await {
        Ok(reply) => {
            println!("Available tools: {}", reply.tools.join(", "));
            println!("{}", reply.text);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}
