use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "balancer-cli")]
#[command(about = "Management CLI for the worker balancer", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered workers
    Workers,
    /// Show balancer and per-worker health
    Health,
    /// Ask for the next worker in rotation
    Next,
    /// Register a worker address
    Register { server: String },
    /// Remove a worker address
    Deregister { server: String },
    /// Report a worker's in-flight request count
    ReportLoad { server: String, load: u64 },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Workers => client.get(format!("{}/list-workers", base)).send().await?,
        Commands::Health => client.get(format!("{}/load-balancer-health", base)).send().await?,
        Commands::Next => client.get(format!("{}/next", base)).send().await?,
        Commands::Register { server } => {
            client
                .post(format!("{}/register-worker", base))
                .json(&json!({ "server": server }))
                .send()
                .await?
        }
        Commands::Deregister { server } => {
            client
                .post(format!("{}/deregister-worker", base))
                .json(&json!({ "server": server }))
                .send()
                .await?
        }
        Commands::ReportLoad { server, load } => {
            client
                .post(format!("{}/report-load", base))
                .json(&json!({ "server": server, "load": load }))
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: balancer returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
