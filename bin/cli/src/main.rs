use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;

const USER_ID_TRAILER: &str = "--- USER_ID: ";

#[derive(Parser)]
#[command(name = "triage-cli")]
#[command(about = "Send a symptom report to the consultation server and stream the reply.")]
struct Cli {
    /// Symptoms to report (required)
    #[arg(short, long)]
    symptoms: String,

    /// Additional health context
    #[arg(short = 'c', long)]
    context: Option<String>,

    /// Reuse an identifier from a previous session
    #[arg(short, long)]
    user: Option<String>,

    /// Server base URL
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    server: String,

    /// Call the paid endpoint with this payment payload instead of the test endpoint
    #[arg(long)]
    payment: Option<String>,

    /// Fetch and print the raw history for --user instead of consulting
    #[arg(long)]
    history: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    if cli.history {
        let user = cli
            .user
            .as_deref()
            .context("--history requires --user <identifier>")?;
        let log = client
            .get(format!("{}/api/history/{user}", cli.server))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        println!("{log}");
        return Ok(());
    }

    let path = if cli.payment.is_some() {
        "/api/consult"
    } else {
        "/api/consult/test"
    };

    let mut request = client.post(format!("{}{path}", cli.server)).json(&json!({
        "symptoms": cli.symptoms,
        "health_context": cli.context,
        "user_id": cli.user,
    }));
    if let Some(payment) = &cli.payment {
        request = request.header("X-Payment", payment);
    }

    let mut response = request
        .send()
        .await
        .context("consultation server unreachable")?
        .error_for_status()?;

    let mut full = String::new();
    while let Some(chunk) = response.chunk().await? {
        let text = String::from_utf8_lossy(&chunk);
        print!("{text}");
        io::stdout().flush()?;
        full.push_str(&text);
    }
    println!();

    if let Some(user_id) = extract_user_id(&full) {
        eprintln!("(pass --user {user_id} next time to continue this history)");
    }

    Ok(())
}

/// Pulls the identifier out of the stream trailer, if the stream completed.
fn extract_user_id(body: &str) -> Option<&str> {
    let start = body.rfind(USER_ID_TRAILER)? + USER_ID_TRAILER.len();
    let rest = &body[start..];
    let end = rest.find(" ---")?;
    Some(rest[..end].trim())
}
