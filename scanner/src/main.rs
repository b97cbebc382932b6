//! Operator terminal for the two-scan ticket gate.
//!
//! Runs the manual input path against a real backend (or the bundled
//! simulator with `--demo`): plain lines are scans, `/reset` starts a new
//! ticket once the current one is resolved, `/mode` toggles the input
//! mode, `/quit` exits.

mod render;

use aboor_client::{ApiRoutes, Client};
use aboor_gate::{Event, Gate, OperatorAction};
use aboor_simulator::{Api, Simulator};
use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "aboor-scanner", about = "Aboor ticket gate scanner")]
struct Args {
    /// Verification backend base URL.
    #[arg(
        long,
        env = "ABOOR_BACKEND_URL",
        default_value = "https://aboor-backend.onrender.com"
    )]
    backend_url: String,

    /// Use the legacy endpoint paths (switch-qr / verify-secondary-qr).
    #[arg(long)]
    legacy_api: bool,

    /// Run against a local in-memory backend seeded with demo tickets.
    #[arg(long)]
    demo: bool,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

/// Serve a seeded simulator on a loopback port and return its base URL.
async fn start_demo_backend() -> Result<String> {
    let simulator = Arc::new(Simulator::new());
    let codes = simulator.seed_demo();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind demo backend listener")?;
    let base_url = format!("http://{}", listener.local_addr()?);
    let router = Api::new(simulator).router();
    tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, router.into_make_service()).await {
            error!(error = %err, "demo backend stopped");
        }
    });

    info!(%base_url, "demo backend running");
    println!("Demo tickets:");
    for (qr1, qr2) in codes {
        println!("  first scan: {qr1}   second scan: {qr2}");
    }
    Ok(base_url)
}

/// Forward operator input to the gate. Dropping the sender (on `/quit` or
/// EOF) is what ends the session loop.
async fn read_operator_input(tx: mpsc::Sender<Event>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                error!(error = %err, "failed to read operator input");
                break;
            }
        };
        let input = line.trim();
        let event = match input {
            "" => continue,
            "/quit" => break,
            "/reset" => Event::Operator(OperatorAction::Reset),
            "/mode" => Event::Operator(OperatorAction::ToggleInputMode),
            code => Event::CodeScanned(code.to_string()),
        };
        if tx.send(event).await.is_err() {
            break;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let backend_url = if args.demo {
        start_demo_backend().await?
    } else {
        args.backend_url.clone()
    };

    let client = Client::new(&backend_url).context("invalid backend URL")?;
    let client = if args.legacy_api {
        client.with_api(ApiRoutes::LEGACY)
    } else {
        client
    };
    info!(%backend_url, legacy_api = args.legacy_api, "scanner starting");

    let (mut gate, tx) = Gate::new(client);

    println!("🎫 Aboor Scanner - نظام التحقق من التذاكر");
    println!("Type a code to scan, /reset for a new ticket, /quit to exit.");
    render::draw(gate.session());

    let input = tokio::spawn(read_operator_input(tx));
    gate.run(|session, _effects| render::draw(session)).await;
    input.await.context("input task failed")?;

    Ok(())
}
