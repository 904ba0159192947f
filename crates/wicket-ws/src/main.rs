//! wicket-bridge: development host for the bridge.
//!
//! Starts the asset and channel servers, opens one demo window and prints
//! its URL. Open the URL in any browser to drive the window.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use wicket_config::WicketConfig;
use wicket_core::{Bridge, Event, EventKind, NoBrowser};
use wicket_ws::{AssetServer, ChannelServer};

const DEMO_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>wicket</title><script src="wicket.js"></script></head>
<body>
  <h1>wicket</h1>
  <button id="Inc">Increment</button>
  <button id="Echo" onclick="wicket.call('Echo', document.title).then(console.log)">Echo</button>
  <p id="out"></p>
</body>
</html>"#;

#[derive(Parser)]
#[command(name = "wicket-bridge", about = "Serve a bridge window to a browser")]
struct Args {
    /// Config file (defaults to the platform config path).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HTTP port for window assets (overrides the config).
    #[arg(short, long)]
    port: Option<u16>,

    /// WebSocket port for browser channels (overrides the config).
    #[arg(long)]
    ws_port: Option<u16>,

    /// Content to show instead of the demo page: HTML, a URL or a file.
    #[arg(long)]
    content: Option<String>,

    /// Print the effective config as JSON and exit.
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref());
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ws_port) = args.ws_port {
        config.server.ws_port = ws_port;
    }
    if args.print_config {
        println!("{}", wicket_config::config_to_json(&config));
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.directive().into()),
        )
        .init();

    if let Err(e) = run(config, args.content).await {
        tracing::error!(error = %e, "wicket-bridge failed");
        std::process::exit(1);
    }
}

fn load_config(path: Option<&std::path::Path>) -> WicketConfig {
    let loaded = match path {
        Some(path) => wicket_config::toml_loader::load_from_path(path),
        None => wicket_config::load_config(),
    };
    loaded.unwrap_or_else(|e| {
        eprintln!("wicket-bridge: {e}, using defaults");
        WicketConfig::default()
    })
}

async fn run(config: WicketConfig, content: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let bridge = Bridge::from_config(&config, Arc::new(NoBrowser))?;
    let host = config.server.bind_host().to_string();

    let assets = AssetServer::bind(bridge.clone(), (host.as_str(), config.server.port)).await?;
    let channels = ChannelServer::bind(bridge.clone(), (host.as_str(), config.server.ws_port)).await?;
    tokio::spawn(async move {
        if let Err(e) = assets.run().await {
            tracing::error!(error = %e, "asset server stopped");
        }
    });
    tokio::spawn(channels.run());

    let window = bridge.new_window()?;
    bridge.bind(window, "", |e: &mut Event| {
        tracing::info!(window = %e.window, kind = ?e.kind, element = %e.element, "event");
    })?;
    let counter = Arc::new(std::sync::atomic::AtomicI64::new(0));
    bridge.bind(window, "Inc", move |e: &mut Event| {
        let n = counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
        let _ = e.bridge().run(e.window, &format!("document.getElementById('out').textContent = {n};"));
        e.return_int(n);
    })?;
    bridge.bind(window, "Echo", |e: &mut Event| {
        if e.kind == EventKind::Callback {
            let text = e.string();
            e.return_string(text);
        }
    })?;

    bridge.show(window, content.as_deref().unwrap_or(DEMO_PAGE))?;
    if let Some(url) = bridge.url(window)? {
        println!("{url}");
    }

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted");
        }
        _ = wait_for_windows(bridge.clone()) => {
            tracing::info!("all windows closed");
        }
    }

    bridge.exit();
    bridge.cleanup();
    Ok(())
}

/// Resolve once a window has connected and every shown window has closed
/// again.
async fn wait_for_windows(bridge: Bridge) {
    let _ = tokio::task::spawn_blocking(move || {
        bridge.wait_shown();
        bridge.wait();
    })
    .await;
}
