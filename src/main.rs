use clap::Parser;
use incidentx_api::{RestApi, ServiceContext};
use incidentx_core::Capability;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Fraud, risk and similarity scoring for incident reports
#[derive(Parser, Debug)]
#[command(name = "incidentx")]
#[command(about = "Fraud, risk and similarity scoring for incident reports", long_about = None)]
struct Args {
    /// Fraud model artifact (JSON)
    #[arg(long)]
    fraud_model: Option<PathBuf>,

    /// Risk model artifact (JSON)
    #[arg(long)]
    risk_model: Option<PathBuf>,

    /// Incident corpus for similarity search (JSON array or JSON Lines)
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// HTTP API port
    #[arg(long, default_value_t = 5000)]
    http_port: u16,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Keep serving when a capability fails to load; it reports unhealthy
    #[arg(long)]
    allow_partial: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting IncidentX v{}", env!("CARGO_PKG_VERSION"));
    info!("HTTP API port: {}", args.http_port);

    let mut builder = ServiceContext::builder();
    if let Some(path) = &args.fraud_model {
        builder = builder.load_fraud_model(path);
    }
    if let Some(path) = &args.risk_model {
        builder = builder.load_risk_model(path);
    }
    if let Some(path) = &args.corpus {
        builder = builder.load_corpus(path);
    }
    let context = builder.build()?;

    let (failed, unconfigured): (Vec<_>, Vec<_>) = context
        .failures()
        .into_iter()
        .partition(|(capability, _)| match capability {
            Capability::Fraud => args.fraud_model.is_some(),
            Capability::Risk => args.risk_model.is_some(),
            Capability::Similarity => args.corpus.is_some(),
        });
    if !failed.is_empty() {
        let summary = failed
            .iter()
            .map(|(capability, reason)| format!("{capability}: {reason}"))
            .collect::<Vec<_>>()
            .join("; ");
        if !args.allow_partial {
            anyhow::bail!("capabilities failed to load ({summary}); pass --allow-partial to serve anyway");
        }
        warn!("Serving with unavailable capabilities: {}", summary);
    }
    for (capability, _) in unconfigured {
        warn!("No artifact given for {}; it will report unavailable", capability);
    }

    let context = Arc::new(context);
    let http_port = args.http_port;
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on port {}", http_port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(context, http_port).await {
                eprintln!("HTTP server error: {}", e);
            }
        })
    });

    info!("IncidentX started successfully");
    info!("HTTP API: http://localhost:{}/", args.http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}
