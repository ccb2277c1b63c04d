use anyhow::{Context, Result};
use autext_classifiers::{Detector, DetectorConfig, ModelSourceSpec};
use autext_core::Language;
use autext_demo::{
    cli::{Cli, Commands},
    config::load_config,
    models::DetectResponse,
    render::render_report,
    server::run_server,
    state::AppState,
};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use std::io::{IsTerminal, Read};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    let config = load_config(&cli.global)?;

    match cli.command {
        Commands::Detect {
            file,
            details,
            json,
        } => run_detect(&config, file, details, json).await,
        Commands::Fetch { languages } => run_fetch(&config, languages).await,
        Commands::Languages => {
            print_languages(&config);
            Ok(())
        }
        Commands::Serve {
            port,
            address,
            preload,
        } => run_serve(&config, &address, port, preload).await,
    }
}

async fn run_detect(
    config: &DetectorConfig,
    file: Option<PathBuf>,
    details: bool,
    json: bool,
) -> Result<()> {
    let text = match &file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    let detector = Detector::from_config(config)?;
    let result = detector.analyze(&text).await?;

    if json {
        let response = DetectResponse::new(&result, details);
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        let color = std::io::stdout().is_terminal();
        print!("{}", render_report(&result, details, color));
    }

    Ok(())
}

async fn run_fetch(config: &DetectorConfig, languages: Vec<Language>) -> Result<()> {
    let languages = if languages.is_empty() {
        config
            .languages
            .iter()
            .copied()
            .filter(|l| config.has_model(*l))
            .collect()
    } else {
        languages
    };

    if languages.is_empty() {
        anyhow::bail!("No model sources configured; add a `models` section to the config file");
    }

    let detector = Detector::from_config(config)?;
    detector.registry().preload(&languages).await?;

    for language in &languages {
        println!("{:<4} {:<12} ready", language.code(), language.name());
    }
    Ok(())
}

fn print_languages(config: &DetectorConfig) {
    for language in Language::ALL {
        let enabled = if config.languages.contains(&language) {
            "enabled"
        } else {
            "disabled"
        };
        let source = config
            .models
            .get(&language)
            .map(|spec| source_label(&spec.source))
            .unwrap_or_else(|| "no model source".to_string());
        println!(
            "{:<4} {:<12} {:<9} {}",
            language.code(),
            language.name(),
            enabled,
            source
        );
    }
}

fn source_label(source: &ModelSourceSpec) -> String {
    match source {
        ModelSourceSpec::GoogleDrive { drive_id } => format!("google drive {}", drive_id),
        ModelSourceSpec::HuggingFace {
            repo_id, filename, ..
        } => format!("hf://{}/{}", repo_id, filename),
        ModelSourceSpec::Url { url } => url.clone(),
        ModelSourceSpec::Local { path } => path.display().to_string(),
    }
}

async fn run_serve(config: &DetectorConfig, address: &str, port: u16, preload: bool) -> Result<()> {
    info!("Starting autext demo");

    let metrics_handle = init_metrics()?;
    let detector = Arc::new(Detector::from_config(config)?);
    info!(
        "Enabled languages: {}",
        detector
            .languages()
            .iter()
            .map(|l| l.code())
            .collect::<Vec<_>>()
            .join(", ")
    );

    if preload {
        let configured: Vec<Language> = detector
            .languages()
            .iter()
            .copied()
            .filter(|l| config.has_model(*l))
            .collect();
        info!("Preloading {} models...", configured.len());
        detector.registry().preload(&configured).await?;
    }

    let addr: SocketAddr = format!("{}:{}", address, port).parse()?;
    let state = AppState::new(detector, Some(metrics_handle));
    run_server(state, addr).await
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("autext=debug,autext_classifiers=debug,autext_demo=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("autext=info,autext_classifiers=info,autext_demo=info")
        })
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!("autext_requests_total", "Total number of texts submitted");
    metrics::describe_counter!(
        "autext_paragraphs_total",
        "Total number of paragraphs scored by verdict"
    );
    metrics::describe_counter!(
        "autext_model_loads_total",
        "Model load attempts by language and outcome"
    );
    metrics::describe_histogram!(
        "autext_pipeline_latency_us",
        metrics::Unit::Microseconds,
        "Whole-text analysis latency in microseconds"
    );

    info!("Metrics exporter initialized");
    Ok(handle)
}
