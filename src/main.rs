//! modelroute binary
//!
//! Runs the HTTP service or one of the CLI subcommands.

use clap::Parser;
use modelroute::{
    classify::{ProviderFailure, classify},
    cli::{Cli, Command, generate_config_template},
    config::Config,
    error::AppError,
    handlers::{self, AppState},
    probe::{ModelServerProbe, OllamaProbe},
    providers::{ModelConfig, Provider, Task, mask_secret},
    resolver::ModelResolver,
    telemetry,
};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(Command::Config { output }) = &cli.command {
        let template = generate_config_template();
        match output {
            Some(path) => {
                std::fs::write(path, template)?;
                eprintln!("Wrote configuration template to {}", path);
            }
            None => print!("{}", template),
        }
        return Ok(());
    }

    let config = load_config(&cli.config)?;
    telemetry::init(&config.observability.log_level);

    match cli.command {
        None | Some(Command::Serve) => serve(config).await,
        Some(Command::Resolve {
            task,
            provider,
            model,
        }) => resolve(&config, &task, provider, model),
        Some(Command::Probe { base_url }) => probe(&config, base_url).await,
        Some(Command::Classify { message }) => {
            let (category, advice) = classify(&ProviderFailure::from(message));
            println!("{}: {}", category, advice);
            Ok(())
        }
        Some(Command::Config { .. }) => Ok(()),
    }
}

/// File config (if present) overlaid with the process environment
fn load_config(path: &str) -> Result<Config, AppError> {
    let config = if Path::new(path).exists() {
        Config::from_file(path)?
    } else {
        Config::default()
    };
    let config = config.apply_process_env();
    config.validate()?;
    Ok(config)
}

async fn serve(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let config = Arc::new(config);
    let state = AppState::new(config.clone())?;

    let addr = SocketAddr::from((
        config
            .server
            .host
            .parse::<std::net::IpAddr>()
            .unwrap_or_else(|_| std::net::IpAddr::from([127, 0, 0, 1])),
        config.server.port,
    ));

    tracing::info!(
        ollama_base_url = %state.resolver().ollama_base_url(),
        "Starting modelroute on {}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, handlers::app(state)).await?;

    Ok(())
}

fn resolve(
    config: &Config,
    task: &str,
    provider: Option<String>,
    model: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let resolver = ModelResolver::new(config)?;
    let task: Task = task.parse()?;

    let resolved = match provider {
        Some(provider) => {
            let provider: Provider = provider.parse()?;
            let explicit = ModelConfig::new(provider, model.unwrap_or_default());
            resolver.resolve(task, Some(&explicit))?
        }
        None => resolver.resolve_configured(task)?,
    };

    let output = serde_json::json!({
        "task": task,
        "provider": resolved.provider,
        "model_name": resolved.model_name,
        "base_url": resolved.base_url,
        "api_key": resolved.api_key.as_deref().map(mask_secret),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn probe(config: &Config, base_url: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let base_url = base_url.unwrap_or_else(|| config.providers.ollama.base_url().to_string());
    let probe = match config.probe.timeout() {
        Some(timeout) => OllamaProbe::with_timeout(timeout)?,
        None => OllamaProbe::new()?,
    };

    let (report, models) = futures::join!(
        probe.diagnose(&base_url),
        probe.available_models(&base_url)
    );

    if report.reachable {
        println!("Ollama at {} is reachable", base_url);
    } else {
        println!("Ollama at {} is not reachable", base_url);
        if let Some(advice) = report.advice {
            println!("  {}", advice);
        }
    }

    if models.is_empty() {
        println!("No models available");
    } else {
        println!("Available models:");
        for model in models {
            println!("  {}", model);
        }
    }
    Ok(())
}
