mod cli;
mod output;

use anyhow::Context;
use clap::Parser;
use std::process;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cli::Args;
use dialogue_core::config::{load_from_file, DialogueConfig};
use dialogue_core::{
    AzureOpenAIClient, ChainedSession, Session, SessionKind, TranscriptSession, TurnRunner,
};
use output::ConsoleReporter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> dialogue_core::config::ConfigResult<DialogueConfig> {
    let mut config = match &args.config {
        Some(path) => load_from_file(path)?,
        None => DialogueConfig::from_env()?,
    };
    if let Some(system) = &args.system {
        config.system_prompt = system.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", args.config_failure_headline());
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let kind = SessionKind::from(args.mode);
    debug!(
        endpoint = %config.endpoint,
        deployment = %config.deployment,
        session = %kind,
        "Starting dialogue"
    );

    let client = Arc::new(
        AzureOpenAIClient::from_config(&config).context("Failed to build the HTTP client")?,
    );
    let mut session: Box<dyn Session> = match kind {
        SessionKind::Transcript => Box::new(TranscriptSession::new(
            client,
            &config.deployment,
            &config.system_prompt,
        )),
        SessionKind::Chained => Box::new(ChainedSession::new(
            client,
            &config.deployment,
            &config.system_prompt,
        )),
    };

    println!("Sending requests to Azure OpenAI ({} session)...\n", kind);

    let runner = TurnRunner::new(args.prompts());
    let mut reporter = ConsoleReporter;
    if runner.run(session.as_mut(), &mut reporter).await.is_err() {
        // The reporter has already printed the failure
        process::exit(1);
    }

    Ok(())
}
