use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use llmbridge::cli::{load_factory, provider_entries};
use llmbridge::utils::LoggingConfig;
use llmbridge::{ChatUtil, ProviderRegistry, StreamEvent};

#[derive(Parser)]
#[command(name = "llmbridge", version, about = "Unified LLM provider CLI", author)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List discovered providers in priority order
    Providers {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Send a single prompt
    Chat {
        #[arg(long)]
        config: PathBuf,
        #[arg(long)]
        provider: Option<String>,
        #[arg(long, default_value_t = false)]
        stream: bool,
        prompt: String,
    },
    /// Check whether a provider answers a minimal request
    Probe {
        #[arg(long)]
        config: PathBuf,
        #[arg(long)]
        provider: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    LoggingConfig::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Providers { json } => handle_providers(json)?,
        Command::Chat {
            config,
            provider,
            stream,
            prompt,
        } => handle_chat(config, provider, stream, prompt).await?,
        Command::Probe { config, provider } => handle_probe(config, provider).await?,
    }
    Ok(())
}

fn handle_providers(json: bool) -> anyhow::Result<()> {
    let registry = ProviderRegistry::global();
    if json {
        println!("{}", serde_json::to_string_pretty(&provider_entries(&registry))?);
    } else {
        println!("{}", registry.providers_summary());
    }
    Ok(())
}

async fn handle_chat(
    config: PathBuf,
    provider: Option<String>,
    stream: bool,
    prompt: String,
) -> anyhow::Result<()> {
    let chat = ChatUtil::new(Arc::new(load_factory(&config)?));

    if !stream {
        let answer = match provider.as_deref() {
            Some(name) => chat.chat_with(name, &prompt).await?,
            None => chat.chat(&prompt).await?,
        };
        println!("{answer}");
        return Ok(());
    }

    let mut failed = None;
    let mut sink = |event: StreamEvent| match event {
        StreamEvent::Delta(text) => {
            print!("{text}");
            let _ = std::io::stdout().flush();
        }
        StreamEvent::Error(message) => failed = Some(message),
    };
    match provider.as_deref() {
        Some(name) => chat.chat_stream_with(name, &prompt, &mut sink).await?,
        None => chat.chat_stream(&prompt, &mut sink).await?,
    }
    println!();

    if let Some(message) = failed {
        anyhow::bail!("stream failed: {message}");
    }
    Ok(())
}

async fn handle_probe(config: PathBuf, provider: String) -> anyhow::Result<()> {
    let factory = load_factory(&config)?;
    let service = factory.get_service(&provider)?;
    if service.is_available().await {
        println!("{provider}: available");
        Ok(())
    } else {
        anyhow::bail!("{provider}: unavailable")
    }
}
