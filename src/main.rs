mod gateway;

use clap::{Parser, Subcommand};
use shepherd_channels::telegram::TelegramChannel;
use shepherd_core::{
    config,
    context::Context,
    prompts,
    traits::{Classifier, Provider},
};
use shepherd_providers::{KeywordClassifier, ModerationClassifier, OpenAiProvider};
use shepherd_store::{MemoryStore, RecordStore, SqliteStore};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "shepherd", version, about = "🕊 Shepherd — pastoral companion bot")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot.
    Start,
    /// Check configuration and provider availability.
    Status,
    /// Send a one-shot message to the model with the bot persona.
    Ask {
        /// The message to send.
        #[arg(trailing_var_arg = true)]
        message: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Start => {
            let cfg = config::load(&cli.config)?;

            let provider = build_provider(&cfg)?;
            if !provider.is_available().await {
                anyhow::bail!("provider '{}' is not available", provider.name());
            }

            let classifier = build_classifier(&cfg)?;
            let store = build_store(&cfg).await?;

            let mut channels: HashMap<String, Arc<dyn shepherd_core::traits::Channel>> =
                HashMap::new();

            if let Some(ref tg) = cfg.channel.telegram {
                if tg.enabled {
                    if tg.bot_token.is_empty() {
                        anyhow::bail!(
                            "Telegram is enabled but bot_token is empty. Set it in config.toml."
                        );
                    }
                    channels.insert(
                        "telegram".to_string(),
                        Arc::new(TelegramChannel::new(tg.clone())),
                    );
                }
            }

            if channels.is_empty() {
                anyhow::bail!("No channels enabled. Enable at least one channel in config.toml.");
            }

            println!("🕊 Shepherd — Starting bot...");
            let gw = Arc::new(gateway::Gateway::new(
                provider,
                classifier,
                channels,
                store,
                cfg.devotional.clone(),
                cfg.conversation.clone(),
            ));
            gw.run().await?;
        }
        Commands::Status => {
            let cfg = config::load(&cli.config)?;
            println!("🕊 Shepherd — Status Check\n");
            println!("Config: {}", cli.config);
            println!("Provider: {}", cfg.provider.default);
            println!("Classifier: {}", cfg.classifier.backend);
            println!("Store: {}", cfg.store.backend);
            println!();

            let provider = build_provider(&cfg)?;
            println!(
                "  {}: {}",
                provider.name(),
                if provider.is_available().await {
                    "available"
                } else {
                    "not available"
                }
            );

            match cfg.channel.telegram {
                Some(ref tg) => println!(
                    "  telegram: {}",
                    if tg.enabled && !tg.bot_token.is_empty() {
                        "configured"
                    } else if tg.enabled {
                        "enabled but missing bot_token"
                    } else {
                        "disabled"
                    }
                ),
                None => println!("  telegram: not configured"),
            }
        }
        Commands::Ask { message } => {
            if message.is_empty() {
                anyhow::bail!("no message provided. Usage: shepherd ask <message>");
            }

            let prompt = message.join(" ");
            let cfg = config::load(&cli.config)?;
            let provider = build_provider(&cfg)?;

            if !provider.is_available().await {
                anyhow::bail!("provider '{}' is not available", provider.name());
            }

            let context = Context::new(prompts::PERSONA, &prompt);
            let response = provider.complete(&context).await?;
            println!("{}", response.text);
        }
    }

    Ok(())
}

/// Build the configured language-model provider.
fn build_provider(cfg: &config::Config) -> anyhow::Result<Arc<dyn Provider>> {
    match cfg.provider.default.as_str() {
        "openai" => {
            let openai = cfg.provider.openai.clone().unwrap_or_default();
            if openai.api_key.is_empty() {
                anyhow::bail!(
                    "OpenAI provider selected but api_key is empty. \
                     Set it under [provider.openai] in config.toml."
                );
            }
            Ok(Arc::new(OpenAiProvider::from_config(&openai)))
        }
        other => anyhow::bail!("unsupported provider: {other}"),
    }
}

/// Build the configured crisis classifier.
fn build_classifier(cfg: &config::Config) -> anyhow::Result<Arc<dyn Classifier>> {
    match cfg.classifier.backend.as_str() {
        "moderation" => {
            let provider_key = cfg
                .provider
                .openai
                .as_ref()
                .map(|o| o.api_key.as_str())
                .unwrap_or_default();
            Ok(Arc::new(ModerationClassifier::from_config(
                &cfg.classifier,
                provider_key,
            )))
        }
        "keyword" => Ok(Arc::new(KeywordClassifier::new(
            &cfg.classifier.crisis_message,
        ))),
        other => anyhow::bail!("unsupported classifier backend: {other}"),
    }
}

/// Build the configured record store.
async fn build_store(cfg: &config::Config) -> anyhow::Result<Arc<dyn RecordStore>> {
    match cfg.store.backend.as_str() {
        "sqlite" => Ok(Arc::new(SqliteStore::new(&cfg.store).await?)),
        "memory" => Ok(Arc::new(MemoryStore::new())),
        other => anyhow::bail!("unsupported store backend: {other}"),
    }
}
