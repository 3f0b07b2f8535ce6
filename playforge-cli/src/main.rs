//! # Playforge CLI
//!
//! Command-line interface for generating children's web games.
//!
//! Usage:
//!   playforge generate <text>...
//!   playforge generate --model kimi-k2 --option level=3 <text>...
//!   playforge analyze <text>...
//!   playforge agents [KEY]
//!
//! Examples:
//!   playforge generate "给7岁孩子做一个太空主题的加法游戏"
//!   playforge generate -o space.html "space memory game for 5 year olds"
//!   playforge analyze "困难的拼图游戏 15分钟"

mod logging;
mod settings;

use chrono::Utc;
use clap::{Parser, Subcommand};
use logging::init_logging;
use playforge_agent::context::MODEL_ATTRIBUTE;
use playforge_agent::{GameGenerator, GenerationResult};
use playforge_error::{Error, ErrorKind, Result};
use playforge_llm::{ModelRoute, ModelRouter};
use rand::Rng;
use serde_json::Value;
use settings::AppSettings;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "playforge")]
#[command(author, version, about = "Playforge - turn a sentence into a playable game")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (TOML); defaults to ./playforge.toml when present
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Override the log format (text or json)
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a game and write its HTML page
    Generate {
        /// The game request
        #[arg(trailing_var_arg = true, required = true)]
        text: Vec<String>,

        /// Model route: default, kimi-k2, qwen3-coder-plus or deepseek
        #[arg(short, long)]
        model: Option<String>,

        /// Session ID (generated when omitted)
        #[arg(short, long)]
        session: Option<String>,

        /// Extra agent option as key=value; values parse as JSON when they can
        #[arg(long = "option", value_name = "KEY=VALUE")]
        options: Vec<String>,

        /// Output file (default: <session>.html)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Show the recognized intent and game configuration
    Analyze {
        #[arg(trailing_var_arg = true, required = true)]
        text: Vec<String>,
    },
    /// List registered game agents, or show the one registered under KEY
    Agents {
        key: Option<String>,
    },
}

/// Parse `key=value`. The value is JSON when it parses, a string otherwise.
fn parse_option(raw: &str) -> Result<(String, Value)> {
    let Some((key, value)) = raw.split_once('=') else {
        return Err(Error::invalid_argument(format!(
            "option '{}' must be in key=value form",
            raw
        )));
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(Error::invalid_argument(format!("option '{}' has an empty key", raw)));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn new_session_id() -> String {
    let suffix: u16 = rand::thread_rng().gen();
    format!("session-{}-{:04x}", Utc::now().format("%Y%m%d%H%M%S"), suffix)
}

fn io_error_kind(kind: std::io::ErrorKind) -> ErrorKind {
    match kind {
        std::io::ErrorKind::NotFound => ErrorKind::FileNotFound,
        std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
        _ => ErrorKind::IoFailed,
    }
}

fn write_html(path: &Path, html: &str) -> Result<()> {
    std::fs::write(path, html).map_err(|e| {
        Error::new(io_error_kind(e.kind()), "failed to write game page")
            .with_operation("cli::write_html")
            .with_context("path", path.display().to_string())
            .set_source(e)
    })
}

fn print_summary(result: &GenerationResult) {
    println!("Session:  {}", result.session_id);
    println!("Success:  {}", result.success);
    if let Some(config) = &result.config {
        println!(
            "Game:     {} ({}, ages {}, {})",
            config.title, config.game_type, config.age_group, config.difficulty
        );
    }
    if let Some(key) = &result.agent_key {
        println!(
            "Agent:    {} [{}]",
            result.agent_name.as_deref().unwrap_or_default(),
            key
        );
    }
    println!("Source:   {}", result.agent_source());
    if let Some(model) = result.model_name() {
        println!("Model:    {}", model);
    }
    println!("Elapsed:  {}ms", result.elapsed_ms);
    if let Some(error) = &result.error {
        println!("Error:    {}", error);
    }
}

async fn run_generate(
    generator: &GameGenerator,
    text: &str,
    model: Option<String>,
    session: Option<String>,
    raw_options: &[String],
    out: Option<PathBuf>,
) -> Result<bool> {
    let mut options = HashMap::new();
    for raw in raw_options {
        let (key, value) = parse_option(raw)?;
        options.insert(key, value);
    }
    if let Some(model) = model {
        if ModelRoute::from_key(Some(&model)).is_none() {
            tracing::warn!(model = %model, "Unknown model route, using default");
        }
        options.insert(MODEL_ATTRIBUTE.to_string(), Value::String(model));
    }

    let session_id = session.unwrap_or_else(new_session_id);
    let result = generator.generate(text, &session_id, options).await;
    print_summary(&result);

    if let Some(artifact) = &result.artifact {
        let path = out.unwrap_or_else(|| PathBuf::from(format!("{}.html", result.session_id)));
        write_html(&path, &artifact.html)?;
        println!("Written:  {}", path.display());
    }
    Ok(result.success)
}

fn run_analyze(generator: &GameGenerator, text: &str) -> Result<()> {
    let (intent, config) = generator.analyze(text);
    let report = serde_json::json!({ "intent": intent, "config": config });
    let rendered = serde_json::to_string_pretty(&report).map_err(|e| {
        Error::new(ErrorKind::SerializationFailed, "failed to render analysis")
            .set_source(e)
    })?;
    println!("{}", rendered);
    Ok(())
}

fn show_agent(generator: &GameGenerator, key: &str) -> Result<()> {
    let descriptor = generator.describe(key)?;
    println!("Key:         {}", descriptor.key);
    println!("Name:        {}", descriptor.name);
    println!("Priority:    {}", descriptor.priority.display_name());
    println!("Description: {}", descriptor.description);
    Ok(())
}

fn list_agents(generator: &GameGenerator) {
    println!("Registered agents:\n");
    for descriptor in generator.agents() {
        println!(
            "  {:<18} {} [{}]",
            descriptor.key,
            descriptor.name,
            descriptor.priority.display_name()
        );
        println!("  {:<18} {}", "", descriptor.description);
    }
}

fn load_settings(cli: &Cli) -> Result<AppSettings> {
    let mut settings = AppSettings::load(cli.config.as_deref())?;
    if let Some(level) = &cli.log_level {
        settings.logging.level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        settings.logging.format = format.clone();
    }
    Ok(settings)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = init_logging(&settings.logging) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let generator = match ModelRouter::from_settings(&settings.llm)
        .and_then(GameGenerator::with_default_agents)
    {
        Ok(generator) => generator,
        Err(e) => {
            eprintln!("Failed to initialize generator: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Generate {
            text,
            model,
            session,
            options,
            out,
        } => match run_generate(&generator, &text.join(" "), model, session, &options, out).await {
            Ok(true) => {}
            Ok(false) => std::process::exit(1),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        Commands::Analyze { text } => {
            if let Err(e) = run_analyze(&generator, &text.join(" ")) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Agents { key: None } => list_agents(&generator),
        Commands::Agents { key: Some(key) } => {
            if let Err(e) = show_agent(&generator, &key) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
