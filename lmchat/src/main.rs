use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use futures::StreamExt;
use lmchat_client::{ChatSettings, ClientError, LmChat, SettingsError};
use lmchat_types::{StreamError, StreamEvent, StreamOutcome};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Settings file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG: &str = "lmchat.json";

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Stream(#[from] StreamError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Default, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    server: Option<String>,
    prompt: Option<String>,
    instructions: Option<String>,
    max_responses: Option<usize>,
}

#[derive(Debug, PartialEq)]
enum Command {
    Help,
    Run(Args),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run_cli().await {
        eprintln!("lmchat error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), CliError> {
    let args = match parse_args(std::env::args().skip(1).collect())? {
        Command::Help => {
            print_usage();
            return Ok(());
        }
        Command::Run(args) => args,
    };

    let settings = load_settings(&args)?;
    let query = match &args.prompt {
        Some(text) => text.clone(),
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer.trim().to_string()
        }
    };

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("interrupt received, aborting query");
            on_interrupt.cancel();
        }
    });

    let client = LmChat::from_settings(&settings);
    let mut handle = client.stream(&query, cancel).await?;

    let mut stdout = std::io::stdout().lock();
    while let Some(event) = handle.receiver.next().await {
        match event {
            StreamEvent::Delta(delta) => {
                stdout.write_all(delta.as_str().as_bytes())?;
                stdout.flush()?;
            }
            StreamEvent::Finished(outcome) => {
                writeln!(stdout)?;
                match outcome {
                    StreamOutcome::Completed => {}
                    StreamOutcome::Aborted(reason) => eprintln!("[aborted: {reason}]"),
                    StreamOutcome::Failed(err) => return Err(err.into()),
                }
            }
        }
    }
    Ok(())
}

fn parse_args(args: Vec<String>) -> Result<Command, CliError> {
    let mut parsed = Args::default();
    let mut remaining = args;
    while !remaining.is_empty() {
        let flag = remaining.remove(0);
        match flag.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "--config" => parsed.config = Some(PathBuf::from(take_arg("--config", &mut remaining)?)),
            "--server" => parsed.server = Some(take_arg("--server", &mut remaining)?),
            "--prompt" => parsed.prompt = Some(take_arg("--prompt", &mut remaining)?),
            "--instructions" => {
                parsed.instructions = Some(take_arg("--instructions", &mut remaining)?)
            }
            "--max-responses" => {
                let value = take_arg("--max-responses", &mut remaining)?;
                let limit = value.parse::<usize>().ok().filter(|n| *n > 0).ok_or_else(|| {
                    CliError::Usage(format!("--max-responses expects a positive integer, got {value}"))
                })?;
                parsed.max_responses = Some(limit);
            }
            other => return Err(CliError::Usage(format!("unknown flag: {other}"))),
        }
    }
    Ok(Command::Run(parsed))
}

fn take_arg(flag: &str, remaining: &mut Vec<String>) -> Result<String, CliError> {
    if remaining.is_empty() {
        return Err(CliError::Usage(format!("missing value for {flag}")));
    }
    Ok(remaining.remove(0))
}

/// Settings from `--config`, else `lmchat.json` if present, with flags applied on top.
fn load_settings(args: &Args) -> Result<ChatSettings, CliError> {
    let mut settings = match &args.config {
        Some(path) => ChatSettings::from_path(path)?,
        None if Path::new(DEFAULT_CONFIG).exists() => {
            ChatSettings::from_path(Path::new(DEFAULT_CONFIG))?
        }
        None => ChatSettings::default(),
    };
    if let Some(server) = &args.server {
        settings.server_address = server.clone();
    }
    if let Some(instructions) = &args.instructions {
        settings.custom_instructions = instructions.clone();
    }
    if let Some(limit) = args.max_responses {
        settings.response_limit = limit;
    }
    Ok(settings)
}

fn print_usage() {
    println!(
        "lmchat [--config lmchat.json] [--server URL] [--prompt TEXT] [--instructions TEXT] [--max-responses N]"
    );
}
