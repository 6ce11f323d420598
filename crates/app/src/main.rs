mod commands;
mod render;

use std::fmt;
use std::sync::Arc;

use services::{
    FallbackSupplier, GameHandle, GameLoop, QuestionBank, QuestionGenConfig, QuestionGenerator,
    QuestionSupplier,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tracing::{debug, info};

use crate::commands::{Command, HELP};
use crate::render::render;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidSeed { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--offline] [--seed <u64>] [--verbose]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --offline   use the built-in question bank only");
    eprintln!("  --seed      make the question draw and lifelines reproducible");
    eprintln!("  --verbose   log at debug level (overridden by RUST_LOG)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  LADDER_AI_API_KEY, LADDER_AI_BASE_URL, LADDER_AI_MODEL, LADDER_QUIZ_TOPIC");
    eprintln!("  LADDER_SEED, RUST_LOG");
}

#[derive(Debug, Default)]
struct Args {
    offline: bool,
    seed: Option<u64>,
    verbose: bool,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            seed: std::env::var("LADDER_SEED")
                .ok()
                .and_then(|value| value.parse::<u64>().ok()),
            ..Self::default()
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--offline" => parsed.offline = true,
                "--verbose" | "-v" => parsed.verbose = true,
                "--seed" => {
                    let value = require_value(args, "--seed")?;
                    let seed = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidSeed { raw: value.clone() })?;
                    parsed.seed = Some(seed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }
}

fn init_tracing(verbose: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(if verbose { "debug" } else { "warn" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_supplier(args: &Args) -> Arc<dyn QuestionSupplier> {
    let bank = match args.seed {
        Some(seed) => QuestionBank::german_b1().with_seed(seed),
        None => QuestionBank::german_b1(),
    };
    let bank: Arc<dyn QuestionSupplier> = Arc::new(bank);
    if args.offline {
        info!("offline mode, using the built-in question bank");
        return bank;
    }

    match QuestionGenConfig::from_env() {
        Some(config) => {
            info!(model = %config.model, "generating questions, built-in bank as fallback");
            let generator = QuestionGenerator::new(Some(config));
            Arc::new(FallbackSupplier::new(Arc::new(generator), bank))
        }
        None => {
            info!("LADDER_AI_API_KEY not set, using the built-in question bank");
            bank
        }
    }
}

enum Input {
    Line(Option<String>),
    Frame(ladder_core::GameSnapshot),
}

async fn write_out(stdout: &mut Stdout, text: &str) -> std::io::Result<()> {
    stdout.write_all(text.as_bytes()).await?;
    stdout.flush().await
}

async fn play(mut handle: GameHandle) -> Result<(), Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    write_out(&mut stdout, &render(&handle.snapshot())).await?;

    loop {
        let input = tokio::select! {
            line = lines.next_line() => Input::Line(line?),
            snapshot = handle.changed() => Input::Frame(snapshot?),
        };

        match input {
            Input::Frame(snapshot) => {
                write_out(&mut stdout, &format!("\n{}", render(&snapshot))).await?;
            }
            Input::Line(None) => break,
            Input::Line(Some(line)) => match Command::parse(&line) {
                Some(Command::Quit) => break,
                Some(Command::Help) => write_out(&mut stdout, HELP).await?,
                Some(command) => match command.intent(&handle.snapshot()) {
                    Some(intent) => handle.send(intent)?,
                    None => debug!(?command, "command has no effect right now"),
                },
                None if line.trim().is_empty() => {}
                None => write_out(&mut stdout, "Unknown command, `h` for help.\n").await?,
            },
        }
    }

    handle.shutdown().await;
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    init_tracing(args.verbose);

    let supplier = build_supplier(&args);
    let mut game = GameLoop::new(supplier);
    if let Some(seed) = args.seed {
        game = game.with_seed(seed);
    }

    play(game.spawn()).await
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, ArgsError> {
        let mut iter = args.iter().map(|arg| (*arg).to_owned());
        Args::parse(&mut iter)
    }

    #[test]
    fn parses_flags() {
        let args = parse(&["--offline", "--seed", "42", "--verbose"]).unwrap();
        assert!(args.offline);
        assert!(args.verbose);
        assert_eq!(args.seed, Some(42));
    }

    #[test]
    fn seed_requires_a_number() {
        assert!(matches!(
            parse(&["--seed", "abc"]),
            Err(ArgsError::InvalidSeed { .. })
        ));
        assert!(matches!(
            parse(&["--seed"]),
            Err(ArgsError::MissingValue { flag: "--seed" })
        ));
    }

    #[test]
    fn rejects_unknown_arguments() {
        assert!(matches!(
            parse(&["--db", "x"]),
            Err(ArgsError::UnknownArg(arg)) if arg == "--db"
        ));
    }
}
