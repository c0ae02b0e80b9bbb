//! SHADE CLI
//!
//! Command-line interface for the SHADE stealth messaging scheme.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use shade_core::constants::DEFAULT_EVENT_QUEUE_CAPACITY;
use shade_core::error::ShadeError;
use shade_core::traits::ReportSink;
use shade_core::types::{EncryptedPayload, Event, PlaintextMessage, PublicKey, SecretKey};
use shade_crypto::{generate_keypair, keypair_from_secret, public_key_from_secret};
use shade_scanner::{channel, ScanSummary, Scanner, ScannerConfig};
use shade_stealth::{seal, CandidateSet, EngineConfig, OpenOutcome, StealthEngine};

/// SHADE - Stealth messages over a public event network
#[derive(Parser)]
#[command(name = "shade")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Receiver key material, from flags or the environment.
#[derive(clap::Args)]
struct ReceiverArgs {
    /// Receiver secret key (hex)
    #[arg(long, env = "RPRIV", hide_env_values = true)]
    rpriv: String,

    /// Candidate sender public keys (hex, comma-separated)
    #[arg(long, env = "SPUB", value_delimiter = ',', required = true)]
    spub: Vec<PublicKey>,

    /// Channel public key events must be tagged with
    #[arg(long, env = "CHANPUB")]
    chanpub: Option<PublicKey>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new identity
    Generate {
        /// Output file for the key pair (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the public key for a secret key
    Pubkey {
        /// Secret key (hex)
        #[arg(env = "RPRIV", hide_env_values = true)]
        secret: String,
    },

    /// Seal a stealth message
    Seal {
        /// Author secret key (hex)
        #[arg(long)]
        from: String,
        /// Recipient public key (hex)
        #[arg(long)]
        to: PublicKey,
        /// Secret key for the outer layer (defaults to the author's)
        #[arg(long)]
        outer: Option<String>,
        /// Wrap the payload in an event on this channel
        #[arg(long)]
        channel: Option<PublicKey>,
        /// Message text
        text: String,
    },

    /// Open a single payload
    Open {
        #[command(flatten)]
        receiver: ReceiverArgs,
        /// Payload string (`<base64>?iv=<base64>`)
        payload: String,
    },

    /// Scan newline-delimited JSON events
    Scan {
        #[command(flatten)]
        receiver: ReceiverArgs,
        /// Events file (stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Stop after the first event
        #[arg(long)]
        first: bool,
        /// Stop after this many events
        #[arg(long)]
        max: Option<u64>,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "shade=debug,info"
    } else {
        "shade=info,warn"
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());
    let fmt_layer = if cli.log_json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    match cli.command {
        Commands::Generate { output } => cmd_generate(output),
        Commands::Pubkey { secret } => cmd_pubkey(&secret),
        Commands::Seal {
            from,
            to,
            outer,
            channel,
            text,
        } => cmd_seal(&from, &to, outer.as_deref(), channel, &text),
        Commands::Open { receiver, payload } => cmd_open(receiver, &payload),
        Commands::Scan {
            receiver,
            input,
            first,
            max,
            json,
        } => cmd_scan(receiver, input, first, max, json).await,
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMMANDS
// ═══════════════════════════════════════════════════════════════════════════════

/// Generate a new identity
fn cmd_generate(output: Option<PathBuf>) -> Result<()> {
    println!("{}", "🔑 Generating identity...".cyan().bold());

    let keypair = generate_keypair();
    let keys_json = serde_json::json!({
        "public": keypair.public.to_hex(),
        "secret": keypair.secret.to_hex(),
    });

    if let Some(path) = output {
        std::fs::write(&path, serde_json::to_string_pretty(&keys_json)?)?;
        println!("{} {}", "✅ Keys saved to:".green(), path.display());
    } else {
        println!("\n{}", "Keys (JSON):".yellow().bold());
        println!("{}", serde_json::to_string_pretty(&keys_json)?);
    }

    println!("\n{}", "⚠️  IMPORTANT: Keep your secret key safe!".red().bold());
    println!("   Share only the public key with people who will message you.");

    Ok(())
}

/// Print the public key for a secret
fn cmd_pubkey(secret: &str) -> Result<()> {
    let secret = parse_secret(secret, "secret")?;
    let public = public_key_from_secret(&secret).context("Invalid secret key")?;
    println!("{}", public);
    Ok(())
}

/// Seal a stealth message
fn cmd_seal(
    from: &str,
    to: &PublicKey,
    outer: Option<&str>,
    channel: Option<PublicKey>,
    text: &str,
) -> Result<()> {
    let author = keypair_from_secret(&parse_secret(from, "--from")?).context("Invalid author key")?;
    let outer = match outer {
        Some(hex) => parse_secret(hex, "--outer")?,
        None => author.secret.clone(),
    };

    let sealed = seal(&author, &outer, to, text).context("Failed to seal message")?;

    match channel {
        Some(channel) => {
            // publish under a throwaway identity so the event does not name the author
            let publisher = generate_keypair().public;
            let event = sealed.to_event(publisher, &channel);
            println!("{}", serde_json::to_string(&event)?);
        }
        None => println!("{}", sealed.payload()),
    }

    eprintln!(
        "{} recipient must list {} as a candidate",
        "ℹ️ ".cyan(),
        sealed.outer().to_string().yellow()
    );
    Ok(())
}

/// Open a single payload
fn cmd_open(receiver: ReceiverArgs, payload: &str) -> Result<()> {
    let engine = build_engine(receiver)?;
    let payload = EncryptedPayload::parse(payload.trim()).context("Invalid payload")?;

    match engine.open_payload(&payload) {
        OpenOutcome::Disclosed(disclosure) => {
            print_message(&disclosure.candidate, &disclosure.message);
            Ok(())
        }
        OpenOutcome::NoMatch => bail!("no candidate opened the payload"),
        OpenOutcome::Unrecoverable { candidate, error } => {
            Err(error).with_context(|| format!("candidate {} matched but the message is unrecoverable", candidate))
        }
    }
}

/// Scan events from a file or stdin
async fn cmd_scan(
    receiver: ReceiverArgs,
    input: Option<PathBuf>,
    first: bool,
    max: Option<u64>,
    json: bool,
) -> Result<()> {
    let engine = Arc::new(build_engine(receiver)?);

    let mut config = ScannerConfig::stealth(engine.config().channel().copied());
    if first {
        config = config.stop_on_first();
    }
    if let Some(max) = max {
        config = config.max_events(max);
    }
    let scanner = Scanner::new(engine, config);

    let reader = open_input(input.as_deref())?;
    let (tx, mut source) = channel(DEFAULT_EVENT_QUEUE_CAPACITY);
    let skipped = Arc::new(AtomicUsize::new(0));
    let counter = skipped.clone();

    // A plain thread: it may block on stdin after the scanner has stopped.
    std::thread::spawn(move || match read_events(reader, |event| tx.blocking_send(event).is_ok()) {
        Ok(n) => counter.store(n, Ordering::SeqCst),
        Err(e) => warn!(error = %e, "failed to read events"),
    });

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message("Scanning events...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let reporter = ConsoleReporter {
        progress: spinner.clone(),
    };
    let summary = scanner.run(&mut source, &reporter).await?;
    spinner.finish_and_clear();
    let skipped = skipped.load(Ordering::SeqCst);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary, skipped);
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

fn parse_secret(hex: &str, what: &str) -> Result<SecretKey> {
    SecretKey::from_hex(hex).with_context(|| format!("{} is not a 32-byte hex secret", what))
}

fn build_engine(args: ReceiverArgs) -> Result<StealthEngine> {
    let secret = parse_secret(&args.rpriv, "RPRIV")?;
    let candidates = CandidateSet::new(args.spub).context("SPUB")?;

    let mut config = EngineConfig::new(secret, candidates)?;
    if let Some(channel) = args.chanpub {
        config = config.with_channel(channel);
    }
    Ok(StealthEngine::new(config))
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead + Send>> {
    Ok(match path {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    })
}

/// Parses one NDJSON line. Blank lines yield `None`.
fn parse_event_line(line: &str) -> shade_core::Result<Option<Event>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    Event::from_json(line).map(Some)
}

/// Feeds every parseable NDJSON event to `deliver` until it returns false.
///
/// Returns the number of lines that failed to parse.
fn read_events<R, F>(reader: R, mut deliver: F) -> io::Result<usize>
where
    R: BufRead,
    F: FnMut(Event) -> bool,
{
    let mut skipped = 0;
    for line in reader.lines() {
        match parse_event_line(&line?) {
            Ok(Some(event)) => {
                if !deliver(event) {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "skipping unparseable event line");
                skipped += 1;
            }
        }
    }
    Ok(skipped)
}

fn print_message(candidate: &PublicKey, message: &PlaintextMessage) {
    println!("\n{} {}", "Pubkey:".green().bold(), message.sender);
    if candidate != &message.sender {
        println!("   {} {}", "via:".dimmed(), candidate);
    }
    println!("   {}", message.text);
}

fn print_summary(summary: &ScanSummary, skipped: usize) {
    println!("\n{}", "📈 Scan complete:".green().bold());
    println!("   {} {}", "Events:".dimmed(), summary.total_events);
    println!("   {} {}", "Filtered:".dimmed(), summary.filtered);
    println!("   {} {}", "Rejected:".dimmed(), summary.rejected + skipped as u64);
    println!("   {} {}", "No match:".dimmed(), summary.no_match);
    println!("   {} {}", "Unrecoverable:".dimmed(), summary.unrecoverable);
    println!("   {} {}", "Disclosed:".dimmed(), summary.disclosed);
    println!("   {} {:.0} events/sec", "Rate:".dimmed(), summary.rate);

    if summary.disclosed == 0 {
        println!("\n{}", "No messages found.".yellow());
    }
}

/// Prints results above the progress spinner.
struct ConsoleReporter {
    progress: ProgressBar,
}

impl ReportSink for ConsoleReporter {
    fn report(&self, candidate: &PublicKey, message: &PlaintextMessage) {
        self.progress.suspend(|| print_message(candidate, message));
    }

    fn report_unrecoverable(&self, candidate: &PublicKey, error: &ShadeError) {
        self.progress.suspend(|| {
            println!(
                "\n{} {} {}",
                "⚠️  Unrecoverable:".yellow().bold(),
                candidate.short(),
                error.to_string().dimmed()
            );
        });
    }
}
