mod history_file;
mod markup;
mod transport;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use framelift_core::{
    BypassConfig, EncodedToken, FrameBypass, GameRequest, OpenOutcome, ProbeOutcome,
    SandboxPolicy, Strategy, TokenSource,
};
use serde::Serialize;

use history_file::{ChronoClock, JsonFileBackend};
use markup::MarkupSurface;
use transport::ReqwestTransport;

type CliBypass = FrameBypass<ReqwestTransport, JsonFileBackend, ChronoClock, MarkupSurface>;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SandboxArg {
    /// Grant the permissive sandbox token set
    Permissive,
    /// Omit the sandbox attribute
    None,
}

impl From<SandboxArg> for SandboxPolicy {
    fn from(arg: SandboxArg) -> Self {
        match arg {
            SandboxArg::Permissive => Self::Permissive,
            SandboxArg::None => Self::None,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "framelift", version)]
#[command(about = "Encode, probe and plan game embeds through the Framelift proxy")]
struct Args {
    /// JSON configuration file (fields default when absent)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the proxy base URL
    #[arg(long, global = true)]
    proxy_base: Option<String>,

    /// Directory holding the history file
    #[arg(long, global = true, default_value = ".framelift")]
    history_dir: PathBuf,

    /// Abort proxy requests after this many milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u32>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Ask the proxy for a token, falling back to local Base64
    Encode {
        url: String,
        /// Print the full outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Decode a token back to its URL
    Decode { token: String },
    /// Print the embed strategy for a URL
    Resolve { url: String },
    /// Check that the proxy answers on its root
    Probe,
    /// Inspect or extend the recent-games history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Open a game headlessly and print the outcome and overlay markup
    Open {
        url: String,
        /// Display title (ignored with --cooperative)
        #[arg(long, default_value = "Game")]
        title: String,
        /// Use the cooperative-host embed path
        #[arg(long)]
        cooperative: bool,
        /// Override the configured sandbox policy
        #[arg(long, value_enum)]
        sandbox: Option<SandboxArg>,
    },
}

#[derive(Debug, Subcommand)]
enum HistoryAction {
    /// Print stored entries as JSON in recording order
    List,
    /// Store a token under a title
    Record { token: String, title: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(&args)?;
    log::debug!("Using proxy base {}", config.proxy_base);
    let transport = ReqwestTransport::new(config.encode_timeout_ms)?;
    let mut bypass: CliBypass = FrameBypass::new(
        config,
        transport,
        JsonFileBackend::new(&args.history_dir),
        ChronoClock,
        MarkupSurface::new(),
    );

    match args.command {
        Command::Encode { url, json } => encode(&bypass, &url, json).await,
        Command::Decode { token } => {
            println!("{}", bypass.decode(&token));
            Ok(())
        }
        Command::Resolve { url } => {
            let label = match bypass.resolve(&url) {
                Strategy::Direct => "direct",
                Strategy::Proxied => "proxied",
            };
            println!("{label}");
            Ok(())
        }
        Command::Probe => probe(&bypass).await,
        Command::History { action } => history(&bypass, action),
        Command::Open {
            url,
            title,
            cooperative,
            sandbox,
        } => open(&mut bypass, url, title, cooperative, sandbox).await,
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn load_config(args: &Args) -> Result<BypassConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            BypassConfig::from_json(&raw)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => BypassConfig::default(),
    };
    if let Some(base) = &args.proxy_base {
        config = config.with_proxy_base(base.clone());
    }
    if args.timeout_ms.is_some() {
        config.encode_timeout_ms = args.timeout_ms;
    }
    config.validated().context("invalid configuration")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn encode(bypass: &CliBypass, url: &str, json: bool) -> Result<()> {
    let outcome = bypass.codec().encode_detailed(url).await;
    if let TokenSource::LocalFallback(reason) = &outcome.source {
        eprintln!(
            "{} proxy unavailable ({reason}), using local token",
            "⚠".yellow().bold()
        );
    }
    if json {
        print_json(&outcome)
    } else {
        println!("{}", outcome.token);
        Ok(())
    }
}

async fn probe(bypass: &CliBypass) -> Result<()> {
    let outcome = bypass.probe().await;
    print_json(&outcome)?;
    match &outcome {
        ProbeOutcome::Reachable { status } => {
            eprintln!("{} proxy reachable ({status})", "✓".green().bold());
            Ok(())
        }
        ProbeOutcome::Rejected { status } => {
            eprintln!("{} proxy answered {status}", "✗".red().bold());
            std::process::exit(1);
        }
        ProbeOutcome::Unreachable { error } => {
            eprintln!("{} proxy unreachable: {error}", "✗".red().bold());
            std::process::exit(1);
        }
    }
}

fn history(bypass: &CliBypass, action: HistoryAction) -> Result<()> {
    match action {
        HistoryAction::List => {
            let entries = bypass
                .history()
                .try_list()
                .context("reading history")?;
            print_json(&entries)
        }
        HistoryAction::Record { token, title } => {
            bypass
                .history()
                .try_record(&EncodedToken::new(token), &title)
                .context("recording history")?;
            eprintln!("{} stored \"{title}\"", "✓".green().bold());
            Ok(())
        }
    }
}

async fn open(
    bypass: &mut CliBypass,
    url: String,
    title: String,
    cooperative: bool,
    sandbox: Option<SandboxArg>,
) -> Result<()> {
    eprintln!("{}", "🎮 Framelift".bright_cyan().bold());
    let outcome = if cooperative {
        if sandbox.is_some() {
            bail!("--sandbox cannot be combined with --cooperative");
        }
        bypass.open_cooperative_embed(&url).await
    } else {
        let request = GameRequest::new(url, title);
        match sandbox {
            Some(policy) => {
                let plan = bypass.plan_bypass_with(request, policy.into()).await;
                bypass.commit(&plan)
            }
            None => bypass.open_with_bypass(request).await,
        }
    };
    print_json(&outcome)?;

    let surface = bypass.sessions().surface();
    log::debug!(
        "Scroll lock {}, {} key guard(s) installed",
        surface.scroll_locked(),
        surface.key_guards()
    );
    if let Some(markup) = surface.markup() {
        print!("{markup}");
    }
    for (url, target) in surface.navigations() {
        eprintln!("{} navigated to {url} ({target:?})", "→".cyan());
    }
    if let OpenOutcome::Failed { reason, .. } = &outcome {
        eprintln!("{} open failed: {reason}", "✗".red().bold());
        std::process::exit(1);
    }
    Ok(())
}
