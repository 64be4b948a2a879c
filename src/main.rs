mod cli;
mod config;
mod directory;
mod feedback;
mod transcript;
mod validate;

use anyhow::Result;
use clap::Parser;
use std::cell::RefCell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "roster", about = "An interactive user-directory manager")]
pub struct Args {
    #[arg(short, long, help = "Run one command and exit (e.g. 'list')")]
    pub command: Option<String>,

    #[arg(long, env = "ROSTER_CONFIG", help = "Config file path")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Disable the simulated add/edit latency")]
    pub no_delay: bool,

    #[arg(long, help = "Session transcripts directory")]
    pub transcripts_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let cfg = if let Some(config_path) = &args.config {
        config::Config::load_from(config_path)?
    } else {
        let root = std::env::current_dir()?;
        config::Config::load(&root)?
    };

    if let Err(errors) = cfg.validate() {
        eprintln!("Invalid configuration:");
        for e in &errors {
            eprintln!("  {}", e);
        }
        anyhow::bail!("{} configuration error(s)", errors.len());
    }

    let root = std::env::current_dir()?;
    let transcripts_dir = args
        .transcripts_dir
        .clone()
        .or_else(|| cfg.transcripts_dir.clone())
        .unwrap_or_else(|| root.join(".roster").join("sessions"));
    std::fs::create_dir_all(&transcripts_dir)?;

    let session_id = uuid::Uuid::new_v4().to_string();
    let transcript_path = transcripts_dir.join(format!("{}.jsonl", session_id));
    let mut transcript = transcript::Transcript::new(&transcript_path, &session_id)?;

    let directory = directory::Directory::with_seed(cfg.seed_users());
    transcript.session_start(directory.len())?;

    // One-shot mode skips the cosmetic delay; interactively it comes from
    // config unless --no-delay turns it off.
    let delay_ms = if args.no_delay || args.command.is_some() {
        0
    } else {
        cfg.latency_ms
    };
    let feedback = feedback::ConsoleFeedback::new(delay_ms);

    let ctx = cli::Context {
        args,
        session_id,
        config: cfg,
        directory: RefCell::new(directory),
        transcript: RefCell::new(transcript),
    };

    if let Some(line) = &ctx.args.command {
        cli::run_once(&ctx, line, &feedback)
    } else {
        cli::run_repl(ctx, &feedback)
    }
}
