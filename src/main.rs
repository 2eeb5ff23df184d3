mod api;
mod cli;
mod config;
mod model;
mod nav;
mod screens;
mod session;
mod transcript;

use anyhow::Result;
use clap::Parser;
use std::cell::RefCell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tally", about = "Terminal client for the indicator tracking backend")]
pub struct Args {
    #[arg(
        long,
        env = "TALLY_BASE_URL",
        help = "Backend base URL (overrides config)"
    )]
    pub base_url: Option<String>,

    #[arg(long, help = "Config file path")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Session file path (default: ~/.tally/session.toml)")]
    pub session_file: Option<PathBuf>,

    #[arg(
        long,
        value_name = "MS",
        help = "Chat request timeout in milliseconds"
    )]
    pub chat_timeout_ms: Option<u64>,

    #[arg(long, help = "Activity log directory (default: ~/.tally/logs)")]
    pub logs_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => config::Config::load_from(path)?,
        None => config::Config::load()?,
    };
    if let Some(base_url) = &args.base_url {
        cfg.base_url = base_url.clone();
    }
    if let Some(timeout_ms) = args.chat_timeout_ms {
        cfg.chat.timeout_ms = timeout_ms;
    }
    if let Err(errors) = cfg.validate() {
        for error in &errors {
            eprintln!("Config error: {}", error);
        }
        return Err(anyhow::anyhow!("invalid configuration"));
    }

    let store = match &args.session_file {
        Some(path) => session::SessionStore::new(path.clone()),
        None => session::SessionStore::new(session::SessionStore::default_path()?),
    };

    let api = api::ApiClient::new(&cfg.base_url, cfg.chat.timeout_ms);
    if let Ok(Some(existing)) = store.load() {
        use crate::api::Backend as _;
        api.set_token(Some(existing.token));
    }

    let logs_dir = match &args.logs_dir {
        Some(dir) => dir.clone(),
        None => dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("could not determine home directory"))?
            .join(".tally")
            .join("logs"),
    };
    std::fs::create_dir_all(&logs_dir)?;

    let session_id = uuid::Uuid::new_v4().to_string();
    let transcript_path = logs_dir.join(format!("{}.jsonl", session_id));
    let transcript = transcript::Transcript::new(&transcript_path, &session_id)?;

    let ctx = cli::Context {
        config: cfg,
        api: std::rc::Rc::new(api),
        store,
        transcript: RefCell::new(transcript),
        session_id,
        chat_log: RefCell::new(Vec::new()),
    };

    cli::run_repl(ctx)
}
