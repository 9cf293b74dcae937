use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use lexicon_db::{LexemeStore, LoadMode};
use lexicon_xref::PhraseMatcher;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{Level, debug, info};
use tracing_subscriber::EnvFilter;

use pocketdict::{AppState, PrefixIndex, router};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_WORDLIST: &str = "words.txt";
const DEFAULT_GLOSSES: &str = "glosses.jsonl";
const DEFAULT_PHRASES: &str = "go-deeper.txt";
const MAX_PAGE_SIZE: usize = 500;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = load_config();
    info!("binding to {}:{}", config.host, config.port);
    info!("using wordlist at {}", config.wordlist_path.display());
    info!(
        "using glosses at {} (mode: {:?})",
        config.glosses_path.display(),
        config.glosses_mode
    );
    info!("using reference phrases at {}", config.phrases_path.display());
    if config.disable_cache {
        info!("cache headers disabled");
    }

    let start = Instant::now();
    let index = PrefixIndex::build_from_file(&config.wordlist_path)
        .with_context(|| format!("building index from {}", config.wordlist_path.display()))?;
    info!("index built in {} ms", start.elapsed().as_millis());
    debug!(
        "trie has {} nodes, ~{:.2} MB estimated",
        index.count_nodes(),
        index.estimated_memory_bytes() as f64 / (1024.0 * 1024.0)
    );

    let gloss_start = Instant::now();
    let store = Arc::new(LexemeStore::load_with_mode(
        &config.glosses_path,
        config.glosses_mode,
    )?);
    info!(
        "loaded {} gloss records for {} headwords in {} ms",
        store.entry_count(),
        store.headword_count(),
        gloss_start.elapsed().as_millis()
    );

    let phrase_start = Instant::now();
    let phrases = Arc::new(PhraseMatcher::load(&config.phrases_path)?);
    info!(
        "loaded {} reference phrases in {} ms",
        phrases.len(),
        phrase_start.elapsed().as_millis()
    );

    let state = AppState {
        index: Arc::clone(&index),
        store,
        phrases,
        max_page_size: MAX_PAGE_SIZE,
        disable_cache: config.disable_cache,
    };

    let app = router(state).layer(TraceLayer::new_for_http());
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("invalid listen address")?;
    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Debug, Clone)]
struct Config {
    host: String,
    port: u16,
    wordlist_path: PathBuf,
    glosses_path: PathBuf,
    glosses_mode: LoadMode,
    phrases_path: PathBuf,
    disable_cache: bool,
}

fn load_config() -> Config {
    let mut disable_cache = false;
    let mut cli_glosses: Option<PathBuf> = None;
    let mut cli_mode: Option<LoadMode> = None;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--no-cache" => disable_cache = true,
            "--glosses" => {
                if let Some(path) = args.next() {
                    cli_glosses = Some(PathBuf::from(path));
                }
            }
            _ => {
                if let Some(path) = arg.strip_prefix("--glosses=") {
                    cli_glosses = Some(PathBuf::from(path));
                } else if let Some(mode) = arg.strip_prefix("--load-mode=") {
                    cli_mode = parse_load_mode(mode);
                }
            }
        }
    }

    let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);
    let wordlist_path = env_path("WORDLIST_PATH", DEFAULT_WORDLIST);
    let glosses_path = cli_glosses.unwrap_or_else(|| env_path("GLOSSES_PATH", DEFAULT_GLOSSES));
    let glosses_mode = cli_mode
        .or_else(|| {
            env::var("GLOSSES_LOAD_MODE")
                .ok()
                .as_deref()
                .and_then(parse_load_mode)
        })
        .unwrap_or(LoadMode::Mmap);
    let phrases_path = env_path("PHRASES_PATH", DEFAULT_PHRASES);

    Config {
        host,
        port,
        wordlist_path,
        glosses_path,
        glosses_mode,
        phrases_path,
        disable_cache,
    }
}

fn env_path(var: &str, default: &str) -> PathBuf {
    env::var(var)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}

fn parse_load_mode(raw: &str) -> Option<LoadMode> {
    match raw.to_ascii_lowercase().as_str() {
        "mmap" => Some(LoadMode::Mmap),
        "owned" => Some(LoadMode::Owned),
        _ => None,
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .init();
}
