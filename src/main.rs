//! Indigo — garden memory assistant, HTTP service entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config
//!   3. Init logger once (CLI `-v` flags > `RUST_LOG` > config)
//!   4. Collect provider API keys from the environment
//!   5. Serve the HTTP channel until Ctrl-C

use tokio_util::sync::CancellationToken;
use tracing::info;

use indigo::config::{self, ProviderKeys};
use indigo::memory::store::GardenStore;
use indigo::{comms, error, logger};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), error::AppError> {
    // Load .env if present — ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();

    let mut cfg = config::load(args.config_path.as_deref())?;
    if let Some(bind) = args.bind {
        cfg.http.bind = bind;
    }

    logger::init(&cfg.log_level, args.log_level)?;

    info!(
        gardens_dir = %cfg.gardens_dir.display(),
        default_provider = %cfg.llm.default_provider,
        "indigo starting"
    );

    let keys = ProviderKeys::from_env();
    let store = GardenStore::new(cfg.gardens_dir.clone());
    let state = comms::HttpState::new(store, keys, cfg.llm.clone());

    let shutdown = CancellationToken::new();

    // Ctrl-C handler — cancels the token so the server drains and stops.
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received — initiating shutdown");
            ctrlc_token.cancel();
        }
    });

    if !cfg.http.enabled {
        return Err(error::AppError::Config(
            "http channel is disabled; nothing to run".into(),
        ));
    }

    comms::run(&cfg.http.bind, state, shutdown).await
}

struct CliArgs {
    log_level: Option<&'static str>,
    config_path: Option<String>,
    bind: Option<String>,
}

fn parse_cli_args() -> CliArgs {
    let mut verbosity = 0u8;
    let mut config_path = None;
    let mut bind = None;

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => {
                println!("Usage: indigo [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -h, --help                 Print help");
                println!("  -f, --config <PATH>        Path to configuration file (default: config/default.toml)");
                println!("  -b, --bind <ADDR>          Socket address to listen on");
                println!("  -v, -vv, -vvv, -vvvv       Increase logging verbosity");
                std::process::exit(0);
            }
            "-f" | "--config" => {
                if let Some(path) = iter.next() {
                    config_path = Some(path);
                } else {
                    eprintln!("error: -f/--config requires a path argument");
                    std::process::exit(1);
                }
            }
            "-b" | "--bind" => {
                if let Some(addr) = iter.next() {
                    bind = Some(addr);
                } else {
                    eprintln!("error: -b/--bind requires an address argument");
                    std::process::exit(1);
                }
            }
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            _ => {}
        }
    }

    // Each -v raises verbosity one tier from the config default.
    let log_level = match verbosity {
        0 => None,
        1 => Some("warn"),
        2 => Some("info"),
        3 => Some("debug"),
        _ => Some("trace"),
    };

    CliArgs { log_level, config_path, bind }
}
