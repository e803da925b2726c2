//! Holdfast kiosk window manager binary.
//!
//! # Usage
//!
//! ```bash
//! # Home application from the command line
//! holdfast /usr/bin/launcher
//!
//! # Home application from the config file
//! echo /usr/bin/launcher > /etc/holdfast/home_application
//! holdfast
//! ```
//!
//! Exit codes: 0 after an external shutdown signal, 1 for display-level
//! failures (cannot connect, another window manager, connection lost),
//! 2 when the home application path cannot be resolved.

use std::{path::PathBuf, process::ExitCode, time::Duration};

use clap::Parser;
use holdfast_core::{CloseEscalation, KeySym, KioskConfig, Session, SystemClock};
use holdfast_x11::X11Backend;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod host;
mod paths;

use host::OsProcessHost;

/// Single-tenant kiosk window manager
#[derive(Parser, Debug)]
#[command(name = "holdfast")]
#[command(about = "Single-tenant kiosk window manager")]
#[command(version)]
struct Args {
    /// Home application executable; read from --home-file when omitted
    home: Option<PathBuf>,

    /// File holding the home application path
    #[arg(long, default_value = "/etc/holdfast/home_application")]
    home_file: PathBuf,

    /// X display to manage (defaults to $DISPLAY)
    #[arg(long)]
    display: Option<String>,

    /// Hotkey keysym, hex or decimal (default Super_L)
    #[arg(long, value_parser = parse_keysym, default_value = "0xffeb")]
    hotkey: KeySym,

    /// Hold duration before the hotkey fires, in milliseconds
    #[arg(long, default_value_t = 2000)]
    hold_ms: u64,

    /// Poll granularity while the hotkey is held, in milliseconds
    #[arg(long, default_value_t = 50)]
    poll_ms: u64,

    /// Grace before an ignored close request is forced, in milliseconds
    /// (0 never forces)
    #[arg(long, default_value_t = 2000)]
    grace_ms: u64,

    /// Minimum delay between home launches, in milliseconds
    #[arg(long, default_value_t = 1000)]
    respawn_delay_ms: u64,

    /// Log level (tracing env-filter syntax; RUST_LOG overrides)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn parse_keysym(value: &str) -> Result<KeySym, String> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => value.parse::<u32>(),
    };
    parsed.map(KeySym).map_err(|err| format!("invalid keysym {value:?}: {err}"))
}

fn kiosk_config(args: &Args, home_path: PathBuf) -> KioskConfig {
    let mut config = KioskConfig::new(home_path);
    config.hotkey = args.hotkey;
    config.hold_threshold = Duration::from_millis(args.hold_ms);
    config.hold_poll_interval = Duration::from_millis(args.poll_ms);
    config.close_escalation = match args.grace_ms {
        0 => CloseEscalation::Never,
        ms => CloseEscalation::ForceAfter(Duration::from_millis(ms)),
    };
    config.respawn_delay = Duration::from_millis(args.respawn_delay_ms);
    config
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "holdfast starting");

    let home_path = match paths::resolve_home(args.home.clone(), &args.home_file) {
        Ok(path) => path,
        Err(err) => {
            tracing::error!(%err, "home application path unresolved");
            return ExitCode::from(2);
        },
    };

    // The host registers its signal flags before anything is spawned so
    // no child exit can slip past the reaper.
    let mut host = match OsProcessHost::new() {
        Ok(host) => host,
        Err(err) => {
            tracing::error!(%err, "cannot install signal handlers");
            return ExitCode::from(1);
        },
    };

    let config = kiosk_config(&args, home_path);
    let mut backend = match X11Backend::connect(args.display.as_deref(), config.hotkey) {
        Ok(backend) => backend,
        Err(err) => {
            tracing::error!(%err, "cannot take over the display");
            return ExitCode::from(1);
        },
    };

    let mut session = Session::new(config);
    match holdfast_core::run(&mut session, &mut backend, &mut host, &SystemClock) {
        Ok(()) => {
            tracing::info!("holdfast shut down");
            ExitCode::SUCCESS
        },
        Err(err) => {
            tracing::error!(%err, "display lost");
            ExitCode::from(1)
        },
    }
}
