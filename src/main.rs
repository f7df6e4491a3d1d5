mod app;
mod config;
mod dump;
mod input;
mod key_state;
mod render;
mod selector;
mod zone;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::Parser;
use signal_hook::consts::{SIGINT, SIGTERM};

use config::{Cli, Command, Config};
use input::ReaderHandle;
use key_state::{KeyStateTable, SharedKeyState};
use render::{AssetTable, LogRenderer, Renderer, RendererKind, TerminalRenderer};
use selector::{MonotonicClock, PresentationSelector};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    let default_filter = if matches!(cli.command, Some(Command::Dump { .. })) { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let config = Config::load(&cli);

    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    let device = config.device()?.clone();

    let shutdown = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(SIGINT, shutdown.clone())?;
    signal_hook::flag::register(SIGTERM, shutdown.clone())?;

    if let Some(Command::Dump { .. }) = cli.command {
        return dump::run_dump(&device, &shutdown, config.poll_interval);
    }

    let assets = match &config.assets {
        Some(paths) => AssetTable::load(paths)?,
        None => AssetTable::builtin(),
    };

    log::info!(
        "keycat starting (device={}, idle_timeout={}ms, idle_policy={}, renderer={})",
        device.display(),
        config.idle_timeout.as_millis(),
        config.idle_policy,
        config.renderer
    );

    let table: SharedKeyState = Arc::new(KeyStateTable::new());
    let reader_device = device.clone();
    let reader = ReaderHandle::spawn(
        &device.display().to_string(),
        move || input::open_device(&reader_device),
        table.clone(),
        config.poll_interval,
    )?;

    let mut renderer: Box<dyn Renderer> = match config.renderer {
        RendererKind::Terminal => Box::new(TerminalRenderer::new(std::io::stdout(), assets)),
        RendererKind::Log => Box::new(LogRenderer::default()),
    };
    let mut selector = PresentationSelector::new(config.idle_timeout, config.idle_policy);

    let result = app::run_display_loop(
        &table,
        &mut selector,
        &mut renderer,
        &MonotonicClock::new(),
        &shutdown,
        config.frame_interval,
        Some(&reader),
    );

    log::info!("Shutting down");
    reader.stop();
    result.map(|_| ())
}
