mod cli;
mod file;

pub use cli::{Cli, Command};

use std::path::PathBuf;
use std::time::Duration;

use crate::render::RendererKind;
use crate::selector::IdlePolicy;

const DEFAULT_IDLE_TIMEOUT_MS: u64 = 50;
const DEFAULT_FRAME_INTERVAL_MS: u64 = 10;
const DEFAULT_POLL_INTERVAL_MS: u64 = 1;

/// Merged configuration from CLI args and TOML file.
#[derive(Debug, Clone)]
pub struct Config {
    pub device: Option<PathBuf>,
    pub idle_timeout: Duration,
    pub frame_interval: Duration,
    pub poll_interval: Duration,
    pub idle_policy: IdlePolicy,
    pub renderer: RendererKind,
    pub assets: Option<Vec<PathBuf>>,
}

impl Config {
    /// Load configuration by merging TOML file with CLI overrides.
    pub fn load(cli: &Cli) -> Self {
        let file_config = cli
            .config
            .as_ref()
            .and_then(|p| file::load_from_path(p))
            .or_else(file::load_from_default_paths)
            .unwrap_or_default();

        Self::merge(cli, file_config)
    }

    fn merge(cli: &Cli, file_config: file::FileConfig) -> Self {
        let ms = |cli: Option<u64>, file: Option<u64>, default: u64| {
            Duration::from_millis(cli.or(file).unwrap_or(default))
        };

        let dump_device = match &cli.command {
            Some(Command::Dump { device }) => device.clone(),
            None => None,
        };

        Self {
            device: dump_device.or_else(|| cli.device.clone()).or(file_config.device),
            idle_timeout: ms(cli.idle_timeout_ms, file_config.idle_timeout_ms, DEFAULT_IDLE_TIMEOUT_MS),
            frame_interval: ms(
                cli.frame_interval_ms,
                file_config.frame_interval_ms,
                DEFAULT_FRAME_INTERVAL_MS,
            ),
            poll_interval: ms(
                cli.poll_interval_ms,
                file_config.poll_interval_ms,
                DEFAULT_POLL_INTERVAL_MS,
            ),
            idle_policy: cli.idle_policy.unwrap_or(file_config.idle_policy),
            renderer: cli.renderer.unwrap_or(file_config.renderer),
            assets: cli.assets.clone().or(file_config.assets),
        }
    }

    /// The device path, or an error suitable for showing to the user.
    pub fn device(&self) -> Result<&PathBuf, &'static str> {
        self.device
            .as_ref()
            .ok_or("No keyboard device given (pass --device /dev/input/event3 or set it in the config)")
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        self.device()?;
        if self.frame_interval.is_zero() {
            return Err("frame_interval_ms must be greater than zero");
        }
        if self.assets.as_ref().is_some_and(|a| a.len() != 4) {
            return Err("assets needs exactly four paths: idle, left, right, both");
        }
        Ok(())
    }
}
