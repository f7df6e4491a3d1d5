use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::render::RendererKind;
use crate::selector::IdlePolicy;

#[derive(Parser)]
#[command(name = "keycat")]
#[command(about = "Animated cat that reacts to global keyboard activity")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Keyboard evdev node, e.g. /dev/input/event3
    #[arg(long, env = "KEYCAT_DEVICE")]
    pub device: Option<PathBuf>,

    /// Milliseconds a pose counts as recent after the last key press
    #[arg(long)]
    pub idle_timeout_ms: Option<u64>,

    /// Render tick in milliseconds
    #[arg(long)]
    pub frame_interval_ms: Option<u64>,

    /// Sleep between device polls when no event is queued, in milliseconds
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// What to show after release (immediate, hold-last-pose)
    #[arg(long, value_parser = clap::value_parser!(IdlePolicy))]
    pub idle_policy: Option<IdlePolicy>,

    /// Output (terminal, log)
    #[arg(long, value_parser = clap::value_parser!(RendererKind))]
    pub renderer: Option<RendererKind>,

    /// Frame files for idle, left, right and both, in that order
    #[arg(long, num_args = 4, value_names = ["IDLE", "LEFT", "RIGHT", "BOTH"])]
    pub assets: Option<Vec<PathBuf>>,

    /// Path to config file
    #[arg(long, env = "KEYCAT_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print key transitions from the device for debugging
    Dump {
        /// Keyboard evdev node; overrides --device and the config file
        device: Option<PathBuf>,
    },
}
