//! Drawing the selected pose.

use serde::Deserialize;
use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;

use crossterm::cursor::MoveTo;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use crossterm::queue;

use crate::selector::DisplayImage;

const IDLE_FRAME: &str = r"
   /\_/\
  ( o.o )
   > ^ <
  _|   |_
 [_______]
";

const LEFT_FRAME: &str = r"
   /\_/\
  ( >.o )
   > ^ <
  \|   |_
 [_______]
";

const RIGHT_FRAME: &str = r"
   /\_/\
  ( o.< )
   > ^ <
  _|   |/
 [_______]
";

const BOTH_FRAME: &str = r"
   /\_/\
  ( >.< )
   > ^ <
  \|   |/
 [_______]
";

/// One pre-loaded frame per pose, indexed by `DisplayImage::index`.
pub struct AssetTable {
    frames: [String; 4],
}

impl AssetTable {
    pub fn builtin() -> Self {
        Self {
            frames: [IDLE_FRAME, LEFT_FRAME, RIGHT_FRAME, BOTH_FRAME].map(String::from),
        }
    }

    /// Read every asset up front. A missing or unreadable file is fatal.
    pub fn load(paths: &[PathBuf]) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let [idle, left, right, both] = paths else {
            return Err(format!("Expected 4 asset paths, got {}", paths.len()).into());
        };

        let read = |path: &PathBuf| -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
            let content = std::fs::read_to_string(path)
                .map_err(|e| format!("Failed to load {}: {}", path.display(), e))?;
            log::debug!("Loaded asset {} ({} bytes)", path.display(), content.len());
            Ok(content)
        };

        Ok(Self {
            frames: [read(idle)?, read(left)?, read(right)?, read(both)?],
        })
    }

    pub fn frame(&self, image: DisplayImage) -> &str {
        &self.frames[image.index()]
    }
}

/// Consumer of the per-frame selection.
pub trait Renderer {
    fn present(&mut self, image: DisplayImage) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn present(&mut self, image: DisplayImage) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).present(image)
    }
}

/// Redraws the terminal when the pose changes.
pub struct TerminalRenderer<W: Write> {
    out: W,
    assets: AssetTable,
    shown: Option<DisplayImage>,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, assets: AssetTable) -> Self {
        Self {
            out,
            assets,
            shown: None,
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn present(&mut self, image: DisplayImage) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.shown == Some(image) {
            return Ok(());
        }
        queue!(
            self.out,
            Clear(ClearType::All),
            MoveTo(0, 0),
            Print(self.assets.frame(image))
        )?;
        self.out.flush()?;
        self.shown = Some(image);
        Ok(())
    }
}

/// Headless renderer: one log line per pose change.
#[derive(Default)]
pub struct LogRenderer {
    shown: Option<DisplayImage>,
}

impl Renderer for LogRenderer {
    fn present(&mut self, image: DisplayImage) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.shown != Some(image) {
            log::info!("Pose: {}", image);
            self.shown = Some(image);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RendererKind {
    #[default]
    Terminal,
    Log,
}

impl fmt::Display for RendererKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RendererKind::Terminal => write!(f, "terminal"),
            RendererKind::Log => write!(f, "log"),
        }
    }
}

impl FromStr for RendererKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "terminal" | "term" => Ok(RendererKind::Terminal),
            "log" | "headless" => Ok(RendererKind::Log),
            _ => Err(format!("Invalid renderer '{}'. Valid values: terminal, log", s)),
        }
    }
}
