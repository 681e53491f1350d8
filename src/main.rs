//! Samegametui: SameGame-style tile-clearing puzzle in the terminal.

mod app;
mod board;
mod compact;
mod game;
mod highscores;
mod input;
mod region;
mod score;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use board::BoardConfig;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Options derived from CLI that affect game behaviour (board shape, colours, seed).
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub board: BoardConfig,
    pub seed: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }
    let board = BoardConfig::new(args.width, args.height, args.colors)
        .context("invalid board configuration")?;
    let theme = theme::Theme::load_or_default(args.theme.as_deref(), args.palette);
    let config = GameConfig {
        board,
        seed: args.seed,
    };
    tracing::info!(?config, "starting");
    let mut app = App::new(config, theme, args.no_menu, highscores::HighScores::load());
    app.run()?;
    Ok(())
}

/// Log to a file: stdout belongs to the TUI.
fn init_logging(path: &Path) -> Result<()> {
    let log_file = std::fs::File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// SameGame-style puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "samegametui",
    version,
    about = "SameGame in the terminal. Remove groups of two or more same-coloured tiles; the rest fall and slide left.",
    long_about = "Samegametui is a terminal take on SameGame.\n\n\
        Select a group of at least two orthogonally connected tiles of one colour, then select it \
        again to remove it. Tiles above fall down and empty columns close up to the left. \
        Removing n tiles scores (n-2)^2. The game ends when no group of two is left.\n\n\
        CONTROLS:\n  Mouse       Click a group to select, click again to remove\n  \
        Arrows/hjkl Move cursor   Enter/Space  Select / remove\n  \
        R           New board     Q / Esc      Back to menu / quit"
)]
pub struct Args {
    /// Board width in columns (5-25).
    #[arg(long, default_value = "20", value_name = "COLS")]
    pub width: usize,

    /// Board height in rows (5-20).
    #[arg(long, default_value = "10", value_name = "ROWS")]
    pub height: usize,

    /// Number of tile colours (4-6).
    #[arg(short, long, default_value = "5", value_name = "N")]
    pub colors: u8,

    /// Seed for the board generator; the same seed deals the same boards.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Skip main menu and start game immediately.
    #[arg(long)]
    pub no_menu: bool,

    /// Write logs to this file (filter with RUST_LOG, default info).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["samegametui"]).unwrap();
        assert_eq!((args.width, args.height, args.colors), (20, 10, 5));
        assert_eq!(args.palette, Palette::Normal);
        assert!(args.seed.is_none());
    }

    #[test]
    fn test_args_palette_alias() {
        let args =
            Args::try_parse_from(["samegametui", "--palette", "colourblind", "-c", "6"]).unwrap();
        assert_eq!(args.palette, Palette::Colorblind);
        assert_eq!(args.colors, 6);
    }

    #[test]
    fn test_args_verify() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
