//! Game state: board, two-click selection, score, game over.

use crate::board::{Board, BoardConfig, ConfigError, Pos};
use crate::region::Region;
use crate::score::{ScoreKeeper, score_for_removal};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, instrument};

/// How long a "+N" popup stays on screen.
const POPUP_LIFETIME_MS: u32 = 1500;
/// Popups rise one row per step.
const POPUP_STEP_MS: u32 = 300;

/// Commands from the input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    CellActivated(Pos),
    Reset,
    Reconfigure {
        width: usize,
        height: usize,
        num_colors: u8,
    },
}

/// Selection state. `Pending` holds the region awaiting a confirming click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    NoSelection,
    Pending(Region),
    GameOver,
}

/// What a command did, so the caller can react without diffing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Command not accepted in the current phase.
    Ignored,
    /// Clicked an empty cell or a lone tile; any selection is gone.
    Deselected,
    /// A region is now pending; `preview` is what removing it would score.
    Selected { size: usize, preview: u32 },
    Removed { size: usize, delta: u32 },
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScorePopup {
    pub pos: Pos,
    pub amount: u32,
    pub age_ms: u32,
}

#[derive(Debug)]
pub struct GameState {
    config: BoardConfig,
    board: Board,
    phase: Phase,
    score: ScoreKeeper,
    rng: StdRng,
    pub popups: Vec<ScorePopup>,
}

impl GameState {
    /// New game with a random board. A seed makes the sequence of boards
    /// (including those drawn by later resets) reproducible.
    pub fn new(config: BoardConfig, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let board = Board::random(config, &mut rng);
        let mut state = Self {
            config,
            board,
            phase: Phase::NoSelection,
            score: ScoreKeeper::default(),
            rng,
            popups: Vec::new(),
        };
        state.settle_phase();
        state
    }

    /// Game on a fixed board. Resets draw from the default configuration.
    #[cfg(test)]
    pub fn from_board(board: Board) -> Self {
        let mut state = Self {
            config: BoardConfig::default(),
            board,
            phase: Phase::NoSelection,
            score: ScoreKeeper::default(),
            rng: StdRng::seed_from_u64(0),
            popups: Vec::new(),
        };
        state.settle_phase();
        state
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> BoardConfig {
        self.config
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Region awaiting confirmation, if any.
    pub fn pending(&self) -> Option<&Region> {
        match &self.phase {
            Phase::Pending(region) => Some(region),
            _ => None,
        }
    }

    pub fn score(&self) -> u32 {
        self.score.total()
    }

    pub fn removals(&self) -> u32 {
        self.score.removals()
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    /// Apply one command. Removal, reflow and the game-over check complete
    /// before this returns, so callers only ever see a settled board.
    #[instrument(level = "debug", skip(self))]
    pub fn handle(&mut self, command: Command) -> Result<Outcome, ConfigError> {
        match command {
            Command::CellActivated(pos) => Ok(self.activate(pos)),
            Command::Reset => {
                self.reset();
                Ok(Outcome::Reset)
            }
            Command::Reconfigure {
                width,
                height,
                num_colors,
            } => {
                self.config = BoardConfig::new(width, height, num_colors)?;
                info!(width, height, num_colors, "board reconfigured");
                self.reset();
                Ok(Outcome::Reset)
            }
        }
    }

    fn activate(&mut self, pos: Pos) -> Outcome {
        if self.is_over() {
            return Outcome::Ignored;
        }
        let region = self.board.find_region(pos);
        if !region.is_removable() {
            if self.pending().is_some() {
                debug!(row = pos.row, col = pos.col, "selection cleared");
            }
            self.phase = Phase::NoSelection;
            return Outcome::Deselected;
        }
        if self.pending() == Some(&region) {
            return self.remove(region);
        }
        let size = region.len();
        debug!(row = pos.row, col = pos.col, size, "region selected");
        self.phase = Phase::Pending(region);
        Outcome::Selected {
            size,
            preview: score_for_removal(size),
        }
    }

    fn remove(&mut self, region: Region) -> Outcome {
        self.board.remove_cells(&region);
        self.board.compact();
        let size = region.len();
        let delta = self.score.record_removal(size);
        // Anchored where the region was before the reflow, not where tiles now sit.
        if let Some(pos) = region.origin() {
            self.popups.push(ScorePopup {
                pos,
                amount: delta,
                age_ms: 0,
            });
        }
        info!(size, delta, total = self.score.total(), "region removed");
        self.phase = Phase::NoSelection;
        self.settle_phase();
        Outcome::Removed { size, delta }
    }

    /// Fresh random board under the current configuration.
    fn reset(&mut self) {
        self.board = Board::random(self.config, &mut self.rng);
        self.score.reset();
        self.popups.clear();
        self.phase = Phase::NoSelection;
        self.settle_phase();
        info!(
            width = self.config.width(),
            height = self.config.height(),
            colors = self.config.num_colors(),
            "new board"
        );
    }

    fn settle_phase(&mut self) {
        if self.board.is_terminal() {
            info!(
                score = self.score.total(),
                tiles_left = self.board.tiles_left(),
                "no moves left"
            );
            self.phase = Phase::GameOver;
        }
    }

    /// Age popups; they drift up a row per step and expire.
    pub fn tick_popups(&mut self, delta_ms: u32) {
        self.popups.retain_mut(|p| {
            let old_steps = p.age_ms / POPUP_STEP_MS;
            p.age_ms = p.age_ms.saturating_add(delta_ms);
            let new_steps = p.age_ms / POPUP_STEP_MS;
            if new_steps > old_steps {
                p.pos.row = p.pos.row.saturating_sub(1);
            }
            p.age_ms < POPUP_LIFETIME_MS
        });
    }
}
