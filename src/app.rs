//! App: terminal init, main loop, screens and input dispatch.

use crate::GameConfig;
use crate::board::{self, BoardConfig, Pos};
use crate::game::{Command, GameState, Outcome};
use crate::highscores::HighScores;
use crate::input::{Action, key_to_action, mouse_to_action};
use crate::theme::Theme;
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use ratatui::layout::Rect;
use std::time::{Duration, Instant};
use tachyonfx::Effect;
use tracing::{debug, info, warn};

/// Target frame time (~60 FPS).
const FRAME_MS: u64 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Settings,
    Playing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Start,
    Settings,
    Exit,
}

impl MenuItem {
    pub const ALL: [Self; 3] = [Self::Start, Self::Settings, Self::Exit];

    fn next(self) -> Self {
        match self {
            Self::Start => Self::Settings,
            Self::Settings => Self::Exit,
            Self::Exit => Self::Start,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Start => Self::Exit,
            Self::Settings => Self::Start,
            Self::Exit => Self::Settings,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuState {
    pub selected: MenuItem,
    pub animation_start: Instant,
}

impl Default for MenuState {
    fn default() -> Self {
        Self {
            selected: MenuItem::Start,
            animation_start: Instant::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    Colors,
    Width,
    Height,
    Back,
}

/// Draft board configuration edited on the settings screen. Always within
/// bounds; applied when a game is started from the menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsState {
    pub field: SettingsField,
    pub colors: u8,
    pub width: usize,
    pub height: usize,
}

impl SettingsState {
    fn from_config(config: BoardConfig) -> Self {
        Self {
            field: SettingsField::Colors,
            colors: config.num_colors(),
            width: config.width(),
            height: config.height(),
        }
    }

    fn next_field(&mut self) {
        self.field = match self.field {
            SettingsField::Colors => SettingsField::Width,
            SettingsField::Width => SettingsField::Height,
            SettingsField::Height => SettingsField::Back,
            SettingsField::Back => SettingsField::Colors,
        };
    }

    fn prev_field(&mut self) {
        self.field = match self.field {
            SettingsField::Colors => SettingsField::Back,
            SettingsField::Width => SettingsField::Colors,
            SettingsField::Height => SettingsField::Width,
            SettingsField::Back => SettingsField::Height,
        };
    }

    /// Step the current field by one, clamped to the board bounds.
    fn adjust(&mut self, up: bool) {
        match self.field {
            SettingsField::Colors => {
                self.colors = step(self.colors, up).clamp(board::MIN_COLORS, board::PALETTE_SIZE);
            }
            SettingsField::Width => {
                self.width = step(self.width, up).clamp(board::MIN_WIDTH, board::MAX_WIDTH);
            }
            SettingsField::Height => {
                self.height = step(self.height, up).clamp(board::MIN_HEIGHT, board::MAX_HEIGHT);
            }
            SettingsField::Back => {}
        }
    }
}

fn step<T>(value: T, up: bool) -> T
where
    T: Copy + std::ops::Add<Output = T> + std::ops::Sub<Output = T> + From<u8>,
{
    if up {
        value + T::from(1)
    } else {
        value - T::from(1)
    }
}

pub struct App {
    config: GameConfig,
    theme: Theme,
    state: GameState,
    screen: Screen,
    cursor: Pos,
    menu: MenuState,
    settings: SettingsState,
    high_scores: HighScores,
    /// The finished game beat the stored best for its configuration.
    new_record: bool,
    last_outcome: Option<Outcome>,
    /// Terminal area of the last frame, for mouse hit testing.
    last_area: Rect,
    /// TachyonFX fade over the board once no moves are left.
    game_over_effect: Option<Effect>,
    /// Last time we processed the game-over effect (for delta).
    game_over_effect_process_time: Option<Instant>,
}

impl App {
    pub fn new(config: GameConfig, theme: Theme, no_menu: bool, high_scores: HighScores) -> Self {
        let state = GameState::new(config.board, config.seed);
        let settings = SettingsState::from_config(config.board);
        let screen = if no_menu {
            Screen::Playing
        } else {
            Screen::Menu
        };
        let mut app = Self {
            config,
            theme,
            state,
            screen,
            cursor: Pos::new(0, 0),
            menu: MenuState::default(),
            settings,
            high_scores,
            new_record: false,
            last_outcome: None,
            last_area: Rect::default(),
            game_over_effect: None,
            game_over_effect_process_time: None,
        };
        app.reset_cursor();
        app
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{DisableMouseCapture, EnableMouseCapture},
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        // Restore
        execute!(std::io::stdout(), DisableMouseCapture, LeaveAlternateScreen)?;
        disable_raw_mode()?;
        info!(seed = ?self.config.seed, "exiting");

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let frame_duration = Duration::from_millis(FRAME_MS);
        let mut last_frame = Instant::now();
        loop {
            let now = Instant::now();
            let elapsed = now.duration_since(last_frame);
            last_frame = now;
            self.state.tick_popups(elapsed.as_millis().min(u32::MAX as u128) as u32);

            let best = self.high_scores.best(self.state.config());
            let mut area = Rect::default();
            terminal.draw(|f| {
                area = f.area();
                crate::ui::draw(
                    f,
                    self.screen,
                    &self.state,
                    &self.theme,
                    &self.menu,
                    &self.settings,
                    self.cursor,
                    best,
                    self.new_record,
                    self.last_outcome,
                    &mut self.game_over_effect,
                    &mut self.game_over_effect_process_time,
                    now,
                );
            })?;
            self.last_area = area;

            let timeout = frame_duration.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    let action = match event::read()? {
                        // Only presses; some terminals also report releases.
                        Event::Key(key) if key.kind == KeyEventKind::Press => key_to_action(key),
                        Event::Mouse(mouse) => mouse_to_action(mouse),
                        _ => Action::None,
                    };
                    if self.on_action(action) {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Dispatch one action to the current screen. Returns true to exit.
    fn on_action(&mut self, action: Action) -> bool {
        match self.screen {
            Screen::Menu => return self.on_menu_action(action),
            Screen::Settings => self.on_settings_action(action),
            Screen::Playing => self.on_play_action(action),
        }
        false
    }

    fn on_menu_action(&mut self, action: Action) -> bool {
        match action {
            Action::Up | Action::Left => self.menu.selected = self.menu.selected.prev(),
            Action::Down | Action::Right => self.menu.selected = self.menu.selected.next(),
            Action::Activate => match self.menu.selected {
                MenuItem::Start => self.start_game(),
                MenuItem::Settings => self.screen = Screen::Settings,
                MenuItem::Exit => return true,
            },
            Action::Quit => return true,
            Action::Click { .. } | Action::Reset | Action::None => {}
        }
        false
    }

    fn on_settings_action(&mut self, action: Action) {
        match action {
            Action::Up => self.settings.prev_field(),
            Action::Down => self.settings.next_field(),
            Action::Left => self.settings.adjust(false),
            Action::Right => self.settings.adjust(true),
            Action::Activate if self.settings.field != SettingsField::Back => {
                self.settings.next_field();
            }
            Action::Activate | Action::Quit => self.back_to_menu(),
            Action::Click { .. } | Action::Reset | Action::None => {}
        }
    }

    fn on_play_action(&mut self, action: Action) {
        match action {
            Action::Up => self.move_cursor(-1, 0),
            Action::Down => self.move_cursor(1, 0),
            Action::Left => self.move_cursor(0, -1),
            Action::Right => self.move_cursor(0, 1),
            Action::Activate => self.send(Command::CellActivated(self.cursor)),
            Action::Click { column, row } => {
                if let Some(pos) = crate::ui::cell_at(self.last_area, self.state.board(), column, row)
                {
                    self.cursor = pos;
                    self.send(Command::CellActivated(pos));
                }
            }
            Action::Reset => self.send(Command::Reset),
            Action::Quit => self.back_to_menu(),
            Action::None => {}
        }
    }

    /// Start a game from the menu with the configuration from the settings screen.
    fn start_game(&mut self) {
        self.send(Command::Reconfigure {
            width: self.settings.width,
            height: self.settings.height,
            num_colors: self.settings.colors,
        });
        self.screen = Screen::Playing;
    }

    fn back_to_menu(&mut self) {
        self.screen = Screen::Menu;
        self.menu.animation_start = Instant::now();
    }

    fn send(&mut self, command: Command) {
        let was_over = self.state.is_over();
        match self.state.handle(command) {
            Ok(outcome) => {
                debug!(?outcome, phase = ?self.state.phase(), "command handled");
                self.last_outcome = Some(outcome);
                if outcome == Outcome::Reset {
                    self.new_record = false;
                    self.game_over_effect = None;
                    self.game_over_effect_process_time = None;
                    self.reset_cursor();
                }
                if !was_over && self.state.is_over() {
                    self.record_score();
                }
            }
            Err(err) => warn!(%err, "command rejected"),
        }
    }

    fn record_score(&mut self) {
        self.new_record = self
            .high_scores
            .submit(self.state.config(), self.state.score());
        if self.new_record {
            info!(score = self.state.score(), "new best score");
            if let Err(err) = self.high_scores.save() {
                warn!("could not save high scores: {err:#}");
            }
        }
    }

    /// Bottom-left: where tiles settle.
    fn reset_cursor(&mut self) {
        self.cursor = Pos::new(self.state.board().height().saturating_sub(1), 0);
    }

    fn move_cursor(&mut self, d_row: isize, d_col: isize) {
        let board = self.state.board();
        self.cursor = Pos::new(
            self.cursor
                .row
                .saturating_add_signed(d_row)
                .min(board.height().saturating_sub(1)),
            self.cursor
                .col
                .saturating_add_signed(d_col)
                .min(board.width().saturating_sub(1)),
        );
    }
}
