//! Layout and drawing: menu, settings, board, sidebar, game over; terminal position → cell.

use crate::app::{MenuItem, MenuState, Screen, SettingsField, SettingsState};
use crate::board::{Board, Cell, Pos};
use crate::game::{GameState, Outcome};
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};

/// Each tile is two terminal columns wide so it looks roughly square.
const TILE_WIDTH: u16 = 2;
const TILE_HEIGHT: u16 = 1;

const SIDEBAR_WIDTH: u16 = 26;
/// Stats, colours and help need this many rows even next to a short board.
const SIDEBAR_MIN_HEIGHT: u16 = 20;

/// Duration of the game-over dimming (TachyonFX) in ms.
const GAME_OVER_FADE_MS: u32 = 600;

/// Playfield size in terminal cells (border + tiles) for given board dimensions.
fn playfield_pixel_size(width: usize, height: usize) -> (u16, u16) {
    (
        width as u16 * TILE_WIDTH + 2,
        height as u16 * TILE_HEIGHT + 2,
    )
}

/// Playfield (with border) and sidebar rects, centered in `area` and clipped to it.
fn game_layout(area: Rect, board: &Board) -> (Rect, Rect) {
    let (pw, ph) = playfield_pixel_size(board.width(), board.height());
    let total_w = pw + SIDEBAR_WIDTH;
    let total_h = ph.max(SIDEBAR_MIN_HEIGHT);
    let x = area.x + area.width.saturating_sub(total_w) / 2;
    let y = area.y + area.height.saturating_sub(total_h) / 2;
    let playfield = Rect {
        x,
        y,
        width: pw,
        height: ph,
    };
    let sidebar = Rect {
        x: x + pw,
        y,
        width: SIDEBAR_WIDTH,
        height: total_h,
    };
    (playfield.intersection(area), sidebar.intersection(area))
}

/// Board inner rect (tiles only, no border) for given area; matches the drawn layout.
pub(crate) fn board_rect(area: Rect, board: &Board) -> Rect {
    let (playfield, _) = game_layout(area, board);
    Rect {
        x: playfield.x + 1,
        y: playfield.y + 1,
        width: (board.width() as u16 * TILE_WIDTH).min(playfield.width.saturating_sub(2)),
        height: (board.height() as u16 * TILE_HEIGHT).min(playfield.height.saturating_sub(2)),
    }
}

/// Board cell under a terminal position, if any. Border and sidebar are not cells.
pub fn cell_at(area: Rect, board: &Board, column: u16, row: u16) -> Option<Pos> {
    let inner = board_rect(area, board);
    if !inner.contains(Position::new(column, row)) {
        return None;
    }
    let pos = Pos::new(
        ((row - inner.y) / TILE_HEIGHT) as usize,
        ((column - inner.x) / TILE_WIDTH) as usize,
    );
    board.in_bounds(pos).then_some(pos)
}

/// Short status line for the last command.
pub fn outcome_text(outcome: Outcome) -> Option<String> {
    match outcome {
        Outcome::Selected { size, preview } => Some(format!("{size} tiles, worth {preview}")),
        Outcome::Removed { size, delta } => Some(format!("Removed {size} (+{delta})")),
        Outcome::Deselected | Outcome::Ignored | Outcome::Reset => None,
    }
}

/// Draw current screen. On the playing screen a finished game gets the
/// TachyonFX fade and the game-over box; `game_over_effect` /
/// `game_over_process_time` carry the effect between frames.
pub fn draw(
    frame: &mut Frame,
    screen: Screen,
    state: &GameState,
    theme: &Theme,
    menu_state: &MenuState,
    settings: &SettingsState,
    cursor: Pos,
    best: u32,
    new_record: bool,
    last_outcome: Option<Outcome>,
    game_over_effect: &mut Option<Effect>,
    game_over_process_time: &mut Option<Instant>,
    now: Instant,
) {
    let area = frame.area();
    match screen {
        Screen::Menu => draw_menu(frame, theme, menu_state, area, now),
        Screen::Settings => draw_settings(frame, theme, settings, area),
        Screen::Playing => {
            let dimmed = state.is_over() && game_over_effect.as_ref().is_some_and(|e| e.done());
            draw_game(frame, state, theme, area, cursor, best, last_outcome, dimmed);
            if state.is_over() {
                apply_game_over_effect(
                    frame,
                    state,
                    theme,
                    area,
                    game_over_effect,
                    game_over_process_time,
                    now,
                );
                draw_game_over(frame, state, theme, area, best, new_record);
            }
        }
    }
}

/// Create or advance the fade that dims the board once no moves are left.
fn apply_game_over_effect(
    frame: &mut Frame,
    state: &GameState,
    theme: &Theme,
    area: Rect,
    game_over_effect: &mut Option<Effect>,
    game_over_process_time: &mut Option<Instant>,
    now: Instant,
) {
    let board_rect = board_rect(area, state.board());
    let delta = game_over_process_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    *game_over_process_time = Some(now);

    let effect = game_over_effect.get_or_insert_with(|| {
        fx::fade_to(
            theme.inactive_fg,
            theme.bg,
            (GAME_OVER_FADE_MS, Interpolation::Linear),
        )
        .with_area(board_rect)
    });
    // Once done the board is drawn dimmed directly.
    if !effect.done() {
        frame.render_effect(effect, board_rect, TfxDuration::from_millis(delta_ms));
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

fn popup_block(theme: &Theme) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
}

fn draw_menu(frame: &mut Frame, theme: &Theme, menu_state: &MenuState, area: Rect, now: Instant) {
    let popup = centered(area, 40, 16);

    let title = Line::from(vec![
        Span::styled(" Same ", Style::default().fg(theme.tile_color(0)).bold()),
        Span::styled(" game ", Style::default().fg(theme.main_fg).bold()),
    ]);

    let highlight_style = Style::default().fg(Color::Black).bg(theme.tile_color(1)).bold();
    let normal_style = Style::default().fg(theme.main_fg);

    let mut lines = vec![Line::from(""), title, Line::from(""), Line::from("")];
    for item in MenuItem::ALL {
        let label = match item {
            MenuItem::Start => " [ START GAME ] ",
            MenuItem::Settings => " SETTINGS ",
            MenuItem::Exit => " EXIT ",
        };
        let style = if item == menu_state.selected {
            highlight_style
        } else {
            normal_style
        };
        lines.push(Line::from(Span::styled(label, style)));
        lines.push(Line::from(""));
    }
    lines.extend([
        Line::from(""),
        Line::from(vec![
            Span::styled(" ↕ ", Style::default().fg(theme.tile_color(3))),
            Span::from("NAVIGATE   "),
            Span::styled(" ENTER ", Style::default().fg(theme.tile_color(3))),
            Span::from("SELECT"),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            " [Q] QUIT ",
            Style::default().fg(Color::Rgb(255, 80, 80)),
        )),
    ]);

    let p = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(popup_block(theme));

    // Startup animation: slide in from bottom
    let elapsed = now.duration_since(menu_state.animation_start).as_millis() as u32;
    let anim_duration = 500u32;
    let t = (elapsed as f32 / anim_duration as f32).min(1.0);
    // Ease out cubic
    let offset_t = 1.0 - (1.0 - t).powi(3);
    let anim_y_offset = ((1.0 - offset_t) * 10.0) as u16;
    let mut anim_popup = popup;
    anim_popup.y += anim_y_offset;

    p.render(anim_popup.intersection(area), frame.buffer_mut());
}

fn draw_settings(frame: &mut Frame, theme: &Theme, settings: &SettingsState, area: Rect) {
    let popup = centered(area, 40, 14);
    let highlight_style = Style::default().fg(Color::Black).bg(theme.tile_color(1)).bold();
    let label_style = Style::default().fg(theme.title);
    let value_style = Style::default().fg(theme.main_fg);

    let row = |field: SettingsField, label: &'static str, value: String| {
        let style = if settings.field == field {
            highlight_style
        } else {
            value_style
        };
        Line::from(vec![
            Span::styled(format!("{label:<16}"), label_style),
            Span::styled(format!(" ◀ {value:>2} ▶ "), style),
        ])
    };

    let back_style = if settings.field == SettingsField::Back {
        highlight_style
    } else {
        value_style
    };
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(" Settings ", Style::default().fg(theme.title).bold())),
        Line::from(""),
        row(SettingsField::Colors, "Colours", settings.colors.to_string()),
        Line::from(""),
        row(SettingsField::Width, "Board width", settings.width.to_string()),
        Line::from(""),
        row(SettingsField::Height, "Board height", settings.height.to_string()),
        Line::from(""),
        Line::from(Span::styled(" [ BACK ] ", back_style)),
        Line::from(""),
        Line::from(vec![
            Span::styled(" ↕ ", Style::default().fg(theme.tile_color(3))),
            Span::from("FIELD   "),
            Span::styled(" ↔ ", Style::default().fg(theme.tile_color(3))),
            Span::from("CHANGE"),
        ]),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(popup_block(theme))
        .render(popup, frame.buffer_mut());
}

/// Draw game: board + sidebar, centered in the full area.
fn draw_game(
    frame: &mut Frame,
    state: &GameState,
    theme: &Theme,
    area: Rect,
    cursor: Pos,
    best: u32,
    last_outcome: Option<Outcome>,
    dimmed: bool,
) {
    let (playfield_area, sidebar_area) = game_layout(area, state.board());
    draw_playfield(frame, state, theme, playfield_area, cursor, dimmed);
    draw_sidebar(frame, state, theme, sidebar_area, best, last_outcome);
}

/// Write one buffer cell if it lies inside `clip`.
fn put(buf: &mut Buffer, clip: Rect, x: u16, y: u16, symbol: &str, style: Style) {
    if clip.contains(Position::new(x, y)) {
        buf[(x, y)].set_symbol(symbol).set_style(style);
    }
}

fn draw_playfield(
    frame: &mut Frame,
    state: &GameState,
    theme: &Theme,
    area: Rect,
    cursor: Pos,
    dimmed: bool,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(" Samegame ", theme.title));
    let board_rect = block.inner(area);
    block.render(area, frame.buffer_mut());
    // Same as board_rect(): the block may be narrower than the board when clipped.
    let board_rect = Rect {
        width: (state.board().width() as u16 * TILE_WIDTH).min(board_rect.width),
        height: (state.board().height() as u16 * TILE_HEIGHT).min(board_rect.height),
        ..board_rect
    };

    let board = state.board();
    let pending = state.pending();
    let buf = frame.buffer_mut();

    for row in 0..board.height() {
        for col in 0..board.width() {
            let pos = Pos::new(row, col);
            let selected = pending.is_some_and(|region| region.contains(pos));
            let at_cursor = pos == cursor;
            let rx = board_rect.x + col as u16 * TILE_WIDTH;
            let ry = board_rect.y + row as u16 * TILE_HEIGHT;

            let (symbols, style) = match board.get(row, col) {
                Ok(Cell::Tile(color_index)) => {
                    let color = if dimmed {
                        theme.inactive_fg
                    } else {
                        theme.tile_color(color_index)
                    };
                    match (selected, at_cursor) {
                        (false, false) => (["█", "█"], Style::default().fg(color).bg(theme.bg)),
                        (true, false) => (["[", "]"], Style::default().fg(theme.bg).bg(color).bold()),
                        (false, true) => (["(", ")"], Style::default().fg(theme.bg).bg(color).bold()),
                        (true, true) => (["{", "}"], Style::default().fg(theme.bg).bg(color).bold()),
                    }
                }
                _ if at_cursor => (["(", ")"], Style::default().fg(theme.inactive_fg).bg(theme.bg)),
                _ => ([" ", " "], Style::default().bg(theme.bg)),
            };
            put(buf, board_rect, rx, ry, symbols[0], style);
            put(buf, board_rect, rx + 1, ry, symbols[1], style);
        }
    }

    // Floating score popups
    for popup in &state.popups {
        let rx = board_rect.x + popup.pos.col as u16 * TILE_WIDTH;
        let ry = board_rect.y + popup.pos.row as u16 * TILE_HEIGHT;
        if board_rect.contains(Position::new(rx, ry)) {
            let label = format!("+{}", popup.amount);
            let style = Style::default().fg(theme.title).bg(theme.bg).bold();
            buf.set_stringn(rx, ry, label, (board_rect.right() - rx) as usize, style);
        }
    }
}

fn sidebar_block_style(theme: &Theme) -> Style {
    Style::default().fg(theme.div_line).bg(theme.bg)
}

fn draw_sidebar(
    frame: &mut Frame,
    state: &GameState,
    theme: &Theme,
    area: Rect,
    best: u32,
    last_outcome: Option<Outcome>,
) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let border_style = sidebar_block_style(theme);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Stats (border + score, best, removed, tiles, moves)
            Constraint::Length(1), // gap
            Constraint::Length(4), // Colours (border + title + strip)
            Constraint::Length(1), // status
            Constraint::Min(6),    // Help
        ])
        .split(area);

    // --- Stats ---
    let stats_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);
    let stats_inner = stats_block.inner(chunks[0]);
    stats_block.render(chunks[0], frame.buffer_mut());
    let stat = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(label, title_style),
            Span::styled(value, fg_style),
        ])
    };
    let stats_lines = vec![
        stat("Score: ", state.score().to_string()),
        stat("Best: ", best.max(state.score()).to_string()),
        stat("Removed: ", state.removals().to_string()),
        stat("Tiles left: ", state.board().tiles_left().to_string()),
        stat("Moves left: ", state.board().count_moves().to_string()),
    ];
    Paragraph::new(Text::from(stats_lines)).render(stats_inner, frame.buffer_mut());

    // --- Colours ---
    let colours_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);
    let colours_inner = colours_block.inner(chunks[2]);
    colours_block.render(chunks[2], frame.buffer_mut());
    let colours_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(colours_inner);
    Paragraph::new(Line::from(Span::styled("Colours", title_style)))
        .render(colours_layout[0], frame.buffer_mut());
    draw_colour_strip(frame, theme, state.board().num_colors(), colours_layout[1]);

    // --- Status ---
    if let Some(text) = last_outcome.and_then(outcome_text) {
        Paragraph::new(Line::from(Span::styled(text, fg_style.bold())))
            .alignment(Alignment::Center)
            .render(chunks[3], frame.buffer_mut());
    }

    // --- Help ---
    let key_style = Style::default().fg(theme.tile_color(3));
    let help = vec![
        Line::from(""),
        Line::from(vec![Span::styled("Click ", key_style), Span::from("select / remove")]),
        Line::from(vec![Span::styled("hjkl  ", key_style), Span::from("move cursor")]),
        Line::from(vec![Span::styled("Enter ", key_style), Span::from("select / remove")]),
        Line::from(vec![Span::styled("R     ", key_style), Span::from("new board")]),
        Line::from(vec![Span::styled("Q     ", key_style), Span::from("menu")]),
    ];
    Paragraph::new(help)
        .style(fg_style)
        .render(chunks[4], frame.buffer_mut());
}

/// Draw one block per colour in play.
fn draw_colour_strip(frame: &mut Frame, theme: &Theme, num_colors: u8, area: Rect) {
    for i in 0..num_colors {
        let r = Rect {
            x: area.x + i as u16 * 3,
            y: area.y,
            width: 2,
            height: area.height.min(1),
        }
        .intersection(area);
        let c = theme.tile_color(i);
        Paragraph::new("██")
            .style(Style::default().fg(c).bg(theme.bg))
            .render(r, frame.buffer_mut());
    }
}

fn draw_game_over(
    frame: &mut Frame,
    state: &GameState,
    theme: &Theme,
    area: Rect,
    best: u32,
    new_record: bool,
) {
    let popup = centered(area, 28, 9);
    let fg = Style::default().fg(theme.main_fg);

    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(
            " Game Over ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(format!(" Score: {} ", state.score()), fg)),
        Line::from(Span::styled(format!(" Best: {} ", best.max(state.score())), fg)),
    ];
    if state.board().is_cleared() {
        lines.push(Line::from(Span::styled(
            " Board cleared! ",
            Style::default().fg(theme.title).bold(),
        )));
    }
    if new_record {
        lines.push(Line::from(Span::styled(
            " New record! ",
            Style::default().fg(Color::Yellow).bold(),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(" R — Restart    Q — Menu ", fg)));

    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(popup_block(theme).title(Span::styled(" Samegame ", theme.title)))
        .render(popup, frame.buffer_mut());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardConfig;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn default_board() -> Board {
        GameState::new(BoardConfig::default(), Some(3)).board().clone()
    }

    #[test]
    fn test_cell_at_maps_tile_columns() {
        let board = default_board();
        let area = Rect::new(0, 0, 80, 24);
        let inner = board_rect(area, &board);
        assert_eq!((inner.width, inner.height), (40, 10));

        assert_eq!(cell_at(area, &board, inner.x, inner.y), Some(Pos::new(0, 0)));
        assert_eq!(cell_at(area, &board, inner.x + 1, inner.y), Some(Pos::new(0, 0)));
        assert_eq!(cell_at(area, &board, inner.x + 2, inner.y), Some(Pos::new(0, 1)));
        assert_eq!(
            cell_at(area, &board, inner.x + 39, inner.y + 9),
            Some(Pos::new(9, 19))
        );
    }

    #[test]
    fn test_cell_at_outside_board() {
        let board = default_board();
        let area = Rect::new(0, 0, 80, 24);
        let inner = board_rect(area, &board);
        // Border
        assert_eq!(cell_at(area, &board, inner.x - 1, inner.y), None);
        assert_eq!(cell_at(area, &board, inner.x, inner.y - 1), None);
        // Past the last column / row
        assert_eq!(cell_at(area, &board, inner.x + 40, inner.y), None);
        assert_eq!(cell_at(area, &board, inner.x, inner.y + 10), None);
        assert_eq!(cell_at(area, &board, 0, 0), None);
    }

    #[test]
    fn test_cell_at_clipped_terminal() {
        let board = default_board();
        // Too narrow for the whole board: only the visible part is clickable.
        let area = Rect::new(0, 0, 30, 12);
        let inner = board_rect(area, &board);
        assert!(inner.right() <= area.right());
        assert_eq!(cell_at(area, &board, inner.x, inner.y), Some(Pos::new(0, 0)));
        assert_eq!(cell_at(area, &board, area.right(), inner.y), None);
    }

    #[test]
    fn test_outcome_text() {
        assert_eq!(
            outcome_text(Outcome::Selected { size: 4, preview: 4 }).as_deref(),
            Some("4 tiles, worth 4")
        );
        assert_eq!(
            outcome_text(Outcome::Removed { size: 5, delta: 9 }).as_deref(),
            Some("Removed 5 (+9)")
        );
        assert_eq!(outcome_text(Outcome::Deselected), None);
    }

    fn render(screen: Screen, state: &GameState, width: u16, height: u16) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        let theme = Theme::default();
        let settings = SettingsState {
            field: SettingsField::Width,
            colors: 5,
            width: 20,
            height: 10,
        };
        let mut effect = None;
        let mut process_time = None;
        terminal
            .draw(|f| {
                draw(
                    f,
                    screen,
                    state,
                    &theme,
                    &MenuState::default(),
                    &settings,
                    Pos::new(0, 0),
                    0,
                    false,
                    None,
                    &mut effect,
                    &mut process_time,
                    Instant::now(),
                );
            })
            .unwrap();
        terminal.backend().buffer().clone()
    }

    #[test]
    fn test_board_tiles_drawn_in_place() {
        let state = GameState::new(BoardConfig::default(), Some(8));
        let buf = render(Screen::Playing, &state, 80, 24);
        let inner = board_rect(Rect::new(0, 0, 80, 24), state.board());
        // Bottom-right tile: never under the cursor at (0, 0).
        let (x, y) = (inner.x + 38, inner.y + 9);
        assert_eq!(buf[(x, y)].symbol(), "█");
        assert_eq!(buf[(x + 1, y)].symbol(), "█");
        // Cursor brackets on the top-left tile.
        assert_eq!(buf[(inner.x, inner.y)].symbol(), "(");
    }

    #[test]
    fn test_every_screen_fits_tiny_terminal() {
        let state = GameState::new(BoardConfig::new(25, 20, 6).unwrap(), Some(1));
        for screen in [Screen::Menu, Screen::Settings, Screen::Playing] {
            render(screen, &state, 20, 8);
            render(screen, &state, 120, 40);
        }
    }

    #[test]
    fn test_game_over_overlay() {
        let board = Board::parse("0123\n1230\n2301\n3012", 4);
        let state = GameState::from_board(board);
        assert!(state.is_over());
        let buf = render(Screen::Playing, &state, 80, 24);
        let text: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Game Over"));
    }
}
