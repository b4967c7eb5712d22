use crate::app::{
    App, ChaseLayout, GridLayout, ScreenState, CHASE_UNITS_PER_COLUMN, CHASE_UNITS_PER_ROW,
};
use crate::theme::{contrast_color, term_color};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute,
    style::{Color, Print, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use cube_core::{GameOverReason, LeaderboardEntry, CUBE_SIZE};
use std::io;

/// Width of the panel right of the grid
const INFO_PANEL_WIDTH: u16 = 28;

pub fn render(stdout: &mut io::Stdout, app: &mut App) -> io::Result<()> {
    let (term_width, term_height) = terminal::size()?;

    execute!(
        stdout,
        Hide,
        SetBackgroundColor(app.theme.bg),
        Clear(ClearType::All)
    )?;

    match app.screen_state {
        ScreenState::NameEntry => render_name_screen(stdout, app, term_width, term_height)?,
        ScreenState::Playing => render_game_screen(stdout, app, term_width, term_height)?,
        ScreenState::GameOver => render_game_over_screen(stdout, app, term_width)?,
        ScreenState::Leaderboard => render_leaderboard_screen(stdout, app, term_width, term_height)?,
        ScreenState::Chase => render_chase_screen(stdout, app, term_width, term_height)?,
    }

    if let Some(ref msg) = app.message {
        render_message(stdout, app, msg, term_width)?;
    }

    execute!(stdout, Show)?;
    Ok(())
}

fn centered(text: &str, term_width: u16) -> u16 {
    term_width.saturating_sub(text.chars().count() as u16) / 2
}

fn render_title(stdout: &mut io::Stdout, app: &App, title: &str, term_width: u16) -> io::Result<()> {
    execute!(
        stdout,
        MoveTo(centered(title, term_width), 1),
        SetForegroundColor(app.theme.key),
        Print(title)
    )
}

fn render_name_screen(
    stdout: &mut io::Stdout,
    app: &App,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    render_title(stdout, app, "═══ ODD CUBE ═══", term_width)?;

    let y = (term_height / 2).saturating_sub(2);
    let prompt = "Enter your name:";
    let field = format!("> {}_", app.name_input);
    let x = centered(prompt, term_width).min(centered(&field, term_width));

    execute!(
        stdout,
        MoveTo(x, y),
        SetForegroundColor(theme.fg),
        Print(prompt),
        MoveTo(x, y + 2),
        SetForegroundColor(theme.key),
        Print(&field)
    )?;

    if let Some(ref error) = app.name_error {
        execute!(
            stdout,
            MoveTo(x, y + 4),
            SetForegroundColor(theme.error),
            Print(error)
        )?;
    }

    let help = "Enter: play   Esc: quit";
    execute!(
        stdout,
        MoveTo(centered(help, term_width), y + 7),
        SetForegroundColor(theme.info),
        Print(help)
    )?;
    Ok(())
}

/// Lay the grid out to fit the terminal
fn grid_layout(grid_size: u32, term_width: u16, term_height: u16) -> GridLayout {
    let n = grid_size.max(1) as u16;
    let gap = 1;
    let avail_w = term_width.saturating_sub(INFO_PANEL_WIDTH + 4);
    let avail_h = term_height.saturating_sub(6);

    let by_width = avail_w.saturating_sub(gap * (n - 1)) / n;
    let by_height = (avail_h / n) * 2;
    let cell_width = by_width.min(by_height).clamp(2, 10);
    let cell_height = (cell_width / 2).max(1);

    let grid_width = cell_width * n + gap * (n - 1);
    let total_width = grid_width + 3 + INFO_PANEL_WIDTH;
    GridLayout {
        x: term_width.saturating_sub(total_width) / 2,
        y: 3,
        cell_width,
        cell_height,
        gap,
        grid_size,
    }
}

fn render_game_screen(
    stdout: &mut io::Stdout,
    app: &mut App,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let Some(state) = app.machine.state().copied() else {
        return Ok(());
    };
    let layout = grid_layout(state.grid_size(), term_width, term_height);
    app.grid_layout = Some(layout);

    render_title(stdout, app, "Find the odd square", term_width)?;

    for (index, color) in state.round.cells() {
        let (row, col) = state.round.position(index);
        let x = layout.x + col as u16 * (layout.cell_width + layout.gap);
        let y = layout.y + row as u16 * layout.cell_height;
        let blank = " ".repeat(layout.cell_width as usize);

        execute!(stdout, SetBackgroundColor(term_color(color)))?;
        for dy in 0..layout.cell_height {
            execute!(stdout, MoveTo(x, y + dy), Print(&blank))?;
        }

        if index == app.cursor {
            let marker_x = x + layout.cell_width / 2 - 1;
            let marker_y = y + layout.cell_height / 2;
            execute!(
                stdout,
                MoveTo(marker_x, marker_y),
                SetForegroundColor(contrast_color(color)),
                Print("<>")
            )?;
        }
    }
    execute!(stdout, SetBackgroundColor(app.theme.bg))?;

    let n = state.grid_size() as u16;
    let info_x = layout.x + layout.cell_width * n + layout.gap * (n - 1) + 3;
    render_info_panel(stdout, app, info_x, layout.y)?;

    let controls_y = layout.y + layout.cell_height * n + 1;
    execute!(
        stdout,
        MoveTo(layout.x, controls_y),
        SetForegroundColor(app.theme.info),
        Print("Click or arrows + Enter to pick   q: quit")
    )?;
    Ok(())
}

fn render_info_panel(stdout: &mut io::Stdout, app: &App, x: u16, y: u16) -> io::Result<()> {
    let theme = &app.theme;
    let Some(state) = app.machine.state() else {
        return Ok(());
    };

    let time_color = if state.time_left <= 10 {
        theme.warning
    } else {
        theme.info
    };
    let player = app
        .machine
        .player()
        .map(|p| p.name().to_string())
        .unwrap_or_default();

    let lines: [(&str, String, Color); 4] = [
        ("Player", player, theme.fg),
        ("Score", state.score.to_string(), theme.success),
        ("Time", format!("{}s", state.time_left), time_color),
        (
            "Grid",
            format!("{0}x{0} (round {1})", state.grid_size(), state.round.round),
            theme.info,
        ),
    ];

    for (i, (label, value, color)) in lines.iter().enumerate() {
        execute!(
            stdout,
            MoveTo(x, y + i as u16 * 2),
            SetForegroundColor(theme.border),
            Print(format!("{:<8}", label)),
            SetForegroundColor(*color),
            Print(value)
        )?;
    }
    Ok(())
}

fn render_game_over_screen(stdout: &mut io::Stdout, app: &App, term_width: u16) -> io::Result<()> {
    let theme = &app.theme;
    render_title(stdout, app, "═══ GAME OVER ═══", term_width)?;

    let Some(result) = app.machine.result() else {
        return Ok(());
    };

    let reason = match result.reason {
        GameOverReason::WrongCell { .. } => "That was not the odd square.",
        GameOverReason::TimeUp => "Time is up!",
    };
    let summary = format!("{}: {} points in {}s", result.name, result.score, result.time_secs);

    execute!(
        stdout,
        MoveTo(centered(reason, term_width), 3),
        SetForegroundColor(theme.error),
        Print(reason),
        MoveTo(centered(&summary, term_width), 5),
        SetForegroundColor(theme.success),
        Print(&summary)
    )?;

    let table_x = term_width.saturating_sub(40) / 2;
    render_entries(stdout, app, &app.top_entries, table_x, 8, usize::MAX)?;

    let help = "Enter: play again   l: leaderboard   c: chase   p: change player   q: quit";
    execute!(
        stdout,
        MoveTo(centered(help, term_width), 8 + 3 + app.top_entries.len().max(1) as u16 + 1),
        SetForegroundColor(theme.info),
        Print(help)
    )?;
    Ok(())
}

fn render_leaderboard_screen(
    stdout: &mut io::Stdout,
    app: &App,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    render_title(stdout, app, "═══ LEADERBOARD ═══", term_width)?;

    let status = app.leaderboard.status();
    let status_line = if status.using_fallback {
        format!("{} (fallback)", status.backend_name)
    } else {
        status.backend_name.to_string()
    };
    execute!(
        stdout,
        MoveTo(centered(&status_line, term_width), 3),
        SetForegroundColor(if status.is_available {
            theme.info
        } else {
            theme.warning
        }),
        Print(&status_line)
    )?;

    let max_rows = term_height.saturating_sub(10) as usize;
    let table_x = term_width.saturating_sub(40) / 2;
    render_entries(stdout, app, &app.top_entries, table_x, 5, max_rows)?;

    let help = "Esc: back   q: quit";
    execute!(
        stdout,
        MoveTo(centered(help, term_width), term_height.saturating_sub(2)),
        SetForegroundColor(theme.info),
        Print(help)
    )?;
    Ok(())
}

fn render_entries(
    stdout: &mut io::Stdout,
    app: &App,
    entries: &[LeaderboardEntry],
    x: u16,
    y: u16,
    max_rows: usize,
) -> io::Result<()> {
    let theme = &app.theme;

    execute!(
        stdout,
        MoveTo(x, y),
        SetForegroundColor(theme.fg),
        Print(format!("{:>4}  {:<20} {:>6} {:>6}", "Rank", "Player", "Score", "Time")),
        MoveTo(x, y + 1),
        SetForegroundColor(theme.border),
        Print("─".repeat(40))
    )?;

    if entries.is_empty() {
        return execute!(
            stdout,
            MoveTo(x, y + 2),
            SetForegroundColor(theme.info),
            Print("No scores yet")
        );
    }

    let me = app.machine.player().map(|p| p.name());
    for (i, entry) in entries.iter().take(max_rows).enumerate() {
        let color = match i {
            0 => Color::Yellow,
            1 => Color::Grey,
            2 => Color::Rgb {
                r: 205,
                g: 127,
                b: 50,
            },
            _ if Some(entry.name.as_str()) == me => theme.key,
            _ => theme.fg,
        };
        let name: String = entry.name.chars().take(20).collect();
        execute!(
            stdout,
            MoveTo(x, y + 2 + i as u16),
            SetForegroundColor(color),
            Print(format!(
                "{:>4}  {:<20} {:>6} {:>5}s",
                entry.rank.unwrap_or(i + 1),
                name,
                entry.score,
                entry.time
            ))
        )?;
    }
    Ok(())
}

fn render_chase_screen(
    stdout: &mut io::Stdout,
    app: &mut App,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let state = *app.chase.state();
    let columns = ChaseLayout::columns();
    let rows = ChaseLayout::rows();
    let layout = ChaseLayout {
        x: term_width.saturating_sub(columns) / 2,
        y: if term_height > rows + 5 { 3 } else { 1 },
    };
    app.chase_layout = Some(layout);

    render_title(stdout, app, "Click the cube", term_width)?;

    let background = " ".repeat(columns as usize);
    execute!(stdout, SetBackgroundColor(term_color(state.background)))?;
    for dy in 0..rows {
        execute!(stdout, MoveTo(layout.x, layout.y + dy), Print(&background))?;
    }

    let cube_x = layout.x + (state.x / CHASE_UNITS_PER_COLUMN) as u16;
    let cube_y = layout.y + (state.y / CHASE_UNITS_PER_ROW) as u16;
    let cube = " ".repeat((CUBE_SIZE / CHASE_UNITS_PER_COLUMN) as usize);
    execute!(stdout, SetBackgroundColor(term_color(state.cube_color)))?;
    for dy in 0..(CUBE_SIZE / CHASE_UNITS_PER_ROW) as u16 {
        execute!(stdout, MoveTo(cube_x, cube_y + dy), Print(&cube))?;
    }
    execute!(stdout, SetBackgroundColor(app.theme.bg))?;

    let theme = &app.theme;
    let status = if state.finished {
        format!("Time's up! Score {}   r: retry", state.score)
    } else if state.started {
        format!("Score {}   Time {}s", state.score, state.time_left)
    } else {
        format!("Click the cube to start ({}s)", state.time_left)
    };
    execute!(
        stdout,
        MoveTo(layout.x, layout.y + rows + 1),
        SetForegroundColor(if state.finished { theme.success } else { theme.fg }),
        Print(&status),
        MoveTo(layout.x, layout.y + rows + 2),
        SetForegroundColor(theme.info),
        Print("g: grid game   l: leaderboard   q: quit")
    )?;
    Ok(())
}

fn render_message(stdout: &mut io::Stdout, app: &App, msg: &str, term_width: u16) -> io::Result<()> {
    let theme = &app.theme;
    let padded = format!("  {}  ", msg);

    execute!(
        stdout,
        MoveTo(centered(&padded, term_width), 0),
        SetForegroundColor(theme.bg),
        SetBackgroundColor(theme.info),
        Print(&padded),
        SetBackgroundColor(theme.bg)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_layout_fits_terminal() {
        for size in 2..=8 {
            let layout = grid_layout(size, 80, 24);
            let n = size as u16;
            let width = layout.cell_width * n + layout.gap * (n - 1);
            assert!(layout.x + width + 3 + INFO_PANEL_WIDTH <= 80, "size {}", size);
            assert!(layout.y + layout.cell_height * n <= 24, "size {}", size);
        }
    }

    #[test]
    fn test_layout_round_trips_cells() {
        let layout = grid_layout(5, 120, 40);
        for index in 0..25u32 {
            let (row, col) = (index / 5, index % 5);
            let x = layout.x + col as u16 * (layout.cell_width + layout.gap);
            let y = layout.y + row as u16 * layout.cell_height;
            assert_eq!(layout.cell_at(x, y), Some(index));
        }
    }
}
