//! Canvas rendering

use crate::game::{Screen, WebGame};
use crate::theme::{with_alpha, Theme};
use cube_core::{Clock, GameOverReason, LeaderboardEntry, CUBE_SIZE, PLAY_AREA};
use web_sys::CanvasRenderingContext2d;

const FONT: &str = "'JetBrains Mono', monospace";

fn set_font(ctx: &CanvasRenderingContext2d, size: f64, bold: bool) {
    let weight = if bold { "bold " } else { "" };
    ctx.set_font(&format!("{}{}px {}", weight, size, FONT));
}

/// Render the complete game to canvas
pub fn render_game<C: Clock>(
    ctx: &CanvasRenderingContext2d,
    game: &WebGame<C>,
    theme: &Theme,
    width: u32,
    height: u32,
    font_size: f64,
) {
    ctx.set_fill_style_str(&theme.background.as_css());
    ctx.fill_rect(0.0, 0.0, width as f64, height as f64);

    match game.screen() {
        Screen::Idle => render_idle(ctx, theme, width, height, font_size),
        Screen::Playing => {
            render_board(ctx, game, theme);
            render_info_panel(ctx, game, theme, font_size);
        }
        Screen::GameOver => {
            render_board(ctx, game, theme);
            render_info_panel(ctx, game, theme, font_size);
            render_game_over(ctx, game, theme, width, height, font_size);
        }
        Screen::Chase => render_chase(ctx, game, theme, font_size),
    }
}

fn render_idle(ctx: &CanvasRenderingContext2d, theme: &Theme, width: u32, height: u32, font_size: f64) {
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    set_font(ctx, font_size * 1.4, true);
    ctx.set_fill_style_str(&theme.title_text.as_css());
    let _ = ctx.fill_text("Find the odd square", width as f64 / 2.0, height as f64 / 2.0 - font_size);

    set_font(ctx, font_size * 0.7, false);
    ctx.set_fill_style_str(&theme.info_text.as_css());
    let _ = ctx.fill_text(
        "Enter your name to start",
        width as f64 / 2.0,
        height as f64 / 2.0 + font_size,
    );
}

fn render_board<C: Clock>(ctx: &CanvasRenderingContext2d, game: &WebGame<C>, theme: &Theme) {
    let Some(round) = game.machine().round() else {
        return;
    };
    let board = game.board;

    ctx.set_fill_style_str(&theme.board_bg.as_css());
    ctx.fill_rect(board.x - 6.0, board.y - 6.0, board.size + 12.0, board.size + 12.0);

    let cell = board.cell_size(round.grid_size);
    for (index, color) in round.cells() {
        let (x, y) = board.cell_origin(index, round.grid_size);
        ctx.set_fill_style_str(&color.as_css());
        ctx.fill_rect(x, y, cell, cell);
    }
}

fn render_info_panel<C: Clock>(
    ctx: &CanvasRenderingContext2d,
    game: &WebGame<C>,
    theme: &Theme,
    font_size: f64,
) {
    let Some(state) = game.machine().state() else {
        return;
    };
    let x = game.board.x + game.board.size + 30.0;
    let mut y = game.board.y;
    let line_height = font_size * 1.3;

    ctx.set_text_align("left");
    ctx.set_text_baseline("top");

    if let Some(player) = game.machine().player() {
        set_font(ctx, font_size * 0.8, true);
        ctx.set_fill_style_str(&theme.title_text.as_css());
        let _ = ctx.fill_text(player.name(), x, y);
        y += line_height * 1.5;
    }

    set_font(ctx, font_size * 0.7, false);
    ctx.set_fill_style_str(&theme.score_text.as_css());
    let _ = ctx.fill_text(&format!("Score: {}", state.score), x, y);
    y += line_height;

    let time_color = if state.time_left <= 10 {
        theme.warning_text
    } else {
        theme.info_text
    };
    ctx.set_fill_style_str(&time_color.as_css());
    let _ = ctx.fill_text(&format!("Time:  {}s", state.time_left), x, y);
    y += line_height;

    ctx.set_fill_style_str(&theme.info_text.as_css());
    let _ = ctx.fill_text(&format!("Round: {}", state.round.round), x, y);
    y += line_height;
    let _ = ctx.fill_text(&format!("Grid:  {0}x{0}", state.grid_size()), x, y);
}

fn render_game_over<C: Clock>(
    ctx: &CanvasRenderingContext2d,
    game: &WebGame<C>,
    theme: &Theme,
    width: u32,
    height: u32,
    font_size: f64,
) {
    ctx.set_fill_style_str(&with_alpha(theme.overlay, 0.75));
    ctx.fill_rect(0.0, 0.0, width as f64, height as f64);

    let center_x = width as f64 / 2.0;
    let mut y = height as f64 * 0.15;

    ctx.set_text_align("center");
    ctx.set_text_baseline("top");
    set_font(ctx, font_size * 1.4, true);
    ctx.set_fill_style_str(&theme.lose_color.as_css());
    let _ = ctx.fill_text("GAME OVER", center_x, y);
    y += font_size * 2.0;

    if let Some(result) = game.machine().result() {
        let reason = match result.reason {
            GameOverReason::WrongCell { .. } => "That was not the odd square",
            GameOverReason::TimeUp => "Time is up",
        };
        set_font(ctx, font_size * 0.7, false);
        ctx.set_fill_style_str(&theme.info_text.as_css());
        let _ = ctx.fill_text(reason, center_x, y);
        y += font_size * 1.2;

        set_font(ctx, font_size * 0.9, true);
        ctx.set_fill_style_str(&theme.score_text.as_css());
        let _ = ctx.fill_text(&format!("Your score is {}", result.score), center_x, y);
        y += font_size * 2.0;
    }

    render_top_list(ctx, &game.top_entries(), theme, center_x, y, font_size * 0.6);
}

fn render_top_list(
    ctx: &CanvasRenderingContext2d,
    entries: &[LeaderboardEntry],
    theme: &Theme,
    center_x: f64,
    y: f64,
    font_size: f64,
) {
    set_font(ctx, font_size, false);
    ctx.set_text_align("center");
    ctx.set_fill_style_str(&theme.title_text.as_css());
    let _ = ctx.fill_text(
        &format!("{:>4}  {:<16} {:>6} {:>6}", "Rank", "Player", "Score", "Time"),
        center_x,
        y,
    );

    ctx.set_fill_style_str(&theme.info_text.as_css());
    for (i, entry) in entries.iter().enumerate() {
        let name: String = entry.name.chars().take(16).collect();
        let line = format!(
            "{:>4}  {:<16} {:>6} {:>5}s",
            entry.rank.unwrap_or(i + 1),
            name,
            entry.score,
            entry.time
        );
        let _ = ctx.fill_text(&line, center_x, y + (i as f64 + 1.5) * font_size * 1.4);
    }
}

fn render_chase<C: Clock>(ctx: &CanvasRenderingContext2d, game: &WebGame<C>, theme: &Theme, font_size: f64) {
    let chase = game.chase();
    let (ox, oy) = game.chase_origin;
    let extent = (PLAY_AREA + CUBE_SIZE) as f64;

    ctx.set_fill_style_str(&chase.background.as_css());
    ctx.fill_rect(ox, oy, extent, extent);

    ctx.set_fill_style_str(&chase.cube_color.as_css());
    ctx.fill_rect(
        ox + chase.x as f64,
        oy + chase.y as f64,
        CUBE_SIZE as f64,
        CUBE_SIZE as f64,
    );

    let x = ox + extent + 30.0;
    ctx.set_text_align("left");
    ctx.set_text_baseline("top");
    set_font(ctx, font_size * 0.8, true);
    ctx.set_fill_style_str(&theme.title_text.as_css());
    let _ = ctx.fill_text("Click the cube", x, oy);

    set_font(ctx, font_size * 0.7, false);
    ctx.set_fill_style_str(&theme.score_text.as_css());
    let _ = ctx.fill_text(&format!("Score: {}", chase.score), x, oy + font_size * 1.5);
    ctx.set_fill_style_str(&theme.info_text.as_css());
    let status = if chase.finished {
        "Time's up".to_string()
    } else {
        format!("Time:  {}s", chase.time_left)
    };
    let _ = ctx.fill_text(&status, x, oy + font_size * 2.5);
}
