//! Terminal renderer
//!
//! The world is scaled onto a grid of character cells: row 0 is the HUD, the
//! last row holds the controls hint and everything between is playfield.
//! A frame is composed into a [`Canvas`] first and then written in one pass,
//! so composing stays free of terminal I/O.

use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

use crossterm::{
    QueueableCommand, cursor,
    style::{self, Color, Print},
    terminal,
};

use super::Renderer;
use crate::assets::{Assets, Image};
use crate::error::Result;
use crate::sim::{InvaderSkin, Rect, Snapshot};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_LIVES: Color = Color::Red;
const C_HUD_LEVEL: Color = Color::Cyan;
const C_SHIP: Color = Color::White;
const C_PROJECTILE: Color = Color::White;
const C_HINT: Color = Color::DarkGrey;
const C_GAME_OVER: Color = Color::Red;

const SPRITE_CHAR: char = '█';
const PROJECTILE_CHAR: char = '┃';
const SHIP_SPRITE: &str = "sprites/ship.txt";

fn skin_color(skin: InvaderSkin) -> Color {
    match skin {
        InvaderSkin::Green => Color::Green,
        InvaderSkin::Cyan => Color::Cyan,
        InvaderSkin::Magenta => Color::Magenta,
        InvaderSkin::Yellow => Color::Yellow,
    }
}

/// One character cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub color: Color,
}

impl Cell {
    const BLANK: Cell = Cell {
        ch: ' ',
        color: Color::Reset,
    };
}

/// A composed frame
#[derive(Debug, Clone)]
pub struct Canvas {
    pub cols: u16,
    pub rows: u16,
    cells: Vec<Cell>,
}

impl Canvas {
    fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            cells: vec![Cell::BLANK; cols as usize * rows as usize],
        }
    }

    pub fn get(&self, col: u16, row: u16) -> Option<Cell> {
        (col < self.cols && row < self.rows)
            .then(|| self.cells[row as usize * self.cols as usize + col as usize])
    }

    fn set(&mut self, col: u16, row: u16, ch: char, color: Color) {
        if col < self.cols && row < self.rows {
            self.cells[row as usize * self.cols as usize + col as usize] = Cell { ch, color };
        }
    }

    fn text(&mut self, col: u16, row: u16, text: &str, color: Color) {
        for (i, ch) in text.chars().enumerate() {
            self.set(col.saturating_add(i as u16), row, ch, color);
        }
    }

    fn centered(&mut self, row: u16, text: &str, color: Color) {
        let col = (self.cols / 2).saturating_sub(text.chars().count() as u16 / 2);
        self.text(col, row, text, color);
    }

    /// Text of one row, trailing blanks trimmed
    pub fn row_text(&self, row: u16) -> String {
        let line: String = (0..self.cols)
            .filter_map(|col| self.get(col, row))
            .map(|cell| cell.ch)
            .collect();
        line.trim_end().to_owned()
    }
}

/// Maps world pixels onto playfield cells
#[derive(Debug, Clone, Copy)]
struct Viewport {
    /// World pixels per cell
    sx: f32,
    sy: f32,
    /// First playfield row
    top: u16,
    cols: u16,
    rows: u16,
}

impl Viewport {
    fn new(world: glam::Vec2, cols: u16, rows: u16) -> Self {
        let field_rows = rows.saturating_sub(2).max(1);
        let cols = cols.max(1);
        Self {
            sx: world.x / cols as f32,
            sy: world.y / field_rows as f32,
            top: 1,
            cols,
            rows: field_rows,
        }
    }

    /// Cell ranges touched by `rect`
    fn cells(&self, rect: &Rect) -> (std::ops::Range<u16>, std::ops::Range<u16>) {
        let span = |a: f32, b: f32, scale: f32, n: u16| {
            let start = (a / scale).floor().clamp(0.0, n as f32) as u16;
            let end = (b / scale).ceil().clamp(0.0, n as f32) as u16;
            start..end.max(start + 1).min(n)
        };
        (
            span(rect.left(), rect.right(), self.sx, self.cols),
            span(rect.top(), rect.bottom(), self.sy, self.rows),
        )
    }

    fn draw_sprite(&self, canvas: &mut Canvas, rect: &Rect, image: &Image, color: Color) {
        if rect.w <= 0.0 || rect.h <= 0.0 {
            return;
        }
        let (cols, rows) = self.cells(rect);
        for row in rows {
            let v0 = (row as f32 * self.sy - rect.top()) / rect.h;
            let v1 = ((row + 1) as f32 * self.sy - rect.top()) / rect.h;
            for col in cols.clone() {
                let u0 = (col as f32 * self.sx - rect.left()) / rect.w;
                let u1 = ((col + 1) as f32 * self.sx - rect.left()) / rect.w;
                let inside = u1 > 0.0 && u0 < 1.0 && v1 > 0.0 && v0 < 1.0;
                if inside && image.covers(u0, v0, u1, v1) {
                    canvas.set(col, row + self.top, SPRITE_CHAR, color);
                }
            }
        }
    }

    fn draw_projectile(&self, canvas: &mut Canvas, rect: &Rect) {
        let (_, rows) = self.cells(rect);
        let center = rect.left() + rect.w / 2.0;
        if center < 0.0 {
            return;
        }
        let col = (center / self.sx) as u16;
        for row in rows {
            canvas.set(col, row + self.top, PROJECTILE_CHAR, C_PROJECTILE);
        }
    }
}

/// Draws snapshots to a crossterm-capable writer
pub struct TerminalRenderer<W: Write> {
    out: W,
    cols: u16,
    rows: u16,
    ship: Rc<Image>,
    invaders: HashMap<InvaderSkin, Vec<Rc<Image>>>,
}

impl<W: Write> TerminalRenderer<W> {
    /// Loads every sprite up front so a missing one fails before play starts
    pub fn new(out: W, assets: &mut Assets, cols: u16, rows: u16) -> Result<Self> {
        let ship = assets.load_image(SHIP_SPRITE)?;
        let mut invaders = HashMap::new();
        for skin in InvaderSkin::ALL {
            invaders.insert(skin, assets.load_frames(&skin.frame_paths())?);
        }
        log::info!("Terminal renderer ready at {}x{}", cols, rows);
        Ok(Self {
            out,
            cols,
            rows,
            ship,
            invaders,
        })
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        log::debug!("Terminal resized to {}x{}", cols, rows);
        self.cols = cols;
        self.rows = rows;
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    /// Build the frame for `snapshot` without writing it
    pub fn compose(&self, snapshot: &Snapshot<'_>) -> Canvas {
        let mut canvas = Canvas::new(self.cols, self.rows);
        let view = Viewport::new(snapshot.world, self.cols, self.rows);

        for invader in snapshot.invaders {
            let Some(frames) = self.invaders.get(&invader.skin) else {
                continue;
            };
            if let Some(image) = frames.get(invader.frame_index() % frames.len().max(1)) {
                view.draw_sprite(&mut canvas, &invader.bounds(), image, skin_color(invader.skin));
            }
        }
        for projectile in snapshot.projectiles {
            view.draw_projectile(&mut canvas, &projectile.bounds());
        }
        view.draw_sprite(&mut canvas, &snapshot.ship.bounds(), &self.ship, C_SHIP);

        draw_hud(&mut canvas, snapshot);
        draw_controls_hint(&mut canvas);
        if snapshot.game_over {
            draw_game_over(&mut canvas, snapshot);
        }
        canvas
    }

    fn write(&mut self, canvas: &Canvas) -> Result<()> {
        self.out.queue(terminal::Clear(terminal::ClearType::All))?;
        for row in 0..canvas.rows {
            self.out.queue(cursor::MoveTo(0, row))?;
            let mut current = None;
            for col in 0..canvas.cols {
                let Some(cell) = canvas.get(col, row) else {
                    continue;
                };
                if current != Some(cell.color) {
                    self.out.queue(style::SetForegroundColor(cell.color))?;
                    current = Some(cell.color);
                }
                self.out.queue(Print(cell.ch))?;
            }
        }
        // Park cursor in a harmless spot and flush
        self.out.queue(style::ResetColor)?;
        self.out.queue(cursor::MoveTo(0, canvas.rows.saturating_sub(1)))?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render(&mut self, snapshot: &Snapshot<'_>) -> Result<()> {
        let canvas = self.compose(snapshot);
        self.write(&canvas)
    }
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud(canvas: &mut Canvas, snapshot: &Snapshot<'_>) {
    let score = format!("Score:{:>6}", snapshot.score);
    canvas.text(1, 0, &score, C_HUD_SCORE);

    let level = format!("[ LEVEL {} · {} left ]", snapshot.level, snapshot.invaders.len());
    canvas.centered(0, &level, C_HUD_LEVEL);

    let lives = format!("Lives:{}", "♥".repeat(snapshot.lives as usize));
    let col = canvas
        .cols
        .saturating_sub(lives.chars().count() as u16 + 1);
    canvas.text(col, 0, &lives, C_HUD_LIVES);
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint(canvas: &mut Canvas) {
    let row = canvas.rows.saturating_sub(1);
    canvas.text(1, row, "← → / A D : Move   SPACE : Shoot   Q : Quit", C_HINT);
}

// ── Game-over overlay ─────────────────────────────────────────────────────────

fn draw_game_over(canvas: &mut Canvas, snapshot: &Snapshot<'_>) {
    let lines = [
        "╔════════════════════╗",
        "║     GAME  OVER     ║",
        "╚════════════════════╝",
    ];
    let start = (canvas.rows / 2).saturating_sub(2);
    for (i, line) in lines.iter().enumerate() {
        canvas.centered(start + i as u16, line, C_GAME_OVER);
    }
    let score = format!("Final Score: {:>6}  Level {}", snapshot.score, snapshot.level);
    canvas.centered(start + 3, &score, C_HUD_SCORE);
    canvas.centered(start + 4, "R - Play Again  Q - Quit", Color::White);
}
