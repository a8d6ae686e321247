use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use orbit_drawer::{driver::SurfaceSource, PixelCanvas, Rgba, Surface};
use std::io::{self, Write};

/// Left panel width in cells.
pub(crate) const PANEL_W: u16 = 30;
/// Below this the scene area reports no surface.
pub(crate) const MIN_SCENE_COLS: u16 = 20;
pub(crate) const MIN_SCENE_ROWS: u16 = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self { ch: ' ', fg: Color::White, bg: Color::Black }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self { w, h, cells: vec![Cell::default(); (w as usize) * (h as usize)] }
    }
    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }
    pub(crate) fn clear(&mut self, bg: Color) {
        self.cells.fill(Cell { bg, ..Cell::default() });
    }
}

pub(crate) fn to_color(c: Rgba) -> Color {
    Color::Rgb { r: c.r, g: c.g, b: c.b }
}

/// Where the scene canvas sits on screen, in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SceneArea {
    pub(crate) x: u16,
    pub(crate) y: u16,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
}

impl SceneArea {
    /// Header on row 0, panel on the left, scene fills the rest.
    pub(crate) fn for_terminal(cols: u16, rows: u16) -> Self {
        let x = PANEL_W.min(cols);
        Self { x, y: 1, cols: cols.saturating_sub(x), rows: rows.saturating_sub(1) }
    }
    pub(crate) fn usable(&self) -> bool {
        self.cols >= MIN_SCENE_COLS && self.rows >= MIN_SCENE_ROWS
    }
}

pub(crate) struct Terminal {
    pub(crate) out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) prev: CellBuffer,
    pub(crate) cur: CellBuffer,
    pub(crate) area: SceneArea,
    pub(crate) canvas: PixelCanvas,
}

fn canvas_for(area: SceneArea) -> PixelCanvas {
    if area.usable() {
        // Braille: 2×4 dots per cell
        PixelCanvas::new(area.cols as u32 * 2, area.rows as u32 * 4)
    } else {
        PixelCanvas::new(0, 0)
    }
}

impl Terminal {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(out, EnterAlternateScreen, cursor::Hide, DisableLineWrap, Clear(ClearType::All))?;
        terminal::enable_raw_mode()?;

        let (cols, rows) = terminal::size()?;
        let area = SceneArea::for_terminal(cols, rows);
        Ok(Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
            area,
            canvas: canvas_for(area),
        })
    }

    /// Undo `begin`. Raw mode goes first so a failed write below still leaves a usable shell.
    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        terminal::disable_raw_mode()?;
        execute!(self.out, ResetColor, Clear(ClearType::All), EnableLineWrap, cursor::Show, LeaveAlternateScreen)?;
        Ok(())
    }

    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        self.area = SceneArea::for_terminal(c, r);
        self.canvas = canvas_for(self.area);
        execute!(self.out, Clear(ClearType::All))?;
        Ok(true)
    }

    /// Repaint the changed stretch of every row, then remember what is on screen.
    pub(crate) fn present(&mut self) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;
        let w = self.cols as usize;
        let mut pen: Option<(Color, Color)> = None;

        for y in 0..self.rows {
            let start = y as usize * w;
            let row = &self.cur.cells[start..start + w];
            let Some((first, last)) = changed_span(&self.prev.cells[start..start + w], row) else {
                continue;
            };
            queue!(self.out, cursor::MoveTo(first as u16, y))?;
            for c in &row[first..=last] {
                if pen != Some((c.fg, c.bg)) {
                    queue!(self.out, SetForegroundColor(c.fg), SetBackgroundColor(c.bg))?;
                    pen = Some((c.fg, c.bg));
                }
                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.clone_from(&self.cur.cells);
        Ok(())
    }
}

/// First and last differing index of two equally long rows.
fn changed_span(prev: &[Cell], cur: &[Cell]) -> Option<(usize, usize)> {
    let first = prev.iter().zip(cur).position(|(a, b)| a != b)?;
    let last = prev.iter().zip(cur).rposition(|(a, b)| a != b)?;
    Some((first, last))
}

impl SurfaceSource for Terminal {
    type Surface = PixelCanvas;

    fn acquire(&mut self) -> Option<&mut PixelCanvas> {
        if self.area.usable() {
            Some(&mut self.canvas)
        } else {
            None
        }
    }
}

/// Braille dot bits by `[row][column]` within a 2×4 cell.
const BRAILLE_DOTS: [[u8; 2]; 4] = [[0x01, 0x08], [0x02, 0x10], [0x04, 0x20], [0x40, 0x80]];

/// Braille-encode `canvas` into `area` of `out`, then lay its labels over the top.
pub(crate) fn canvas_to_cells(
    canvas: &PixelCanvas,
    out: &mut CellBuffer,
    area: SceneArea,
    enable_color: bool,
    bg: Color,
) {
    let cols = (canvas.width() / 2).min(area.cols as u32);
    let rows = (canvas.height() / 4).min(area.rows as u32);

    for cy in 0..rows {
        for cx in 0..cols {
            let mut mask: u8 = 0;
            let mut sum = [0u32; 3];
            let mut ink: u32 = 0;

            for dy in 0..4 {
                for dx in 0..2 {
                    let Some(p) = canvas.pixel(cx * 2 + dx, cy * 4 + dy) else {
                        continue;
                    };
                    // alpha as ink
                    if p.a >= 32 {
                        mask |= BRAILLE_DOTS[dy as usize][dx as usize];
                        sum[0] += p.r as u32;
                        sum[1] += p.g as u32;
                        sum[2] += p.b as u32;
                        ink += 1;
                    }
                }
            }
            if mask == 0 {
                continue;
            }

            let ch = char::from_u32(0x2800 + (mask as u32)).unwrap_or(' ');
            let fg = if enable_color {
                Color::Rgb {
                    r: (sum[0] / ink) as u8,
                    g: (sum[1] / ink) as u8,
                    b: (sum[2] / ink) as u8,
                }
            } else {
                Color::White
            };
            out.set(area.x + cx as u16, area.y + cy as u16, Cell { ch, fg, bg });
        }
    }

    for label in canvas.labels() {
        if label.x < 0.0 || label.y < 0.0 {
            continue;
        }
        let lx = (label.x / 2.0) as u16;
        let ly = (label.y / 4.0) as u16;
        if ly >= area.rows {
            continue;
        }
        let fg = if enable_color { to_color(label.color) } else { Color::White };
        for (i, ch) in label.text.chars().enumerate() {
            let x = lx.saturating_add(i as u16);
            if x >= area.cols {
                break;
            }
            out.set(area.x + x, area.y + ly, Cell { ch, fg, bg });
        }
    }
}

/// Single-row text, clipped at the right edge.
pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color, bg: Color) {
    if y >= buf.h {
        return;
    }
    for (xx, ch) in (x..buf.w).zip(s.chars()) {
        buf.set(xx, y, Cell { ch, fg, bg });
    }
}
