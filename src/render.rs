use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use unicode_width::UnicodeWidthStr;

use crate::geometry::{BodyTag, Rect};
use crate::grid::Dimensions;
use crate::physics::{BodyState, Shape};
use crate::world::WinBanner;

/// Canvas columns and rows per maze cell.
pub const CELL_W: usize = 4;
pub const CELL_H: usize = 2;

const BANNER_TEXT: &str = " You win! Press q to quit ";

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Cell {
    pub glyph: char,
    pub color: Color,
}

const BLANK: Cell = Cell {
    glyph: ' ',
    color: Color::Reset,
};

/// Pixel space to canvas mapping.
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    unit_x: f64,
    unit_y: f64,
    cols: usize,
    rows: usize,
}

impl Viewport {
    pub fn new(dims: Dimensions, unit_x: f64, unit_y: f64) -> Self {
        Self {
            unit_x,
            unit_y,
            cols: dims.cells_horizontal() * CELL_W + 1,
            rows: dims.cells_vertical() * CELL_H + 1,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    fn to_canvas(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x / self.unit_x * CELL_W as f64,
            y / self.unit_y * CELL_H as f64,
        )
    }

    /// Inclusive canvas span covered by `[lo, hi]`, falling back to the
    /// nearest line when the extent is thinner than one character.
    fn span(lo: f64, hi: f64, limit: usize) -> Option<(usize, usize)> {
        let (mut a, mut b) = (lo.ceil(), hi.floor());
        if a > b {
            a = ((lo + hi) / 2.0).round();
            b = a;
        }
        let max = limit as f64 - 1.0;
        if b < 0.0 || a > max {
            return None;
        }
        Some((a.max(0.0) as usize, b.min(max) as usize))
    }

    /// Draws every body onto a fresh canvas. Arena edges first, then the
    /// goal, walls and finally the ball on top.
    pub fn rasterize(&self, bodies: &[BodyState]) -> Vec<Cell> {
        let mut canvas = vec![BLANK; self.cols * self.rows];
        for tag in [BodyTag::Boundary, BodyTag::Goal, BodyTag::Wall, BodyTag::Ball] {
            for body in bodies.iter().filter(|b| b.tag == tag) {
                self.draw(&mut canvas, body);
            }
        }
        canvas
    }

    fn draw(&self, canvas: &mut [Cell], body: &BodyState) {
        let cell = paint(body.tag);
        match body.shape {
            Shape::Rect { width, height } => {
                let rect = Rect {
                    x: body.x,
                    y: body.y,
                    width,
                    height,
                    tag: body.tag,
                };
                if body.angle.sin().abs() < 1e-3 {
                    self.fill(canvas, &rect, cell);
                } else if body.angle.cos().abs() < 1e-3 {
                    let turned = Rect {
                        width: height,
                        height: width,
                        ..rect
                    };
                    self.fill(canvas, &turned, cell);
                } else {
                    self.fill_rotated(canvas, &rect, body.angle, cell);
                }
            }
            Shape::Circle { .. } => self.plot(canvas, body.x, body.y, cell),
        }
    }

    fn fill(&self, canvas: &mut [Cell], rect: &Rect, cell: Cell) {
        let (min_x, min_y) = rect.min();
        let (max_x, max_y) = rect.max();
        let (x0, y0) = self.to_canvas(min_x, min_y);
        let (x1, y1) = self.to_canvas(max_x, max_y);
        let (Some((c0, c1)), Some((r0, r1))) = (
            Self::span(x0, x1, self.cols),
            Self::span(y0, y1, self.rows),
        ) else {
            return;
        };
        for row in r0..=r1 {
            for col in c0..=c1 {
                canvas[row * self.cols + col] = cell;
            }
        }
    }

    /// Tumbling walls: samples the rectangle at half-character spacing.
    fn fill_rotated(&self, canvas: &mut [Cell], rect: &Rect, angle: f64, cell: Cell) {
        let spacing = (self.unit_x / CELL_W as f64).min(self.unit_y / CELL_H as f64) / 2.0;
        let samples = |len: f64| (len / spacing).ceil().max(1.0) as usize + 1;
        let (nu, nv) = (samples(rect.width), samples(rect.height));
        let (sin, cos) = angle.sin_cos();
        for i in 0..nu {
            let u = rect.width * (i as f64 / (nu - 1) as f64 - 0.5);
            for j in 0..nv {
                let v = rect.height * (j as f64 / (nv - 1) as f64 - 0.5);
                self.plot(canvas, rect.x + u * cos - v * sin, rect.y + u * sin + v * cos, cell);
            }
        }
    }

    fn plot(&self, canvas: &mut [Cell], x: f64, y: f64, cell: Cell) {
        let (x, y) = self.to_canvas(x, y);
        let (col, row) = (x.round(), y.round());
        if col >= 0.0 && row >= 0.0 && (col as usize) < self.cols && (row as usize) < self.rows {
            canvas[row as usize * self.cols + col as usize] = cell;
        }
    }

    /// Terminal size needed for the HUD line plus the canvas, or `None` when
    /// the canvas is wider or taller than any terminal can be.
    fn required_size(&self) -> Option<(u16, u16)> {
        let cols = u16::try_from(self.cols).ok()?;
        let rows = u16::try_from(self.rows + 1).ok()?;
        Some((cols, rows))
    }
}

fn paint(tag: BodyTag) -> Cell {
    match tag {
        BodyTag::Wall => Cell {
            glyph: '█',
            color: Color::Red,
        },
        BodyTag::Boundary => Cell {
            glyph: '█',
            color: Color::DarkGrey,
        },
        BodyTag::Goal => Cell {
            glyph: '▒',
            color: Color::Green,
        },
        BodyTag::Ball => Cell {
            glyph: '●',
            color: Color::Blue,
        },
    }
}

/// Win banner shown over the canvas once revealed.
#[derive(Debug, Default)]
pub struct TerminalBanner {
    shown: bool,
}

impl TerminalBanner {
    pub fn is_shown(&self) -> bool {
        self.shown
    }
}

impl WinBanner for TerminalBanner {
    fn reveal(&mut self) {
        self.shown = true;
    }
}

pub struct Renderer {
    last: Vec<Cell>,
    last_hud: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    pub fn new(viewport: &Viewport) -> Self {
        Self {
            last: vec![BLANK; viewport.cols * viewport.rows],
            last_hud: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }
}

pub fn render(
    stdout: &mut impl Write,
    viewport: &Viewport,
    bodies: &[BodyState],
    hud: &str,
    banner: &TerminalBanner,
    renderer: &mut Renderer,
) -> io::Result<()> {
    stdout.queue(MoveTo(0, 0))?;

    let (term_w, term_h) = terminal::size()?;
    let fits = viewport
        .required_size()
        .filter(|&(w, h)| term_w >= w && term_h >= h);
    let Some((needed_w, needed_h)) = fits else {
        stdout.queue(Clear(ClearType::All))?;
        let msg = format!(
            "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
            viewport.cols,
            viewport.rows + 1,
            term_w,
            term_h
        );
        stdout.queue(Print(msg))?;
        stdout.flush()?;
        renderer.needs_full = true;
        return Ok(());
    };

    let origin_x = (term_w - needed_w) / 2;
    let origin_y = (term_h - needed_h) / 2 + 1;
    if origin_x != renderer.origin_x || origin_y != renderer.origin_y {
        renderer.origin_x = origin_x;
        renderer.origin_y = origin_y;
        renderer.needs_full = true;
        stdout.queue(Clear(ClearType::All))?;
    }

    if renderer.needs_full || hud != renderer.last_hud {
        stdout.queue(MoveTo(renderer.origin_x, renderer.origin_y - 1))?;
        stdout.queue(SetForegroundColor(Color::White))?;
        stdout.queue(Clear(ClearType::CurrentLine))?;
        stdout.queue(Print(hud))?;
        stdout.queue(ResetColor)?;
        renderer.last_hud = hud.to_string();
    }

    let mut canvas = viewport.rasterize(bodies);
    if banner.is_shown() {
        overlay_banner(&mut canvas, viewport);
    }

    for row in 0..viewport.rows {
        for col in 0..viewport.cols {
            let idx = row * viewport.cols + col;
            let cell = canvas[idx];
            if renderer.needs_full || cell != renderer.last[idx] {
                renderer.last[idx] = cell;
                stdout.queue(MoveTo(
                    renderer.origin_x + col as u16,
                    renderer.origin_y + row as u16,
                ))?;
                stdout.queue(SetForegroundColor(cell.color))?;
                stdout.queue(Print(cell.glyph))?;
            }
        }
    }
    stdout.queue(ResetColor)?;
    renderer.needs_full = false;

    stdout.flush()?;
    Ok(())
}

/// Writes the banner text across the middle row, clipped to the canvas.
fn overlay_banner(canvas: &mut [Cell], viewport: &Viewport) {
    let width = UnicodeWidthStr::width(BANNER_TEXT).min(viewport.cols);
    let start = (viewport.cols - width) / 2;
    let row = viewport.rows / 2;
    for (i, glyph) in BANNER_TEXT.chars().take(width).enumerate() {
        canvas[row * viewport.cols + start + i] = Cell {
            glyph,
            color: Color::Yellow,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{build_layout, Arena, GeometryParams};
    use crate::grid::Maze;
    use crate::physics::RapierWorld;
    use crate::world::Session;

    fn closed_world(x: usize, y: usize) -> (RapierWorld, Viewport) {
        let dims = Dimensions::new(x, y).unwrap();
        let layout = build_layout(
            &Maze::closed(dims),
            Arena::new(x as f64 * 50.0, y as f64 * 40.0).unwrap(),
            &GeometryParams::default(),
        )
        .unwrap();
        let mut world = RapierWorld::new();
        Session::spawn(&mut world, &layout, 5.0, 1.0);
        (world, Viewport::new(dims, layout.unit_x, layout.unit_y))
    }

    fn at(canvas: &[Cell], vp: &Viewport, col: usize, row: usize) -> Cell {
        canvas[row * vp.cols() + col]
    }

    #[test]
    fn canvas_size_follows_cells() {
        let (_, vp) = closed_world(3, 2);
        assert_eq!(vp.cols(), 13);
        assert_eq!(vp.rows(), 5);
    }

    #[test]
    fn walls_land_on_cell_edges() {
        let (world, vp) = closed_world(3, 2);
        let canvas = vp.rasterize(&world.bodies());
        // interior horizontal wall between rows runs along canvas row 2
        assert_eq!(at(&canvas, &vp, 2, 2).color, Color::Red);
        // vertical wall right of cell (0, 0)
        assert_eq!(at(&canvas, &vp, 4, 1).color, Color::Red);
        // cell interior stays empty
        assert_eq!(at(&canvas, &vp, 6, 1), BLANK);
        // arena edge
        assert_eq!(at(&canvas, &vp, 0, 1).color, Color::DarkGrey);
    }

    #[test]
    fn ball_and_goal_are_drawn() {
        let (world, vp) = closed_world(3, 2);
        let canvas = vp.rasterize(&world.bodies());
        assert_eq!(at(&canvas, &vp, 2, 1).glyph, '●');
        assert_eq!(at(&canvas, &vp, 10, 3).color, Color::Green);
    }

    #[test]
    fn banner_is_clipped_to_narrow_canvas() {
        let (world, vp) = closed_world(2, 2);
        let mut canvas = vp.rasterize(&world.bodies());
        overlay_banner(&mut canvas, &vp);
        let row: String = (0..vp.cols()).map(|c| at(&canvas, &vp, c, 2).glyph).collect();
        assert_eq!(row, " You win!");
    }

    #[test]
    fn banner_flag_flips_on_reveal() {
        let mut banner = TerminalBanner::default();
        assert!(!banner.is_shown());
        banner.reveal();
        assert!(banner.is_shown());
    }

    #[test]
    fn oversized_canvas_does_not_fit_any_terminal() {
        let (_, vp) = closed_world(3, 2);
        assert_eq!(vp.required_size(), Some((13, 6)));

        // 16384 cells * 4 + 1 columns would wrap to 1 as a u16
        let wide = Viewport::new(Dimensions::new(16384, 1).unwrap(), 50.0, 40.0);
        assert_eq!(wide.cols(), 65537);
        assert_eq!(wide.required_size(), None);

        let tall = Viewport::new(Dimensions::new(1, 40000).unwrap(), 50.0, 40.0);
        assert_eq!(tall.required_size(), None);
    }

    #[test]
    fn tilted_wall_is_drawn_along_its_diagonal() {
        let vp = Viewport::new(Dimensions::new(2, 2).unwrap(), 40.0, 40.0);
        let wall = BodyState {
            tag: BodyTag::Wall,
            shape: Shape::Rect {
                width: 40.0 * std::f64::consts::SQRT_2,
                height: 3.0,
            },
            x: 40.0,
            y: 40.0,
            angle: std::f64::consts::FRAC_PI_4,
            is_static: false,
        };
        let canvas = vp.rasterize(&[wall]);
        // runs from pixel (20, 20) to (60, 60): canvas (2, 1) to (6, 3)
        assert_eq!(at(&canvas, &vp, 2, 1).color, Color::Red);
        assert_eq!(at(&canvas, &vp, 4, 2).color, Color::Red);
        assert_eq!(at(&canvas, &vp, 6, 3).color, Color::Red);
        assert_eq!(at(&canvas, &vp, 6, 1), BLANK);
        assert_eq!(at(&canvas, &vp, 2, 3), BLANK);
    }

    #[test]
    fn quarter_turned_wall_swaps_extents() {
        let vp = Viewport::new(Dimensions::new(2, 2).unwrap(), 40.0, 40.0);
        let wall = BodyState {
            tag: BodyTag::Wall,
            shape: Shape::Rect {
                width: 40.0,
                height: 3.0,
            },
            x: 40.0,
            y: 40.0,
            angle: std::f64::consts::FRAC_PI_2,
            is_static: false,
        };
        let canvas = vp.rasterize(&[wall]);
        // now a vertical bar at canvas column 4 spanning rows 1..=3
        for row in 1..=3 {
            assert_eq!(at(&canvas, &vp, 4, row).color, Color::Red);
        }
        assert_eq!(at(&canvas, &vp, 2, 2), BLANK);
    }
}
