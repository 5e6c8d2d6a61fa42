//! Character-grid drawing surface for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use std::io::Write;
use wirecanvas_core::{DrawSurface, Point2, Primitive, Rgb, Stroke, Viewport};

const THIN: char = '*';
const THICK: char = '#';
const FILL: char = '.';
const DOT: char = 'o';

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    ch: char,
    color: Rgb,
}

const BLANK: Cell = Cell {
    ch: ' ',
    color: Rgb::BLACK,
};

/// One pixel per terminal cell; pixel (x, y) is column x, row y.
pub struct CharSurface {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl CharSurface {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![BLANK; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.cells = vec![BLANK; width * height];
    }

    pub fn clear(&mut self) {
        self.cells.fill(BLANK);
    }

    /// Character and colour at a cell, `None` outside the grid.
    pub fn cell(&self, x: usize, y: usize) -> Option<(char, Rgb)> {
        (x < self.width && y < self.height).then(|| {
            let c = self.cells[y * self.width + x];
            (c.ch, c.color)
        })
    }

    pub fn row_text(&self, y: usize) -> String {
        (0..self.width)
            .filter_map(|x| self.cell(x, y).map(|(ch, _)| ch))
            .collect()
    }

    fn plot(&mut self, x: i64, y: i64, ch: char, color: Rgb) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        self.cells[y as usize * self.width + x as usize] = Cell { ch, color };
    }

    /// Bresenham between two cells.
    fn line(&mut self, from: (i64, i64), to: (i64, i64), ch: char, color: Rgb) {
        let (mut x, mut y) = from;
        let dx = (to.0 - x).abs();
        let dy = -(to.1 - y).abs();
        let sx = if x < to.0 { 1 } else { -1 };
        let sy = if y < to.1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.plot(x, y, ch, color);
            if (x, y) == to {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Even-odd scanline fill sampled at cell centres.
    fn fill_polygon(&mut self, vertices: &[(f64, f64)], color: Rgb) {
        let (ymin, ymax) = vertices
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v.1), hi.max(v.1)));
        if !ymin.is_finite() {
            return;
        }
        for row in ymin.floor() as i64..=ymax.ceil() as i64 {
            let y = row as f64 + 0.5;
            let mut xs: Vec<f64> = Vec::new();
            for (i, a) in vertices.iter().enumerate() {
                let b = vertices[(i + 1) % vertices.len()];
                if (a.1 <= y) != (b.1 <= y) {
                    xs.push(a.0 + (y - a.1) * (b.0 - a.0) / (b.1 - a.1));
                }
            }
            xs.sort_by(f64::total_cmp);
            for span in xs.chunks_exact(2) {
                for col in span[0].round() as i64..span[1].round() as i64 {
                    self.plot(col, row, FILL, color);
                }
            }
        }
    }

    fn marker(&mut self, at: (i64, i64), radius: f64, color: Rgb) {
        let r = radius.max(0.0).floor() as i64;
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    self.plot(at.0 + dx, at.1 + dy, DOT, color);
                }
            }
        }
    }

    fn border(&mut self, vp: &Viewport) {
        let (x0, y0) = cell(Point2::new(vp.xmin, vp.ymin));
        let (x1, y1) = cell(Point2::new(vp.xmax, vp.ymax));
        let grey = Rgb::GREY;
        self.line((x0, y0), (x1, y0), '-', grey);
        self.line((x0, y1), (x1, y1), '-', grey);
        self.line((x0, y0), (x0, y1), '|', grey);
        self.line((x1, y0), (x1, y1), '|', grey);
        for corner in [(x0, y0), (x1, y0), (x0, y1), (x1, y1)] {
            self.plot(corner.0, corner.1, '+', grey);
        }
    }

    /// Queue the whole grid on `writer`, one terminal row per surface row.
    pub fn present<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let c = self.cells[y * self.width + x];
                writer.queue(SetForegroundColor(to_color(c.color)))?;
                writer.queue(Print(c.ch))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl DrawSurface for CharSurface {
    fn draw(&mut self, primitive: &Primitive) {
        match primitive {
            Primitive::Border(vp) => self.border(vp),
            Primitive::Point { at, radius, stroke } => self.marker(cell(*at), *radius, stroke.color),
            Primitive::Segment { from, to, stroke } => {
                self.line(cell(*from), cell(*to), stroke_char(stroke), stroke.color)
            }
            Primitive::Polygon {
                vertices,
                fill,
                stroke,
            } => {
                if *fill {
                    let pts: Vec<(f64, f64)> = vertices.iter().map(|p| (p.x, p.y)).collect();
                    self.fill_polygon(&pts, stroke.color);
                }
                for (i, a) in vertices.iter().enumerate() {
                    let b = vertices[(i + 1) % vertices.len()];
                    self.line(cell(*a), cell(b), stroke_char(stroke), stroke.color);
                }
            }
        }
    }
}

fn cell(p: Point2<f64>) -> (i64, i64) {
    (p.x.round() as i64, p.y.round() as i64)
}

fn stroke_char(stroke: &Stroke) -> char {
    if stroke.width > 1 {
        THICK
    } else {
        THIN
    }
}

/// Scene colours on the terminal's true-colour palette. Black would vanish on
/// a dark background, so it is drawn white.
fn to_color(c: Rgb) -> Color {
    if c == Rgb::BLACK {
        Color::White
    } else {
        Color::Rgb {
            r: c.r,
            g: c.g,
            b: c.b,
        }
    }
}
