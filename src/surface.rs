//! 2D drawing surfaces.
//!
//! [`Surface`] is the primitive set the renderer needs. [`PixelCanvas`] is an RGBA raster
//! implementing it; the terminal host turns that raster into braille cells.

use std::f64::consts::TAU;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::rgba(0, 0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const YELLOW: Rgba = Rgba::rgb(255, 255, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
    /// Source-over composite of `self` onto `dst`.
    pub fn over(self, dst: Rgba) -> Rgba {
        if self.a == 255 || dst.a == 0 {
            return self;
        }
        if self.a == 0 {
            return dst;
        }
        let sa = self.a as f32 / 255.0;
        // destination weight after the source has covered its share
        let dw = dst.a as f32 / 255.0 * (1.0 - sa);
        let out_a = sa + dw;
        let mix = |s: u8, d: u8| ((s as f32 * sa + d as f32 * dw) / out_a).round().clamp(0.0, 255.0) as u8;
        Rgba {
            r: mix(self.r, dst.r),
            g: mix(self.g, dst.g),
            b: mix(self.b, dst.b),
            a: (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
        }
    }

    /// Same color with alpha scaled by `t` in `[0, 1]`.
    pub fn with_alpha(self, t: f32) -> Self {
        let a = (self.a as f32 * t.clamp(0.0, 1.0) + 0.5) as u8;
        Self { a, ..self }
    }
}

pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn clear(&mut self, color: Rgba);
    fn stroke_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgba);
    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgba);
    /// Connected polyline through `points`.
    fn stroke_path(&mut self, points: &[(f64, f64)], color: Rgba);
    fn fill_text(&mut self, x: f64, y: f64, text: &str, color: Rgba);
}

#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub color: Rgba,
}

/// RGBA raster with source-over blending.
///
/// Text cannot be rasterised at dot resolution, so labels are kept as a separate layer
/// positioned in pixel space and composited by whoever presents the canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelCanvas {
    w: u32,
    h: u32,
    px: Vec<Rgba>,
    labels: Vec<Label>,
}

impl PixelCanvas {
    pub fn new(w: u32, h: u32) -> Self {
        Self {
            w,
            h,
            px: vec![Rgba::TRANSPARENT; (w as usize) * (h as usize)],
            labels: Vec::new(),
        }
    }

    fn idx(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.w || y >= self.h {
            return None;
        }
        Some(self.px[self.idx(x, y)])
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.px
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    fn blend_over(&mut self, x: i32, y: i32, src: Rgba) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.w || y >= self.h {
            return;
        }
        let i = self.idx(x, y);
        self.px[i] = src.over(self.px[i]);
    }

    /// Distance from `(cx, cy)` to the nearest and farthest points of the raster.
    fn reach(&self, cx: f64, cy: f64) -> (f64, f64) {
        let (w, h) = (self.w as f64, self.h as f64);
        let nx = cx.clamp(0.0, w) - cx;
        let ny = cy.clamp(0.0, h) - cy;
        let fx = cx.abs().max((w - cx).abs());
        let fy = cy.abs().max((h - cy).abs());
        (nx.hypot(ny), fx.hypot(fy))
    }

    /// Blend each touched pixel once, so overlapping segments of one stroke don't darken.
    fn stroke_dots(&mut self, mut dots: Vec<(i32, i32)>, color: Rgba) {
        dots.sort_unstable();
        dots.dedup();
        for (x, y) in dots {
            self.blend_over(x, y, color);
        }
    }
}

fn line_dots(out: &mut Vec<(i32, i32)>, a: (f64, f64), b: (f64, f64)) {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;
    for s in 0..=steps {
        let t = s as f64 / steps as f64;
        let x = a.0 + dx * t;
        let y = a.1 + dy * t;
        out.push((x.floor() as i32, y.floor() as i32));
    }
}

impl Surface for PixelCanvas {
    fn width(&self) -> u32 {
        self.w
    }

    fn height(&self) -> u32 {
        self.h
    }

    fn clear(&mut self, color: Rgba) {
        self.px.fill(color);
        self.labels.clear();
    }

    fn stroke_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgba) {
        if radius <= 0.0 || !radius.is_finite() {
            return;
        }
        let (near, far) = self.reach(cx, cy);
        if radius > far + 1.0 || radius < near - 1.0 {
            return;
        }
        let (w, h) = (self.w as f64, self.h as f64);
        let steps = (TAU * radius).ceil() as usize;
        if steps <= 2 * (self.w + self.h) as usize {
            let steps = steps.max(12);
            let pts: Vec<(f64, f64)> = (0..=steps)
                .map(|s| {
                    let a = TAU * (s as f64 / steps as f64);
                    (cx + radius * a.cos(), cy + radius * a.sin())
                })
                .collect();
            self.stroke_path(&pts, color);
            return;
        }

        // Large ring: intersect it with every row and column instead of walking the
        // whole circumference, so the cost follows the surface size.
        let mut dots = Vec::new();
        let r2 = radius * radius;
        for y in 0..self.h {
            let dy = y as f64 + 0.5 - cy;
            if dy.abs() <= radius {
                let dx = (r2 - dy * dy).sqrt();
                for x in [cx - dx, cx + dx] {
                    if (0.0..w).contains(&x) {
                        dots.push((x.floor() as i32, y as i32));
                    }
                }
            }
        }
        for x in 0..self.w {
            let dx = x as f64 + 0.5 - cx;
            if dx.abs() <= radius {
                let dy = (r2 - dx * dx).sqrt();
                for y in [cy - dy, cy + dy] {
                    if (0.0..h).contains(&y) {
                        dots.push((x as i32, y.floor() as i32));
                    }
                }
            }
        }
        self.stroke_dots(dots, color);
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgba) {
        if radius <= 0.0 || !radius.is_finite() {
            return;
        }
        let r2 = radius * radius;
        // bounding box clipped to the raster
        let x0 = ((cx - radius).floor() as i32).max(0);
        let x1 = ((cx + radius).ceil() as i32).min(self.w as i32 - 1);
        let y0 = ((cy - radius).floor() as i32).max(0);
        let y1 = ((cy + radius).ceil() as i32).min(self.h as i32 - 1);
        for y in y0..=y1 {
            for x in x0..=x1 {
                // sample pixel centres
                let dx = x as f64 + 0.5 - cx;
                let dy = y as f64 + 0.5 - cy;
                if dx * dx + dy * dy <= r2 {
                    self.blend_over(x, y, color);
                }
            }
        }
    }

    fn stroke_path(&mut self, points: &[(f64, f64)], color: Rgba) {
        let mut dots = Vec::new();
        match points {
            [] => return,
            [p] => dots.push((p.0.floor() as i32, p.1.floor() as i32)),
            _ => {
                for seg in points.windows(2) {
                    line_dots(&mut dots, seg[0], seg[1]);
                }
            }
        }
        self.stroke_dots(dots, color);
    }

    fn fill_text(&mut self, x: f64, y: f64, text: &str, color: Rgba) {
        self.labels.push(Label { x, y, text: text.to_string(), color });
    }
}
