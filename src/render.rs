use crate::error::{OrbitError, Result};
use crate::orbit::angle_at;
use crate::surface::{Rgba, Surface};
use crate::system::Planet;
use crate::viewport::Viewport;

/// Samples behind the planet in a trail.
pub const TRAIL_STEPS: usize = 50;
/// Angular gap between trail samples, radians.
pub const TRAIL_STEP: f64 = 0.02;
/// Closest two grid rings may sit, in pixels. Denser grids skip whole AU steps.
pub const GRID_MIN_GAP_PX: f64 = 6.0;

/// blue, red, green, orange, purple, pink, cyan, magenta
pub const PALETTE: [Rgba; 8] = [
    Rgba::rgb(0, 0, 255),
    Rgba::rgb(255, 0, 0),
    Rgba::rgb(0, 128, 0),
    Rgba::rgb(255, 165, 0),
    Rgba::rgb(128, 0, 128),
    Rgba::rgb(255, 192, 203),
    Rgba::rgb(0, 255, 255),
    Rgba::rgb(255, 0, 255),
];

/// Color for the planet at 0-based `index`, wrapping after eight.
///
/// Counting starts at 0, so the first planet is blue and the second red.
pub fn planet_color(index: usize) -> Rgba {
    PALETTE[index % PALETTE.len()]
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneStyle {
    pub background: Rgba,
    pub star: Rgba,
    pub star_radius: f64,
    pub planet_radius: f64,
    pub orbit: Rgba,
    pub grid: Rgba,
    pub grid_label: Rgba,
    pub trail_alpha: f32,
}

impl Default for SceneStyle {
    fn default() -> Self {
        Self {
            background: Rgba::TRANSPARENT,
            star: Rgba::YELLOW,
            star_radius: 10.0,
            planet_radius: 5.0,
            orbit: Rgba::WHITE,
            grid: Rgba::rgba(80, 95, 120, 160),
            grid_label: Rgba::rgb(120, 120, 120),
            trail_alpha: 0.35,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SceneRenderer {
    pub style: SceneStyle,
}

impl SceneRenderer {
    pub fn new(style: SceneStyle) -> Self {
        Self { style }
    }

    /// One full draw pass. Output depends only on the arguments.
    pub fn render<S: Surface + ?Sized>(
        &self,
        surface: Option<&mut S>,
        planets: &[Planet],
        elapsed: f64,
        viewport: &Viewport,
    ) -> Result<()> {
        let surface = match surface {
            Some(s) if s.width() > 0 && s.height() > 0 => s,
            _ => return Err(OrbitError::SurfaceUnavailable),
        };
        let st = &self.style;

        surface.clear(st.background);
        self.draw_grid(surface, planets, viewport);

        surface.fill_circle(viewport.center_x, viewport.center_y, st.star_radius, st.star);

        for (i, p) in planets.iter().enumerate() {
            let color = planet_color(i);
            let r = viewport.radius_px(p.distance());
            surface.stroke_circle(viewport.center_x, viewport.center_y, r, st.orbit);

            let angle = angle_at(elapsed, p.period());
            let trail = trail_points(viewport, p.distance(), angle);
            surface.stroke_path(&trail, color.with_alpha(st.trail_alpha));

            let (x, y) = viewport.to_screen(p.distance(), angle);
            surface.fill_circle(x, y, st.planet_radius, color);
        }
        Ok(())
    }

    /// Rings every whole AU up to the outermost planet, thinned so they stay
    /// `GRID_MIN_GAP_PX` apart, and none past the surface corners.
    fn draw_grid<S: Surface + ?Sized>(&self, surface: &mut S, planets: &[Planet], vp: &Viewport) {
        if !(vp.scale_factor > 0.0) {
            return;
        }
        let max_d = planets.iter().map(|p| p.distance()).fold(0.0, f64::max).ceil();
        let stride = (GRID_MIN_GAP_PX / vp.scale_factor).ceil().max(1.0);
        let corner = (vp.width / 2.0).hypot(vp.height / 2.0);
        let mut n = stride;
        while n <= max_d {
            let r = vp.radius_px(n);
            if r > corner {
                break;
            }
            surface.stroke_circle(vp.center_x, vp.center_y, r, self.style.grid);
            surface.fill_text(vp.center_x + r + 2.0, vp.center_y, &format!("{n} AU"), self.style.grid_label);
            n += stride;
        }
    }
}

/// Current position followed by `TRAIL_STEPS` earlier positions.
fn trail_points(vp: &Viewport, distance: f64, angle: f64) -> Vec<(f64, f64)> {
    (0..=TRAIL_STEPS)
        .map(|k| vp.to_screen(distance, angle - k as f64 * TRAIL_STEP))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::PixelCanvas;
    use crate::system::PlanetarySystem;

    fn scene(distances: &[f64]) -> (PlanetarySystem, Viewport) {
        let sys = PlanetarySystem::new(1.0, distances, "T").unwrap();
        let vp = Viewport::fit(&sys.distances(), 200.0, 160.0, 20.0).unwrap();
        (sys, vp)
    }

    #[test]
    fn missing_surface_is_reported() {
        let (sys, vp) = scene(&[1.0]);
        let r = SceneRenderer::default().render::<PixelCanvas>(None, sys.planets(), 0.0, &vp);
        assert_eq!(r, Err(OrbitError::SurfaceUnavailable));
    }

    #[test]
    fn zero_sized_surface_is_unavailable() {
        let (sys, vp) = scene(&[1.0]);
        let mut c = PixelCanvas::new(0, 0);
        let r = SceneRenderer::default().render(Some(&mut c), sys.planets(), 0.0, &vp);
        assert_eq!(r, Err(OrbitError::SurfaceUnavailable));
    }

    #[test]
    fn same_inputs_same_pixels() {
        let (sys, vp) = scene(&[1.0, 2.0, 3.0]);
        let renderer = SceneRenderer::default();
        let mut a = PixelCanvas::new(200, 160);
        let mut b = PixelCanvas::new(200, 160);
        renderer.render(Some(&mut a), sys.planets(), 3.7, &vp).unwrap();
        renderer.render(Some(&mut b), sys.planets(), 3.7, &vp).unwrap();
        assert_eq!(a, b);
        // and again on an already-dirty canvas
        renderer.render(Some(&mut a), sys.planets(), 3.7, &vp).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn star_and_planet_markers_land_where_expected() {
        let (sys, vp) = scene(&[2.0]);
        let mut c = PixelCanvas::new(200, 160);
        SceneRenderer::default().render(Some(&mut c), sys.planets(), 0.0, &vp).unwrap();
        assert_eq!(c.pixel(100, 80), Some(Rgba::YELLOW));
        // angle 0: planet sits to the right of the star on the outer ring
        let (x, y) = vp.to_screen(2.0, 0.0);
        assert_eq!(c.pixel(x as u32, y as u32), Some(planet_color(0)));
    }

    #[test]
    fn grid_rings_are_labelled_up_to_ceiling() {
        let (sys, vp) = scene(&[0.7, 2.4]);
        let mut c = PixelCanvas::new(200, 160);
        SceneRenderer::default().render(Some(&mut c), sys.planets(), 0.0, &vp).unwrap();
        let texts: Vec<&str> = c.labels().iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["1 AU", "2 AU", "3 AU"]);
    }

    #[test]
    fn palette_wraps() {
        assert_eq!(planet_color(0), planet_color(PALETTE.len()));
        assert_eq!(planet_color(3), planet_color(PALETTE.len() + 3));
        assert_ne!(planet_color(0), planet_color(1));
        assert_eq!(planet_color(0), Rgba::rgb(0, 0, 255));
    }

    #[test]
    fn trail_is_translucent_planet_color() {
        let (sys, vp) = scene(&[2.0]);
        let style = SceneStyle { orbit: Rgba::TRANSPARENT, grid: Rgba::TRANSPARENT, ..SceneStyle::default() };
        let mut c = PixelCanvas::new(200, 160);
        SceneRenderer::new(style).render(Some(&mut c), sys.planets(), 0.0, &vp).unwrap();
        // ten samples behind the planet, well clear of its marker
        let (x, y) = vp.to_screen(2.0, -10.0 * TRAIL_STEP);
        let p = c.pixel(x as u32, y as u32).unwrap();
        let want = planet_color(0);
        assert_eq!((p.r, p.g, p.b), (want.r, want.g, want.b));
        assert_eq!(p.a, (255.0 * style.trail_alpha).round() as u8);
    }

    #[test]
    fn orbit_ring_sits_at_distance_times_scale() {
        let (sys, vp) = scene(&[2.0]);
        let mut c = PixelCanvas::new(200, 160);
        SceneRenderer::default().render(Some(&mut c), sys.planets(), 0.0, &vp).unwrap();
        // opposite side from the planet and its trail
        let (x, y) = vp.to_screen(2.0, std::f64::consts::PI);
        assert_eq!((x.floor(), y.floor()), (40.0, 80.0));
        assert_eq!(c.pixel(40, 80), Some(SceneStyle::default().orbit));
        assert_eq!(c.pixel(45, 80), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn extreme_distances_render_quickly() {
        for d in [1.0e-5, 1.0e5] {
            let (sys, vp) = scene(&[d]);
            let mut c = PixelCanvas::new(200, 160);
            let start = std::time::Instant::now();
            SceneRenderer::default().render(Some(&mut c), sys.planets(), 12.5, &vp).unwrap();
            let took = start.elapsed();
            assert!(took < std::time::Duration::from_millis(500), "{d} AU took {took:?}");
            assert!(c.labels().len() <= 20, "{d} AU drew {} labels", c.labels().len());
        }
    }

    #[test]
    fn grid_thins_out_when_rings_crowd() {
        // 60 px for 40 AU: 1.5 px per AU, so every fourth AU gets a ring
        let (sys, vp) = scene(&[40.0]);
        let mut c = PixelCanvas::new(200, 160);
        SceneRenderer::default().render(Some(&mut c), sys.planets(), 0.0, &vp).unwrap();
        let texts: Vec<&str> = c.labels().iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts.first(), Some(&"4 AU"));
        assert_eq!(texts.last(), Some(&"40 AU"));
        assert_eq!(texts.len(), 10);
    }

    #[test]
    fn trail_starts_at_planet_and_runs_backwards() {
        let vp = Viewport::fit(&[1.0], 100.0, 100.0, 10.0).unwrap();
        let pts = trail_points(&vp, 1.0, 1.0);
        assert_eq!(pts.len(), TRAIL_STEPS + 1);
        assert_eq!(pts[0], vp.to_screen(1.0, 1.0));
        assert_eq!(pts[TRAIL_STEPS], vp.to_screen(1.0, 1.0 - TRAIL_STEPS as f64 * TRAIL_STEP));
    }

    #[test]
    fn empty_system_draws_only_the_star() {
        let vp = Viewport::fit(&[], 100.0, 100.0, 10.0).unwrap();
        let mut c = PixelCanvas::new(100, 100);
        SceneRenderer::default().render(Some(&mut c), &[], 1.0, &vp).unwrap();
        assert!(c.labels().is_empty());
        assert_eq!(c.pixel(50, 50), Some(Rgba::YELLOW));
        assert_eq!(c.pixel(0, 0), Some(Rgba::TRANSPARENT));
    }
}
