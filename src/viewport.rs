use crate::error::{OrbitError, Result};

/// Pixels per AU when there is nothing to fit.
pub const DEFAULT_SCALE: f64 = 50.0;
/// Margin kept clear around the outermost ring.
pub const DEFAULT_PADDING: f64 = 20.0;

/// Pixels per AU such that the largest distance fits inside the surface minus `padding`.
///
/// `max_d * scale <= min(width, height) / 2 - padding` holds whenever the surface is at least
/// `2 * padding` across. Below that the radius budget is clamped to zero rather than going
/// negative, so every ring collapses onto the centre.
pub fn compute_scale(distances: &[f64], width: f64, height: f64, padding: f64) -> Result<f64> {
    if !(width > 0.0 && height > 0.0) {
        return Err(OrbitError::invalid(format!(
            "viewport must be positive, got {width}x{height}"
        )));
    }
    if distances.is_empty() {
        return Ok(DEFAULT_SCALE);
    }
    let max_d = distances.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max_d.is_finite() || max_d <= 0.0 {
        return Err(OrbitError::invalid(format!("largest distance must be positive, got {max_d}")));
    }
    let max_radius_px = (width.min(height) / 2.0 - padding).max(0.0);
    Ok(max_radius_px / max_d)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub center_x: f64,
    pub center_y: f64,
    pub scale_factor: f64,
    pub padding: f64,
}

impl Viewport {
    pub fn fit(distances: &[f64], width: f64, height: f64, padding: f64) -> Result<Self> {
        let scale_factor = compute_scale(distances, width, height, padding)?;
        Ok(Self {
            width,
            height,
            center_x: width / 2.0,
            center_y: height / 2.0,
            scale_factor,
            padding,
        })
    }

    /// Physical distance to on-surface radius.
    pub fn radius_px(&self, distance: f64) -> f64 {
        distance * self.scale_factor
    }

    /// Polar (AU, radians) to surface coordinates around the centre.
    pub fn to_screen(&self, distance: f64, angle: f64) -> (f64, f64) {
        let r = self.radius_px(distance);
        (self.center_x + r * angle.cos(), self.center_y + r * angle.sin())
    }
}
