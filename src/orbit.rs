//! Simplified Kepler law: `T = sqrt(a³ / M)` with `a` in AU and `M` in solar masses.

use crate::error::{OrbitError, Result};
use std::f64::consts::TAU;

fn check_positive(what: &str, v: f64) -> Result<()> {
    if !v.is_finite() || v <= 0.0 {
        return Err(OrbitError::invalid(format!("{what} must be positive, got {v}")));
    }
    Ok(())
}

pub fn period(distance: f64, star_mass: f64) -> Result<f64> {
    check_positive("star mass", star_mass)?;
    check_positive("distance", distance)?;
    let t = (distance.powi(3) / star_mass).sqrt();
    if !t.is_finite() {
        return Err(OrbitError::invalid(format!(
            "period overflows for distance {distance} and star mass {star_mass}"
        )));
    }
    Ok(t)
}

/// One period per distance, same order.
pub fn periods_for(distances: &[f64], star_mass: f64) -> Result<Vec<f64>> {
    check_positive("star mass", star_mass)?;
    distances.iter().map(|&d| period(d, star_mass)).collect()
}

/// Angular position after `elapsed` seconds of animation time, in `[0, 2π)`.
///
/// One full revolution per `period` seconds. This compresses time heavily on purpose:
/// an Earth-like planet goes round once a second.
pub fn angle_at(elapsed: f64, period: f64) -> f64 {
    let turns = (elapsed / period).rem_euclid(1.0);
    // rem_euclid can round up to exactly 1.0 for tiny negative inputs
    if turns >= 1.0 {
        0.0
    } else {
        turns * TAU
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn unit_mass_unit_distance_is_one() {
        assert_relative_eq!(period(1.0, 1.0).unwrap(), 1.0);
    }

    #[test]
    fn heavier_star_shortens_period() {
        let light = period(2.0, 0.5).unwrap();
        let heavy = period(2.0, 2.0).unwrap();
        assert!(heavy < light);
    }

    #[test]
    fn farther_planet_takes_longer() {
        let mut prev = 0.0;
        for d in [0.1, 0.39, 1.0, 5.2, 30.07] {
            let t = period(d, 1.0).unwrap();
            assert!(t > prev);
            prev = t;
        }
    }

    #[test]
    fn rejects_non_positive_inputs() {
        assert!(matches!(period(1.0, 0.0), Err(OrbitError::InvalidInput(_))));
        assert!(matches!(period(1.0, -2.0), Err(OrbitError::InvalidInput(_))));
        assert!(matches!(period(0.0, 1.0), Err(OrbitError::InvalidInput(_))));
        assert!(matches!(period(f64::NAN, 1.0), Err(OrbitError::InvalidInput(_))));
        assert!(matches!(periods_for(&[], 0.0), Err(OrbitError::InvalidInput(_))));
        assert!(matches!(periods_for(&[1.0, -1.0], 1.0), Err(OrbitError::InvalidInput(_))));
    }

    #[test]
    fn periods_for_keeps_order() {
        let ds = [3.0, 1.0, 2.0];
        let ts = periods_for(&ds, 2.5).unwrap();
        assert_eq!(ts.len(), ds.len());
        for (d, t) in ds.iter().zip(&ts) {
            assert_relative_eq!(*t, period(*d, 2.5).unwrap());
        }
    }

    #[test]
    fn angle_wraps_every_period() {
        let p = 2.828_427_124_746_19;
        let a0 = angle_at(0.0, p);
        for k in 1..6 {
            let a = angle_at(k as f64 * p, p);
            let diff = (a - a0).abs().min(TAU - (a - a0).abs());
            assert!(diff < 1e-9, "k={k} a={a}");
        }
    }

    #[test]
    fn angle_stays_in_range() {
        for i in 0..200 {
            let t = i as f64 * 0.137 - 5.0;
            let a = angle_at(t, 1.7);
            assert!((0.0..TAU).contains(&a));
        }
        assert_relative_eq!(angle_at(0.25, 1.0), TAU / 4.0);
    }
}
