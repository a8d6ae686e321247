//! Planetary system state owned by the caller.
//!
//! Periods are derived: every mutation that touches a distance or the star mass recomputes
//! them before returning, so a render never sees stale periods.

use crate::error::{OrbitError, Result};
use crate::orbit;
use tracing::debug;

pub const MAX_PLANETS: usize = 10;
pub const DEFAULT_STAR_MASS: f64 = 1.0;
pub const DEFAULT_LABEL: &str = "The Dave System";

#[derive(Clone, Debug, PartialEq)]
pub struct Planet {
    pub id: usize,
    pub name: String,
    distance: f64,
    period: f64,
}

impl Planet {
    pub fn distance(&self) -> f64 {
        self.distance
    }
    pub fn period(&self) -> f64 {
        self.period
    }
}

/// Emitted when planet count, star mass or label changes.
#[derive(Clone, Debug, PartialEq)]
pub struct SystemUpdate {
    pub number_of_planets: usize,
    pub star_mass: f64,
    pub system_info: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlanetarySystem {
    star_mass: f64,
    planets: Vec<Planet>,
    label: String,
}

fn default_name(id: usize) -> String {
    format!("Planet {}", id + 1)
}

fn check_count(n: usize) -> Result<()> {
    if n > MAX_PLANETS {
        return Err(OrbitError::invalid(format!(
            "at most {MAX_PLANETS} planets are supported, got {n}"
        )));
    }
    Ok(())
}

impl PlanetarySystem {
    pub fn new(star_mass: f64, distances: &[f64], label: impl Into<String>) -> Result<Self> {
        check_count(distances.len())?;
        let periods = orbit::periods_for(distances, star_mass)?;
        let planets = distances
            .iter()
            .zip(periods)
            .enumerate()
            .map(|(id, (&distance, period))| Planet {
                id,
                name: default_name(id),
                distance,
                period,
            })
            .collect();
        Ok(Self { star_mass, planets, label: label.into() })
    }

    /// Planet `i` (1-based) at `i` AU.
    pub fn evenly_spaced(star_mass: f64, count: usize, label: impl Into<String>) -> Result<Self> {
        let distances: Vec<f64> = (1..=count).map(|i| i as f64).collect();
        Self::new(star_mass, &distances, label)
    }

    pub fn star_mass(&self) -> f64 {
        self.star_mass
    }

    pub fn planets(&self) -> &[Planet] {
        &self.planets
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn distances(&self) -> Vec<f64> {
        self.planets.iter().map(|p| p.distance).collect()
    }

    pub fn periods(&self) -> Vec<f64> {
        self.planets.iter().map(|p| p.period).collect()
    }

    pub fn update_event(&self) -> SystemUpdate {
        SystemUpdate {
            number_of_planets: self.planets.len(),
            star_mass: self.star_mass,
            system_info: self.label.clone(),
        }
    }

    pub fn set_star_mass(&mut self, star_mass: f64) -> Result<Option<SystemUpdate>> {
        let periods = orbit::periods_for(&self.distances(), star_mass)?;
        if star_mass == self.star_mass {
            return Ok(None);
        }
        self.star_mass = star_mass;
        for (p, t) in self.planets.iter_mut().zip(periods) {
            p.period = t;
        }
        debug!(star_mass, "star mass changed");
        Ok(Some(self.update_event()))
    }

    pub fn set_distance(&mut self, index: usize, distance: f64) -> Result<()> {
        let period = orbit::period(distance, self.star_mass)?;
        let planet = self
            .planets
            .get_mut(index)
            .ok_or_else(|| OrbitError::invalid(format!("no planet at index {index}")))?;
        planet.distance = distance;
        planet.period = period;
        debug!(index, distance, period, "planet moved");
        Ok(())
    }

    /// Grow by appending planets one AU further out than the current last slot, or shrink
    /// by dropping from the end. Survivors keep their ids, names and distances.
    pub fn set_planet_count(&mut self, count: usize) -> Result<Option<SystemUpdate>> {
        check_count(count)?;
        if count == self.planets.len() {
            return Ok(None);
        }
        if count < self.planets.len() {
            self.planets.truncate(count);
        } else {
            for id in self.planets.len()..count {
                let distance = (id + 1) as f64;
                let period = orbit::period(distance, self.star_mass)?;
                self.planets.push(Planet { id, name: default_name(id), distance, period });
            }
        }
        debug!(count, "planet count changed");
        Ok(Some(self.update_event()))
    }

    pub fn set_label(&mut self, label: impl Into<String>) -> Option<SystemUpdate> {
        let label = label.into();
        if label == self.label {
            return None;
        }
        self.label = label;
        Some(self.update_event())
    }

    pub fn rename(&mut self, index: usize, name: impl Into<String>) -> Result<()> {
        let planet = self
            .planets
            .get_mut(index)
            .ok_or_else(|| OrbitError::invalid(format!("no planet at index {index}")))?;
        planet.name = name.into();
        Ok(())
    }
}

impl Default for PlanetarySystem {
    fn default() -> Self {
        Self { star_mass: DEFAULT_STAR_MASS, planets: Vec::new(), label: DEFAULT_LABEL.to_string() }
    }
}
