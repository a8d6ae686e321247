//! Animated schematic orrery.
//!
//! Periods come from a simplified Kepler law ([`orbit`]), distances are fitted to the
//! drawing surface ([`viewport`]), and [`driver::AnimationDriver`] redraws the scene
//! ([`render`]) once per frame onto any [`surface::Surface`].

pub mod driver;
pub mod error;
pub mod orbit;
pub mod render;
pub mod settings;
pub mod surface;
pub mod system;
pub mod viewport;

pub use driver::{AnimationDriver, AnimationHandle, DriverState, FrameScheduler, SurfaceSource, TickOutcome};
pub use error::{OrbitError, Result};
pub use render::{SceneRenderer, SceneStyle};
pub use surface::{PixelCanvas, Rgba, Surface};
pub use system::{Planet, PlanetarySystem, SystemUpdate};
pub use viewport::Viewport;
