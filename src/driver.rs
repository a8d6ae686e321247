//! Frame loop lifecycle.
//!
//! The driver never owns a timer. A [`FrameScheduler`] hands out frame tokens and the
//! host calls [`AnimationDriver::on_frame`] when one comes due; each tick schedules the
//! next, so the chain runs until stopped. Tokens from a cancelled chain are ignored.

use crate::error::{OrbitError, Result};
use crate::render::SceneRenderer;
use crate::surface::Surface;
use crate::system::PlanetarySystem;
use crate::viewport::Viewport;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameToken(pub u64);

pub trait FrameScheduler {
    /// Monotonic time since an arbitrary origin.
    fn now(&self) -> Duration;
    fn schedule_next_frame(&mut self) -> FrameToken;
    fn cancel_frame(&mut self, token: FrameToken);
}

/// Lazily hands out the drawing surface, or `None` while there isn't one.
pub trait SurfaceSource {
    type Surface: Surface + ?Sized;
    fn acquire(&mut self) -> Option<&mut Self::Surface>;
}

/// Identifies one `start()`; stopping with an older handle does nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationHandle {
    generation: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Running,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TickOutcome {
    Rendered { elapsed: f64 },
    SurfaceUnavailable,
    /// Viewport could not be fitted; the chain continues.
    Skipped(OrbitError),
    /// Token does not belong to the live chain.
    Stale,
}

#[derive(Clone, Copy, Debug)]
struct Run {
    handle: AnimationHandle,
    start: Duration,
    pending: Option<FrameToken>,
}

pub struct AnimationDriver {
    renderer: SceneRenderer,
    padding: f64,
    generation: u64,
    run: Option<Run>,
}

impl AnimationDriver {
    pub fn new(renderer: SceneRenderer, padding: f64) -> Self {
        Self { renderer, padding, generation: 0, run: None }
    }

    pub fn state(&self) -> DriverState {
        if self.run.is_some() {
            DriverState::Running
        } else {
            DriverState::Idle
        }
    }

    pub fn renderer_mut(&mut self) -> &mut SceneRenderer {
        &mut self.renderer
    }

    /// Seconds since the live chain started.
    pub fn elapsed<F: FrameScheduler + ?Sized>(&self, sched: &F) -> Option<f64> {
        self.run.map(|r| sched.now().saturating_sub(r.start).as_secs_f64())
    }

    /// Begin a fresh chain with `elapsed = 0`. A chain already running is cancelled first.
    pub fn start<F: FrameScheduler + ?Sized>(&mut self, sched: &mut F) -> AnimationHandle {
        if let Some(prev) = self.run.take() {
            if let Some(tok) = prev.pending {
                sched.cancel_frame(tok);
            }
        }
        self.generation += 1;
        let handle = AnimationHandle { generation: self.generation };
        let start = sched.now();
        let pending = Some(sched.schedule_next_frame());
        self.run = Some(Run { handle, start, pending });
        info!(generation = self.generation, "animation started");
        handle
    }

    pub fn stop<F: FrameScheduler + ?Sized>(&mut self, handle: AnimationHandle, sched: &mut F) {
        if self.run.map(|r| r.handle) == Some(handle) {
            self.cancel(sched);
        }
    }

    /// Stop whatever chain is live. No-op when idle.
    pub fn cancel<F: FrameScheduler + ?Sized>(&mut self, sched: &mut F) {
        if let Some(run) = self.run.take() {
            if let Some(tok) = run.pending {
                sched.cancel_frame(tok);
            }
            info!(generation = run.handle.generation, "animation stopped");
        }
    }

    /// One tick: draw the current snapshot of `system`, then schedule the next frame.
    ///
    /// A missing surface is not an error here; the next tick tries again.
    pub fn on_frame<F, Src>(
        &mut self,
        token: FrameToken,
        sched: &mut F,
        source: &mut Src,
        system: &PlanetarySystem,
    ) -> TickOutcome
    where
        F: FrameScheduler + ?Sized,
        Src: SurfaceSource + ?Sized,
    {
        let Some(run) = self.run.as_mut() else {
            return TickOutcome::Stale;
        };
        if run.pending != Some(token) {
            return TickOutcome::Stale;
        }
        run.pending = None;
        let elapsed = sched.now().saturating_sub(run.start).as_secs_f64();

        let outcome = match draw(&self.renderer, self.padding, source, system, elapsed) {
            Ok(()) => TickOutcome::Rendered { elapsed },
            Err(OrbitError::SurfaceUnavailable) => {
                debug!(elapsed, "no surface this tick");
                TickOutcome::SurfaceUnavailable
            }
            Err(e) => {
                warn!(error = %e, "frame skipped");
                TickOutcome::Skipped(e)
            }
        };

        if let Some(run) = self.run.as_mut() {
            run.pending = Some(sched.schedule_next_frame());
        }
        outcome
    }
}

fn draw<Src: SurfaceSource + ?Sized>(
    renderer: &SceneRenderer,
    padding: f64,
    source: &mut Src,
    system: &PlanetarySystem,
    elapsed: f64,
) -> Result<()> {
    match source.acquire() {
        Some(surface) if surface.width() > 0 && surface.height() > 0 => {
            let vp = Viewport::fit(
                &system.distances(),
                surface.width() as f64,
                surface.height() as f64,
                padding,
            )?;
            renderer.render(Some(surface), system.planets(), elapsed, &vp)
        }
        _ => Err(OrbitError::SurfaceUnavailable),
    }
}

/// Wall-clock scheduler capped at a fixed frame rate.
pub struct FramePump {
    origin: Instant,
    frame_dt: Duration,
    next_id: u64,
    pending: Option<(FrameToken, Instant)>,
    last_due: Option<Instant>,
}

impl FramePump {
    pub fn new(fps_cap: u32) -> Self {
        let fps = fps_cap.clamp(1, 240);
        Self {
            origin: Instant::now(),
            frame_dt: Duration::from_secs_f64(1.0 / fps as f64),
            next_id: 0,
            pending: None,
            last_due: None,
        }
    }

    pub fn frame_dt(&self) -> Duration {
        self.frame_dt
    }

    /// Token of the pending frame once it is due, without blocking.
    pub fn poll_due(&mut self) -> Option<FrameToken> {
        let (tok, due) = self.pending?;
        let now = Instant::now();
        if now < due {
            return None;
        }
        self.pending = None;
        self.last_due = Some(now);
        Some(tok)
    }

    /// Time until the pending frame is due, capped at one frame.
    pub fn until_due(&self) -> Duration {
        match self.pending {
            Some((_, due)) => due.saturating_duration_since(Instant::now()).min(self.frame_dt),
            None => self.frame_dt,
        }
    }
}

impl FrameScheduler for FramePump {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn schedule_next_frame(&mut self) -> FrameToken {
        self.next_id += 1;
        let tok = FrameToken(self.next_id);
        let base = self.last_due.unwrap_or_else(Instant::now);
        self.pending = Some((tok, base + self.frame_dt));
        tok
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        if matches!(self.pending, Some((t, _)) if t == token) {
            self.pending = None;
        }
    }
}

/// Scheduler driven by hand, for deterministic replays and tests.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_id: u64,
    pending: Vec<FrameToken>,
    cancelled: Vec<FrameToken>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }

    /// Pops the oldest scheduled frame.
    pub fn next_frame(&mut self) -> Option<FrameToken> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.remove(0))
        }
    }

    pub fn pending(&self) -> &[FrameToken] {
        &self.pending
    }

    pub fn cancelled(&self) -> &[FrameToken] {
        &self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn now(&self) -> Duration {
        self.now
    }

    fn schedule_next_frame(&mut self) -> FrameToken {
        self.next_id += 1;
        let tok = FrameToken(self.next_id);
        self.pending.push(tok);
        tok
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        self.pending.retain(|t| *t != token);
        self.cancelled.push(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::PixelCanvas;
    use approx::assert_relative_eq;

    struct Always(PixelCanvas);
    impl SurfaceSource for Always {
        type Surface = PixelCanvas;
        fn acquire(&mut self) -> Option<&mut PixelCanvas> {
            Some(&mut self.0)
        }
    }

    fn setup() -> (AnimationDriver, ManualScheduler, Always, PlanetarySystem) {
        (
            AnimationDriver::new(SceneRenderer::default(), 20.0),
            ManualScheduler::new(),
            Always(PixelCanvas::new(120, 120)),
            PlanetarySystem::evenly_spaced(1.0, 3, "T").unwrap(),
        )
    }

    #[test]
    fn start_schedules_one_frame() {
        let (mut d, mut s, _, _) = setup();
        assert_eq!(d.state(), DriverState::Idle);
        d.start(&mut s);
        assert_eq!(d.state(), DriverState::Running);
        assert_eq!(s.pending().len(), 1);
    }

    #[test]
    fn ticks_report_elapsed_and_reschedule() {
        let (mut d, mut s, mut src, sys) = setup();
        s.advance(Duration::from_secs(7));
        d.start(&mut s);
        for i in 1..=3 {
            s.advance(Duration::from_millis(500));
            let tok = s.next_frame().unwrap();
            match d.on_frame(tok, &mut s, &mut src, &sys) {
                TickOutcome::Rendered { elapsed } => assert_relative_eq!(elapsed, 0.5 * i as f64),
                other => panic!("unexpected {other:?}"),
            }
            assert_eq!(s.pending().len(), 1);
        }
    }

    #[test]
    fn restart_cancels_previous_chain() {
        let (mut d, mut s, mut src, sys) = setup();
        let first = d.start(&mut s);
        let old_tok = s.pending()[0];
        let second = d.start(&mut s);
        assert_ne!(first, second);
        assert_eq!(s.cancelled(), &[old_tok]);
        assert_eq!(s.pending().len(), 1);
        assert_eq!(d.on_frame(old_tok, &mut s, &mut src, &sys), TickOutcome::Stale);
    }

    #[test]
    fn stop_is_idempotent_and_ignores_old_handles() {
        let (mut d, mut s, _, _) = setup();
        let first = d.start(&mut s);
        let second = d.start(&mut s);
        d.stop(first, &mut s);
        assert_eq!(d.state(), DriverState::Running);
        d.stop(second, &mut s);
        assert_eq!(d.state(), DriverState::Idle);
        assert!(s.pending().is_empty());
        d.stop(second, &mut s);
        d.cancel(&mut s);
        assert_eq!(d.state(), DriverState::Idle);
    }

    #[test]
    fn frame_after_stop_is_stale() {
        let (mut d, mut s, mut src, sys) = setup();
        d.start(&mut s);
        let tok = s.pending()[0];
        d.cancel(&mut s);
        assert_eq!(d.on_frame(tok, &mut s, &mut src, &sys), TickOutcome::Stale);
        assert!(s.pending().is_empty());
    }

    #[test]
    fn pump_cancels_only_matching_token() {
        let mut p = FramePump::new(30);
        let tok = p.schedule_next_frame();
        p.cancel_frame(FrameToken(tok.0 + 1));
        assert!(p.pending.is_some());
        p.cancel_frame(tok);
        assert!(p.pending.is_none());
        assert_eq!(p.poll_due(), None);
    }

    #[test]
    fn pump_releases_frame_once_due() {
        let mut p = FramePump::new(240);
        let tok = p.schedule_next_frame();
        std::thread::sleep(p.frame_dt() * 2);
        assert_eq!(p.poll_due(), Some(tok));
        assert_eq!(p.poll_due(), None);
    }
}
