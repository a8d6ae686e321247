use crate::input::{collect_input, map_key, Action};
use crate::term::{canvas_to_cells, draw_text, to_color, Terminal, PANEL_W};
use chrono::{DateTime, Local};
use crossterm::style::Color;
use orbit_drawer::{
    driver::{FramePump, FrameScheduler},
    render::planet_color,
    settings::Settings,
    system::MAX_PLANETS,
    AnimationDriver, AnimationHandle, DriverState, PlanetarySystem, SceneRenderer, SystemUpdate,
    TickOutcome,
};
use tracing::info;

pub(crate) const TITLE: &str = "Orbital Period Calculator";
pub(crate) const MIN_STAR_MASS: f64 = 0.1;
pub(crate) const MAX_STAR_MASS: f64 = 100.0;

/// Everything the keys act on, kept apart from the terminal so it can be driven in tests.
pub(crate) struct Controller {
    pub(crate) system: PlanetarySystem,
    pub(crate) driver: AnimationDriver,
    pub(crate) handle: Option<AnimationHandle>,
    pub(crate) header: SystemUpdate,
    pub(crate) should_quit: bool,
}

impl Controller {
    pub(crate) fn new(system: PlanetarySystem, settings: &Settings) -> Self {
        let header = system.update_event();
        let driver = AnimationDriver::new(SceneRenderer::new(settings.scene_style()), settings.padding);
        Self { system, driver, handle: None, header, should_quit: false }
    }

    pub(crate) fn start<F: FrameScheduler + ?Sized>(&mut self, sched: &mut F) {
        self.handle = Some(self.driver.start(sched));
    }

    fn publish(&mut self, update: Option<SystemUpdate>) {
        if let Some(u) = update {
            info!(planets = u.number_of_planets, star_mass = u.star_mass, system = %u.system_info, "system updated");
            self.header = u;
        }
    }

    pub(crate) fn apply<F: FrameScheduler + ?Sized>(
        &mut self,
        action: Action,
        sched: &mut F,
    ) -> anyhow::Result<()> {
        match action {
            Action::Quit => self.should_quit = true,
            Action::ToggleRunning => match (self.driver.state(), self.handle) {
                (DriverState::Running, Some(h)) => {
                    self.driver.stop(h, sched);
                    self.handle = None;
                }
                _ => self.start(sched),
            },
            Action::Restart => self.start(sched),
            Action::ScaleStarMass(f) => {
                let m = (self.system.star_mass() * f).clamp(MIN_STAR_MASS, MAX_STAR_MASS);
                let u = self.system.set_star_mass(m)?;
                self.publish(u);
            }
            Action::AddPlanets(d) => {
                let n = (self.system.planets().len() as i32 + d).clamp(1, MAX_PLANETS as i32);
                let u = self.system.set_planet_count(n as usize)?;
                self.publish(u);
            }
        }
        Ok(())
    }
}

pub(crate) struct App {
    settings: Settings,
    ctl: Controller,
    pump: FramePump,
    term: Terminal,
    last_tick: Option<TickOutcome>,
    launched: DateTime<Local>,
}

impl App {
    fn init(system: PlanetarySystem, settings: Settings) -> anyhow::Result<Self> {
        let pump = FramePump::new(settings.fps_cap);
        let ctl = Controller::new(system, &settings);
        let term = Terminal::begin()?;
        Ok(Self { settings, ctl, pump, term, last_tick: None, launched: Local::now() })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        self.ctl.start(&mut self.pump);

        while !self.ctl.should_quit {
            self.term.resize_if_needed()?;

            for key in collect_input(self.pump.until_due())? {
                if let Some(action) = map_key(key) {
                    self.ctl.apply(action, &mut self.pump)?;
                }
            }

            if let Some(tok) = self.pump.poll_due() {
                let outcome = self.ctl.driver.on_frame(tok, &mut self.pump, &mut self.term, &self.ctl.system);
                self.last_tick = Some(outcome);
                self.draw_frame()?;
            } else if self.ctl.driver.state() == DriverState::Idle {
                // keep the panel live while paused
                self.draw_frame()?;
            }
        }
        Ok(())
    }

    fn draw_frame(&mut self) -> anyhow::Result<()> {
        let bg = Color::Black;
        self.term.cur.clear(bg);
        canvas_to_cells(&self.term.canvas, &mut self.term.cur, self.term.area, self.settings.enable_color, bg);
        self.draw_header(bg);
        self.draw_panel(bg);
        self.term.present()
    }

    fn draw_header(&mut self, bg: Color) {
        let h = &self.ctl.header;
        let line = format!(
            "{TITLE}  |  {}  |  Planets: {}  |  Star mass: {:.2} M☉",
            h.system_info, h.number_of_planets, h.star_mass
        );
        draw_text(&mut self.term.cur, 1, 0, &line, Color::White, bg);
    }

    fn draw_panel(&mut self, bg: Color) {
        let fg = Color::Rgb { r: 220, g: 220, b: 220 };
        let dim = Color::Rgb { r: 120, g: 120, b: 120 };
        let edge = Color::Rgb { r: 80, g: 95, b: 120 };
        let buf = &mut self.term.cur;
        let bottom = buf.h;

        for y in 1..bottom {
            draw_text(buf, PANEL_W.saturating_sub(1), y, "│", edge, bg);
        }

        let state = match (self.ctl.driver.state(), &self.last_tick) {
            (DriverState::Idle, _) => "stopped",
            (_, Some(TickOutcome::SurfaceUnavailable)) => "waiting for room",
            _ => "running",
        };
        let elapsed = self.ctl.driver.elapsed(&self.pump).unwrap_or(0.0);
        let mut y = 2u16;
        for (text, color) in [
            (format!("Clock:   {}", Local::now().format("%H:%M:%S")), dim),
            (format!("Since:   {}", self.launched.format("%H:%M:%S")), dim),
            (format!("State:   {state}"), dim),
            (format!("Elapsed: {elapsed:.1} s"), dim),
        ] {
            draw_text(buf, 1, y, &text, color, bg);
            y += 1;
        }

        y += 1;
        draw_text(buf, 1, y, "Orbital periods", fg, bg);
        y += 1;
        for (i, p) in self.ctl.system.planets().iter().enumerate() {
            if y >= bottom {
                return;
            }
            draw_text(buf, 1, y, "●", to_color(planet_color(i)), bg);
            let line = format!("{:<9} {:>5.2} AU {:>7.3}", p.name, p.distance(), p.period());
            draw_text(buf, 3, y, &line, dim, bg);
            y += 1;
        }

        y += 1;
        for line in [
            "Controls",
            "space  stop/start",
            "r      restart clock",
            "+/-    star mass",
            "[/]    planets",
            "q      quit",
        ] {
            if y >= bottom {
                return;
            }
            draw_text(buf, 1, y, line, if line == "Controls" { fg } else { dim }, bg);
            y += 1;
        }
    }
}

pub(crate) fn run(system: PlanetarySystem, settings: Settings) -> anyhow::Result<()> {
    let mut app = App::init(system, settings)?;
    let res = app.run();
    app.term.end()?;
    res
}
