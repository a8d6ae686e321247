use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Action {
    Quit,
    ToggleRunning,
    Restart,
    ScaleStarMass(f64),
    AddPlanets(i32),
}

/// Waits up to `timeout` for the first key, then drains whatever else is queued.
pub(crate) fn collect_input(timeout: Duration) -> anyhow::Result<Vec<KeyCode>> {
    let mut out = Vec::new();
    let mut wait = timeout;
    while event::poll(wait)? {
        wait = Duration::ZERO;
        if let Event::Key(k) = event::read()? {
            if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat {
                out.push(k.code);
                if out.len() >= 32 {
                    break;
                }
            }
        }
    }
    Ok(out)
}

pub(crate) fn map_key(key: KeyCode) -> Option<Action> {
    match key {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char(' ') => Some(Action::ToggleRunning),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Action::Restart),
        KeyCode::Char('+') | KeyCode::Char('=') => Some(Action::ScaleStarMass(1.25)),
        KeyCode::Char('-') => Some(Action::ScaleStarMass(0.8)),
        KeyCode::Char(']') => Some(Action::AddPlanets(1)),
        KeyCode::Char('[') => Some(Action::AddPlanets(-1)),
        _ => None,
    }
}
