use crate::render::SceneStyle;
use crate::viewport::DEFAULT_PADDING;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub fps_cap: u32,
    pub padding: f64,
    pub enable_color: bool,
    pub star_radius: f64,
    pub planet_radius: f64,
    pub trail_alpha: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fps_cap: 30,
            padding: DEFAULT_PADDING,
            enable_color: true,
            star_radius: 10.0,
            planet_radius: 5.0,
            trail_alpha: 0.35,
        }
    }
}

impl Settings {
    pub fn scene_style(&self) -> SceneStyle {
        SceneStyle {
            star_radius: self.star_radius.max(0.0),
            planet_radius: self.planet_radius.max(0.0),
            trail_alpha: self.trail_alpha.clamp(0.0, 1.0),
            ..SceneStyle::default()
        }
    }
}

pub fn default_settings_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from("com", "orbit-drawer", "OrbitDrawer")
        .context("could not resolve project directories")?;
    Ok(proj.config_dir().join("settings.json"))
}

/// Missing or unreadable files fall back to defaults. Only a missing file is silent.
pub fn load_settings(path: &Path) -> Settings {
    let s = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Settings::default();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read settings, using defaults");
            return Settings::default();
        }
    };
    match serde_json::from_str::<Settings>(&s) {
        Ok(v) => v,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring malformed settings");
            Settings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn logs_while(f: impl FnOnce()) -> String {
        let out = Captured::default();
        let writer = out.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = out.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("orbit-drawer-{}-{name}", std::process::id()))
    }

    #[test]
    fn missing_file_gives_defaults() {
        assert_eq!(load_settings(&scratch("nope.json")), Settings::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let p = scratch("partial.json");
        fs::write(&p, r#"{ "fps_cap": 60, "trail_alpha": 0.8 }"#).unwrap();
        let s = load_settings(&p);
        fs::remove_file(&p).ok();
        assert_eq!(s.fps_cap, 60);
        assert_eq!(s.trail_alpha, 0.8);
        assert_eq!(s.padding, DEFAULT_PADDING);
    }

    #[test]
    fn garbage_gives_defaults() {
        let p = scratch("garbage.json");
        fs::write(&p, "not json").unwrap();
        let s = load_settings(&p);
        fs::remove_file(&p).ok();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn style_clamps_out_of_range_values() {
        let s = Settings { trail_alpha: 4.0, star_radius: -1.0, ..Settings::default() };
        let st = s.scene_style();
        assert_eq!(st.trail_alpha, 1.0);
        assert_eq!(st.star_radius, 0.0);
    }

    #[test]
    fn unreadable_file_warns_and_gives_defaults() {
        // a directory exists but cannot be read as a file
        let p = scratch("settings-dir");
        fs::create_dir_all(&p).unwrap();
        let mut s = None;
        let logs = logs_while(|| s = Some(load_settings(&p)));
        fs::remove_dir(&p).ok();
        assert_eq!(s, Some(Settings::default()));
        assert!(logs.contains("WARN"), "{logs}");
        assert!(logs.contains("could not read settings"), "{logs}");
    }

    #[test]
    fn missing_file_is_not_a_warning() {
        let logs = logs_while(|| {
            load_settings(&scratch("absent.json"));
        });
        assert!(!logs.contains("WARN"), "{logs}");
        assert!(logs.contains("no settings file"), "{logs}");
    }
}
