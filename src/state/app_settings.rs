use log::LevelFilter;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    /// Grade label preselected on the teams page, e.g. "High School".
    pub default_grade: Option<String>,
    pub default_region: Option<String>,
}

/// On-disk shape of `settings.json`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SettingsFile {
    full_screen: Option<bool>,
    log_level: Option<String>,
    default_grade: Option<String>,
    default_region: Option<String>,
}

impl AppSettings {
    /// Settings file first, then `VEXTUI_*` environment overrides.
    ///
    /// An unreadable settings file is returned as a message rather than
    /// logged, since the log level is not applied yet.
    pub fn load() -> (Self, Option<String>) {
        let (file, problem) = match settings_path() {
            Some(path) => read_file(&path),
            None => (SettingsFile::default(), None),
        };
        (Self::resolve(file, |key| std::env::var(key).ok()), problem)
    }

    fn resolve(file: SettingsFile, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let env = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let full_screen = env("VEXTUI_FULL_SCREEN")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .or(file.full_screen)
            .unwrap_or(false);
        let log_level = env("VEXTUI_LOG_LEVEL")
            .or(file.log_level)
            .and_then(|v| LevelFilter::from_str(&v).ok());

        Self {
            full_screen,
            log_level,
            default_grade: file.default_grade.filter(|g| !g.trim().is_empty()),
            default_region: file.default_region.filter(|r| !r.trim().is_empty()),
        }
    }
}

/// A missing file is not a problem; malformed JSON is.
fn read_file(path: &Path) -> (SettingsFile, Option<String>) {
    let Ok(content) = std::fs::read_to_string(path) else {
        return (SettingsFile::default(), None);
    };
    match serde_json::from_str::<SettingsFile>(&content) {
        Ok(file) => (file, None),
        Err(e) => (
            SettingsFile::default(),
            Some(format!("ignoring invalid settings file {}: {e}", path.display())),
        ),
    }
}

fn settings_path() -> Option<PathBuf> {
    if let Ok(config_dir) = std::env::var("XDG_CONFIG_HOME")
        && !config_dir.trim().is_empty()
    {
        return Some(PathBuf::from(config_dir).join("vextui").join("settings.json"));
    }
    if let Ok(home) = std::env::var("HOME")
        && !home.trim().is_empty()
    {
        return Some(PathBuf::from(home).join(".config").join("vextui").join("settings.json"));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_values_apply_without_env() {
        let file: SettingsFile = serde_json::from_str(
            r#"{"full_screen": true, "log_level": "debug", "default_grade": "Middle School"}"#,
        )
        .unwrap();
        let settings = AppSettings::resolve(file, |_| None);
        assert!(settings.full_screen);
        assert_eq!(settings.log_level, Some(LevelFilter::Debug));
        assert_eq!(settings.default_grade.as_deref(), Some("Middle School"));
        assert_eq!(settings.default_region, None);
    }

    #[test]
    fn env_overrides_file() {
        let file = SettingsFile {
            full_screen: Some(true),
            log_level: Some("debug".into()),
            ..Default::default()
        };
        let settings = AppSettings::resolve(file, |key| match key {
            "VEXTUI_FULL_SCREEN" => Some("false".into()),
            "VEXTUI_LOG_LEVEL" => Some("WARN".into()),
            _ => None,
        });
        assert!(!settings.full_screen);
        assert_eq!(settings.log_level, Some(LevelFilter::Warn));
    }

    fn scratch_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("vextui-{}-{name}", std::process::id()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn malformed_file_is_reported_not_applied() {
        let path = scratch_file("broken.json", r#"{"full_screen": tru"#);
        let (file, problem) = read_file(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(file.full_screen.is_none());
        let problem = problem.unwrap();
        assert!(problem.starts_with("ignoring invalid settings file"));
        assert!(problem.contains("broken.json"));
    }

    #[test]
    fn missing_or_valid_file_has_no_problem() {
        let (_, problem) = read_file(Path::new("/nonexistent/vextui/settings.json"));
        assert!(problem.is_none());

        let path = scratch_file("valid.json", r#"{"log_level": "info"}"#);
        let (file, problem) = read_file(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(problem.is_none());
        assert_eq!(file.log_level.as_deref(), Some("info"));
    }

    #[test]
    fn unknown_level_is_ignored() {
        let settings = AppSettings::resolve(SettingsFile::default(), |key| {
            (key == "VEXTUI_LOG_LEVEL").then(|| "chatty".to_string())
        });
        assert_eq!(settings, AppSettings::default());
    }
}
