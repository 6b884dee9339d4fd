use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

#[derive(Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub server_url: String,
    pub log_level: String,
    pub thumbnails_preload: usize,
    pub fetch_concurrency: usize,
    pub data_path: PathBuf,
}

pub struct AppConfigOverrides {
    pub server_url: Option<String>,
    pub log_level: Option<String>,
    pub thumbnails_preload: Option<usize>,
    pub fetch_concurrency: Option<usize>,
}

fn default_data_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".picseek")
}

impl AppConfig {
    pub fn load_from(path: Option<PathBuf>) -> Self {
        let mut builder = config::Config::builder();
        let path = match path {
            Some(p) => p,
            None => default_data_path().join("config"),
        };
        builder = builder.add_source(config::File::from(path).required(false));
        let cfg = builder.build().unwrap_or_default();

        let server_url = cfg
            .get_string("server_url")
            .unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());
        let log_level = cfg
            .get_string("log_level")
            .unwrap_or_else(|_| "info".to_string());
        let thumbnails_preload = cfg.get_int("thumbnails_preload").unwrap_or(20) as usize;
        let fetch_concurrency = cfg.get_int("fetch_concurrency").unwrap_or(4) as usize;
        let data_path = cfg
            .get_string("data_path")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_data_path());

        Self {
            server_url,
            log_level,
            thumbnails_preload,
            fetch_concurrency,
            data_path,
        }
    }

    pub fn apply_overrides(mut self, ov: &AppConfigOverrides) -> Self {
        if let Some(url) = &ov.server_url {
            self.server_url = url.clone();
        }
        if let Some(level) = &ov.log_level {
            self.log_level = level.clone();
        }
        if let Some(preload) = ov.thumbnails_preload {
            self.thumbnails_preload = preload;
        }
        if let Some(concurrency) = ov.fetch_concurrency {
            self.fetch_concurrency = concurrency;
        }
        self
    }

    pub fn save_to(&self, path: Option<PathBuf>) -> std::io::Result<()> {
        let path = match path {
            Some(p) => p,
            None => default_data_path().join("config"),
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = toml::to_string(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AppConfig::load_from(Some(dir.path().join("missing")));
        assert_eq!(cfg.server_url, DEFAULT_SERVER_URL);
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.thumbnails_preload, 20);
        assert_eq!(cfg.fetch_concurrency, 4);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        let cfg = AppConfig {
            server_url: "http://imagebox:8080".into(),
            log_level: "debug".into(),
            thumbnails_preload: 8,
            fetch_concurrency: 2,
            data_path: dir.path().to_path_buf(),
        };
        cfg.save_to(Some(path.clone())).unwrap();

        let loaded = AppConfig::load_from(Some(path));
        assert_eq!(loaded.server_url, "http://imagebox:8080");
        assert_eq!(loaded.log_level, "debug");
        assert_eq!(loaded.thumbnails_preload, 8);
        assert_eq!(loaded.fetch_concurrency, 2);
        assert_eq!(loaded.data_path, dir.path().to_path_buf());
    }

    #[test]
    fn test_overrides_win() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AppConfig::load_from(Some(dir.path().join("missing"))).apply_overrides(
            &AppConfigOverrides {
                server_url: Some("http://other:9000".into()),
                log_level: None,
                thumbnails_preload: Some(5),
                fetch_concurrency: None,
            },
        );
        assert_eq!(cfg.server_url, "http://other:9000");
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.thumbnails_preload, 5);
    }
}
