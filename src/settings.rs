use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub feed: FeedSettings,
    #[serde(default)]
    pub globe: GlobeSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    pub url: String,              // Traffic server root or full /get_traffic URL
    pub poll_interval_ms: u64,    // Cycle cadence
    pub marker_ttl_ms: u64,       // Marker lifetime before eviction
    pub max_markers: usize,       // Oldest markers are displaced beyond this
    pub request_timeout_ms: u64,  // 0 = wait for the transport to give up
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:5000".to_string(),
            poll_interval_ms: 2000,
            marker_ttl_ms: 10_000,
            max_markers: 5000,
            request_timeout_ms: 5000,
        }
    }
}

impl FeedSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(100))
    }

    pub fn marker_ttl(&self) -> Duration {
        Duration::from_millis(self.marker_ttl_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GlobeSettings {
    pub tilt_deg: f32,           // Initial tilt toward the viewer
    pub spin_speed: f32,         // Radians per second
    pub frame_ms: u64,           // Display refresh period
    pub color_scheme: u8,        // 0-9, same as the !..) keys
    pub evict_interval_ms: u64,  // Headless eviction timer
}

impl Default for GlobeSettings {
    fn default() -> Self {
        Self {
            tilt_deg: 20.0,
            spin_speed: 0.15,
            frame_ms: 33,
            color_scheme: 0,
            evict_interval_ms: 250,
        }
    }
}

impl GlobeSettings {
    pub fn frame_period(&self) -> Duration {
        Duration::from_millis(self.frame_ms.clamp(5, 1000))
    }

    pub fn evict_interval(&self) -> Duration {
        Duration::from_millis(self.evict_interval_ms.max(10))
    }
}

impl Settings {
    /// Load from `explicit` or the default config path. A missing file gives
    /// defaults; an unreadable or malformed one is logged and also gives defaults.
    pub fn load(explicit: Option<&Path>) -> Self {
        let path = explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::config_path);
        if !path.exists() {
            if explicit.is_some() {
                tracing::warn!(path = %path.display(), "config file not found, using defaults");
            }
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(settings) => {
                    tracing::debug!(path = %path.display(), "loaded config");
                    settings
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read config, using defaults");
                Self::default()
            }
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("trafficglobe")
            .join("config.toml")
    }
}
