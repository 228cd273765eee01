use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::core::WindowSpec;
use crate::data::RunDirSource;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WindowConfig {
    #[serde(default = "WindowConfig::default_pre")]
    pub pre: usize,
    #[serde(default = "WindowConfig::default_post")]
    pub post: usize,
}

impl WindowConfig {
    fn default_pre() -> usize {
        15
    }
    fn default_post() -> usize {
        30
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            pre: Self::default_pre(),
            post: Self::default_post(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PathsConfig {
    /// Ensemble directory holding the event table. Per-run directories are
    /// derived from it by replacing `_ensemble` with `_<run_tag>_runNN`.
    #[serde(default = "PathsConfig::default_base_dir")]
    pub base_dir: String,
    #[serde(default = "PathsConfig::default_run_tag")]
    pub run_tag: String,
    #[serde(default = "PathsConfig::default_timeseries_file")]
    pub timeseries_file: String,
    /// Where charts are written. Defaults to `base_dir`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<String>,
}

impl PathsConfig {
    fn default_base_dir() -> String {
        "outputs/U25_FULL_ensemble".to_string()
    }
    fn default_run_tag() -> String {
        "N10".to_string()
    }
    fn default_timeseries_file() -> String {
        "timeseries.csv".to_string()
    }

    pub fn event_table(&self) -> PathBuf {
        Path::new(&self.base_dir).join(format!("{}_tau_delay.csv", self.run_tag))
    }

    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(self.out_dir.as_deref().unwrap_or(&self.base_dir))
    }

    pub fn series_source(&self) -> RunDirSource {
        RunDirSource::new(&self.base_dir, &self.run_tag).with_file_name(&self.timeseries_file)
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            base_dir: Self::default_base_dir(),
            run_tag: Self::default_run_tag(),
            timeseries_file: Self::default_timeseries_file(),
            out_dir: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ImageFormat {
    #[default]
    Svg,
    Png,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Svg => "svg",
            ImageFormat::Png => "png",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: ImageFormat,
    #[serde(default = "OutputConfig::default_hist_size")]
    pub hist_size: (u32, u32),
    #[serde(default = "OutputConfig::default_curve_size")]
    pub curve_size: (u32, u32),
    #[serde(default = "OutputConfig::default_write_csv")]
    pub write_csv: bool,
}

impl OutputConfig {
    fn default_hist_size() -> (u32, u32) {
        (620, 420)
    }
    fn default_curve_size() -> (u32, u32) {
        (950, 400)
    }
    fn default_write_csv() -> bool {
        true
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: ImageFormat::default(),
            hist_size: Self::default_hist_size(),
            curve_size: Self::default_curve_size(),
            write_csv: Self::default_write_csv(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl AppConfig {
    pub fn window_spec(&self) -> WindowSpec {
        WindowSpec::new(self.window.pre, self.window.post)
    }

    pub fn load_or_default(path: &str) -> Self {
        let path_obj = Path::new(path);
        if path_obj.exists() {
            match fs::read_to_string(path_obj) {
                Ok(contents) => match toml::from_str(&contents) {
                    Ok(cfg) => return cfg,
                    Err(err) => {
                        warn!("Failed to parse config {path}: {err}. Using defaults.");
                    }
                },
                Err(err) => {
                    warn!("Failed to read config {path}: {err}. Using defaults.");
                }
            }
            return Self::default();
        }

        // File does not exist: write defaults as a commented template.
        let default_cfg = Self::default();
        match toml::to_string_pretty(&default_cfg) {
            Ok(text) => {
                if let Err(err) = fs::write(path_obj, commented_template(&text)) {
                    warn!("Failed to write default config to {path}: {err}");
                } else {
                    info!("Wrote default config to {path}");
                }
            }
            Err(err) => warn!("Failed to serialize default config: {err}"),
        }
        default_cfg
    }
}

fn commented_template(text: &str) -> String {
    let mut commented = String::new();
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || (trimmed.starts_with('[') && trimmed.ends_with(']')) {
            commented.push_str(line);
        } else {
            commented.push_str("# ");
            commented.push_str(line);
        }
        commented.push('\n');
    }
    commented
}
