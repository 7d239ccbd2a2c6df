// Application configuration.
//
// Precedence: built-in defaults < JSON file (`--config`) < command-line flags.
// Every section uses `#[serde(default)]`, so a config file only needs the keys
// it changes.

use crate::gesture::GestureConfig;
use crate::photos::PhotoConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{flag} expects a value")]
    MissingValue { flag: String },
    #[error("{flag}: cannot parse `{value}`")]
    BadValue { flag: String, value: String },
    #[error("unknown argument `{0}` (try --help)")]
    UnknownArgument(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub decorations: usize,
    pub lights: usize,
    pub snow: usize,
    pub burst: usize,
    pub tree_height: f32,
    pub tree_radius: f32,
    /// Half-width of the heart formation.
    pub heart_scale: f32,
    pub scatter_radius: f32,
    /// Smoothing rate for decorations and lights (1/s).
    pub decoration_rate: f32,
    /// Smoothing rate for photos (1/s).
    pub photo_rate: f32,
    /// Seed for every random placement; the same seed gives the same tree.
    pub seed: u64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            decorations: 260,
            lights: 420,
            snow: 300,
            burst: 40,
            tree_height: 12.0,
            tree_radius: 5.0,
            heart_scale: 7.0,
            scatter_radius: 14.0,
            decoration_rate: 3.5,
            photo_rate: 5.0,
            seed: 2024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// External landmark-model command. `None` runs the keyboard/mouse simulator.
    pub landmarks: Option<String>,
    /// Photos to load at startup.
    pub photos: Vec<PathBuf>,
    pub gesture: GestureConfig,
    pub scene: SceneConfig,
    pub photo: PhotoConfig,
}

/// What the command line asked for.
#[derive(Debug)]
pub enum Invocation {
    Run(AppConfig),
    Help,
}

pub const USAGE: &str = "\
memory_tree — gesture-controlled 3D memory tree

USAGE:
    memory_tree [OPTIONS] [PHOTO...]

OPTIONS:
    --config <file>       JSON config file (any subset of keys)
    --landmarks <cmd>     hand-landmark command emitting JSON lines on stdout
                          (split on whitespace; quotes are not parsed)
    --photo <file>        add a photo at startup (repeatable)
    --decorations <n>     ornament count
    --lights <n>          tree light count
    --seed <n>            placement seed
    -h, --help            print this help

KEYS:
    F (hold) fist   O (hold) open hand   1/2/3 tree/scattered/zoom
    Left/Right photos   R reset   F3 HUD   Esc quit
    Drop image files onto the window to add photos.
";

impl AppConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Build the configuration from command-line arguments (without argv[0]).
    pub fn from_args<I>(args: I) -> Result<Invocation, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let args: Vec<String> = args.into_iter().collect();

        if args.iter().any(|a| a == "-h" || a == "--help") {
            return Ok(Invocation::Help);
        }

        // The config file sets the base every other flag overrides,
        // wherever it appears on the line.
        let mut config = match args.iter().position(|a| a == "--config") {
            Some(i) => {
                let path = args.get(i + 1).ok_or_else(|| missing("--config"))?;
                Self::from_json_file(Path::new(path))?
            }
            None => Self::default(),
        };

        let mut iter = args.into_iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--config" => {
                    iter.next();
                }
                "--landmarks" => config.landmarks = Some(value(&mut iter, &arg)?),
                "--photo" => config.photos.push(PathBuf::from(value(&mut iter, &arg)?)),
                "--decorations" => config.scene.decorations = parsed(&mut iter, &arg)?,
                "--lights" => config.scene.lights = parsed(&mut iter, &arg)?,
                "--seed" => config.scene.seed = parsed(&mut iter, &arg)?,
                other if other.starts_with('-') => {
                    return Err(ConfigError::UnknownArgument(other.to_string()));
                }
                _ => config.photos.push(PathBuf::from(&arg)),
            }
        }
        Ok(Invocation::Run(config))
    }
}

fn missing(flag: &str) -> ConfigError {
    ConfigError::MissingValue { flag: flag.to_string() }
}

fn value(iter: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, ConfigError> {
    iter.next().ok_or_else(|| missing(flag))
}

fn parsed<T: std::str::FromStr>(
    iter: &mut impl Iterator<Item = String>,
    flag: &str,
) -> Result<T, ConfigError> {
    let raw = value(iter, flag)?;
    raw.parse().map_err(|_| ConfigError::BadValue {
        flag: flag.to_string(),
        value: raw,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn run(list: &[&str]) -> AppConfig {
        match AppConfig::from_args(args(list)).unwrap() {
            Invocation::Run(cfg) => cfg,
            Invocation::Help => panic!("unexpected help"),
        }
    }

    #[test]
    fn defaults_without_args() {
        let cfg = run(&[]);
        assert_eq!(cfg, AppConfig::default());
        assert!(cfg.landmarks.is_none());
        assert_eq!(cfg.gesture.debounce_frames, 5);
        assert_eq!(cfg.photo.max_photos, 24);
    }

    #[test]
    fn flags_override_defaults() {
        let cfg = run(&[
            "--landmarks", "python3 hands.py --camera 0",
            "--photo", "a.jpg",
            "--decorations", "80",
            "--seed", "9",
            "b.png",
        ]);
        assert_eq!(cfg.landmarks.as_deref(), Some("python3 hands.py --camera 0"));
        assert_eq!(cfg.photos, vec![PathBuf::from("a.jpg"), PathBuf::from("b.png")]);
        assert_eq!(cfg.scene.decorations, 80);
        assert_eq!(cfg.scene.seed, 9);
        assert_eq!(cfg.scene.lights, SceneConfig::default().lights);
    }

    #[test]
    fn help_and_errors() {
        assert!(matches!(AppConfig::from_args(args(&["-h"])), Ok(Invocation::Help)));
        assert!(matches!(
            AppConfig::from_args(args(&["--seed"])),
            Err(ConfigError::MissingValue { .. })
        ));
        assert!(matches!(
            AppConfig::from_args(args(&["--lights", "many"])),
            Err(ConfigError::BadValue { .. })
        ));
        assert!(matches!(
            AppConfig::from_args(args(&["--bogus"])),
            Err(ConfigError::UnknownArgument(_))
        ));
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let cfg: AppConfig = serde_json::from_str(
            r#"{"gesture": {"debounce_frames": 8}, "scene": {"snow": 0}, "landmarks": "hands"}"#,
        )
        .unwrap();
        assert_eq!(cfg.gesture.debounce_frames, 8);
        assert_eq!(cfg.gesture.open_min_fingers, 4);
        assert_eq!(cfg.scene.snow, 0);
        assert_eq!(cfg.scene.tree_height, 12.0);
        assert_eq!(cfg.landmarks.as_deref(), Some("hands"));
    }

    #[test]
    fn config_file_then_flags() {
        let path = std::env::temp_dir().join(format!("memory_tree_cfg_{}.json", std::process::id()));
        std::fs::write(&path, r#"{"scene": {"decorations": 12, "lights": 7}}"#).unwrap();
        let p = path.to_string_lossy().to_string();
        let cfg = run(&["--lights", "99", "--config", &p]);
        std::fs::remove_file(&path).ok();
        assert_eq!(cfg.scene.decorations, 12);
        assert_eq!(cfg.scene.lights, 99);
    }
}
