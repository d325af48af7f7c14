/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory, the CWD, or
/// `~/.config/snake-loader`. Missing files or keys fall back to defaults.
/// Problems are collected as `ConfigError`s and handed back to the caller,
/// because the logger is only set up once the config is known.

use std::path::{Path, PathBuf};

use crossterm::style::Color;
use log::LevelFilter;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::snake::GrowthTiming;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("config.toml parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unknown color {0:?}")]
    InvalidColor(String),
    #[error("unknown growth timing {0:?} (expected \"same-tick\" or \"next-tick\")")]
    InvalidGrowth(String),
    #[error("unknown log level {0:?}")]
    InvalidLevel(String),
}

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub display: DisplayConfig,
    pub gamepad: GamepadConfig,
    pub log: LogConfig,
}

#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub growth: GrowthTiming,
    /// Fixed scatter seed; `None` seeds from the OS.
    pub seed: Option<u64>,
}

/// Presentation only. Nothing here reaches the simulation.
#[derive(Clone, Debug)]
pub struct DisplayConfig {
    pub text_color: Option<Color>,
    pub background: Vec<String>,
    /// Terminal widths at or below this count as a narrow viewport.
    pub narrow_columns: u16,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub activate: Vec<String>,
    pub dismiss: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    pub file: PathBuf,
    pub level: LevelFilter,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    engine: TomlEngine,
    #[serde(default)]
    display: TomlDisplay,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlEngine {
    #[serde(default = "default_growth")]
    growth: String,
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct TomlDisplay {
    #[serde(default)]
    text_color: Option<String>,
    #[serde(default)]
    background: Option<String>,
    #[serde(default = "default_narrow_columns")]
    narrow_columns: u16,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_activate")]
    activate: Vec<String>,
    #[serde(default = "default_dismiss")]
    dismiss: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    log_file: Option<String>,
    #[serde(default = "default_log_level")]
    log_level: String,
}

// ── Defaults ──

fn default_growth() -> String { "same-tick".into() }
fn default_narrow_columns() -> u16 { 60 }
fn default_activate() -> Vec<String> { vec!["Start".into(), "A".into()] }
fn default_dismiss() -> Vec<String> { vec!["Select".into(), "B".into()] }
fn default_log_level() -> String { "info".into() }

fn default_log_file() -> PathBuf {
    std::env::temp_dir().join("snake-loader.log")
}

impl Default for TomlEngine {
    fn default() -> Self {
        TomlEngine { growth: default_growth(), seed: None }
    }
}

impl Default for TomlDisplay {
    fn default() -> Self {
        TomlDisplay { text_color: None, background: None, narrow_columns: default_narrow_columns() }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad { activate: default_activate(), dismiss: default_dismiss() }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { log_file: None, log_level: default_log_level() }
    }
}

// ── Value parsers ──

/// Named terminal color or `#rrggbb`.
pub fn parse_color(s: &str) -> Result<Color, ConfigError> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() == 6 && hex.is_ascii() {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
            if let (Ok(r), Ok(g), Ok(b)) = (channel(0), channel(2), channel(4)) {
                return Ok(Color::Rgb { r, g, b });
            }
        }
        return Err(ConfigError::InvalidColor(s.to_string()));
    }
    let color = match s.to_lowercase().replace(['-', ' '], "_").as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "dark_red" => Color::DarkRed,
        "green" => Color::Green,
        "dark_green" => Color::DarkGreen,
        "yellow" => Color::Yellow,
        "dark_yellow" => Color::DarkYellow,
        "blue" => Color::Blue,
        "dark_blue" => Color::DarkBlue,
        "magenta" => Color::Magenta,
        "dark_magenta" => Color::DarkMagenta,
        "cyan" => Color::Cyan,
        "dark_cyan" => Color::DarkCyan,
        "white" => Color::White,
        "grey" | "gray" => Color::Grey,
        "dark_grey" | "dark_gray" => Color::DarkGrey,
        _ => return Err(ConfigError::InvalidColor(s.to_string())),
    };
    Ok(color)
}

pub fn parse_growth(s: &str) -> Result<GrowthTiming, ConfigError> {
    match s.trim().to_lowercase().as_str() {
        "same-tick" | "same_tick" | "same" => Ok(GrowthTiming::SameTick),
        "next-tick" | "next_tick" | "next" => Ok(GrowthTiming::NextTick),
        other => Err(ConfigError::InvalidGrowth(other.to_string())),
    }
}

pub fn parse_level(s: &str) -> Result<LevelFilter, ConfigError> {
    match s.trim().to_lowercase().as_str() {
        "off" => Ok(LevelFilter::Off),
        "error" => Ok(LevelFilter::Error),
        "warn" => Ok(LevelFilter::Warn),
        "info" => Ok(LevelFilter::Info),
        "debug" => Ok(LevelFilter::Debug),
        "trace" => Ok(LevelFilter::Trace),
        other => Err(ConfigError::InvalidLevel(other.to_string())),
    }
}

// ── Loading ──

impl AppConfig {
    /// Load config from the first `config.toml` found.
    /// Returns the resolved config plus every problem met on the way.
    pub fn load() -> (Self, Vec<ConfigError>) {
        let search_dirs = candidate_dirs();
        for dir in &search_dirs {
            let path = dir.join("config.toml");
            if !path.exists() {
                continue;
            }
            return match std::fs::read_to_string(&path) {
                Ok(text) => AppConfig::from_toml_str(&text, dir),
                Err(source) => {
                    let (cfg, mut warnings) = AppConfig::from_toml(TomlConfig::default(), dir);
                    warnings.insert(0, ConfigError::Read { path, source });
                    (cfg, warnings)
                }
            };
        }
        let base = search_dirs.first().cloned().unwrap_or_else(|| PathBuf::from("."));
        AppConfig::from_toml(TomlConfig::default(), &base)
    }

    /// Parse config text. Relative paths resolve against `base_dir`.
    /// A parse error falls back to defaults for the whole file.
    pub fn from_toml_str(text: &str, base_dir: &Path) -> (Self, Vec<ConfigError>) {
        match toml::from_str::<TomlConfig>(text) {
            Ok(raw) => AppConfig::from_toml(raw, base_dir),
            Err(e) => {
                let (cfg, mut warnings) = AppConfig::from_toml(TomlConfig::default(), base_dir);
                warnings.insert(0, ConfigError::Parse(e));
                (cfg, warnings)
            }
        }
    }

    fn from_toml(raw: TomlConfig, base_dir: &Path) -> (Self, Vec<ConfigError>) {
        let mut warnings = Vec::new();

        let growth = parse_growth(&raw.engine.growth).unwrap_or_else(|e| {
            warnings.push(e);
            GrowthTiming::default()
        });

        let text_color = raw.display.text_color.as_deref().and_then(|s| {
            parse_color(s).map_err(|e| warnings.push(e)).ok()
        });

        let background = match raw.display.background {
            Some(p) => {
                let path = resolve(base_dir, &p);
                match std::fs::read_to_string(&path) {
                    Ok(text) => text.lines().map(str::to_string).collect(),
                    Err(source) => {
                        warnings.push(ConfigError::Read { path, source });
                        vec![]
                    }
                }
            }
            None => vec![],
        };

        let level = parse_level(&raw.general.log_level).unwrap_or_else(|e| {
            warnings.push(e);
            LevelFilter::Info
        });

        let file = raw.general.log_file
            .map(|p| resolve(base_dir, &p))
            .unwrap_or_else(default_log_file);

        let cfg = AppConfig {
            engine: EngineConfig { growth, seed: raw.engine.seed },
            display: DisplayConfig {
                text_color,
                background,
                narrow_columns: raw.display.narrow_columns,
            },
            gamepad: GamepadConfig {
                activate: raw.gamepad.activate,
                dismiss: raw.gamepad.dismiss,
            },
            log: LogConfig { file, level },
        };
        (cfg, warnings)
    }
}

fn resolve(base_dir: &Path, p: &str) -> PathBuf {
    let path = PathBuf::from(p);
    if path.is_absolute() { path } else { base_dir.join(path) }
}

/// Candidate directories to search: exe dir + CWD + user config dir (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // Resolve symlinks so a linked binary still finds its config.
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let user = PathBuf::from(&home).join(".config/snake-loader");
        if user.is_dir() && !dirs.iter().any(|d| d == &user) {
            dirs.push(user);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}
