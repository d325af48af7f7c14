/// File-based logging using simplelog.
///
/// The terminal belongs to the renderer, so nothing is logged to stdout or
/// stderr while the animation runs. `RUST_LOG` overrides the configured level.

use std::fs::File;
use std::io;

use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use crate::config::{self, LogConfig};

pub fn init(cfg: &LogConfig) -> io::Result<()> {
    let level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|v| config::parse_level(&v).ok())
        .unwrap_or(cfg.level);

    if level == LevelFilter::Off {
        return Ok(());
    }

    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_time_offset_to_local()
        .unwrap_or_else(|c| c)
        .build();

    if let Some(dir) = cfg.file.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let file = File::create(&cfg.file)?;

    WriteLogger::init(level, log_config, file)
        .map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e))
}
