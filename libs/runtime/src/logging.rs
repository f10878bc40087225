//! `tracing` subscriber setup: a console layer plus an optional rotating JSON
//! file layer, each filtered per subsystem from the `logging:` sections.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{filter::Targets, fmt};

use crate::config::{LoggingConfig, Section, DEFAULT_SECTION};

const DEFAULT_MAX_SIZE_MB: u64 = 100;
const DEFAULT_MAX_BACKUPS: usize = 3;

/// `off`/`none` silence a target; unrecognized names fall back to `info`.
fn level_filter(name: &str) -> LevelFilter {
    match name.trim().to_ascii_lowercase().as_str() {
        "off" | "none" => LevelFilter::OFF,
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => LevelFilter::INFO,
    }
}

/// Per-target filter: the default section is the fallback, every other section names a target.
fn build_targets(cfg: &LoggingConfig, level_of: impl Fn(&Section) -> &str) -> Targets {
    let fallback = cfg
        .get(DEFAULT_SECTION)
        .map_or(LevelFilter::OFF, |section| level_filter(level_of(section)));

    cfg.iter()
        .filter(|(target, _)| target.as_str() != DEFAULT_SECTION)
        .fold(Targets::new().with_default(fallback), |targets, (target, section)| {
            targets.with_target(target.clone(), level_filter(level_of(section)))
        })
}

/// Log file shared by every writer handle the fmt layer creates.
#[derive(Clone)]
struct SharedLogFile(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl SharedLogFile {
    fn open(path: &Path, max_bytes: usize, max_backups: usize) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let rotate = FileRotate::new(
            path,
            AppendTimestamp::default(FileLimit::MaxFiles(max_backups)),
            ContentLimit::BytesSurpassed(max_bytes),
            Compression::None,
            #[cfg(unix)]
            None,
        );
        Ok(Self(Arc::new(Mutex::new(rotate))))
    }
}

impl<'a> fmt::MakeWriter<'a> for SharedLogFile {
    type Writer = SharedLogFile;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

impl Write for SharedLogFile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self.0.lock() {
            Ok(mut file) => file.write(buf),
            // poisoned by a panic mid-write; drop the record
            Err(_) => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self.0.lock() {
            Ok(mut file) => file.flush(),
            Err(_) => Ok(()),
        }
    }
}

fn log_file_path(section: &Section, home_dir: &Path) -> Option<PathBuf> {
    let file = section.file.trim();
    (!file.is_empty()).then(|| crate::paths::home_dir::resolve_under(home_dir, file))
}

/// Opens the default section's file; an unusable path disables file logging.
fn open_log_file(cfg: &LoggingConfig, home_dir: &Path) -> Option<SharedLogFile> {
    let section = cfg.get(DEFAULT_SECTION)?;
    let path = log_file_path(section, home_dir)?;
    let max_bytes = section.max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB) * 1024 * 1024;
    let max_backups = section.max_backups.unwrap_or(DEFAULT_MAX_BACKUPS);

    SharedLogFile::open(&path, max_bytes as usize, max_backups)
        .map_err(|e| eprintln!("Log file {} unavailable: {e}", path.display()))
        .ok()
}

/// Install the global subscriber. Relative log files resolve against `home_dir`.
/// Later calls are no-ops.
pub fn init_logging_from_config(cfg: &LoggingConfig, home_dir: &Path) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

    // `log` records from dependencies go through tracing too
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        let _ = fmt()
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .try_init();
        return;
    }

    let console = fmt::layer()
        .with_ansi(atty::is(atty::Stream::Stdout))
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(build_targets(cfg, |s| &s.console_level));

    let file = open_log_file(cfg, home_dir).map(|writer| {
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_writer(writer)
            .with_filter(build_targets(cfg, |s| &s.file_level))
    });

    let _ = Registry::default().with(console).with(file).try_init();
}
