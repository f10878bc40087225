//! Resolution of the server home directory.
//!
//! The home directory anchors every relative path in the configuration
//! (log files, the data directory). Resolution rules:
//! - `None` => platform base (the roaming config dir on Windows, the user's home elsewhere) joined with `default_subdir`
//! - a leading `~` expands to the platform base
//! - any other relative path is resolved against the current working directory

use std::io;
use std::path::{Path, PathBuf};

fn platform_base() -> io::Result<PathBuf> {
    #[cfg(target_os = "windows")]
    let base = dirs::config_dir();
    #[cfg(not(target_os = "windows"))]
    let base = dirs::home_dir();

    base.ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            "could not determine the user's home directory",
        )
    })
}

fn expand_tilde(raw: &str) -> io::Result<PathBuf> {
    if raw == "~" {
        return platform_base();
    }
    if let Some(rest) = raw
        .strip_prefix("~/")
        .or_else(|| raw.strip_prefix("~\\"))
    {
        return Ok(platform_base()?.join(rest));
    }
    Ok(PathBuf::from(raw))
}

/// Resolve the home directory into an absolute path, optionally creating it.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> io::Result<PathBuf> {
    let mut path = match configured {
        Some(raw) => expand_tilde(raw.trim())?,
        None => platform_base()?.join(default_subdir),
    };

    if path.is_relative() {
        path = std::env::current_dir()?.join(path);
    }

    if create {
        std::fs::create_dir_all(&path)?;
    }

    Ok(path)
}

/// Join `path` onto `base` unless it is already absolute.
pub fn resolve_under(base: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}
