//! Shared utilities: logging, input sanitizing, bounds.

use std::path::Path;
use tracing::Level;

/// Initialize tracing with env filter. Safe to call once at startup.
pub fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| level.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Normalize a tier identifier for lookup (trim only; ids are case-sensitive).
pub fn normalize_id(s: &str) -> String {
    s.trim().to_string()
}

/// Coerce a raw numeric input into a troop count: non-finite or negative becomes 0.
pub fn sanitize_count(v: f64) -> u32 {
    if !v.is_finite() || v <= 0.0 {
        return 0;
    }
    if v >= u32::MAX as f64 {
        return u32::MAX;
    }
    v.trunc() as u32
}

/// Coerce a raw stat percentage: non-finite becomes 0.
pub fn sanitize_stat(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Check a file exists and is within size limit.
pub fn check_file_size(path: &Path, max_bytes: usize) -> Result<u64, String> {
    let meta = std::fs::metadata(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    let size = meta.len();
    if size > max_bytes as u64 {
        return Err(format!(
            "file too large: {} bytes (max {})",
            size, max_bytes
        ));
    }
    Ok(size)
}
