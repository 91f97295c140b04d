use std::path::Path;

use log::{info, warn};

pub struct LogManager;

impl LogManager {
    pub fn new() -> Self {
        Self
    }

    pub fn record(&self, message: &str) {
        info!("{}", message);
    }

    /// Per-file merge failure: path plus reason, enough to chase the file.
    pub fn warn_skipped(&self, path: &Path, reason: &str) {
        warn!("skipping {}: {}", path.display(), reason);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}
