// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline configuration loaded from environment variables.

use shellweld_geometry::ConversionSettings;

/// Pipeline configuration.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Settings handed to every element's kernel.
    pub settings: ConversionSettings,
    /// Size of a dedicated thread pool. `None` runs on rayon's global pool.
    pub worker_threads: Option<usize>,
    /// Attach a topology snapshot to every element result.
    pub snapshots: bool,
}

impl PipelineConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            settings: ConversionSettings::from_env(),
            worker_threads: std::env::var("SHELLWELD_WORKER_THREADS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n: &usize| n > 0),
            snapshots: std::env::var("SHELLWELD_SNAPSHOTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }

    pub fn with_settings(mut self, settings: ConversionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads).filter(|&n| n > 0);
        self
    }

    pub fn with_snapshots(mut self, snapshots: bool) -> Self {
        self.snapshots = snapshots;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_threads_means_global_pool() {
        let config = PipelineConfig::default().with_worker_threads(0);
        assert_eq!(config.worker_threads, None);
        let config = config.with_worker_threads(2);
        assert_eq!(config.worker_threads, Some(2));
    }

    #[test]
    fn defaults_leave_settings_untouched() {
        let config = PipelineConfig::default();
        assert_eq!(config.settings, ConversionSettings::default());
        assert!(!config.snapshots);
    }
}
