//! Live progress line shown while an external tool fills the target dir.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use tokio::task::JoinHandle;
use walkdir::WalkDir;

use crate::elapsed::format_duration;
use crate::error::CoreError;

const TICK: Duration = Duration::from_secs(1);

/// Only one session may draw the status line at a time.
static ACTIVE: AtomicBool = AtomicBool::new(false);

/// Counts regular files under `dir`, recursively.
///
/// A missing directory counts as zero. Entries that vanish while the walk
/// is in progress are skipped.
pub fn count_files(dir: &Path) -> usize {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| {
            std::fs::symlink_metadata(entry.path())
                .map(|meta| meta.is_file())
                .unwrap_or(false)
        })
        .count()
}

/// What the status line describes.
#[derive(Debug, Clone)]
pub struct ProgressState {
    pub phase: String,
    pub target: PathBuf,
    pub started: Instant,
}

impl ProgressState {
    pub fn line(&self, files: usize) -> String {
        format!(
            "[{}] {}; {} files generated so far...",
            self.phase,
            format_duration(self.started.elapsed()),
            files
        )
    }
}

/// A running status line, stopped by [`ProgressSession::stop`] or on drop.
pub struct ProgressSession {
    bar: ProgressBar,
    ticker: Option<JoinHandle<()>>,
}

impl ProgressSession {
    /// Starts ticking; must be called inside a tokio runtime.
    pub fn start(phase: impl Into<String>, target: impl Into<PathBuf>) -> Result<Self, CoreError> {
        if ACTIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(CoreError::ProgressBusy);
        }
        let state = ProgressState {
            phase: phase.into(),
            target: target.into(),
            started: Instant::now(),
        };
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{msg}") {
            bar.set_style(style);
        }
        let ticker = tokio::spawn({
            let bar = bar.clone();
            async move {
                let mut interval = tokio::time::interval(TICK);
                loop {
                    interval.tick().await;
                    let dir = state.target.clone();
                    let files = tokio::task::spawn_blocking(move || count_files(&dir))
                        .await
                        .unwrap_or(0);
                    bar.set_message(state.line(files));
                }
            }
        });
        Ok(Self {
            bar,
            ticker: Some(ticker),
        })
    }

    pub fn stop(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
            self.bar.finish_and_clear();
            ACTIVE.store(false, Ordering::Release);
        }
    }
}

impl Drop for ProgressSession {
    fn drop(&mut self) {
        self.release();
    }
}
