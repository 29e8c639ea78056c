use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::error::ScrapeError;

/// Running tally for one sequential batch (sitemaps or pages).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    pub total: usize,
    pub ok: usize,
    pub errors: usize,
}

impl BatchStats {
    /// Pass a success through, log and drop a failure.
    pub fn settle<T>(&mut self, source: &str, outcome: Result<T, ScrapeError>) -> Option<T> {
        self.total += 1;
        match outcome {
            Ok(value) => {
                self.ok += 1;
                Some(value)
            }
            Err(e) => {
                self.errors += 1;
                warn!(url = source, kind = %e.kind(), "Skipping: {}", e);
                None
            }
        }
    }

    pub fn log(&self, what: &str) {
        info!(
            "Processed {} {} ({} ok, {} errors)",
            self.total, what, self.ok, self.errors
        );
    }
}

pub fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) =
        ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("=> "));
    }
    pb
}
