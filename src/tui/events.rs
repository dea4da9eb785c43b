//! Events sent from background requests back to the UI loop

use std::path::PathBuf;

use crate::errors::PaperError;
use crate::models::ResourcesResponse;

/// Completion of a spawned network task
#[derive(Debug)]
pub enum AppEvent {
    /// Unfiltered list request finished
    LoadFinished {
        generation: u64,
        result: Result<ResourcesResponse, PaperError>,
    },
    /// Filtered search finished
    SearchFinished {
        generation: u64,
        result: Result<ResourcesResponse, PaperError>,
    },
    /// Paper download finished
    DownloadFinished {
        title: String,
        result: Result<PathBuf, PaperError>,
    },
}
