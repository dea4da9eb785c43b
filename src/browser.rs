//! The paper browser: initial load, filtered search, and the shared render step

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::client::PaperSource;
use crate::errors::PaperError;
use crate::models::{PaperRecord, ResourcesResponse, SearchFilter};
use crate::render::{ResultsPanel, LOAD_ERROR_MESSAGE, SEARCH_ERROR_MESSAGE};

/// What happened when a response was applied to the panel
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Panel re-rendered with this many cards
    Rendered(usize),
    /// Request failed; the panel shows the error notice
    Failed(String),
    /// A newer request was issued after this one, response dropped
    Stale,
}

pub struct PaperBrowser {
    source: Arc<dyn PaperSource>,
    /// Full set from the initial load, only used for selector options
    all_papers: Vec<PaperRecord>,
    panel: ResultsPanel,
    /// Latest request generation handed out
    generation: u64,
}

impl PaperBrowser {
    pub fn new(source: Arc<dyn PaperSource>) -> Self {
        Self {
            source,
            all_papers: Vec::new(),
            panel: ResultsPanel::new(),
            generation: 0,
        }
    }

    pub fn source(&self) -> Arc<dyn PaperSource> {
        Arc::clone(&self.source)
    }

    pub fn panel(&self) -> &ResultsPanel {
        &self.panel
    }

    pub fn all_papers(&self) -> &[PaperRecord] {
        &self.all_papers
    }

    /// Reserve a generation for a new request. Anything issued earlier becomes stale.
    pub fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Fetch the unfiltered list and render it
    pub async fn initial_load(&mut self) -> Outcome {
        let generation = self.next_generation();
        let result = self.source.list_papers().await;
        self.apply_load(generation, result)
    }

    /// Fetch with the given filter and render the result
    pub async fn search(&mut self, filter: &SearchFilter) -> Outcome {
        let generation = self.next_generation();
        let result = self.source.search_papers(filter).await;
        self.apply_search(generation, result)
    }

    pub fn apply_load(
        &mut self,
        generation: u64,
        result: Result<ResourcesResponse, PaperError>,
    ) -> Outcome {
        let current = self.is_current(generation);

        match result {
            Ok(response) => {
                // The full set feeds the selectors even when a newer search owns the panel
                self.all_papers = response.data.clone().unwrap_or_default();
                info!("Loaded {} papers", self.all_papers.len());

                if !current {
                    debug!("Not rendering stale load response (generation {})", generation);
                    return Outcome::Stale;
                }
                self.render(response.data.as_deref())
            }
            Err(e) if !current => {
                debug!("Dropping stale load failure (generation {}): {}", generation, e);
                Outcome::Stale
            }
            Err(e) => {
                error!("Error fetching papers: {}", e);
                self.panel.show_error(LOAD_ERROR_MESSAGE);
                Outcome::Failed(e.to_string())
            }
        }
    }

    pub fn apply_search(
        &mut self,
        generation: u64,
        result: Result<ResourcesResponse, PaperError>,
    ) -> Outcome {
        if !self.is_current(generation) {
            debug!("Dropping stale search response (generation {})", generation);
            return Outcome::Stale;
        }

        match result {
            Ok(response) => self.render(response.data.as_deref()),
            Err(e) => {
                warn!("Search failed: {}", e);
                self.panel.show_error(SEARCH_ERROR_MESSAGE);
                Outcome::Failed(e.to_string())
            }
        }
    }

    fn render(&mut self, records: Option<&[PaperRecord]>) -> Outcome {
        self.panel.render(records);
        Outcome::Rendered(self.panel.cards().len())
    }

    /// Distinct course values from the full set, first-seen order
    pub fn course_options(&self) -> Vec<String> {
        distinct(self.all_papers.iter().map(|p| p.course.as_str()))
    }

    /// Distinct session values from the full set, first-seen order
    pub fn session_options(&self) -> Vec<String> {
        distinct(self.all_papers.iter().map(|p| p.session.as_str()))
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for value in values {
        if !value.is_empty() && !seen.iter().any(|s| s == value) {
            seen.push(value.to_string());
        }
    }
    seen
}
