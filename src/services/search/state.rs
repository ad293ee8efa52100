use serde::Serialize;

use crate::{models::Movie, services::pagination::PaginationControls};

/// Message shown when a settled fetch returned nothing
pub const NO_RESULTS_MESSAGE: &str = "No movies found";

/// What the search view currently holds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchState {
    /// Term exactly as typed
    pub raw_term: String,
    /// Term the current results belong to
    pub debounced_term: String,
    pub page: u32,
    pub total_pages: u32,
    pub results: Vec<Movie>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            raw_term: String::new(),
            debounced_term: String::new(),
            page: 1,
            total_pages: 0,
            results: Vec::new(),
            is_loading: false,
            error: None,
        }
    }
}

/// Which branch of the results area to draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResultsView<'a> {
    Loading,
    Error(&'a str),
    NoResults,
    Movies(&'a [Movie]),
}

impl SearchState {
    pub fn view(&self) -> ResultsView<'_> {
        if self.is_loading {
            ResultsView::Loading
        } else if let Some(error) = &self.error {
            ResultsView::Error(error)
        } else if self.results.is_empty() {
            ResultsView::NoResults
        } else {
            ResultsView::Movies(&self.results)
        }
    }

    /// Pager for the current page, if there is more than nothing to page through
    pub fn pagination(&self) -> Option<PaginationControls> {
        (self.total_pages > 0).then(|| PaginationControls::new(self.page, self.total_pages))
    }

    pub(crate) fn begin_fetch(&mut self) {
        self.is_loading = true;
        self.error = None;
    }

    pub(crate) fn apply_results(&mut self, results: Vec<Movie>, total_pages: u32) {
        self.results = results;
        self.total_pages = total_pages;
        self.error = None;
        self.is_loading = false;
    }

    pub(crate) fn apply_error(&mut self, message: String) {
        self.results.clear();
        self.total_pages = 0;
        self.error = Some(message);
        self.is_loading = false;
    }
}
