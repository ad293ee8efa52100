//! Debounced, paginated search-and-fetch loop.
//!
//! A [`SearchOrchestrator`] owns one [`SearchState`] inside a single task.
//! Raw input is debounced, every `(term, page)` pair is fetched once, and
//! only the newest fetch is allowed to touch the state.

mod debounce;
mod orchestrator;
mod state;

pub use debounce::Debouncer;
pub use orchestrator::{SearchHandle, SearchOrchestrator};
pub use state::{ResultsView, SearchState, NO_RESULTS_MESSAGE};
