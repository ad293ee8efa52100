use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};

use crate::{
    error::AppResult,
    models::{MoviePage, MovieQuery},
    services::{
        popularity::PopularityCounter,
        providers::MetadataProvider,
        search::{debounce::Debouncer, state::SearchState},
    },
};

const COMMAND_BUFFER: usize = 64;

#[derive(Debug)]
enum Command {
    SetTerm(String),
    SetPage(u32),
    NextPage,
    PreviousPage,
    Shutdown,
}

/// Result of one fetch, tagged with the generation that issued it
struct FetchOutcome {
    generation: u64,
    query: MovieQuery,
    result: AppResult<MoviePage>,
}

/// Cheap, cloneable handle to a running search loop
#[derive(Clone)]
pub struct SearchHandle {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<SearchState>,
}

impl SearchHandle {
    /// Replace the raw search term; the fetch follows after the debounce window
    pub async fn set_term(&self, term: impl Into<String>) {
        self.send(Command::SetTerm(term.into())).await;
    }

    /// Jump to a page. Ignored outside `1..=total_pages`.
    pub async fn set_page(&self, page: u32) {
        self.send(Command::SetPage(page)).await;
    }

    pub async fn next_page(&self) {
        self.send(Command::NextPage).await;
    }

    pub async fn previous_page(&self) {
        self.send(Command::PreviousPage).await;
    }

    /// Stop the loop. In-flight fetches finish but are no longer applied.
    pub async fn shutdown(&self) {
        self.send(Command::Shutdown).await;
    }

    pub fn snapshot(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// A receiver that wakes on every state change
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.clone()
    }

    /// Wait until the state satisfies `predicate`, returning that state.
    /// `None` if the loop stopped first.
    pub async fn wait_for(&self, predicate: impl FnMut(&SearchState) -> bool) -> Option<SearchState> {
        let mut rx = self.state.clone();
        let state = rx.wait_for(predicate).await.ok()?.clone();
        Some(state)
    }

    async fn send(&self, command: Command) {
        if self.commands.send(command).await.is_err() {
            tracing::debug!("Search loop already stopped");
        }
    }
}

/// Owns the search state and drives debounce, fetch and result handling
///
/// All mutation happens on the orchestrator's own task. Fetches run on
/// spawned tasks and report back with their generation; an outcome whose
/// generation is not the latest issued is dropped, so a slow response for an
/// old term can never replace results for a newer one.
pub struct SearchOrchestrator {
    provider: Arc<dyn MetadataProvider>,
    popularity: PopularityCounter,
    state: watch::Sender<SearchState>,
    debouncer: Debouncer<String>,
    generation: u64,
    outcome_tx: mpsc::UnboundedSender<FetchOutcome>,
}

impl SearchOrchestrator {
    /// Start the loop on the current runtime and issue the initial discover fetch
    pub fn spawn(
        provider: Arc<dyn MetadataProvider>,
        popularity: PopularityCounter,
        debounce: Duration,
    ) -> (SearchHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (state_tx, state_rx) = watch::channel(SearchState::default());
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();

        let orchestrator = Self {
            provider,
            popularity,
            state: state_tx,
            debouncer: Debouncer::new(debounce),
            generation: 0,
            outcome_tx,
        };

        let task = tokio::spawn(orchestrator.run(command_rx, outcome_rx));

        (
            SearchHandle {
                commands: command_tx,
                state: state_rx,
            },
            task,
        )
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut outcomes: mpsc::UnboundedReceiver<FetchOutcome>,
    ) {
        tracing::info!(provider = self.provider.name(), "Search loop started");
        self.issue_fetch();

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                term = self.debouncer.fired() => self.apply_debounced_term(term),
                Some(outcome) = outcomes.recv() => self.apply_outcome(outcome),
            }
        }

        tracing::info!(generation = self.generation, "Search loop stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::SetTerm(term) => {
                self.state.send_modify(|s| s.raw_term = term.clone());
                self.debouncer.push(term);
            }
            Command::SetPage(page) => self.go_to_page(page),
            Command::NextPage => {
                let page = self.state.borrow().page.saturating_add(1);
                self.go_to_page(page);
            }
            Command::PreviousPage => {
                let page = self.state.borrow().page.saturating_sub(1);
                self.go_to_page(page);
            }
            Command::Shutdown => {}
        }
    }

    /// Surrounding whitespace is not part of the term, so "batman " settles
    /// to the same search as "batman"
    fn apply_debounced_term(&mut self, term: String) {
        let term = term.trim().to_string();
        let changed = self.state.send_if_modified(|s| {
            if s.debounced_term == term {
                return false;
            }
            s.debounced_term = term.clone();
            s.page = 1;
            true
        });

        if changed {
            tracing::debug!(term = %term, "Search term settled");
            self.issue_fetch();
        }
    }

    fn go_to_page(&mut self, page: u32) {
        let changed = self.state.send_if_modified(|s| {
            if page < 1 || page > s.total_pages || page == s.page {
                return false;
            }
            s.page = page;
            true
        });

        if changed {
            self.issue_fetch();
        } else {
            tracing::debug!(page, "Page change ignored");
        }
    }

    /// Fetch the current `(debounced_term, page)` under a fresh generation
    fn issue_fetch(&mut self) {
        self.generation += 1;
        let generation = self.generation;

        let query = {
            let state = self.state.borrow();
            MovieQuery::for_term(&state.debounced_term, state.page)
        };
        self.state.send_modify(SearchState::begin_fetch);

        tracing::debug!(generation, query = %query, "Issuing fetch");

        let provider = self.provider.clone();
        let outcome_tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let result = provider.fetch_page(&query).await;
            // The loop may have stopped; nothing left to update then
            let _ = outcome_tx.send(FetchOutcome {
                generation,
                query,
                result,
            });
        });
    }

    fn apply_outcome(&mut self, outcome: FetchOutcome) {
        if outcome.generation != self.generation {
            tracing::debug!(
                generation = outcome.generation,
                latest = self.generation,
                query = %outcome.query,
                "Discarding stale fetch result"
            );
            return;
        }

        match outcome.result {
            Ok(page) => {
                tracing::info!(
                    query = %outcome.query,
                    results = page.results.len(),
                    total_pages = page.total_pages,
                    "Search results applied"
                );

                if let (Some(term), Some(first)) = (outcome.query.term(), page.results.first()) {
                    self.popularity.spawn_record_hit(term, first.clone());
                }

                self.state
                    .send_modify(|s| s.apply_results(page.results, page.total_pages));
            }
            Err(error) => {
                tracing::error!(query = %outcome.query, error = %error, "Search fetch failed");
                let message = error.user_message();
                self.state.send_modify(|s| s.apply_error(message));
            }
        }
    }
}
