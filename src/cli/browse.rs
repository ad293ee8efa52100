//! Interactive terminal view over the search loop.
//!
//! Each stdin line is one edit of the search box. Lines starting with `:`
//! are commands: `:n` / `:p` page forward and back, `:page N` jumps,
//! `:movie ID` opens the detail view, `:q` quits.

use std::fmt::Write as _;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{
    app::Components,
    config::Config,
    models::{MovieDetails, PopularityRecord},
    services::search::{ResultsView, SearchOrchestrator, SearchState, NO_RESULTS_MESSAGE},
};

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Term(String),
    NextPage,
    PreviousPage,
    Page(u32),
    Movie(u64),
    Quit,
    Unknown(String),
}

pub fn parse_line(line: &str) -> Input {
    let Some(command) = line.strip_prefix(':') else {
        return Input::Term(line.to_string());
    };

    let mut parts = command.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("n"), None) => Input::NextPage,
        (Some("p"), None) => Input::PreviousPage,
        (Some("q"), None) => Input::Quit,
        (Some("page"), Some(n)) => n
            .parse()
            .map(Input::Page)
            .unwrap_or_else(|_| Input::Unknown(line.to_string())),
        (Some("movie"), Some(id)) => id
            .parse()
            .map(Input::Movie)
            .unwrap_or_else(|_| Input::Unknown(line.to_string())),
        _ => Input::Unknown(line.to_string()),
    }
}

pub fn render_trending(records: &[PopularityRecord]) -> String {
    let mut out = String::from("Trending Movies\n");
    if records.is_empty() {
        out.push_str("  (nothing yet)\n");
    }
    for (rank, record) in records.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. {} ({} searches)",
            rank + 1,
            record.search_term,
            record.count
        );
    }
    out
}

pub fn render_state(state: &SearchState, image_base_url: &str) -> String {
    let mut out = String::new();
    let heading = if state.debounced_term.trim().is_empty() {
        "All Movies".to_string()
    } else {
        format!("Results for \"{}\"", state.debounced_term.trim())
    };
    let _ = writeln!(out, "{}", heading);

    match state.view() {
        ResultsView::Loading => out.push_str("Loading...\n"),
        ResultsView::Error(message) => {
            let _ = writeln!(out, "{}", message);
        }
        ResultsView::NoResults => {
            let _ = writeln!(out, "{}", NO_RESULTS_MESSAGE);
        }
        ResultsView::Movies(movies) => {
            for movie in movies {
                let _ = writeln!(
                    out,
                    "  [{}] {}  * {} - {} - {}  {}",
                    movie.id,
                    movie.title,
                    movie.rating_label(),
                    movie.language_label(),
                    movie.year_label(),
                    movie.poster_or_placeholder(image_base_url)
                );
            }
        }
    }

    if let Some(pager) = state.pagination() {
        let pages: Vec<String> = pager
            .pages
            .iter()
            .map(|&p| {
                if p == pager.current {
                    format!("[{}]", p)
                } else {
                    p.to_string()
                }
            })
            .collect();
        let _ = writeln!(
            out,
            "{} {} {}",
            if pager.has_previous { "< :p" } else { "<" },
            pages.join(" "),
            if pager.has_next { ":n >" } else { ">" }
        );
    }
    out
}

pub fn render_details(details: &MovieDetails) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", details.title);
    let _ = writeln!(out, "  Release Date: {}", details.release_date_label());
    let _ = writeln!(out, "  Rating: {}/10", details.rating_label());
    let _ = writeln!(out, "  Language: {}", details.original_language.to_uppercase());
    let _ = writeln!(out, "  Runtime: {}", details.runtime_label());
    let _ = writeln!(out, "  Overview: {}", details.overview_text());
    if !details.genres.is_empty() {
        let genres: Vec<&str> = details.genres.iter().map(|g| g.name.as_str()).collect();
        let _ = writeln!(out, "  Genres: {}", genres.join(", "));
    }
    out
}

/// Everything but the raw term, which changes on every line without
/// changing what is on screen
fn visible(state: &SearchState) -> SearchState {
    SearchState {
        raw_term: String::new(),
        ..state.clone()
    }
}

/// Drive the search loop from stdin until `:q` or EOF
pub async fn run(config: Config) -> anyhow::Result<()> {
    let components = Components::from_config(&config)?;
    let provider = components.provider.clone();

    let trending = components.popularity.top_hits(config.trending_limit).await;
    println!("{}", render_trending(&trending));

    let (handle, search_task) = SearchOrchestrator::spawn(
        provider.clone(),
        components.popularity.clone(),
        config.search_debounce(),
    );

    let image_base_url = config.tmdb_image_base_url.clone();
    let mut updates = handle.subscribe();
    let printer = tokio::spawn(async move {
        let mut last: Option<SearchState> = None;
        while updates.changed().await.is_ok() {
            let state = visible(&updates.borrow_and_update());
            if last.as_ref() == Some(&state) {
                continue;
            }
            println!("{}", render_state(&state, &image_base_url));
            last = Some(state);
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            Input::Term(term) => handle.set_term(term).await,
            Input::NextPage => handle.next_page().await,
            Input::PreviousPage => handle.previous_page().await,
            Input::Page(page) => handle.set_page(page).await,
            Input::Movie(id) => match provider.fetch_movie(id).await {
                Ok(details) => println!("{}", render_details(&details)),
                Err(e) => {
                    tracing::error!(movie_id = id, error = %e, "Error fetching movie detail");
                    println!("{}", e.detail_message());
                }
            },
            Input::Quit => break,
            Input::Unknown(line) => eprintln!("Unknown command: {}", line),
        }
    }

    handle.shutdown().await;
    search_task.await?;
    printer.abort();
    components.shutdown().await;
    Ok(())
}
