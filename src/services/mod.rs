pub mod movie_search;
pub mod pagination;
pub mod popularity;
pub mod providers;
pub mod search;

pub use pagination::{page_window, PaginationControls};
pub use popularity::PopularityCounter;
pub use providers::MetadataProvider;
pub use search::{SearchHandle, SearchOrchestrator, SearchState};
