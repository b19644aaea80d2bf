//! Data acquisition and view state for browsing the bird catalog.
//!
//! [controller::ViewController] owns the [state::AppState] and is the only
//! way to change it. It loads pages through a [fetcher::CollectionFetcher]
//! and derives filter values with the functions in [facets].

pub mod controller;
pub mod facets;
pub mod fetcher;
pub mod state;
