//! Traversal and extraction over a single page session.
//!
//! [`web::Crawler`] composes the leaf components: [`revealer`] loads the whole
//! listing page, [`harvester`] reads links and titles from it, [`paginator`]
//! moves to the next listing page and [`extractor`] reads one poem page.

pub mod extractor;
pub mod harvester;
pub mod paginator;
pub mod revealer;
pub mod web;

pub use web::{Crawler, LinkCollectionSummary};
