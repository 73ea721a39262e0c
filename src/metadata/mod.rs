//! Metadata enrichment: canonical names and cover art.
//!
//! # Module layout
//!
//! - [`naming`] -- File name parsing, title shortening and the canonical name.
//! - [`provider`] -- The [`CoverCatalog`] trait.
//! - [`providers`] -- Concrete catalogs (AniList).
//! - [`enrichment`] -- The [`Enricher`] stage.

pub mod enrichment;
pub mod naming;
pub mod provider;
pub mod providers;

pub use enrichment::{Enricher, Enrichment};
pub use naming::EpisodeInfo;
pub use provider::{CatalogError, CoverCatalog};
pub use providers::AniListCatalog;
