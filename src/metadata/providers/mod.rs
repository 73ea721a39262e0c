//! Concrete cover catalog implementations.
//!
//! Each submodule wraps a single external API and implements the
//! [`CoverCatalog`](super::CoverCatalog) trait.

pub mod anilist;

pub use anilist::AniListCatalog;
