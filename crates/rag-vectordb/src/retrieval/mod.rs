//! Document storage and similarity search

pub mod catalog;

pub use catalog::DocumentCatalog;
