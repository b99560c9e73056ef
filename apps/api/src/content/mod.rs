// Content Resolution & Normalization Engine
// Locates a chapter's question file under whichever historical convention is
// present, normalizes its schema, and assembles one page of typed questions.

pub mod assembler;
pub mod handlers;
pub mod image;
pub mod locator;
pub mod models;
pub mod normalizer;
pub mod paginator;
pub mod sanitizer;
pub mod store;

// Re-export the public API consumed by config, state and routes.
pub use assembler::{ContentEngine, ResolutionSettings};
pub use models::Strictness;
pub use store::FsContentStore;
