//! Snippet retention
//!
//! Candidates are scored chunks already on disk. `TopSnippets` decides which
//! of them survive and deletes the files of those that do not.

mod candidate;
mod selector;
mod store;

pub use candidate::Candidate;
pub use selector::TopSnippets;
pub use store::SnippetStore;
