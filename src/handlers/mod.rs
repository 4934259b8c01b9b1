//! HTTP handlers for the settings lists, their tree views, and drafts.

pub mod drafts;
pub mod list;
pub mod tree;
pub use drafts::*;
pub use list::*;
pub use tree::*;
