//! ListController: generic settings-list CRUD. DraftService: edit-session drafts.

mod drafts;
mod list;
pub use drafts::DraftService;
pub use list::{ListAction, ListController, ListRequest, ListResponse};
