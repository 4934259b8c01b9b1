//! Request extractors shared by the settings handlers.

pub mod admin_user;
pub mod list_params;

pub use admin_user::AdminUser;
pub use list_params::ListParams;
