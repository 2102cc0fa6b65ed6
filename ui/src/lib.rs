//! The user info page: its state, the view-model driving it, and the
//! component rendering it.

mod browser;
mod components;
mod state;
mod view_model;

pub use browser::{Browser, EvalBrowser, csrf_token};
pub use components::UserInfosPanel;
pub use state::{StateCell, UserInfosState};
pub use view_model::{FetchOutcome, UserInfosViewModel};
