mod error;
mod provider;
mod userinfos;

pub use error::{Error, Result};
pub use provider::Provider;
pub use userinfos::*;

// FIXME: We can do this better I think.
#[doc(hidden)]
pub use anyhow::anyhow as internal_anyhow_dont_use;
