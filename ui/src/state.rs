use dioxus::prelude::*;
use types::{AttributeRecord, Error, Provider};

/// Everything the user info page shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserInfosState {
    pub attributes: Vec<AttributeRecord>,
    pub provider: Provider,
    /// True while a fetch is in flight. Also true after a redirect, since the
    /// page is being left.
    pub busy: bool,
    /// Empty when there is no error.
    pub last_error: String,
}

impl UserInfosState {
    /// Returns `true` so the radio input keeps its default click behavior.
    pub fn select_provider(&mut self, provider: Provider) -> bool {
        self.provider = provider;
        self.attributes.clear();
        true
    }

    /// Marks the start of a fetch and returns the provider to ask for, or
    /// `None` when one is already running.
    pub fn begin_fetch(&mut self) -> Option<Provider> {
        if self.busy {
            return None;
        }
        self.busy = true;
        self.last_error.clear();
        Some(self.provider)
    }

    pub fn finish_fetch(&mut self, attributes: Vec<AttributeRecord>) {
        self.attributes = attributes;
        self.busy = false;
    }

    /// Attributes are left as they were.
    pub fn fail_fetch(&mut self, error: &Error) {
        self.last_error = error.to_string();
        self.busy = false;
    }
}

/// Somewhere a [`UserInfosState`] can be updated from, without holding a
/// borrow across an await point.
pub trait StateCell {
    fn update<R>(&mut self, f: impl FnOnce(&mut UserInfosState) -> R) -> R;
}

impl StateCell for UserInfosState {
    fn update<R>(&mut self, f: impl FnOnce(&mut UserInfosState) -> R) -> R {
        f(self)
    }
}

impl StateCell for Signal<UserInfosState> {
    fn update<R>(&mut self, f: impl FnOnce(&mut UserInfosState) -> R) -> R {
        f(&mut *self.write())
    }
}
