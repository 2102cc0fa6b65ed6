use api::Transport;
use types::{
    Error, Provider, RESUME_GET_USER_INFOS, RESUME_KEY, Result, UserInfosReply, UserInfosRequest,
};
use url::Url;

use crate::browser::{Browser, csrf_token};
use crate::state::{StateCell, UserInfosState};

/// What a call to [`UserInfosViewModel::fetch_user_infos`] ended with.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The attribute list now holds this many records.
    Populated(usize),
    /// The page is navigating to the provider.
    Redirected(Url),
    Failed(Error),
    /// A fetch was already in flight; nothing was sent.
    Busy,
}

/// Drives the user info page: one request to the backend, and the
/// authentication handoff when the backend asks for it.
#[derive(Clone)]
pub struct UserInfosViewModel<B, T> {
    browser: B,
    transport: T,
}

impl<B: Browser, T: Transport> UserInfosViewModel<B, T> {
    pub fn new(browser: B, transport: T) -> Self {
        Self { browser, transport }
    }

    pub async fn fetch_user_infos(&self, state: &mut impl StateCell) -> FetchOutcome {
        let Some(provider) = state.update(UserInfosState::begin_fetch) else {
            tracing::debug!("fetch already in flight");
            return FetchOutcome::Busy;
        };

        let result = match self.request(provider).await {
            Ok(UserInfosReply::Redirect { redirect_op }) => {
                let left = self.leave_for(&redirect_op).await;
                left.map(|()| redirect_op)
            }
            Ok(UserInfosReply::Attributes(attributes)) => {
                let count = attributes.len();
                state.update(|s| s.finish_fetch(attributes));
                return FetchOutcome::Populated(count);
            }
            Err(error) => Err(error),
        };

        match result {
            Ok(url) => {
                tracing::info!(%provider, %url, "redirecting to provider");
                FetchOutcome::Redirected(url)
            }
            Err(error) => {
                tracing::warn!(%provider, %error, "fetch failed");
                state.update(|s| s.fail_fetch(&error));
                FetchOutcome::Failed(error)
            }
        }
    }

    /// Called once on page load. Fetches again when the page was left for the
    /// provider by a previous fetch. Returns `None` when there was nothing to
    /// resume.
    pub async fn resume_after_auth(&self, state: &mut impl StateCell) -> Option<FetchOutcome> {
        match self.browser.take_session_item(RESUME_KEY).await {
            Ok(Some(action)) if action == RESUME_GET_USER_INFOS => {
                Some(self.fetch_user_infos(state).await)
            }
            Ok(_) => None,
            Err(error) => {
                tracing::warn!(%error, "reading the resume marker failed");
                state.update(|s| s.last_error = error.to_string());
                None
            }
        }
    }

    async fn request(&self, provider: Provider) -> Result<UserInfosReply> {
        let cookies = self.browser.cookies().await?;
        let origin = self.browser.origin().await?;

        let request = UserInfosRequest { provider, origin };
        self.transport
            .post_user_infos(&request, csrf_token(&cookies).as_deref())
            .await
    }

    async fn leave_for(&self, url: &Url) -> Result<()> {
        self.browser
            .set_session_item(RESUME_KEY, RESUME_GET_USER_INFOS)
            .await?;
        self.browser.navigate(url).await
    }
}
