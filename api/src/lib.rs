//! Typed client for the `POST /userinfos` endpoint.

use reqwest::{Client, RequestBuilder, header::CONTENT_TYPE};
use serde::de::DeserializeOwned;
use types::{CSRF_HEADER_NAME, Result, UserInfosReply, UserInfosRequest, err};
use url::Url;

/// Sends a user info request and decodes the reply.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn post_user_infos(
        &self,
        request: &UserInfosRequest,
        csrf_token: Option<&str>,
    ) -> Result<UserInfosReply>;
}

/// Send, fail on non-success statuses and decode the JSON body.
#[allow(async_fn_in_trait)]
pub trait ReqwestExt {
    async fn try_send<T: DeserializeOwned>(self) -> Result<T>;
}

impl ReqwestExt for RequestBuilder {
    async fn try_send<T: DeserializeOwned>(self) -> Result<T> {
        let response = self.send().await?.error_for_status()?;
        let body = response.bytes().await?;

        match serde_json::from_slice(&body) {
            Ok(r) => Ok(r),
            Err(error) => {
                tracing::debug!(%error, len = body.len(), "failed to parse response");
                Err(err!("unexpected response from server: {error}"))
            }
        }
    }
}

/// Posts to `/userinfos` on the origin named in the request, which is the
/// page's own origin.
#[derive(Clone, Default)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn request(
        &self,
        request: &UserInfosRequest,
        csrf_token: Option<&str>,
    ) -> Result<RequestBuilder> {
        let url = Url::parse(&request.origin)?.join("/userinfos")?;

        let mut builder = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .json(request);
        if let Some(token) = csrf_token {
            builder = builder.header(CSRF_HEADER_NAME, token);
        }

        Ok(builder)
    }
}

impl Transport for HttpClient {
    async fn post_user_infos(
        &self,
        request: &UserInfosRequest,
        csrf_token: Option<&str>,
    ) -> Result<UserInfosReply> {
        self.request(request, csrf_token)?.try_send().await
    }
}
