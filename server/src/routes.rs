use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Query, State},
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{COOKIE, LOCATION, SET_COOKIE},
    },
    response::{IntoResponse, Response},
    routing::{get, post},
};
use cookie::{Cookie, SameSite};
use oauth2::RedirectUrl;
use serde::Deserialize;
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use types::{
    CSRF_COOKIE_NAME, CSRF_HEADER_NAME, Provider, SESSION_COOKIE_NAME, UserInfosReply,
};
use url::Url;

use crate::{
    config::Config,
    provider::ProviderClient,
    session::{Session, SessionId, SessionStore, random_token},
};

/// Used when the token response has no `expires_in`.
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct AppState {
    page_path: String,
    providers: Arc<HashMap<Provider, ProviderClient>>,
    sessions: SessionStore,
    http: reqwest::Client,
}

impl AppState {
    pub fn new(config: &Config) -> types::Result<Self> {
        let mut providers = HashMap::new();
        for provider in Provider::ALL {
            match config.provider(provider) {
                Some(provider_config) => {
                    providers.insert(provider, ProviderClient::new(provider, provider_config)?);
                }
                None => tracing::warn!(%provider, "provider not configured"),
            }
        }

        Ok(Self {
            page_path: config.page_path.clone(),
            providers: Arc::new(providers),
            sessions: SessionStore::default(),
            http: reqwest::Client::new(),
        })
    }

    fn provider(&self, provider: Provider) -> Result<&ProviderClient, RouteError> {
        self.providers
            .get(&provider)
            .ok_or(RouteError::ProviderNotConfigured(provider))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/userinfos",
            post(userinfos).layer(DefaultBodyLimit::max(1024)),
        )
        .route("/auth", get(auth))
        .with_state(state)
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(|c| c.ok())
        .find(|c| c.name() == name)
        .map(|c| c.value().to_string())
}

fn set_cookie(response: &mut Response, cookie: Cookie<'_>) -> Result<(), RouteError> {
    let value = HeaderValue::from_str(&cookie.to_string())
        .map_err(|e| RouteError::Internal(e.into()))?;
    response.headers_mut().append(SET_COOKIE, value);
    Ok(())
}

#[derive(Deserialize)]
struct UserInfosBody {
    fournisseur: String,
    origine: String,
}

async fn userinfos(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<UserInfosBody>,
) -> Result<Response, RouteError> {
    // Only enforced once the browser holds a CSRF cookie.
    if let Some(expected) = cookie_value(&headers, CSRF_COOKIE_NAME) {
        match headers.get(CSRF_HEADER_NAME).and_then(|v| v.to_str().ok()) {
            Some(token) if token == expected => {}
            Some(_) => return Err(RouteError::CsrfMismatch),
            None => return Err(RouteError::CsrfMissing),
        }
    }

    let provider: Provider = body
        .fournisseur
        .parse()
        .map_err(|_| RouteError::UnknownProvider(body.fournisseur.clone()))?;
    let client = state.provider(provider)?;

    let redirect_uri = Url::parse(&body.origine)
        .and_then(|origin| origin.join("/auth"))
        .map_err(|_| RouteError::InvalidOrigin(body.origine.clone()))?;

    if let Some(id) = cookie_value(&headers, SESSION_COOKIE_NAME).map(SessionId::from) {
        match state.sessions.get(&id).await {
            Some(Session::Authenticated {
                provider: p,
                access_token,
                expires_at,
            }) if p == provider && expires_at > Instant::now() => {
                let records = client
                    .user_infos(&state.http, &access_token)
                    .await
                    .map_err(RouteError::Upstream)?;
                tracing::info!(%provider, count = records.len(), "user infos sent");
                return Ok(Json(records).into_response());
            }
            Some(session) => {
                tracing::debug!(
                    previous = %session.provider(),
                    %provider,
                    "session expired, pending or for another provider"
                );
                state.sessions.remove(&id).await;
            }
            None => tracing::debug!("unknown session"),
        }
    }

    redirect_to_provider(&state, provider, client, redirect_uri).await
}

async fn redirect_to_provider(
    state: &AppState,
    provider: Provider,
    client: &ProviderClient,
    redirect_uri: Url,
) -> Result<Response, RouteError> {
    state.sessions.purge_expired().await;

    let authorization = client.authorize(RedirectUrl::from_url(redirect_uri.clone()));

    let id = SessionId::new();
    state
        .sessions
        .insert(
            id.clone(),
            Session::AuthenticationRequested {
                provider,
                csrf_state: authorization.csrf_state,
                pkce_verifier: authorization.pkce_verifier,
                redirect_uri: redirect_uri.to_string(),
                created: Instant::now(),
            },
        )
        .await;

    tracing::info!(%provider, "authentication requested");

    // Lax so the cookie comes back with the provider's redirect to /auth.
    let session_cookie = Cookie::build((SESSION_COOKIE_NAME, id.as_str().to_owned()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    // Read by the page script, so not http-only.
    let csrf_cookie = Cookie::build((CSRF_COOKIE_NAME, random_token(64)))
        .path("/")
        .same_site(SameSite::Strict)
        .build();

    let mut response = Json(UserInfosReply::Redirect {
        redirect_op: authorization.url,
    })
    .into_response();
    set_cookie(&mut response, session_cookie)?;
    set_cookie(&mut response, csrf_cookie)?;

    Ok(response)
}

#[derive(Deserialize)]
struct AuthCallback {
    code: Option<String>,
    state: Option<String>,
}

async fn auth(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<AuthCallback>,
) -> Result<Response, RouteError> {
    let id = cookie_value(&headers, SESSION_COOKIE_NAME)
        .map(SessionId::from)
        .ok_or(RouteError::NoSessionCookie)?;

    let session = state
        .sessions
        .remove(&id)
        .await
        .ok_or(RouteError::UnknownSession)?;

    let Session::AuthenticationRequested {
        provider,
        csrf_state,
        pkce_verifier,
        redirect_uri,
        ..
    } = session
    else {
        return Err(RouteError::AlreadyAuthenticated);
    };

    let code = params.code.ok_or(RouteError::MissingCode)?;
    let returned_state = params.state.ok_or(RouteError::MissingState)?;
    if returned_state != csrf_state {
        return Err(RouteError::InvalidState);
    }

    let client = state.provider(provider)?;
    let token = client
        .exchange_code(&state.http, &code, &redirect_uri, &pkce_verifier)
        .await
        .map_err(RouteError::Upstream)?;

    let lifetime = token
        .expires_in
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TOKEN_LIFETIME);
    state
        .sessions
        .insert(
            id.clone(),
            Session::Authenticated {
                provider,
                access_token: token.access_token,
                expires_at: Instant::now() + lifetime,
            },
        )
        .await;

    tracing::info!(%provider, ?lifetime, "authentication completed");

    // Back from the provider: the session cookie no longer needs Lax.
    let session_cookie = Cookie::build((SESSION_COOKIE_NAME, id.as_str().to_owned()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .build();

    let location = HeaderValue::from_str(&state.page_path)
        .map_err(|e| RouteError::Internal(e.into()))?;
    let mut response = (StatusCode::FOUND, [(LOCATION, location)]).into_response();
    set_cookie(&mut response, session_cookie)?;

    Ok(response)
}

#[derive(Debug)]
enum RouteError {
    CsrfMissing,
    CsrfMismatch,
    UnknownProvider(String),
    ProviderNotConfigured(Provider),
    InvalidOrigin(String),
    NoSessionCookie,
    UnknownSession,
    AlreadyAuthenticated,
    MissingCode,
    MissingState,
    InvalidState,
    Upstream(types::Error),
    Internal(types::Error),
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            RouteError::CsrfMissing => (StatusCode::FORBIDDEN, "X-Csrf-Token header missing"),
            RouteError::CsrfMismatch => (StatusCode::FORBIDDEN, "X-Csrf-Token mismatch"),
            RouteError::UnknownProvider(_) => (StatusCode::BAD_REQUEST, "Unknown provider"),
            RouteError::ProviderNotConfigured(_) => {
                (StatusCode::BAD_REQUEST, "Provider not configured")
            }
            RouteError::InvalidOrigin(_) => (StatusCode::BAD_REQUEST, "Invalid origin"),
            RouteError::NoSessionCookie => (StatusCode::BAD_REQUEST, "No session cookie"),
            RouteError::UnknownSession => (StatusCode::BAD_REQUEST, "Unknown session"),
            RouteError::AlreadyAuthenticated => {
                (StatusCode::BAD_REQUEST, "Session already authenticated")
            }
            RouteError::MissingCode => (StatusCode::BAD_REQUEST, "Missing authorization code"),
            RouteError::MissingState => (StatusCode::BAD_REQUEST, "Missing state"),
            RouteError::InvalidState => (StatusCode::BAD_REQUEST, "Invalid OAuth state"),
            RouteError::Upstream(_) => (StatusCode::BAD_GATEWAY, "Provider request failed"),
            RouteError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error"),
        };

        if status.is_server_error() {
            tracing::error!(error = ?self, "{message}");
        } else {
            tracing::warn!(error = ?self, "{message}");
        }

        (status, message).into_response()
    }
}
