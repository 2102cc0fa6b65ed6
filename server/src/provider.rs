use api::ReqwestExt;
use oauth2::{
    AuthUrl, ClientId, CsrfToken, EndpointNotSet, EndpointSet, PkceCodeChallenge, RedirectUrl,
    Scope, StandardErrorResponse, basic::BasicClient,
};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::borrow::Cow;
use types::{AttributeRecord, Provider, Result};
use url::Url;

use crate::config::ProviderConfig;

type ConfiguredClient = oauth2::Client<
    StandardErrorResponse<oauth2::basic::BasicErrorResponseType>,
    oauth2::StandardTokenResponse<oauth2::EmptyExtraTokenFields, oauth2::basic::BasicTokenType>,
    oauth2::StandardTokenIntrospectionResponse<
        oauth2::EmptyExtraTokenFields,
        oauth2::basic::BasicTokenType,
    >,
    oauth2::StandardRevocableToken,
    StandardErrorResponse<oauth2::RevocationErrorResponseType>,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
>;

struct Endpoints {
    auth: &'static str,
    token: &'static str,
    userinfo: &'static str,
}

fn public_endpoints(provider: Provider) -> Endpoints {
    match provider {
        Provider::Microsoft => Endpoints {
            auth: "https://login.microsoftonline.com/consumers/oauth2/v2.0/authorize",
            token: "https://login.microsoftonline.com/consumers/oauth2/v2.0/token",
            userinfo: "https://graph.microsoft.com/oidc/userinfo",
        },
        Provider::Google => Endpoints {
            auth: "https://accounts.google.com/o/oauth2/v2/auth",
            token: "https://oauth2.googleapis.com/token",
            userinfo: "https://openidconnect.googleapis.com/v1/userinfo",
        },
    }
}

/// What the browser is sent to, and what has to be kept to finish the flow.
pub struct Authorization {
    pub url: Url,
    pub csrf_state: String,
    pub pkce_verifier: String,
}

#[derive(Deserialize)]
pub struct TokenResponse {
    pub access_token: SecretString,
    pub expires_in: Option<u64>,
}

#[derive(Clone)]
pub struct ProviderClient {
    oauth_client: ConfiguredClient,
    client_id: String,
    client_secret: SecretString,
    token_url: Url,
    userinfo_url: Url,
}

impl ProviderClient {
    pub fn new(provider: Provider, config: &ProviderConfig) -> Result<Self> {
        let defaults = public_endpoints(provider);
        let auth_url = match &config.auth_url {
            Some(url) => url.clone(),
            None => Url::parse(defaults.auth)?,
        };
        let token_url = match &config.token_url {
            Some(url) => url.clone(),
            None => Url::parse(defaults.token)?,
        };
        let userinfo_url = match &config.userinfo_url {
            Some(url) => url.clone(),
            None => Url::parse(defaults.userinfo)?,
        };

        let oauth_client = BasicClient::new(ClientId::new(config.client_id.clone()))
            .set_auth_uri(AuthUrl::from_url(auth_url));

        Ok(Self {
            oauth_client,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            token_url,
            userinfo_url,
        })
    }

    pub fn authorize(&self, redirect_uri: RedirectUrl) -> Authorization {
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let (url, csrf_state) = self
            .oauth_client
            .authorize_url(CsrfToken::new_random)
            .set_redirect_uri(Cow::Owned(redirect_uri))
            .add_scope(Scope::new("openid".to_string()))
            .add_scope(Scope::new("email".to_string()))
            .add_scope(Scope::new("profile".to_string()))
            .set_pkce_challenge(pkce_challenge)
            .url();

        Authorization {
            url,
            csrf_state: csrf_state.secret().clone(),
            pkce_verifier: pkce_verifier.secret().clone(),
        }
    }

    pub async fn exchange_code(
        &self,
        http: &Client,
        code: &str,
        redirect_uri: &str,
        pkce_verifier: &str,
    ) -> Result<TokenResponse> {
        http.post(self.token_url.clone())
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.expose_secret()),
                ("code_verifier", pkce_verifier),
            ])
            .try_send()
            .await
    }

    pub async fn user_infos(
        &self,
        http: &Client,
        access_token: &SecretString,
    ) -> Result<Vec<AttributeRecord>> {
        let claims: Map<String, Value> = http
            .get(self.userinfo_url.clone())
            .bearer_auth(access_token.expose_secret())
            .try_send()
            .await?;

        Ok(attribute_records(claims))
    }
}

/// One record per claim, in the provider's order.
pub fn attribute_records(claims: Map<String, Value>) -> Vec<AttributeRecord> {
    claims
        .into_iter()
        .map(|(name, value)| AttributeRecord::new(name, value))
        .collect()
}
