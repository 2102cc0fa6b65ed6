use secrecy::SecretString;
use serde::Deserialize;
use types::{Provider, Result};
use url::Url;

#[derive(Clone, Deserialize)]
pub struct Config {
    /// Where `/auth` sends the browser once the provider is done.
    #[serde(default = "default_page_path")]
    pub page_path: String,
    #[serde(default)]
    pub microsoft: Option<ProviderConfig>,
    #[serde(default)]
    pub google: Option<ProviderConfig>,
}

/// Client registration with one provider. Endpoints default to the
/// provider's public ones.
#[derive(Clone, Deserialize)]
pub struct ProviderConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    pub auth_url: Option<Url>,
    pub token_url: Option<Url>,
    pub userinfo_url: Option<Url>,
}

fn default_page_path() -> String {
    "/".into()
}

impl Config {
    /// Reads `userinfos.toml` if present, then `USERINFOS__*` environment
    /// variables, e.g. `USERINFOS__GOOGLE__CLIENT_ID`.
    pub fn load() -> Result<Self> {
        let config = ::config::Config::builder()
            .add_source(::config::File::with_name("userinfos").required(false))
            .add_source(
                ::config::Environment::with_prefix("USERINFOS")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn provider(&self, provider: Provider) -> Option<&ProviderConfig> {
        match provider {
            Provider::Microsoft => self.microsoft.as_ref(),
            Provider::Google => self.google.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn reads_toml() {
        let config: Config = ::config::Config::builder()
            .add_source(::config::File::from_str(
                r#"
                [google]
                client_id = "gg-id"
                client_secret = "gg-secret"
                token_url = "http://127.0.0.1:9999/token"
                "#,
                ::config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.page_path, "/");
        assert!(config.provider(Provider::Microsoft).is_none());

        let google = config.provider(Provider::Google).unwrap();
        assert_eq!(google.client_id, "gg-id");
        assert_eq!(google.client_secret.expose_secret(), "gg-secret");
        assert_eq!(google.token_url.as_ref().unwrap().port(), Some(9999));
        assert!(google.auth_url.is_none());
    }

    #[test]
    fn reads_environment() {
        let vars: ::config::Map<String, String> = [
            ("USERINFOS__PAGE_PATH", "/moi"),
            ("USERINFOS__GOOGLE__CLIENT_ID", "gg-id"),
            ("USERINFOS__GOOGLE__CLIENT_SECRET", "gg-secret"),
            ("OTHER__GOOGLE__CLIENT_ID", "ignored"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect();

        let config: Config = ::config::Config::builder()
            .add_source(
                ::config::Environment::with_prefix("USERINFOS")
                    .prefix_separator("__")
                    .separator("__")
                    .source(Some(vars)),
            )
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.page_path, "/moi");
        assert!(config.provider(Provider::Microsoft).is_none());

        let google = config.provider(Provider::Google).unwrap();
        assert_eq!(google.client_id, "gg-id");
        assert_eq!(google.client_secret.expose_secret(), "gg-secret");
        assert!(google.userinfo_url.is_none());
    }
}
