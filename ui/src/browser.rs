use cookie::Cookie;
use dioxus::document::eval;
use serde_json::json;
use types::{CSRF_COOKIE_NAME, Result, err};
use url::Url;

/// The parts of the page environment the view-model touches.
#[allow(async_fn_in_trait)]
pub trait Browser {
    /// Raw `document.cookie`.
    async fn cookies(&self) -> Result<String>;
    async fn origin(&self) -> Result<String>;
    async fn set_session_item(&self, key: &str, value: &str) -> Result<()>;
    /// Reads and removes a session storage entry.
    async fn take_session_item(&self, key: &str) -> Result<Option<String>>;
    /// Replaces the current page; nothing after this should matter.
    async fn navigate(&self, url: &Url) -> Result<()>;
}

/// Extract the anti-forgery token from a `document.cookie` string.
pub fn csrf_token(cookies: &str) -> Option<String> {
    Cookie::split_parse(cookies)
        .filter_map(|c| c.ok())
        .find(|c| c.name() == CSRF_COOKIE_NAME)
        .map(|c| c.value().to_string())
}

/// [`Browser`] backed by the page's JavaScript context.
#[derive(Clone, Copy, Default)]
pub struct EvalBrowser;

impl EvalBrowser {
    async fn run<T: serde::de::DeserializeOwned>(js: &str) -> Result<T> {
        eval(js)
            .recv::<T>()
            .await
            .map_err(|e| err!("browser call failed: {e:?}"))
    }
}

impl Browser for EvalBrowser {
    async fn cookies(&self) -> Result<String> {
        Self::run("dioxus.send(document.cookie);").await
    }

    async fn origin(&self) -> Result<String> {
        Self::run("dioxus.send(window.location.origin);").await
    }

    async fn set_session_item(&self, key: &str, value: &str) -> Result<()> {
        let js = format!(
            "sessionStorage.setItem({}, {}); dioxus.send(null);",
            json!(key),
            json!(value)
        );
        Self::run(&js).await
    }

    async fn take_session_item(&self, key: &str) -> Result<Option<String>> {
        let js = format!(
            r#"
            const value = sessionStorage.getItem({key});
            sessionStorage.removeItem({key});
            dioxus.send(value);
            "#,
            key = json!(key)
        );
        Self::run(&js).await
    }

    async fn navigate(&self, url: &Url) -> Result<()> {
        let js = format!(
            "window.location.replace({}); dioxus.send(null);",
            json!(url.as_str())
        );
        Self::run(&js).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_csrf_cookie() {
        assert_eq!(
            csrf_token("Session-Id=s3ss10n; Csrf-Token=abc123"),
            Some("abc123".into())
        );
        assert_eq!(csrf_token("Csrf-Token=abc123"), Some("abc123".into()));
    }

    #[test]
    fn missing_csrf_cookie() {
        assert_eq!(csrf_token(""), None);
        assert_eq!(csrf_token("Session-Id=s3ss10n"), None);
        assert_eq!(csrf_token("X-Csrf-Token=nope"), None);
    }

    #[test]
    fn keeps_value_with_equals_sign() {
        assert_eq!(csrf_token("Csrf-Token=a=b"), Some("a=b".into()));
    }
}
