use serde::{Deserialize, Serialize};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A serializable error for client rendering.
///
/// Anything convertible into an [`anyhow::Error`] converts into this type, so
/// `?` works on reqwest, url and serde errors alike. The message keeps the
/// whole context chain (`outer: inner: root`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Error {
    pub message: String,
}

impl Error {
    pub fn msg(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl<E> From<E> for Error
where
    E: Into<anyhow::Error>,
{
    fn from(error: E) -> Self {
        let report: anyhow::Error = error.into();
        Self {
            message: format!("{report:#}"),
        }
    }
}

/// Build an [`Error`] from a format string.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        $crate::Error::from($crate::internal_anyhow_dont_use!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn keeps_context_chain() {
        let result: anyhow::Result<()> = Err(anyhow::anyhow!("connection refused"))
            .context("POST /userinfos failed");
        let error = Error::from(result.unwrap_err());
        assert_eq!(error.message, "POST /userinfos failed: connection refused");
    }

    #[test]
    fn err_macro_formats() {
        let error = crate::err!("unexpected status {}", 418);
        assert_eq!(error.to_string(), "unexpected status 418");
    }
}
