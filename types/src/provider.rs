use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::{Error, err};

/// An OpenID Connect identity provider the backend knows how to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    #[default]
    Microsoft,
    Google,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::Microsoft, Provider::Google];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Microsoft => "Microsoft",
            Provider::Google => "Google",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Provider::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| err!("unknown provider '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_names() {
        assert_eq!("Google".parse::<Provider>().unwrap(), Provider::Google);
        assert_eq!("Microsoft".parse::<Provider>().unwrap(), Provider::Microsoft);
        assert!("microsoft".parse::<Provider>().is_err());
    }

    #[test]
    fn serializes_as_plain_name() {
        assert_eq!(serde_json::to_string(&Provider::Google).unwrap(), r#""Google""#);
        assert_eq!(Provider::default(), Provider::Microsoft);
    }
}
