use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::Provider;

pub const CSRF_COOKIE_NAME: &str = "Csrf-Token";
pub const CSRF_HEADER_NAME: &str = "X-Csrf-Token";
pub const SESSION_COOKIE_NAME: &str = "Session-Id";

/// Session storage key telling the page to fetch again once the provider
/// redirects back.
pub const RESUME_KEY: &str = "actionAfterAuth";
pub const RESUME_GET_USER_INFOS: &str = "getUserInfos";

pub const NAME_FIELD: &str = "propriété";
pub const VALUE_FIELD: &str = "valeur";

/// Body of `POST /userinfos`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfosRequest {
    #[serde(rename = "fournisseur")]
    pub provider: Provider,
    #[serde(rename = "origine")]
    pub origin: String,
}

/// One user attribute as sent by the backend.
///
/// The client does not validate the shape; the record is kept verbatim and
/// the accessors only help with display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeRecord(pub Value);

impl AttributeRecord {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        let mut map = serde_json::Map::new();
        map.insert(NAME_FIELD.into(), Value::String(name.into()));
        map.insert(VALUE_FIELD.into(), value);
        Self(Value::Object(map))
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get(NAME_FIELD)?.as_str()
    }

    pub fn value(&self) -> Option<&Value> {
        self.0.get(VALUE_FIELD)
    }

    /// The value as display text: strings without their quotes, anything else
    /// as compact JSON.
    pub fn value_text(&self) -> String {
        match self.value() {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => self.0.to_string(),
        }
    }
}

/// What `POST /userinfos` answers with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserInfosReply {
    /// The user has to authenticate with the provider first.
    Redirect {
        #[serde(rename = "redirectOP")]
        redirect_op: Url,
    },
    Attributes(Vec<AttributeRecord>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_uses_wire_names() {
        let request = UserInfosRequest {
            provider: Provider::Microsoft,
            origin: "http://localhost:8080".into(),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "fournisseur": "Microsoft", "origine": "http://localhost:8080" })
        );
    }

    #[test]
    fn reply_with_redirect() {
        let reply: UserInfosReply =
            serde_json::from_str(r#"{ "redirectOP": "https://accounts.google.com/o/oauth2/v2/auth?x=1" }"#)
                .unwrap();
        let UserInfosReply::Redirect { redirect_op } = reply else {
            panic!("expected a redirect");
        };
        assert_eq!(redirect_op.host_str(), Some("accounts.google.com"));
    }

    #[test]
    fn reply_with_records_keeps_order_and_shape() {
        let body = json!([
            { "propriété": "sub", "valeur": "1234" },
            { "propriété": "email_verified", "valeur": true },
            { "something": "else" },
        ]);
        let reply: UserInfosReply = serde_json::from_value(body.clone()).unwrap();
        let UserInfosReply::Attributes(records) = reply else {
            panic!("expected records");
        };
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name(), Some("sub"));
        assert_eq!(records[0].value_text(), "1234");
        assert_eq!(records[1].value_text(), "true");
        assert_eq!(records[2].name(), None);
        assert_eq!(serde_json::to_value(&records).unwrap(), body);
    }

    #[test]
    fn reply_rejects_other_shapes() {
        assert!(serde_json::from_str::<UserInfosReply>(r#"{ "error": "nope" }"#).is_err());
        assert!(serde_json::from_str::<UserInfosReply>(r#""text""#).is_err());
    }
}
