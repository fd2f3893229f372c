//! Best-effort decoding of inbound payment notifications.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// Key under which undecodable notification text is exposed.
pub const RAW_BODY_KEY: &str = "raw";

/// Key spellings accepted for the invoice identifier, in lookup order.
const INVOICE_ID_KEYS: [&str; 2] = ["invoice_id", "invoiceId"];

/// Payload of an inbound notification.
///
/// Notifications are unauthenticated and may not be JSON at all, so the
/// decode outcome is carried explicitly instead of being guessed later.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationBody {
    /// The body parsed as JSON.
    Decoded(Value),
    /// The body was not valid JSON; the text is kept verbatim.
    RawText(String),
}

impl NotificationBody {
    /// Decodes a request body, falling back to its raw text.
    pub fn decode(bytes: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(value) => NotificationBody::Decoded(value),
            Err(e) => {
                tracing::debug!("Notification body is not JSON: {}", e);
                NotificationBody::RawText(String::from_utf8_lossy(bytes).into_owned())
            }
        }
    }

    /// Returns the invoice identifier under either accepted key spelling.
    ///
    /// Numbers are accepted and rendered as strings. Empty strings count as
    /// absent. Raw text never yields an identifier.
    pub fn invoice_id(&self) -> Option<String> {
        let NotificationBody::Decoded(Value::Object(map)) = self else {
            return None;
        };

        INVOICE_ID_KEYS
            .iter()
            .filter_map(|key| map.get(*key))
            .find_map(|value| match value {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
    }

    /// Returns the raw text if the body could not be decoded.
    pub fn raw_text(&self) -> Option<&str> {
        match self {
            NotificationBody::RawText(text) => Some(text),
            NotificationBody::Decoded(_) => None,
        }
    }
}

impl Serialize for NotificationBody {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NotificationBody::Decoded(value) => value.serialize(serializer),
            NotificationBody::RawText(text) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(RAW_BODY_KEY, text)?;
                map.end()
            }
        }
    }
}
