use serde::Serialize;
use serde_json::Value;

pub const MAX_MESSAGE_CHARS: usize = 42;
pub const MAX_AUTHOR_CHARS: usize = 21;

#[derive(Debug, Default)]
pub struct PokeRequest {
    pub message: Option<String>,
    pub author: Option<String>,
}

impl PokeRequest {
    /// Reads each field on its own. A field that is missing or not a string
    /// is treated as absent; a body that is not a JSON object is empty.
    pub fn from_body(body: &[u8]) -> Self {
        let value: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
        let field = |name: &str| value.get(name).and_then(Value::as_str).map(String::from);

        Self {
            message: field("message"),
            author: field("author"),
        }
    }

    /// Applies defaults and length checks, returning `(message, author)`.
    pub fn validate(self) -> Result<(String, String), &'static str> {
        let message = self
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "Poke!".into());
        let author = self
            .author
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| "Anonymous".into());

        if message.chars().count() > MAX_MESSAGE_CHARS {
            return Err("Message too long (max 42 characters)");
        }
        if author.chars().count() > MAX_AUTHOR_CHARS {
            return Err("Author name too long (max 21 characters)");
        }

        Ok((message, author))
    }
}

#[derive(Debug, Serialize)]
pub struct PokeResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub hourly_count: u64,
    pub hourly_limit: i64,
}
