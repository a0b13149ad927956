//! Loading raw event text and substituting the job token
//!
//! When an Actions step dumps `toJSON(github)`, the runner masks the token as
//! `***`. Callers that hold the real token (a PAT passed separately) put it
//! back before parsing.

use super::parse::ParsedEvent;
use crate::error::{Error, Result};
use std::borrow::Cow;
use std::path::Path;

/// Placeholder the runner writes in place of secrets
pub const MASKED_TOKEN: &str = "***";

/// Replace the first masked token placeholder with `token`
///
/// The token is JSON-escaped so the document stays valid. Returns the input
/// unchanged (borrowed) when there is no token or no placeholder.
pub fn substitute_token<'a>(raw: &'a str, token: Option<&str>) -> Cow<'a, str> {
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        return Cow::Borrowed(raw);
    };

    if !raw.contains(MASKED_TOKEN) {
        tracing::warn!("token supplied but event text has no masked token placeholder");
        return Cow::Borrowed(raw);
    }

    let quoted = serde_json::Value::String(token.to_string()).to_string();
    let escaped = &quoted[1..quoted.len() - 1];
    Cow::Owned(raw.replacen(MASKED_TOKEN, escaped, 1))
}

/// Parse event text after token substitution
pub fn load_event_str(raw: &str, token: Option<&str>) -> Result<ParsedEvent> {
    ParsedEvent::parse(&substitute_token(raw, token))
}

/// Read an event file, substitute the token, and parse it
pub fn load_event_file(path: &Path, token: Option<&str>) -> Result<ParsedEvent> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("cannot read event file {}: {}", path.display(), e),
        ))
    })?;

    tracing::debug!(path = %path.display(), bytes = content.len(), "read event file");

    load_event_str(&content, token)
}
