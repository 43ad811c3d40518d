//! Best-effort answer extraction from generation responses.
//!
//! Different client versions of the same API disagree on where the text
//! lives: `candidates[0].content.text`, `candidates[0].content.parts[*].text`,
//! `candidates[0].text`, or parts that use `content` instead of `text`. The
//! response is decoded into a [`ResponseView`] first; [`extract_text`] then
//! walks a fixed fallback order and always returns displayable text.

use serde_json::Value;

/// Faults found while decoding a response.
///
/// [`extract_text`] renders them into its output; [`try_extract_text`]
/// returns them.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// `candidates` holds a non-empty value that is not a list.
    #[error("'candidates' is {0}, expected a list")]
    CandidatesNotList(&'static str),
    /// `parts` holds a non-empty value that is not a list.
    #[error("'parts' is {0}, expected a list")]
    PartsNotList(&'static str),
    /// A part carries a non-empty, non-text value where text was expected.
    #[error("part {index} has a {found} in '{field}', expected text")]
    NonTextPart {
        /// Position of the part.
        index: usize,
        /// Offending field name.
        field: &'static str,
        /// JSON kind that was found.
        found: &'static str,
    },
}

/// Decoded shape of a provider response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseView<'a> {
    /// No usable candidates; the whole response is all there is.
    NoCandidates(&'a Value),
    /// First candidate and the resolved content view inside it.
    Candidate {
        /// The candidate as received.
        raw: &'a Value,
        /// Where its text lives.
        content: ContentView<'a>,
    },
}

/// Where the text of a candidate lives.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentView<'a> {
    /// Non-empty flat `text` field.
    Text(&'a str),
    /// Ordered parts.
    Parts(Vec<PartText<'a>>),
    /// Neither shape recognized.
    Opaque,
}

/// Text carried by a single part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartText<'a> {
    /// Taken from the part's `text` field.
    Text(&'a str),
    /// Taken from the part's `content` field.
    Content(&'a str),
    /// Part carries no text.
    Empty,
}

impl ExtractError {
    /// Bracketed text shown in place of an answer.
    pub fn diagnostic(&self) -> String {
        format!("[Could not extract text from response: {self}]")
    }
}

impl<'a> PartText<'a> {
    fn decode(index: usize, part: &'a Value) -> Result<Self, ExtractError> {
        if let Some(text) = non_empty_str(index, part, "text")? {
            return Ok(Self::Text(text));
        }
        if let Some(text) = non_empty_str(index, part, "content")? {
            return Ok(Self::Content(text));
        }
        Ok(Self::Empty)
    }

    /// The carried text, empty for [`PartText::Empty`].
    pub fn as_str(&self) -> &'a str {
        match self {
            Self::Text(t) | Self::Content(t) => t,
            Self::Empty => "",
        }
    }
}

impl<'a> ResponseView<'a> {
    /// Classify a raw provider response.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError`] when a recognized field holds the wrong kind
    /// of value.
    pub fn decode(response: &'a Value) -> Result<Self, ExtractError> {
        let candidate = match response.get("candidates") {
            Some(Value::Array(candidates)) => candidates.first(),
            Some(other) if is_truthy(other) => {
                return Err(ExtractError::CandidatesNotList(kind(other)))
            }
            _ => None,
        };
        let Some(raw) = candidate else {
            return Ok(Self::NoCandidates(response));
        };

        let view = match raw.get("content") {
            Some(content) if is_truthy(content) => content,
            _ => raw,
        };

        let content = if let Some(text) = view.get("text").and_then(Value::as_str) {
            if text.is_empty() {
                Self::decode_parts(view)?
            } else {
                ContentView::Text(text)
            }
        } else {
            Self::decode_parts(view)?
        };

        Ok(Self::Candidate { raw, content })
    }

    fn decode_parts(view: &'a Value) -> Result<ContentView<'a>, ExtractError> {
        match view.get("parts") {
            Some(Value::Array(parts)) => parts
                .iter()
                .enumerate()
                .map(|(index, part)| PartText::decode(index, part))
                .collect::<Result<Vec<_>, _>>()
                .map(ContentView::Parts),
            Some(other) if is_truthy(other) => Err(ExtractError::PartsNotList(kind(other))),
            _ => Ok(ContentView::Opaque),
        }
    }

    /// Pick the answer text following the fallback order.
    pub fn answer(&self) -> String {
        match self {
            Self::NoCandidates(response) => response.to_string(),
            Self::Candidate { raw, content } => match content {
                ContentView::Text(text) => (*text).to_owned(),
                ContentView::Parts(parts) => {
                    let assembled: String = parts.iter().map(PartText::as_str).collect();
                    if assembled.is_empty() {
                        raw.to_string()
                    } else {
                        assembled
                    }
                }
                ContentView::Opaque => raw.to_string(),
            },
        }
    }
}

/// Extract the best-effort answer from a provider response.
///
/// Never fails: decoding faults come back as
/// `[Could not extract text from response: ...]`.
pub fn extract_text(response: &Value) -> String {
    try_extract_text(response).unwrap_or_else(|e| e.diagnostic())
}

/// Like [`extract_text`], but hands decoding faults back to the caller.
///
/// # Errors
///
/// Returns [`ExtractError`] when a recognized field holds the wrong kind of
/// value.
pub fn try_extract_text(response: &Value) -> Result<String, ExtractError> {
    ResponseView::decode(response).map(|view| view.answer())
}

fn non_empty_str<'a>(
    index: usize,
    part: &'a Value,
    field: &'static str,
) -> Result<Option<&'a str>, ExtractError> {
    match part.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(Some(s.as_str())),
        Some(other) if is_truthy(other) => Err(ExtractError::NonTextPart {
            index,
            field,
            found: kind(other),
        }),
        _ => Ok(None),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}
