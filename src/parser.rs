//! Tolerant parser for identification replies.
//!
//! Model output is read in two passes:
//! 1. Structured: the reply (or a JSON object recovered from `<think>`
//!    blocks, Markdown code fences or surrounding prose) is read as JSON and
//!    missing or falsy fields fall back to structured defaults.
//! 2. Extracted: labeled `species:` / `venomous:` / `confidence:` /
//!    `description:` lines are scraped with case-insensitive patterns.
//!
//! Both passes always yield a complete [`IdentificationRecord`].

use crate::types::IdentificationRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

const STRUCTURED_SPECIES: &str = "Unknown";
const STRUCTURED_CONFIDENCE: f64 = 0.5;
const STRUCTURED_DESCRIPTION: &str = "No description available";

const EXTRACTED_SPECIES: &str = "Unknown Snake Species";
const EXTRACTED_CONFIDENCE: f64 = 0.7;
const EXTRACTED_DESCRIPTION: &str = "Snake species identified from image analysis.";

const MAX_BRACE_CANDIDATES: usize = 1024;

static SPECIES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)species[:\s]+([^\n,]+)").unwrap());
static VENOMOUS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)venomous[:\s]+(true|false|yes|no)").unwrap());
static CONFIDENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)confidence[:\s]+([0-9]+(?:\.[0-9]+)?)").unwrap());
static DESCRIPTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)description[:\s]+([^\n]+)").unwrap());

/// Which pass produced a record.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedIdentification {
    /// The reply (or an object embedded in it) was valid JSON.
    Structured(IdentificationRecord),
    /// Fields were scraped from labeled lines.
    Extracted(IdentificationRecord),
}

impl ParsedIdentification {
    pub fn is_structured(&self) -> bool {
        matches!(self, ParsedIdentification::Structured(_))
    }

    pub fn record(&self) -> &IdentificationRecord {
        match self {
            ParsedIdentification::Structured(r) | ParsedIdentification::Extracted(r) => r,
        }
    }

    pub fn into_record(self) -> IdentificationRecord {
        match self {
            ParsedIdentification::Structured(r) | ParsedIdentification::Extracted(r) => r,
        }
    }
}

/// Parse a model reply into an identification record. Never fails.
pub fn parse_identification(response: &str) -> IdentificationRecord {
    classify(response).into_record()
}

/// Parse a model reply, reporting which pass succeeded.
///
/// Candidates for the structured pass, in order:
/// 1. The whole reply as any JSON value other than `null`
/// 2. The reply with `<think>` blocks stripped, as a JSON object
/// 3. The body of a Markdown code fence, as a JSON object
/// 4. The outermost brace-matched `{...}` span, as a JSON object
///
/// If none parse, labeled fields are extracted from the raw reply.
pub fn classify(response: &str) -> ParsedIdentification {
    let trimmed = response.trim();

    if let Some(value) = serde_json::from_str::<Value>(trimmed)
        .ok()
        .filter(|v| !v.is_null())
    {
        return ParsedIdentification::Structured(from_value(&value));
    }

    let cleaned = strip_think_tags(trimmed);
    let cleaned = cleaned.trim();

    let embedded = parse_object(cleaned)
        .or_else(|| extract_object_from_code_block(cleaned))
        .or_else(|| find_json_object(cleaned));

    match embedded {
        Some(value) => ParsedIdentification::Structured(from_value(&value)),
        None => ParsedIdentification::Extracted(extract_labeled(response)),
    }
}

/// Strip `<think>...</think>` blocks emitted by reasoning models.
///
/// An unclosed `<think>` swallows the rest of the text.
pub fn strip_think_tags(text: &str) -> String {
    let mut result = text.to_string();
    while let Some(start) = result.find("<think>") {
        if let Some(end) = result[start..].find("</think>") {
            result = format!("{}{}", &result[..start], &result[start + end + 8..]);
        } else {
            result.truncate(start);
            break;
        }
    }
    result
}

fn parse_object(text: &str) -> Option<Value> {
    serde_json::from_str::<Value>(text)
        .ok()
        .filter(Value::is_object)
}

fn extract_object_from_code_block(text: &str) -> Option<Value> {
    let mut search_from = 0;
    while let Some(start) = text[search_from..].find("```") {
        let fence_end = search_from + start + 3;
        let content_start = text[fence_end..].find('\n').map(|p| fence_end + p + 1)?;
        if let Some(end) = text[content_start..].find("```") {
            if let Some(value) = parse_object(text[content_start..content_start + end].trim()) {
                return Some(value);
            }
            search_from = content_start + end + 3;
        } else {
            return None;
        }
    }
    None
}

/// Find a JSON object by brace matching, preferring the widest span.
///
/// Every `{`/`}` pair is a candidate, so the search is quadratic in the
/// number of braces; it gives up after `MAX_BRACE_CANDIDATES` attempts.
fn find_json_object(text: &str) -> Option<Value> {
    let starts: Vec<usize> = text.match_indices('{').map(|(i, _)| i).collect();
    let ends: Vec<usize> = text.match_indices('}').map(|(i, _)| i).collect();

    let mut attempts = 0;
    for &start in &starts {
        for &end in ends.iter().rev() {
            if end <= start {
                break;
            }
            attempts += 1;
            if attempts > MAX_BRACE_CANDIDATES {
                return None;
            }
            if let Some(value) = parse_object(&text[start..=end]) {
                return Some(value);
            }
        }
    }
    None
}

fn field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).filter(|v| is_truthy(v))
}

fn from_value(value: &Value) -> IdentificationRecord {
    IdentificationRecord {
        species: field(value, "species")
            .and_then(Value::as_str)
            .unwrap_or(STRUCTURED_SPECIES)
            .to_string(),
        is_venomous: field(value, "isVenomous").map(venomous_flag).unwrap_or(false),
        confidence: field(value, "confidence")
            .and_then(confidence_value)
            .map(clamp_confidence)
            .unwrap_or(STRUCTURED_CONFIDENCE),
        description: field(value, "description")
            .and_then(Value::as_str)
            .unwrap_or(STRUCTURED_DESCRIPTION)
            .to_string(),
    }
}

/// Absent-like values: null, false, zero and the empty string.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn venomous_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => is_affirmative(s),
        _ => false,
    }
}

fn confidence_value(value: &Value) -> Option<f64> {
    let confidence = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| *f != 0.0),
        _ => None,
    };
    confidence.filter(|f| f.is_finite())
}

fn is_affirmative(token: &str) -> bool {
    let token = token.trim();
    token.eq_ignore_ascii_case("true") || token.eq_ignore_ascii_case("yes")
}

fn clamp_confidence(confidence: f64) -> f64 {
    confidence.clamp(0.0, 1.0)
}

fn capture<'a>(re: &Regex, text: &'a str) -> Option<&'a str> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
}

fn extract_labeled(text: &str) -> IdentificationRecord {
    IdentificationRecord {
        species: capture(&SPECIES_RE, text)
            .unwrap_or(EXTRACTED_SPECIES)
            .to_string(),
        is_venomous: capture(&VENOMOUS_RE, text)
            .map(is_affirmative)
            .unwrap_or(false),
        confidence: capture(&CONFIDENCE_RE, text)
            .and_then(|s| s.parse::<f64>().ok())
            .map(clamp_confidence)
            .unwrap_or(EXTRACTED_CONFIDENCE),
        description: capture(&DESCRIPTION_RE, text)
            .unwrap_or(EXTRACTED_DESCRIPTION)
            .to_string(),
    }
}
