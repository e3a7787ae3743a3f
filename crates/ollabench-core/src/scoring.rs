//! Pure, deterministic scoring of raw model responses.
//!
//! Every rule produces a verdict; ambiguous responses (no number, no code)
//! are ordinary failures, never errors. The scorer does not execute code.

use std::collections::HashMap;
use std::sync::{LazyLock, Mutex, PoisonError};

use regex::Regex;
use serde_json::{Map, Value};

use crate::model::{ModelRef, ScoringRule, Task, Verdict};

/// First decimal number in a text, optionally followed by a percent sign.
///
/// A minus sign only counts at the start of the text or after a non-word
/// character, so `step-2` reads as 2.
static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:(?:^|[^\w])(-))?(\d+(?:\.\d+)?|\.\d+)\s*(%)?")
        .expect("number pattern is valid")
});

/// Compiled code-structure signatures, keyed by pattern source.
static SIGNATURES: LazyLock<Mutex<HashMap<String, Regex>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Absorbs binary rounding of decimal inputs at the tolerance boundary.
const TOLERANCE_SLACK: f64 = 1e-9;

/// Rule outcome before it is attached to a model and task.
#[derive(Debug, Clone, PartialEq)]
pub struct Judgement {
    pub passed: bool,
    pub detail: String,
}

impl Judgement {
    fn pass(detail: impl Into<String>) -> Self {
        Self {
            passed: true,
            detail: detail.into(),
        }
    }

    fn fail(detail: impl Into<String>) -> Self {
        Self {
            passed: false,
            detail: detail.into(),
        }
    }
}

/// Score one task's response for one model.
pub fn score(task: &Task, model: &ModelRef, raw_text: &str) -> Verdict {
    let judgement = judge(&task.rule, raw_text);
    Verdict {
        task_id: task.id.clone(),
        model: model.clone(),
        passed: judgement.passed,
        detail: judgement.detail,
    }
}

/// Apply a scoring rule to a raw response.
pub fn judge(rule: &ScoringRule, raw_text: &str) -> Judgement {
    match rule {
        ScoringRule::Keyword {
            required,
            disqualifiers,
        } => judge_keywords(required, disqualifiers, raw_text),
        ScoringRule::NumericTolerance {
            expected,
            tolerance,
            answer_field,
        } => judge_numeric(*expected, *tolerance, answer_field.as_deref(), raw_text),
        ScoringRule::CodeStructure {
            signature,
            traversal_keywords,
        } => judge_code_structure(signature, traversal_keywords, raw_text),
    }
}

fn judge_keywords(required: &[String], disqualifiers: &[String], raw_text: &str) -> Judgement {
    let haystack = raw_text.to_lowercase();

    // Disqualifiers win over required matches.
    if let Some(bad) = disqualifiers
        .iter()
        .find(|d| haystack.contains(&d.to_lowercase()))
    {
        return Judgement::fail(format!("disqualifying phrase '{bad}' present"));
    }

    match required
        .iter()
        .find(|r| haystack.contains(&r.to_lowercase()))
    {
        Some(found) => Judgement::pass(format!("found required phrase '{found}'")),
        None => Judgement::fail(format!(
            "none of the required phrases found: {}",
            required.join(", ")
        )),
    }
}

fn judge_numeric(
    expected: f64,
    tolerance: f64,
    answer_field: Option<&str>,
    raw_text: &str,
) -> Judgement {
    let from_field = answer_field.and_then(|field| {
        let object = parse_json_object(raw_text)?;
        let value = field_number(object.get(field)?)?;
        Some((value, format!("field '{field}'")))
    });

    let Some((value, source)) =
        from_field.or_else(|| extract_number(raw_text).map(|v| (v, "response text".to_string())))
    else {
        return Judgement::fail("no number found in response");
    };

    let delta = (value - expected).abs();
    if delta <= tolerance + TOLERANCE_SLACK {
        Judgement::pass(format!(
            "{value} from {source} is within {tolerance} of {expected}"
        ))
    } else {
        Judgement::fail(format!(
            "{value} from {source} is off by {delta:.4} (tolerance {tolerance}, expected {expected})"
        ))
    }
}

/// Compile a signature pattern once and reuse it for every later response.
fn signature_regex(signature: &str) -> Result<Regex, regex::Error> {
    let mut cache = SIGNATURES.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(re) = cache.get(signature) {
        return Ok(re.clone());
    }
    let re = Regex::new(signature)?;
    cache.insert(signature.to_string(), re.clone());
    Ok(re)
}

fn judge_code_structure(signature: &str, keywords: &[String], raw_text: &str) -> Judgement {
    let pattern = match signature_regex(signature) {
        Ok(re) => re,
        Err(e) => return Judgement::fail(format!("invalid signature pattern: {e}")),
    };

    if !pattern.is_match(raw_text) {
        return Judgement::fail(format!("no function definition matching `{signature}`"));
    }

    let haystack = raw_text.to_lowercase();
    match keywords
        .iter()
        .find(|k| haystack.contains(&k.to_lowercase()))
    {
        Some(keyword) => Judgement::pass(format!(
            "function definition present; traversal keyword '{keyword}' found"
        )),
        None => Judgement::fail(format!(
            "function definition present but no traversal keyword ({})",
            keywords.join(", ")
        )),
    }
}

/// Extract the first decimal number from `text`. `62.5%` yields `0.625`.
pub fn extract_number(text: &str) -> Option<f64> {
    let caps = NUMBER.captures(text)?;
    let mut value: f64 = caps.get(2)?.as_str().parse().ok()?;
    if caps.get(1).is_some() {
        value = -value;
    }
    if caps.get(3).is_some() {
        Some(value / 100.0)
    } else {
        Some(value)
    }
}

fn field_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => extract_number(s),
        _ => None,
    }
}

/// Parse a response as a JSON object, or the outermost `{...}` span inside it.
pub fn parse_json_object(text: &str) -> Option<Map<String, Value>> {
    let trimmed = text.trim();
    if let Ok(Value::Object(map)) = serde_json::from_str(trimmed) {
        return Some(map);
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str(&trimmed[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}
