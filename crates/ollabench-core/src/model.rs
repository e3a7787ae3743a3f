//! Core data model types for ollabench.
//!
//! Tasks and their scoring rules are fixed for the lifetime of a run.
//! Invocation results and verdicts are created once per model × task pair
//! and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TransportError;

/// One of the three benchmark categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pillar {
    Logic,
    Math,
    Coding,
}

impl Pillar {
    /// All pillars in report column order.
    pub const ALL: [Pillar; 3] = [Pillar::Logic, Pillar::Math, Pillar::Coding];
}

impl fmt::Display for Pillar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pillar::Logic => write!(f, "logic"),
            Pillar::Math => write!(f, "math"),
            Pillar::Coding => write!(f, "coding"),
        }
    }
}

impl FromStr for Pillar {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "logic" => Ok(Pillar::Logic),
            "math" => Ok(Pillar::Math),
            "coding" | "code" => Ok(Pillar::Coding),
            other => Err(format!("unknown pillar: {other}")),
        }
    }
}

/// The pass/fail rule attached to a task.
///
/// A closed set of variants, one per pillar. Scoring is implemented in
/// [`crate::scoring`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoringRule {
    /// Passes iff any required phrase is present and no disqualifier is.
    Keyword {
        required: Vec<String>,
        disqualifiers: Vec<String>,
    },
    /// Passes iff the first extracted number is within `tolerance` of `expected`.
    NumericTolerance {
        expected: f64,
        tolerance: f64,
        /// JSON field consulted before the raw text, if the response is JSON.
        #[serde(default)]
        answer_field: Option<String>,
    },
    /// Passes iff a function matching `signature` exists and a traversal keyword appears.
    CodeStructure {
        /// Regex the function definition must match.
        signature: String,
        traversal_keywords: Vec<String>,
    },
}

impl ScoringRule {
    /// The pillar this rule variant scores.
    pub fn pillar(&self) -> Pillar {
        match self {
            ScoringRule::Keyword { .. } => Pillar::Logic,
            ScoringRule::NumericTolerance { .. } => Pillar::Math,
            ScoringRule::CodeStructure { .. } => Pillar::Coding,
        }
    }
}

/// A single benchmark task: a self-contained prompt plus its scoring rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier for this task.
    pub id: String,
    /// Benchmark category.
    pub pillar: Pillar,
    /// The complete instruction sent to the model.
    pub prompt: String,
    /// How the response is judged.
    pub rule: ScoringRule,
}

/// Opaque identifier of a model on the inference server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelRef(String);

impl ModelRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModelRef {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ModelRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Outcome of one model × task call to the inference server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationResult {
    pub model: ModelRef,
    pub task_id: String,
    pub pillar: Pillar,
    /// Generated text; `None` when the call failed.
    pub raw_text: Option<String>,
    /// Wall-clock time from send to full receipt (or failure).
    pub latency_ms: u64,
    /// Rendered transport error; `None` when the call succeeded.
    pub transport_error: Option<String>,
}

impl InvocationResult {
    pub fn success(model: ModelRef, task: &Task, raw_text: String, latency_ms: u64) -> Self {
        Self {
            model,
            task_id: task.id.clone(),
            pillar: task.pillar,
            raw_text: Some(raw_text),
            latency_ms,
            transport_error: None,
        }
    }

    pub fn failure(model: ModelRef, task: &Task, error: &TransportError, latency_ms: u64) -> Self {
        Self {
            model,
            task_id: task.id.clone(),
            pillar: task.pillar,
            raw_text: None,
            latency_ms,
            transport_error: Some(error.to_string()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.transport_error.is_some()
    }
}

/// Pass/fail outcome plus explanation for one scored invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub task_id: String,
    pub model: ModelRef,
    pub passed: bool,
    /// Which sub-condition decided the verdict.
    pub detail: String,
}

/// Lifecycle of a model × task pair inside a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairState {
    Pending,
    Invoked,
    Scored,
    Failed,
}

impl PairState {
    /// Whether `next` is a legal successor of `self`.
    pub fn can_transition_to(self, next: PairState) -> bool {
        matches!(
            (self, next),
            (PairState::Pending, PairState::Invoked)
                | (PairState::Invoked, PairState::Scored)
                | (PairState::Invoked, PairState::Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PairState::Scored | PairState::Failed)
    }
}

impl fmt::Display for PairState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PairState::Pending => "pending",
            PairState::Invoked => "invoked",
            PairState::Scored => "scored",
            PairState::Failed => "failed",
        };
        f.write_str(s)
    }
}
