//! The fixed benchmark task registry.
//!
//! One task per pillar. New tasks are added here as entries; nothing else in
//! the crate branches on task content.

use crate::model::{Pillar, ScoringRule, Task};

const LOGIC_PROMPT: &str = r#"Analyze the following argument and identify the logical fallacy present.
Explain your reasoning clearly.

ARGUMENT:
"My opponent suggests that lowering taxes will be a good idea -- this is coming from a woman who eats a pint of Ben and Jerry's each night!"

RESPONSE FORMAT (JSON):
{
  "fallacy_name": "Name of the fallacy",
  "reasoning": "Explanation of why this is a fallacy",
  "correct": "YES/NO (Internal self-check)"
}
"#;

const MATH_PROMPT: &str = r#"Solve this probability problem. Show your work step-by-step.

PROBLEM:
In a factory, Machine A produces 60% of the items and Machine B produces 40%.
2% of the items produced by Machine A are defective, while 5% of the items produced by Machine B are defective.
If a randomly selected item is defective, what is the probability that it was produced by Machine B?

RESPONSE FORMAT (JSON):
{
  "final_answer": "The numerical probability (e.g., 0.45 or 45%)",
  "steps": "Summary of steps taken",
  "calculation_check": "Validation of the final number"
}
"#;

const CODING_PROMPT: &str = r#"Write a Python function to solve the following problem.

PROBLEM:
Given a binary tree, find the maximum path sum. The path may start and end at any node in the tree.
The path must contain at least one node and does not need to go through the root.

REQUIREMENTS:
- Use Python 3.
- Include a 'maxPathSum' function.
- Handle negative node values correctly.
- Provide 2-3 unit tests.

RESPONSE FORMAT (JSON):
{
  "code": "The full Python code string",
  "complexity": "Time and Space complexity analysis",
  "explanation": "Brief explanation of the algorithm"
}
"#;

/// P(B | defective) = 0.4 * 0.05 / (0.6 * 0.02 + 0.4 * 0.05)
const BAYES_ANSWER: f64 = 0.625;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The ordered task list for a run.
pub fn tasks() -> Vec<Task> {
    vec![
        Task {
            id: "test_logic_ad_hominem".into(),
            pillar: Pillar::Logic,
            prompt: LOGIC_PROMPT.into(),
            rule: ScoringRule::Keyword {
                required: strings(&["ad hominem"]),
                disqualifiers: strings(&["straw man", "strawman", "slippery slope", "false dilemma"]),
            },
        },
        Task {
            id: "test_math_bayes_theorem".into(),
            pillar: Pillar::Math,
            prompt: MATH_PROMPT.into(),
            rule: ScoringRule::NumericTolerance {
                expected: BAYES_ANSWER,
                tolerance: 0.005,
                answer_field: Some("final_answer".into()),
            },
        },
        Task {
            id: "test_code_max_path_sum".into(),
            pillar: Pillar::Coding,
            prompt: CODING_PROMPT.into(),
            rule: ScoringRule::CodeStructure {
                signature: r"\bdef\s+maxPathSum\s*\(".into(),
                traversal_keywords: strings(&[
                    "dfs", "recurs", "helper", "max_gain", "stack", "queue", "deque",
                ]),
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn one_task_per_pillar_in_order() {
        let pillars: Vec<Pillar> = tasks().iter().map(|t| t.pillar).collect();
        assert_eq!(pillars, Pillar::ALL.to_vec());
    }

    #[test]
    fn rule_matches_pillar() {
        for task in tasks() {
            assert_eq!(task.rule.pillar(), task.pillar, "task {}", task.id);
        }
    }

    #[test]
    fn ids_are_unique() {
        let all = tasks();
        let ids: HashSet<&str> = all.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids.len(), all.len());
    }

    #[test]
    fn prompts_request_json() {
        for task in tasks() {
            assert!(task.prompt.contains("RESPONSE FORMAT (JSON)"), "task {}", task.id);
        }
    }

    #[test]
    fn bayes_constant_is_correct() {
        let expected = 0.4 * 0.05 / (0.6 * 0.02 + 0.4 * 0.05);
        assert!((BAYES_ANSWER - expected).abs() < 1e-12);
    }
}
