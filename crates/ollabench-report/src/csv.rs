//! CSV formatting for spreadsheet import.
//!
//! Column order is part of the output contract.

use crate::scorecard::ModelScore;
use crate::summary::SummaryRow;

pub const SUMMARY_HEADER: [&str; 6] = ["model", "task", "pillar", "passed", "latency_ms", "detail"];
pub const SCORECARD_HEADER: [&str; 6] = ["model", "avg_latency_ms", "logic", "math", "coding", "total"];

/// Quote a field if it contains a delimiter, quote, or line break.
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn write_line<I, S>(out: &mut String, fields: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let line: Vec<String> = fields.into_iter().map(|f| escape(f.as_ref())).collect();
    out.push_str(&line.join(","));
    out.push('\n');
}

fn pass_fail(passed: bool) -> &'static str {
    if passed {
        "PASS"
    } else {
        "FAIL"
    }
}

/// `benchmark_summary.csv` contents.
pub fn summary_csv(rows: &[SummaryRow]) -> String {
    let mut out = String::new();
    write_line(&mut out, SUMMARY_HEADER);
    for row in rows {
        write_line(
            &mut out,
            [
                row.model.to_string(),
                row.task_id.clone(),
                row.pillar.to_string(),
                pass_fail(row.passed).to_string(),
                row.latency_ms.map(|ms| ms.to_string()).unwrap_or_default(),
                row.detail.clone(),
            ],
        );
    }
    out
}

/// `model_scorecard.csv` contents.
pub fn scorecard_csv(scores: &[ModelScore]) -> String {
    let mut out = String::new();
    write_line(&mut out, SCORECARD_HEADER);
    for score in scores {
        let mut fields = vec![
            score.model.to_string(),
            score
                .avg_latency_ms
                .map(|ms| format!("{ms:.0}"))
                .unwrap_or_default(),
        ];
        fields.extend(score.pillar_cells().into_iter().map(str::to_string));
        fields.push(format!("{}/{}", score.passed, score.total));
        write_line(&mut out, fields);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ollabench_core::model::Pillar;

    fn row(passed: bool, latency_ms: Option<u64>, detail: &str) -> SummaryRow {
        SummaryRow {
            model: "llama3:8b".into(),
            task_id: "test_math_bayes_theorem".into(),
            pillar: Pillar::Math,
            passed,
            latency_ms,
            detail: detail.into(),
        }
    }

    #[test]
    fn escape_rules() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn summary_columns_in_order() {
        let csv = summary_csv(&[row(true, Some(1532), "0.625 from field 'final_answer' is within 0.005 of 0.625")]);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("model,task,pillar,passed,latency_ms,detail"));
        assert_eq!(
            lines.next(),
            Some("llama3:8b,test_math_bayes_theorem,math,PASS,1532,0.625 from field 'final_answer' is within 0.005 of 0.625")
        );
    }

    #[test]
    fn failed_row_has_empty_latency() {
        let csv = summary_csv(&[row(false, None, "transport error: HTTP 500: boom, again")]);
        let line = csv.lines().nth(1).unwrap();
        assert_eq!(
            line,
            "llama3:8b,test_math_bayes_theorem,math,FAIL,,\"transport error: HTTP 500: boom, again\""
        );
    }
}
