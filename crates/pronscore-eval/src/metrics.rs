//! Pronoun score reporting
//!
//! Summaries of antecedent scoring per setting, with a plain-text report
//! and serde support for the results file.

use serde::{Deserialize, Serialize};

use pronscore_core::Setting;

use crate::antecedent::ScoreResult;

// ============================================================================
// Per-Setting Report
// ============================================================================

/// Scoring summary for one setting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PronounReport {
    /// Evaluated pronoun setting
    pub setting: Setting,
    /// Number of pronoun mentions evaluated
    pub pronouns: usize,
    /// Number of pronouns with a correct predicted antecedent
    pub correct: usize,
    /// Percentage correct, `None` when no pronoun was evaluated
    pub score: Option<f64>,
    /// Gold documents containing at least one evaluated pronoun
    pub documents_evaluated: usize,
    /// Gold documents with no predicted clusters
    pub missing_documents: Vec<String>,
}

impl PronounReport {
    /// Summarize a score result
    pub fn from_result(setting: Setting, result: &ScoreResult) -> Self {
        let mut documents: Vec<&str> = result
            .outcomes
            .iter()
            .map(|o| o.document_id.as_str())
            .collect();
        documents.sort_unstable();
        documents.dedup();

        Self {
            setting,
            pronouns: result.total(),
            correct: result.correct(),
            score: result.score(),
            documents_evaluated: documents.len(),
            missing_documents: result.missing_documents.clone(),
        }
    }

    /// Score for display, `N/A` when undefined
    pub fn score_display(&self) -> String {
        format_score(self.score)
    }

    /// Plain-text report in the format printed by the driver
    pub fn report(&self) -> String {
        let mut out = format!(
            "setting: {}\n\
             number of pronouns: {}\n\
             pronoun score : {}\n",
            self.setting,
            self.pronouns,
            self.score_display(),
        );

        if !self.missing_documents.is_empty() {
            out.push_str(&format!(
                "documents without predictions: {}\n",
                self.missing_documents.join(", ")
            ));
        }

        out
    }
}

/// Render an optional score, `N/A` when undefined
///
/// Whole numbers keep their decimal point (`100.0`).
pub fn format_score(score: Option<f64>) -> String {
    match score {
        Some(score) => format!("{score:?}"),
        None => "N/A".to_string(),
    }
}

// ============================================================================
// Evaluation Summary
// ============================================================================

/// Reports for one gold/prediction pair across settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluationSummary {
    /// Evaluation base name the files were derived from
    pub name: String,
    pub reports: Vec<PronounReport>,
}

impl EvaluationSummary {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reports: Vec::new(),
        }
    }

    pub fn add_report(&mut self, report: PronounReport) {
        self.reports.push(report);
    }

    /// Report for a setting, if it was evaluated
    pub fn get(&self, setting: Setting) -> Option<&PronounReport> {
        self.reports.iter().find(|r| r.setting == setting)
    }

    /// Plain-text report of every setting
    pub fn report(&self) -> String {
        let mut out = format!("{}\n", self.name);
        for report in &self.reports {
            out.push_str(&report.report());
        }
        out
    }

    /// One line per setting: setting, pronoun count, score
    pub fn table(&self) -> String {
        let mut out = format!("{:<8}{:>10}{:>10}{:>10}\n", "setting", "pronouns", "correct", "score");
        for r in &self.reports {
            let score = r
                .score
                .map(|s| format!("{s:.1}"))
                .unwrap_or_else(|| "N/A".to_string());
            out.push_str(&format!(
                "{:<8}{:>10}{:>10}{:>10}\n",
                r.setting.as_str(),
                r.pronouns,
                r.correct,
                score
            ));
        }
        out
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::antecedent::PronounOutcome;
    use crate::clusters::MentionSpan;

    fn outcome(doc: &str, pos: usize, correct: bool) -> PronounOutcome {
        PronounOutcome {
            document_id: doc.to_string(),
            mention: MentionSpan::Single(pos),
            correct,
        }
    }

    #[test]
    fn test_report_from_result() {
        let result = ScoreResult {
            outcomes: vec![
                outcome("a", 3, true),
                outcome("a", 8, false),
                outcome("b", 12, true),
                outcome("b", 15, true),
            ],
            missing_documents: Vec::new(),
        };

        let report = PronounReport::from_result(Setting::Masc, &result);
        assert_eq!(report.pronouns, 4);
        assert_eq!(report.correct, 3);
        assert_eq!(report.score, Some(75.0));
        assert_eq!(report.documents_evaluated, 2);
    }

    #[test]
    fn test_format_score_keeps_decimal_point() {
        assert_eq!(format_score(Some(100.0)), "100.0");
        assert_eq!(format_score(Some(0.0)), "0.0");
        assert_eq!(format_score(Some(62.5)), "62.5");
        assert_eq!(format_score(None), "N/A");
    }

    #[test]
    fn test_empty_result_reports_na() {
        let report = PronounReport::from_result(Setting::Gi, &ScoreResult::default());

        assert_eq!(report.score, None);
        assert_eq!(report.score_display(), "N/A");
        assert!(report.report().contains("number of pronouns: 0"));
        assert!(report.report().contains("pronoun score : N/A"));
    }

    #[test]
    fn test_report_lists_missing_documents() {
        let result = ScoreResult {
            outcomes: vec![outcome("a", 1, false)],
            missing_documents: vec!["a".to_string()],
        };

        let report = PronounReport::from_result(Setting::All, &result);
        assert!(report
            .report()
            .contains("documents without predictions: a"));
    }

    #[test]
    fn test_summary_table_and_lookup() {
        let mut summary = EvaluationSummary::new("run_hij_test");
        summary.add_report(PronounReport::from_result(
            Setting::All,
            &ScoreResult {
                outcomes: vec![outcome("a", 1, true), outcome("a", 2, false), outcome("a", 3, false)],
                missing_documents: Vec::new(),
            },
        ));
        summary.add_report(PronounReport::from_result(Setting::Fem, &ScoreResult::default()));

        let table = summary.table();
        assert!(table.contains("33.3"));
        assert!(table.contains("N/A"));
        assert!(summary.report().starts_with("run_hij_test\n"));
        assert_eq!(summary.get(Setting::All).map(|r| r.pronouns), Some(3));
        assert!(summary.get(Setting::Masc).is_none());
    }

    #[test]
    fn test_report_serializes_undefined_score_as_null() {
        let report = PronounReport::from_result(Setting::Fem, &ScoreResult::default());
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["setting"], "fem");
        assert!(json["score"].is_null());
    }
}
