//! Pronscore Eval - Pronoun antecedent evaluation
//!
//! Scores coreference predictions on third-person pronouns:
//! - `clusters`: rebuilds mention clusters from bracket-encoded annotations
//! - `pronoun`: selects the pronouns evaluated under a setting
//! - `antecedent`: checks each gold pronoun for a correct predicted antecedent
//! - `metrics`: per-setting reports
//! - `driver`: file-level evaluation
//! - `results`: JSON results file merging

pub mod antecedent;
pub mod clusters;
pub mod driver;
pub mod metrics;
pub mod pronoun;
pub mod results;

pub use antecedent::{compute_score, AntecedentScorer, PronounOutcome, ScoreResult};
pub use clusters::{Cluster, ClusterReconstructor, CorefClusters, DocumentClusters, MentionSpan};
pub use driver::{EvalPaths, PronounEvaluator};
pub use metrics::{format_score, EvaluationSummary, PronounReport};
pub use pronoun::{is_third_person_pronoun, PronounIndex, PronounPolicy, Verdict};

use pronscore_core::{Result, Setting, TokenRecord};

/// Percentage of gold pronouns with a correct predicted antecedent
///
/// Convenience entry point over already-read token streams; `None` when no
/// pronoun qualifies under the setting.
pub fn compute_pronoun_score(
    gold: &[TokenRecord],
    predicted: &[TokenRecord],
    setting: Setting,
) -> Option<f64> {
    PronounEvaluator::default()
        .evaluate_records(gold, predicted, setting)
        .score
}

/// Score raw gold and prediction annotation text
pub fn score_text(gold: &str, predicted: &str, setting: Setting) -> Result<PronounReport> {
    let gold = pronscore_conll::read_all(gold)?;
    let predicted = pronscore_conll::read_all(predicted)?;

    Ok(PronounEvaluator::default().evaluate_records(&gold, &predicted, setting))
}
