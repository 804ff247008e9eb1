//! Evaluation driver
//!
//! Runs reader, reconstruction, pronoun indexing, and scoring over a
//! gold/prediction file pair.

use std::path::{Path, PathBuf};

use pronscore_core::{EvalConfig, Result, Setting, StackMode, TokenRecord};

use crate::antecedent::AntecedentScorer;
use crate::clusters::ClusterReconstructor;
use crate::metrics::{EvaluationSummary, PronounReport};
use crate::pronoun::{PronounIndex, PronounPolicy};

pub const GOLD_SUFFIX: &str = ".gold.conll";
pub const PRED_SUFFIX: &str = ".pred.conll";

// ============================================================================
// Paths
// ============================================================================

/// Gold and prediction files of one evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalPaths {
    pub name: String,
    pub gold: PathBuf,
    pub pred: PathBuf,
}

impl EvalPaths {
    /// Derive `<base>.gold.conll` and `<base>.pred.conll`
    pub fn from_base(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref().display().to_string();
        Self {
            gold: PathBuf::from(format!("{base}{GOLD_SUFFIX}")),
            pred: PathBuf::from(format!("{base}{PRED_SUFFIX}")),
            name: base,
        }
    }

    /// Paths of a batch entry: `<conll_dir>/<model>_<data_type>`, where
    /// `data_type` is the file stem of the data file
    pub fn for_data_file(conll_dir: &Path, model: &str, data_file: &str) -> Self {
        Self::from_base(conll_dir.join(format!("{model}_{}", data_type(data_file))))
    }
}

/// File stem of a data file path (`data/hij_test.jsonlines` -> `hij_test`)
pub fn data_type(data_file: &str) -> String {
    Path::new(data_file)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| data_file.to_string())
}

// ============================================================================
// Evaluator
// ============================================================================

/// Pronoun antecedent evaluation over token streams
#[derive(Debug, Clone, Default)]
pub struct PronounEvaluator {
    policy: PronounPolicy,
    reconstructor: ClusterReconstructor,
    scorer: AntecedentScorer,
}

impl PronounEvaluator {
    pub fn new(policy: PronounPolicy, stack_mode: StackMode) -> Self {
        Self {
            policy,
            reconstructor: ClusterReconstructor::new(stack_mode),
            scorer: AntecedentScorer::new(),
        }
    }

    /// Build from the evaluation section of the configuration
    pub fn from_config(config: &EvalConfig) -> Self {
        let policy = PronounPolicy::dutch().with_pronoun_pos(config.pronoun_pos.clone());
        Self::new(policy, config.stack_mode)
    }

    pub fn policy(&self) -> &PronounPolicy {
        &self.policy
    }

    pub fn stack_mode(&self) -> StackMode {
        self.reconstructor.mode()
    }

    /// Score gold against predicted records under one setting
    pub fn evaluate_records(
        &self,
        gold: &[TokenRecord],
        predicted: &[TokenRecord],
        setting: Setting,
    ) -> PronounReport {
        self.evaluate_settings(gold, predicted, &[setting])
            .into_iter()
            .next()
            .unwrap_or_else(|| PronounReport::from_result(setting, &Default::default()))
    }

    /// Score gold against predicted records under several settings
    ///
    /// Clusters are reconstructed once and shared by every setting.
    pub fn evaluate_settings(
        &self,
        gold: &[TokenRecord],
        predicted: &[TokenRecord],
        settings: &[Setting],
    ) -> Vec<PronounReport> {
        let gold_clusters = self.reconstructor.reconstruct(gold);
        let pred_clusters = self.reconstructor.reconstruct(predicted);
        tracing::debug!(
            "Reconstructed {} gold and {} predicted clusters ({} mode)",
            gold_clusters.cluster_count(),
            pred_clusters.cluster_count(),
            self.stack_mode()
        );

        settings
            .iter()
            .map(|&setting| {
                let index = PronounIndex::build(gold, &self.policy, setting);
                let result = self.scorer.score(&gold_clusters, &pred_clusters, &index);
                let report = PronounReport::from_result(setting, &result);
                tracing::info!(
                    "setting={} pronouns={} score={}",
                    setting,
                    report.pronouns,
                    report.score_display()
                );
                report
            })
            .collect()
    }

    /// Read both files of an evaluation and score them
    pub fn evaluate_paths(&self, paths: &EvalPaths, settings: &[Setting]) -> Result<EvaluationSummary> {
        let gold = pronscore_conll::load_file(&paths.gold)?;
        let predicted = pronscore_conll::load_file(&paths.pred)?;

        let mut summary = EvaluationSummary::new(&paths.name);
        for report in self.evaluate_settings(&gold.records, &predicted.records, settings) {
            summary.add_report(report);
        }
        Ok(summary)
    }
}

// ============================================================================
// Tests
// ============================================================================
