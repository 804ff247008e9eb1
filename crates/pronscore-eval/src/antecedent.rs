//! Antecedent scoring module
//!
//! For every single-token gold mention on an indexed pronoun, checks whether
//! the system placed at least one true coreferent before it. Multi-token
//! mentions headed by a pronoun (`zijn vader`) are not pronoun mentions.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::clusters::{Cluster, CorefClusters, DocumentClusters, MentionSpan};
use crate::pronoun::PronounIndex;

// ============================================================================
// Score Result
// ============================================================================

/// Outcome for a single pronoun mention
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PronounOutcome {
    pub document_id: String,
    pub mention: MentionSpan,
    pub correct: bool,
}

/// Per-mention correctness, in gold order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreResult {
    /// One entry per evaluated pronoun mention
    pub outcomes: Vec<PronounOutcome>,

    /// Gold documents with pronouns but no predicted clusters
    pub missing_documents: Vec<String>,
}

impl ScoreResult {
    /// Correctness flags in evaluation order
    pub fn flags(&self) -> Vec<bool> {
        self.outcomes.iter().map(|o| o.correct).collect()
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn correct(&self) -> usize {
        self.outcomes.iter().filter(|o| o.correct).count()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Percentage of correctly resolved pronouns, `None` when nothing was evaluated
    pub fn score(&self) -> Option<f64> {
        compute_score(self.correct(), self.total())
    }
}

/// `100 * correct / total`, undefined for an empty total
pub fn compute_score(correct: usize, total: usize) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some(correct as f64 / total as f64 * 100.0)
    }
}

// ============================================================================
// Scorer
// ============================================================================

/// Compares gold and predicted antecedents of pronoun mentions
#[derive(Debug, Clone, Copy, Default)]
pub struct AntecedentScorer;

impl AntecedentScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score every gold pronoun mention
    pub fn score(
        &self,
        gold: &CorefClusters,
        predicted: &CorefClusters,
        pronouns: &PronounIndex,
    ) -> ScoreResult {
        let mut result = ScoreResult::default();

        for (document_id, gold_doc) in gold.documents() {
            let Some(positions) = pronouns.positions(document_id) else {
                continue;
            };
            let predicted_doc = predicted.document(document_id);
            let mut missing_logged = false;

            for gold_cluster in gold_doc.iter() {
                for mention in &gold_cluster.mentions {
                    let MentionSpan::Single(position) = *mention else {
                        continue;
                    };
                    if !positions.contains(&position) {
                        continue;
                    }

                    let correct = match predicted_doc {
                        Some(predicted_doc) => {
                            let antecedents = predicted_antecedents(predicted_doc, mention);
                            has_true_antecedent(gold_cluster, &antecedents)
                        }
                        None => {
                            if !missing_logged {
                                tracing::warn!("No predicted clusters for document {}", document_id);
                                result.missing_documents.push(document_id.to_string());
                                missing_logged = true;
                            }
                            false
                        }
                    };

                    result.outcomes.push(PronounOutcome {
                        document_id: document_id.to_string(),
                        mention: *mention,
                        correct,
                    });
                }
            }
        }

        result
    }
}

/// Mentions strictly preceding `mention` in every predicted cluster containing it
pub fn predicted_antecedents(
    predicted: &DocumentClusters,
    mention: &MentionSpan,
) -> HashSet<MentionSpan> {
    predicted
        .iter()
        .filter(|cluster| cluster.contains(mention))
        .flat_map(|cluster| cluster.mentions.iter())
        .filter(|candidate| candidate.precedes(mention))
        .copied()
        .collect()
}

/// Whether any predicted antecedent is a true coreferent
fn has_true_antecedent(gold_cluster: &Cluster, antecedents: &HashSet<MentionSpan>) -> bool {
    antecedents.iter().any(|antecedent| gold_cluster.contains(antecedent))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pronoun::PronounPolicy;
    use pronscore_core::{Setting, TokenRecord};

    /// Clusters of one document from `(id, "span span ...")` pairs
    fn clusters(doc: &str, entries: &[(&str, &str)]) -> CorefClusters {
        let mut clusters = CorefClusters::default();
        for (id, spans) in entries {
            for span in spans.split_whitespace() {
                clusters.push(doc, id, span.parse().unwrap());
            }
        }
        clusters
    }

    /// Index with "hij" at the given positions of document "doc"
    fn index_at(positions: &[usize]) -> PronounIndex {
        let max = positions.iter().copied().max().unwrap_or(0);
        let tokens: Vec<TokenRecord> = (0..=max)
            .map(|pos| {
                let token = if positions.contains(&pos) { "hij" } else { "de" };
                TokenRecord::new("doc", pos, token, "PRON", "VNW|pers|pron|nomin|vol|3|ev|masc", "-")
            })
            .collect();
        PronounIndex::build(&tokens, &PronounPolicy::dutch(), Setting::All)
    }

    #[test]
    fn test_correct_when_antecedent_is_coreferent() {
        let gold = clusters("doc", &[("1", "2 5 9")]);
        let pred = clusters("doc", &[("8", "5 9")]);

        let result = AntecedentScorer::new().score(&gold, &pred, &index_at(&[9]));
        assert_eq!(result.flags(), vec![true]);
        assert_eq!(result.score(), Some(100.0));
    }

    #[test]
    fn test_incorrect_when_antecedent_is_not_coreferent() {
        let gold = clusters("doc", &[("1", "2 5 9")]);
        let pred = clusters("doc", &[("8", "7 9")]);

        let result = AntecedentScorer::new().score(&gold, &pred, &index_at(&[9]));
        assert_eq!(result.flags(), vec![false]);
        assert_eq!(result.score(), Some(0.0));
    }

    #[test]
    fn test_following_mentions_are_not_antecedents() {
        let gold = clusters("doc", &[("1", "9 12")]);
        let pred = clusters("doc", &[("1", "9 12")]);

        let result = AntecedentScorer::new().score(&gold, &pred, &index_at(&[9]));
        assert_eq!(result.flags(), vec![false]);
    }

    #[test]
    fn test_range_antecedent_uses_its_end() {
        let gold = clusters("doc", &[("1", "3-9 9")]);
        // Range ending on the pronoun itself does not precede it
        let pred = clusters("doc", &[("1", "3-9 9")]);
        let result = AntecedentScorer::new().score(&gold, &pred, &index_at(&[9]));
        assert_eq!(result.flags(), vec![false]);

        let gold = clusters("doc", &[("1", "3-8 9")]);
        let pred = clusters("doc", &[("1", "3-8 9")]);
        let result = AntecedentScorer::new().score(&gold, &pred, &index_at(&[9]));
        assert_eq!(result.flags(), vec![true]);
    }

    #[test]
    fn test_span_must_match_exactly() {
        // Predicted antecedent "1-2" overlaps gold "1-3" but is not the same span
        let gold = clusters("doc", &[("1", "1-3 9")]);
        let pred = clusters("doc", &[("4", "1-2 9")]);

        let result = AntecedentScorer::new().score(&gold, &pred, &index_at(&[9]));
        assert_eq!(result.flags(), vec![false]);
    }

    #[test]
    fn test_union_of_predicted_clusters() {
        let gold = clusters("doc", &[("1", "2 9")]);
        let pred = clusters("doc", &[("5", "4 9"), ("6", "2 9")]);

        let result = AntecedentScorer::new().score(&gold, &pred, &index_at(&[9]));
        assert_eq!(result.flags(), vec![true]);
    }

    #[test]
    fn test_missing_predicted_document_scores_incorrect() {
        let gold = clusters("doc", &[("1", "2 5 9"), ("2", "0 5")]);
        let pred = clusters("other", &[("1", "2 9")]);

        let result = AntecedentScorer::new().score(&gold, &pred, &index_at(&[5, 9]));
        assert_eq!(result.flags(), vec![false, false, false]);
        assert_eq!(result.missing_documents, vec!["doc".to_string()]);
    }

    #[test]
    fn test_non_pronoun_mentions_are_skipped() {
        let gold = clusters("doc", &[("1", "2 5 9")]);
        let pred = clusters("doc", &[("1", "2 5 9")]);

        let result = AntecedentScorer::new().score(&gold, &pred, &index_at(&[]));
        assert!(result.is_empty());
        assert_eq!(result.score(), None);
    }

    #[test]
    fn test_span_starting_on_pronoun_is_not_evaluated() {
        // "zijn" at 3 refers to cluster 1, "zijn vader" (3-4) is cluster 2
        let gold = clusters("doc", &[("1", "0 3"), ("2", "3-4")]);
        let pred = gold.clone();

        let result = AntecedentScorer::new().score(&gold, &pred, &index_at(&[3]));
        assert_eq!(result.total(), 1);
        assert_eq!(result.outcomes[0].mention, MentionSpan::Single(3));
        assert_eq!(result.score(), Some(100.0));
    }

    #[test]
    fn test_compute_score() {
        assert_eq!(compute_score(0, 0), None);
        assert_eq!(compute_score(1, 4), Some(25.0));
        assert_eq!(compute_score(3, 3), Some(100.0));
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let gold = clusters("doc", &[("1", "2 5 9"), ("2", "1 7")]);
        let pred = clusters("doc", &[("1", "5 9"), ("2", "2 7")]);
        let index = index_at(&[7, 9]);

        let first = AntecedentScorer::new().score(&gold, &pred, &index);
        let second = AntecedentScorer::new().score(&gold, &pred, &index);
        assert_eq!(first.flags(), second.flags());
        assert_eq!(first.score(), second.score());
    }
}
