//! Cluster reconstruction module
//!
//! Rebuilds coreference clusters from the bracket-encoded coreference
//! column of a token stream. Each field is either `-` or a `|`-separated
//! list of markers:
//! - `(12)` a single-token mention of cluster 12
//! - `(12` the first token of a multi-token mention
//! - `12)` the last token of a multi-token mention

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use pronscore_core::{PronscoreError, StackMode, TokenRecord};

static SINGLE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([0-9]+)\)").expect("single marker pattern is valid"));
static OPEN_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([0-9]+)").expect("open marker pattern is valid"));
static CLOSE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]+)\)").expect("close marker pattern is valid"));

// ============================================================================
// Mention Spans
// ============================================================================

/// Token range of a mention
///
/// Identity follows the rendered form: `Single(7)` renders as `7` and
/// `Range { start: 7, end: 7 }` as `7-7`, and the two are distinct spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum MentionSpan {
    Single(usize),
    Range { start: usize, end: usize },
}

impl MentionSpan {
    /// Create a multi-token span, rejecting inverted ranges
    pub fn range(start: usize, end: usize) -> Option<Self> {
        (start <= end).then_some(Self::Range { start, end })
    }

    /// First token position
    pub fn start(&self) -> usize {
        match *self {
            Self::Single(pos) => pos,
            Self::Range { start, .. } => start,
        }
    }

    /// Last token position
    pub fn end(&self) -> usize {
        match *self {
            Self::Single(pos) => pos,
            Self::Range { end, .. } => end,
        }
    }

    /// Whether this span ends strictly before `other` starts
    pub fn precedes(&self, other: &MentionSpan) -> bool {
        self.end() < other.start()
    }
}

impl std::fmt::Display for MentionSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single(pos) => write!(f, "{pos}"),
            Self::Range { start, end } => write!(f, "{start}-{end}"),
        }
    }
}

impl std::str::FromStr for MentionSpan {
    type Err = PronscoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PronscoreError::InvalidSpan(s.to_string());

        match s.split_once('-') {
            None => s.parse().map(Self::Single).map_err(|_| invalid()),
            Some((start, end)) => {
                let start = start.parse().map_err(|_| invalid())?;
                let end = end.parse().map_err(|_| invalid())?;
                Self::range(start, end).ok_or_else(invalid)
            }
        }
    }
}

impl From<MentionSpan> for String {
    fn from(span: MentionSpan) -> Self {
        span.to_string()
    }
}

impl TryFrom<String> for MentionSpan {
    type Error = PronscoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ============================================================================
// Clusters
// ============================================================================

/// All mentions sharing one cluster id within one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: String,
    pub mentions: Vec<MentionSpan>,
}

impl Cluster {
    pub fn contains(&self, span: &MentionSpan) -> bool {
        self.mentions.contains(span)
    }

    pub fn len(&self) -> usize {
        self.mentions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mentions.is_empty()
    }
}

/// Clusters of one document, in order of first mention
#[derive(Debug, Clone, Default)]
pub struct DocumentClusters {
    clusters: Vec<Cluster>,
    index: HashMap<String, usize>,
}

impl DocumentClusters {
    /// Append a mention to a cluster, creating the cluster on first use
    pub fn push(&mut self, cluster_id: &str, span: MentionSpan) {
        match self.index.get(cluster_id) {
            Some(&idx) => self.clusters[idx].mentions.push(span),
            None => {
                self.index.insert(cluster_id.to_string(), self.clusters.len());
                self.clusters.push(Cluster {
                    id: cluster_id.to_string(),
                    mentions: vec![span],
                });
            }
        }
    }

    pub fn get(&self, cluster_id: &str) -> Option<&Cluster> {
        self.index.get(cluster_id).map(|&idx| &self.clusters[idx])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cluster> {
        self.clusters.iter()
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Total number of mentions across all clusters
    pub fn mention_count(&self) -> usize {
        self.clusters.iter().map(Cluster::len).sum()
    }
}

/// Clusters of every document of a stream, keyed by document id
#[derive(Debug, Clone, Default)]
pub struct CorefClusters {
    documents: Vec<(String, DocumentClusters)>,
    index: HashMap<String, usize>,
}

impl CorefClusters {
    fn document_mut(&mut self, document_id: &str) -> &mut DocumentClusters {
        let idx = match self.index.get(document_id) {
            Some(&idx) => idx,
            None => {
                let idx = self.documents.len();
                self.index.insert(document_id.to_string(), idx);
                self.documents
                    .push((document_id.to_string(), DocumentClusters::default()));
                idx
            }
        };
        &mut self.documents[idx].1
    }

    /// Append a mention to a cluster of a document
    pub fn push(&mut self, document_id: &str, cluster_id: &str, span: MentionSpan) {
        self.document_mut(document_id).push(cluster_id, span);
    }

    /// Clusters of a document, if it has any mention
    pub fn document(&self, document_id: &str) -> Option<&DocumentClusters> {
        self.index
            .get(document_id)
            .map(|&idx| &self.documents[idx].1)
    }

    /// Iterate documents in order of first mention
    pub fn documents(&self) -> impl Iterator<Item = (&str, &DocumentClusters)> {
        self.documents.iter().map(|(id, doc)| (id.as_str(), doc))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Total number of clusters across documents
    pub fn cluster_count(&self) -> usize {
        self.documents.iter().map(|(_, doc)| doc.len()).sum()
    }
}

// ============================================================================
// Open Mention Tracking
// ============================================================================

/// Positions of mentions opened but not yet closed
#[derive(Debug)]
enum OpenMentions {
    Overwrite(HashMap<String, usize>),
    Nested(HashMap<String, Vec<usize>>),
}

impl OpenMentions {
    fn new(mode: StackMode) -> Self {
        match mode {
            StackMode::Overwrite => Self::Overwrite(HashMap::new()),
            StackMode::Nested => Self::Nested(HashMap::new()),
        }
    }

    fn open(&mut self, cluster_id: &str, position: usize) {
        match self {
            Self::Overwrite(open) => {
                open.insert(cluster_id.to_string(), position);
            }
            Self::Nested(open) => open
                .entry(cluster_id.to_string())
                .or_default()
                .push(position),
        }
    }

    fn close(&mut self, cluster_id: &str) -> Option<usize> {
        match self {
            Self::Overwrite(open) => open.remove(cluster_id),
            Self::Nested(open) => {
                let stack = open.get_mut(cluster_id)?;
                let begin = stack.pop();
                if stack.is_empty() {
                    open.remove(cluster_id);
                }
                begin
            }
        }
    }

    fn pending(&self) -> usize {
        match self {
            Self::Overwrite(open) => open.len(),
            Self::Nested(open) => open.values().map(Vec::len).sum(),
        }
    }
}

// ============================================================================
// Reconstructor
// ============================================================================

/// Stack-based reconstruction of clusters from coreference fields
#[derive(Debug, Clone, Copy, Default)]
pub struct ClusterReconstructor {
    mode: StackMode,
}

impl ClusterReconstructor {
    pub fn new(mode: StackMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> StackMode {
        self.mode
    }

    /// Rebuild the clusters of a token stream
    ///
    /// One set of open mentions is kept for the whole stream; it is not
    /// reset at document boundaries.
    pub fn reconstruct<'a, I>(&self, records: I) -> CorefClusters
    where
        I: IntoIterator<Item = &'a TokenRecord>,
    {
        let mut clusters = CorefClusters::default();
        let mut open = OpenMentions::new(self.mode);
        let mut unmatched = 0usize;

        for record in records {
            if !record.has_coref() {
                continue;
            }
            unmatched += apply_field(
                &mut clusters,
                &mut open,
                &record.document_id,
                record.position,
                &record.coref_field,
            );
        }

        if unmatched > 0 {
            tracing::debug!("Discarded {} unmatched closing markers", unmatched);
        }
        if open.pending() > 0 {
            tracing::debug!("{} mentions were opened but never closed", open.pending());
        }

        clusters
    }
}

/// Apply one coreference field, returning the number of discarded closes
///
/// Markers are consumed single-token first, then opens, then closes; every
/// matched marker is removed from the field before the next pass.
fn apply_field(
    clusters: &mut CorefClusters,
    open: &mut OpenMentions,
    document_id: &str,
    position: usize,
    field: &str,
) -> usize {
    let mut remainder = field.to_string();

    let singles = capture_markers(&SINGLE_MARKER, &remainder);
    for (marker, cluster_id) in singles {
        clusters.push(document_id, &cluster_id, MentionSpan::Single(position));
        remainder = remainder.replace(&marker, "");
    }

    let opens = capture_markers(&OPEN_MARKER, &remainder);
    for (marker, cluster_id) in opens {
        open.open(&cluster_id, position);
        remainder = remainder.replace(&marker, "");
    }

    let mut unmatched = 0;
    for (_, cluster_id) in capture_markers(&CLOSE_MARKER, &remainder) {
        let Some(begin) = open.close(&cluster_id) else {
            unmatched += 1;
            continue;
        };
        match MentionSpan::range(begin, position) {
            Some(span) => clusters.push(document_id, &cluster_id, span),
            None => unmatched += 1,
        }
    }

    unmatched
}

/// All non-overlapping matches of a marker pattern as (marker, cluster id)
fn capture_markers(pattern: &Regex, text: &str) -> Vec<(String, String)> {
    pattern
        .captures_iter(text)
        .map(|caps| (caps[0].to_string(), caps[1].to_string()))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
