//! Third-person pronoun classification
//!
//! Rule-based filter over Dutch morphological tags (CGN/Lassy style, e.g.
//! `VNW|pers|pron|nomin|vol|3|ev|masc`). The allow-lists per setting are
//! held in an explicit [`PronounPolicy`] built once and shared by reference.
//!
//! Plural-marked tags (`mv`) are rejected even though plural forms such as
//! `hen` and `hun` appear in the `all` and `gi` lists; corpus scores depend
//! on this, so it is kept as is.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use pronscore_core::{Setting, TokenRecord};

/// Tag fragments marking pronoun subtypes that are never evaluated
/// (exclamative, indefinite, relative, demonstrative, interrogative)
pub const EXCLUDED_SUBTYPES: [&str; 5] = ["excl", "onbep", "betr", "aanw", "vb"];

/// Tag fragment marking plural forms
pub const PLURAL_MARKER: &str = "mv";

/// Impersonal pronoun, never referential
pub const IMPERSONAL: &str = "men";

const ALL_FORMS: &[&str] = &[
    "hij", "hem", "zijn", "zij", "haar", "hen", "hun", "die", "diens", "dee", "dij", "nij",
    "vij", "zhij", "zem", "dem", "ner", "vijn", "zhaar", "zeer", "dijr", "nijr", "vijns",
];
const FEM_FORMS: &[&str] = &["zij", "haar"];
const MASC_FORMS: &[&str] = &["hij", "hem", "zijn"];
const GI_FORMS: &[&str] = &["hen", "hun", "die", "diens"];

// ============================================================================
// Policy
// ============================================================================

/// Pronoun allow-lists per setting plus the POS gate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PronounPolicy {
    all: HashSet<String>,
    fem: HashSet<String>,
    masc: HashSet<String>,
    gi: HashSet<String>,
    pronoun_pos: String,
}

impl PronounPolicy {
    /// The Dutch policy, including neo-pronoun forms in `all`
    pub fn dutch() -> Self {
        let forms = |list: &[&str]| -> HashSet<String> { list.iter().map(|f| f.to_string()).collect() };

        Self {
            all: forms(ALL_FORMS),
            fem: forms(FEM_FORMS),
            masc: forms(MASC_FORMS),
            gi: forms(GI_FORMS),
            pronoun_pos: "PRON".to_string(),
        }
    }

    /// Set the POS tag a token must carry to be indexed
    pub fn with_pronoun_pos(mut self, pos: impl Into<String>) -> Self {
        self.pronoun_pos = pos.into();
        self
    }

    pub fn pronoun_pos(&self) -> &str {
        &self.pronoun_pos
    }

    /// Allow-list of a setting
    pub fn allowed(&self, setting: Setting) -> &HashSet<String> {
        match setting {
            Setting::All => &self.all,
            Setting::Fem => &self.fem,
            Setting::Masc => &self.masc,
            Setting::Gi => &self.gi,
        }
    }

    /// Whether a lowercase form belongs to a setting
    pub fn is_allowed(&self, setting: Setting, lowercase_form: &str) -> bool {
        self.allowed(setting).contains(lowercase_form)
    }
}

impl Default for PronounPolicy {
    fn default() -> Self {
        Self::dutch()
    }
}

// ============================================================================
// Classification
// ============================================================================

/// Outcome of the third-person check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    /// Tag marks an excluded pronoun subtype
    ExcludedSubtype(&'static str),
    Plural,
    /// Tag carries no person digit in `1..=3`
    NoPersonDigit,
    /// Person digit other than 3
    NotThirdPerson(char),
    Impersonal,
    /// No gender in the tag and the form is not allow-listed
    NotAllowed,
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// First person digit (`1`, `2` or `3`) anywhere in the tag
pub fn person_digit(morph_tag: &str) -> Option<char> {
    morph_tag.chars().find(|c| matches!(c, '1'..='3'))
}

/// Last four characters of the tag with `|` removed
pub fn gender_suffix(morph_tag: &str) -> String {
    let count = morph_tag.chars().count();
    morph_tag
        .chars()
        .skip(count.saturating_sub(4))
        .filter(|&c| c != '|')
        .collect()
}

/// Decide whether a token is a third-person pronoun
///
/// Checks run in a fixed order and the first failing one determines the
/// verdict.
pub fn is_third_person_pronoun(token: &str, morph_tag: &str, allowed: &HashSet<String>) -> Verdict {
    if let Some(subtype) = EXCLUDED_SUBTYPES
        .iter()
        .copied()
        .find(|subtype| morph_tag.contains(subtype))
    {
        return Verdict::ExcludedSubtype(subtype);
    }
    if morph_tag.contains(PLURAL_MARKER) {
        return Verdict::Plural;
    }

    let digit = match person_digit(morph_tag) {
        Some(digit) => digit,
        None => return Verdict::NoPersonDigit,
    };
    if digit != '3' {
        return Verdict::NotThirdPerson(digit);
    }

    let lowercase = token.to_lowercase();
    if lowercase == IMPERSONAL {
        return Verdict::Impersonal;
    }

    let gender = gender_suffix(morph_tag);
    if gender != "fem" && gender != "masc" && !allowed.contains(&lowercase) {
        return Verdict::NotAllowed;
    }

    Verdict::Accepted
}

// ============================================================================
// Pronoun Index
// ============================================================================

/// Positions of evaluation-relevant pronouns per document
#[derive(Debug, Clone, Default)]
pub struct PronounIndex {
    setting: Setting,
    positions: HashMap<String, HashSet<usize>>,
}

impl PronounIndex {
    /// Index the pronouns of a gold stream under a setting
    ///
    /// A token is indexed when it carries the policy's pronoun POS, passes
    /// [`is_third_person_pronoun`], and its lowercase form is in the
    /// setting's allow-list.
    pub fn build<'a, I>(records: I, policy: &PronounPolicy, setting: Setting) -> Self
    where
        I: IntoIterator<Item = &'a TokenRecord>,
    {
        let allowed = policy.allowed(setting);
        let mut index = Self {
            setting,
            positions: HashMap::new(),
        };

        for record in records {
            if record.pos_tag != policy.pronoun_pos() {
                continue;
            }

            let verdict = is_third_person_pronoun(&record.surface_form, &record.morph_tag, allowed);
            if verdict == Verdict::NoPersonDigit {
                tracing::debug!(
                    "No person digit in tag {:?} for {:?}",
                    record.morph_tag,
                    record.surface_form
                );
            }
            if !verdict.is_accepted() {
                continue;
            }

            if allowed.contains(&record.surface_form.to_lowercase()) {
                index.insert(&record.document_id, record.position);
            }
        }

        index
    }

    fn insert(&mut self, document_id: &str, position: usize) {
        self.positions
            .entry(document_id.to_string())
            .or_default()
            .insert(position);
    }

    pub fn setting(&self) -> Setting {
        self.setting
    }

    pub fn contains(&self, document_id: &str, position: usize) -> bool {
        self.positions
            .get(document_id)
            .is_some_and(|positions| positions.contains(&position))
    }

    pub fn positions(&self, document_id: &str) -> Option<&HashSet<usize>> {
        self.positions.get(document_id)
    }

    /// Total number of indexed pronouns
    pub fn len(&self) -> usize {
        self.positions.values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const HAAR_TAG: &str = "VNW|pers|pron|obl|vol|3|getal";
    const HAAR_PLURAL_TAG: &str = "VNW|pers|pron|obl|vol|3|mv";

    fn pron(position: usize, token: &str, tag: &str) -> TokenRecord {
        TokenRecord::new("doc", position, token, "PRON", tag, "-")
    }

    #[test]
    fn test_person_digit() {
        assert_eq!(person_digit("VNW|pers|pron|nomin|vol|3|ev|masc"), Some('3'));
        assert_eq!(person_digit("VNW|pr|pron|obl|vol|1|ev"), Some('1'));
        assert_eq!(person_digit("VNW|refl|pron|obl|red|3|getal"), Some('3'));
        assert_eq!(person_digit("VNW|pers|pron|stan|red|persoon"), None);
    }

    #[test]
    fn test_gender_suffix() {
        assert_eq!(gender_suffix("VNW|pers|pron|nomin|vol|3|ev|masc"), "masc");
        assert_eq!(gender_suffix("VNW|pers|pron|nomin|vol|3v|ev|fem"), "fem");
        assert_eq!(gender_suffix("VNW|pers|pron|obl|vol|3|getal"), "etal");
        assert_eq!(gender_suffix("ab"), "ab");
    }

    #[test]
    fn test_haar_is_pronoun_under_fem_and_all() {
        let policy = PronounPolicy::dutch();
        let tokens = vec![pron(0, "haar", HAAR_TAG)];

        for setting in [Setting::Fem, Setting::All] {
            let index = PronounIndex::build(&tokens, &policy, setting);
            assert!(index.contains("doc", 0), "haar should count under {setting}");
        }

        let masc = PronounIndex::build(&tokens, &policy, Setting::Masc);
        assert!(masc.is_empty());
    }

    #[test]
    fn test_plural_excluded_everywhere() {
        let policy = PronounPolicy::dutch();
        let tokens = vec![pron(0, "haar", HAAR_PLURAL_TAG), pron(1, "hen", HAAR_PLURAL_TAG)];

        for setting in Setting::ALL {
            assert!(PronounIndex::build(&tokens, &policy, setting).is_empty());
        }
    }

    #[test]
    fn test_excluded_subtypes() {
        let allowed = PronounPolicy::dutch().allowed(Setting::All).clone();

        assert_eq!(
            is_third_person_pronoun("die", "VNW|aanw|pron|stan|vol|3o|getal", &allowed),
            Verdict::ExcludedSubtype("aanw")
        );
        assert_eq!(
            is_third_person_pronoun("die", "VNW|betr|pron|stan|vol|persoon|getal", &allowed),
            Verdict::ExcludedSubtype("betr")
        );
        assert_eq!(
            is_third_person_pronoun("wie", "VNW|vb|pron|stan|vol|3p|getal", &allowed),
            Verdict::ExcludedSubtype("vb")
        );
    }

    #[test]
    fn test_person_checks() {
        let allowed = PronounPolicy::dutch().allowed(Setting::All).clone();

        assert_eq!(
            is_third_person_pronoun("ik", "VNW|pers|pron|nomin|vol|1|ev", &allowed),
            Verdict::NotThirdPerson('1')
        );
        assert_eq!(
            is_third_person_pronoun("het", "VNW|pers|pron|stan|red|ev|onz", &allowed),
            Verdict::NoPersonDigit
        );
        assert_eq!(
            is_third_person_pronoun("Men", "VNW|pers|pron|nomin|red|3p|ev|masc", &allowed),
            Verdict::Impersonal
        );
    }

    #[test]
    fn test_gendered_tag_bypasses_allow_list() {
        let empty = HashSet::new();
        assert_eq!(
            is_third_person_pronoun("ze", "VNW|pers|pron|nomin|red|3v|ev|fem", &empty),
            Verdict::Accepted
        );
        assert_eq!(
            is_third_person_pronoun("ze", "VNW|pers|pron|stan|red|3|getal", &empty),
            Verdict::NotAllowed
        );
    }

    #[test]
    fn test_index_requires_allow_list_membership() {
        // Gendered tag passes the check, but "ze" is in no allow-list
        let policy = PronounPolicy::dutch();
        let tokens = vec![pron(0, "ze", "VNW|pers|pron|nomin|red|3v|ev|fem")];

        assert!(PronounIndex::build(&tokens, &policy, Setting::All).is_empty());
    }

    #[test]
    fn test_index_requires_pronoun_pos() {
        let policy = PronounPolicy::dutch();
        let tokens = vec![TokenRecord::new(
            "doc",
            0,
            "hij",
            "NOUN",
            "VNW|pers|pron|nomin|vol|3|ev|masc",
            "-",
        )];

        assert!(PronounIndex::build(&tokens, &policy, Setting::Masc).is_empty());

        let relaxed = policy.with_pronoun_pos("NOUN");
        assert!(PronounIndex::build(&tokens, &relaxed, Setting::Masc).contains("doc", 0));
    }

    #[test]
    fn test_index_is_case_insensitive() {
        let policy = PronounPolicy::dutch();
        let tokens = vec![pron(4, "Hij", "VNW|pers|pron|nomin|vol|3|ev|masc")];
        let index = PronounIndex::build(&tokens, &policy, Setting::Masc);

        assert!(index.contains("doc", 4));
        assert!(!index.contains("other", 4));
        assert_eq!(index.len(), 1);
        assert_eq!(index.setting(), Setting::Masc);
    }

    #[test]
    fn test_settings_are_subsets_of_all() {
        let policy = PronounPolicy::dutch();
        let all = policy.allowed(Setting::All);
        for setting in [Setting::Fem, Setting::Masc, Setting::Gi] {
            assert!(policy.allowed(setting).is_subset(all));
        }
        assert!(policy.is_allowed(Setting::All, "zhij"));
        assert!(!policy.is_allowed(Setting::Fem, "hij"));
    }
}
