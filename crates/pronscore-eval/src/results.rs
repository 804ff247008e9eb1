//! Results file
//!
//! Scores are merged into a JSON object stored at `<logs_dir>/<model>.json`,
//! next to whatever the training run already logged there. The update is a
//! plain read-modify-write and is not atomic.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use pronscore_core::{PronscoreError, Result, Setting};

/// Key under which a data file's score is stored
///
/// The `all` setting uses `<file>_pronoun_score`; other settings insert the
/// setting name: `<file>_<setting>_pronoun_score`.
pub fn score_key(data_file: &str, setting: Setting) -> String {
    match setting {
        Setting::All => format!("{data_file}_pronoun_score"),
        other => format!("{data_file}_{other}_pronoun_score"),
    }
}

/// Path of a model's results file
pub fn results_path(logs_dir: &Path, model: &str) -> PathBuf {
    logs_dir.join(format!("{model}.json"))
}

/// Merge score entries into a results file
///
/// A missing file starts from an empty object; undefined scores are written
/// as `null`. Existing keys are overwritten, all other content is kept.
pub fn merge_scores(path: &Path, entries: &[(String, Option<f64>)]) -> Result<()> {
    let mut data = read_results(path)?;

    for (key, score) in entries {
        let value = score
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null);
        data.insert(key.clone(), value);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }

    let content = serde_json::to_string_pretty(&Value::Object(data))?;
    std::fs::write(path, content).map_err(|e| io_error(path, e))?;
    tracing::debug!("Stored {} scores in {}", entries.len(), path.display());

    Ok(())
}

/// Read the JSON object of a results file, empty when the file is absent
pub fn read_results(path: &Path) -> Result<Map<String, Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
        Err(e) => return Err(io_error(path, e)),
    };

    match serde_json::from_str(&content)? {
        Value::Object(map) => Ok(map),
        _ => Err(PronscoreError::ResultsFile {
            path: path.display().to_string(),
            message: "top-level value is not an object".to_string(),
        }),
    }
}

fn io_error(path: &Path, source: std::io::Error) -> PronscoreError {
    PronscoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

// ============================================================================
// Tests
// ============================================================================
