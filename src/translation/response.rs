/*!
 * Response parsing and reassembly.
 *
 * The service answers with one translation entry per submitted job, each
 * holding candidate beams. Only the first beam of an entry is used.
 * Separators come from the request's own segmentation: the service does
 * not echo which lines were followed by a line break.
 */

use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;

use crate::errors::AttemptError;
use crate::transport::body_snippet;
use super::request::{TranslationJob, TranslationRequest};

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    result: Option<WireResult>,
    #[serde(default)]
    error: Option<WireError>,
}

#[derive(Debug, Deserialize)]
struct WireResult {
    #[serde(default)]
    translations: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct WireError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct WireTranslation {
    #[serde(default)]
    beams: Vec<WireBeam>,
}

#[derive(Debug, Deserialize)]
struct WireBeam {
    #[serde(default)]
    postprocessed_sentence: Option<String>,
}

/// Parse a response body into the first-beam text of each translation entry.
///
/// Entries that do not look like a translation yield `None` instead of
/// failing the whole response.
pub fn parse_candidates(body: &str) -> Result<Vec<Option<String>>, AttemptError> {
    let response: WireResponse = serde_json::from_str(body).map_err(|e| {
        AttemptError::MalformedResponse(format!("{} in '{}'", e, body_snippet(body, 200)))
    })?;

    if let Some(error) = response.error {
        return Err(AttemptError::MalformedResponse(format!(
            "service error {}: {}",
            error.code, error.message
        )));
    }

    let translations = response
        .result
        .and_then(|result| result.translations)
        .ok_or_else(|| AttemptError::MalformedResponse(format!("'{}'", body_snippet(body, 200))))?;

    Ok(translations
        .into_iter()
        .enumerate()
        .map(|(i, entry)| match serde_json::from_value::<WireTranslation>(entry) {
            Ok(translation) => translation
                .beams
                .into_iter()
                .next()
                .and_then(|beam| beam.postprocessed_sentence),
            Err(e) => {
                warn!("Skipping malformed translation entry {}: {}", i, e);
                None
            }
        })
        .collect())
}

/// Join first-beam texts, separating each by a line break or a space as the
/// request job at the same index dictates.
///
/// Candidates without text are skipped along with their separator; entries
/// beyond the request's jobs are separated by spaces.
pub fn stitch<S: AsRef<str>>(candidates: &[Option<S>], jobs: &[TranslationJob]) -> Result<String, AttemptError> {
    let mut output = String::new();
    let mut used = 0;

    for (i, candidate) in candidates.iter().enumerate() {
        let Some(text) = candidate.as_ref().map(|c| c.as_ref()).filter(|t| !t.is_empty()) else {
            continue;
        };

        output.push_str(text);
        used += 1;

        if jobs.get(i).is_some_and(|job| job.newline_follows) {
            output.push('\n');
        } else {
            output.push(' ');
        }
    }

    if used == 0 {
        return Err(AttemptError::EmptyTranslation);
    }
    if candidates.len() != jobs.len() {
        debug!("Response has {} entries for {} jobs", candidates.len(), jobs.len());
    }

    Ok(output.trim_end().to_string())
}

/// Rebuild the translated text of `request` from a raw response body
pub fn reassemble(body: &str, request: &TranslationRequest) -> Result<String, AttemptError> {
    let candidates = parse_candidates(body)?;
    stitch(&candidates, &request.jobs)
}
