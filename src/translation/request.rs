/*!
 * Request construction for the JSON-RPC job protocol.
 *
 * Input text is cut into one job per line. The request carries the
 * endpoint's sequence number as its JSON-RPC id and a timestamp derived
 * from the job texts; both are checked by the service, so a request is
 * only valid for the endpoint session it was built from.
 */

use serde::Serialize;

use crate::errors::AttemptError;
use crate::language_utils::LanguageDescriptor;
use super::endpoint::EndpointSession;

/// JSON-RPC method submitting translation jobs
pub const JOBS_METHOD: &str = "LMT_handle_jobs";

/// One line of input, translated as an independent unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationJob {
    pub text: String,
    pub source_code: String,
    pub target_code: String,
    /// Extended target code (`en-US`), empty when no regional variant applies
    pub regional_code: String,
    /// Whether the line was followed by a line break in the input
    pub newline_follows: bool,
}

/// A built request; immutable once created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    /// Sequence number consumed from the endpoint session
    pub id: u64,
    /// Signed timestamp in milliseconds
    pub timestamp: i64,
    pub jobs: Vec<TranslationJob>,
}

impl TranslationRequest {
    /// Wire payload of this request
    pub fn to_json_string(&self) -> Result<String, AttemptError> {
        let first = self.jobs.first();
        let source = first.map(|j| j.source_code.as_str()).unwrap_or_default();
        let target = first.map(|j| j.target_code.as_str()).unwrap_or_default();
        let regional = first.map(|j| j.regional_code.as_str()).unwrap_or_default();

        let mut preferred = vec![target];
        if source != target {
            preferred.push(source);
        }

        let jobs = self
            .jobs
            .iter()
            .enumerate()
            .map(|(i, job)| WireJob {
                kind: "default",
                raw_en_sentence: &job.text,
                raw_en_context_before: i
                    .checked_sub(1)
                    .map(|prev| vec![self.jobs[prev].text.as_str()])
                    .unwrap_or_default(),
                raw_en_context_after: self
                    .jobs
                    .get(i + 1)
                    .map(|next| vec![next.text.as_str()])
                    .unwrap_or_default(),
                preferred_num_beams: 1,
            })
            .collect();

        let rpc = WireRequest {
            jsonrpc: "2.0",
            method: JOBS_METHOD,
            params: WireParams {
                jobs,
                lang: WireLang {
                    user_preferred_langs: preferred,
                    source_lang_user_selected: source,
                    target_lang: target,
                },
                priority: -1,
                common_job_params: WireCommonParams {
                    regional_variant: regional,
                },
                timestamp: self.timestamp,
            },
            id: self.id,
        };

        let body = serde_json::to_string(&rpc).map_err(|e| AttemptError::Encoding(e.to_string()))?;
        Ok(body.replacen("\"method\":\"", method_separator(self.id), 1))
    }
}

#[derive(Serialize)]
struct WireRequest<'a> {
    jsonrpc: &'static str,
    method: &'static str,
    params: WireParams<'a>,
    id: u64,
}

#[derive(Serialize)]
struct WireParams<'a> {
    jobs: Vec<WireJob<'a>>,
    lang: WireLang<'a>,
    priority: i32,
    #[serde(rename = "commonJobParams")]
    common_job_params: WireCommonParams<'a>,
    timestamp: i64,
}

#[derive(Serialize)]
struct WireJob<'a> {
    kind: &'static str,
    raw_en_sentence: &'a str,
    raw_en_context_before: Vec<&'a str>,
    raw_en_context_after: Vec<&'a str>,
    preferred_num_beams: u32,
}

#[derive(Serialize)]
struct WireLang<'a> {
    user_preferred_langs: Vec<&'a str>,
    source_lang_user_selected: &'a str,
    target_lang: &'a str,
}

#[derive(Serialize)]
struct WireCommonParams<'a> {
    #[serde(rename = "regionalVariant", skip_serializing_if = "str::is_empty")]
    regional_variant: &'a str,
}

/// The service expects the `method` key spaced differently for some ids
fn method_separator(id: u64) -> &'static str {
    if id % 29 == 24 || id % 13 == 10 {
        "\"method\" : \""
    } else {
        "\"method\": \""
    }
}

/// Round the clock up to a multiple of (number of `i` letters + 1)
pub fn signed_timestamp(jobs: &[TranslationJob], now_ms: i64) -> i64 {
    let i_count = jobs.iter().map(|job| job.text.matches('i').count()).sum::<usize>() as i64;
    if i_count == 0 {
        return now_ms;
    }

    let modulus = i_count + 1;
    now_ms - now_ms % modulus + modulus
}

/// Split text into lines, each paired with its "newline follows" flag.
///
/// Blank lines are dropped; the line before them keeps its line break.
/// Kept lines are sent as written, indentation included.
pub fn segment(text: &str) -> Vec<(String, bool)> {
    let lines: Vec<&str> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect();

    let last = lines.len().saturating_sub(1);
    lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| (line.to_string(), i < last))
        .collect()
}

/// Builds requests against an endpoint session
pub struct RequestBuilder;

impl RequestBuilder {
    /// Build a request stamped with the current time.
    ///
    /// Consumes one sequence number from `session`, whatever happens to the
    /// request afterwards.
    pub fn build(
        session: &mut EndpointSession,
        source_text: &str,
        source: &LanguageDescriptor,
        target: &LanguageDescriptor,
    ) -> Result<(TranslationRequest, String), AttemptError> {
        Self::build_at(session, source_text, source, target, chrono::Utc::now().timestamp_millis())
    }

    /// Build a request with an explicit clock value
    pub fn build_at(
        session: &mut EndpointSession,
        source_text: &str,
        source: &LanguageDescriptor,
        target: &LanguageDescriptor,
        now_ms: i64,
    ) -> Result<(TranslationRequest, String), AttemptError> {
        let id = session.advance();

        let source_code = source.iso_code.to_uppercase();
        let target_code = target.iso_code.to_uppercase();
        let regional_code = target.regional_code().to_string();

        let jobs: Vec<TranslationJob> = segment(source_text)
            .into_iter()
            .map(|(text, newline_follows)| TranslationJob {
                text,
                source_code: source_code.clone(),
                target_code: target_code.clone(),
                regional_code: regional_code.clone(),
                newline_follows,
            })
            .collect();

        let request = TranslationRequest {
            id,
            timestamp: signed_timestamp(&jobs, now_ms),
            jobs,
        };
        let body = request.to_json_string()?;

        Ok((request, body))
    }
}
