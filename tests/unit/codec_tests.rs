/*!
 * Tests for request construction and response reassembly
 */

use pooltrans::errors::AttemptError;
use pooltrans::language_utils::describe_language;
use pooltrans::translation::request::{RequestBuilder, segment, signed_timestamp};
use pooltrans::translation::response::{parse_candidates, reassemble, stitch};
use pooltrans::translation::EndpointSession;
use serde_json::Value;

use crate::common::translation_body;

const NOW_MS: i64 = 1_700_000_000_123;

fn build(session: &mut EndpointSession, text: &str, source: &str, target: &str) -> (pooltrans::translation::TranslationRequest, Value) {
    let (request, body) = RequestBuilder::build_at(
        session,
        text,
        &describe_language(source).unwrap(),
        &describe_language(target).unwrap(),
        NOW_MS,
    )
    .unwrap();
    (request, serde_json::from_str(&body).unwrap())
}

#[test]
fn test_request_shouldCarryRpcEnvelopeAndLanguagePreferences() {
    let mut session = EndpointSession::new(2_000_001);
    let (request, body) = build(&mut session, "Hello world", "en", "ja");

    assert_eq!(body["jsonrpc"], "2.0");
    assert_eq!(body["method"], "LMT_handle_jobs");
    assert_eq!(body["id"], 2_000_001);
    assert_eq!(body["params"]["priority"], -1);
    assert_eq!(body["params"]["timestamp"], request.timestamp);
    assert_eq!(body["params"]["lang"]["user_preferred_langs"], serde_json::json!(["JA", "EN"]));
    assert_eq!(body["params"]["jobs"][0]["kind"], "default");
    assert_eq!(body["params"]["jobs"][0]["preferred_num_beams"], 1);
}

#[test]
fn test_request_jobs_shouldCarryOneLineOfContextEachSide() {
    let mut session = EndpointSession::new(1);
    let (_, body) = build(&mut session, "one\ntwo\nthree", "en", "de");
    let jobs = body["params"]["jobs"].as_array().unwrap();

    assert_eq!(jobs.len(), 3);
    assert_eq!(jobs[0]["raw_en_context_before"], serde_json::json!([]));
    assert_eq!(jobs[1]["raw_en_context_before"], serde_json::json!(["one"]));
    assert_eq!(jobs[1]["raw_en_context_after"], serde_json::json!(["three"]));
    assert_eq!(jobs[2]["raw_en_context_after"], serde_json::json!([]));
}

#[test]
fn test_request_timestamp_shouldBeSignedByICount() {
    let mut session = EndpointSession::new(1);
    // "mini iris" holds four lowercase i letters
    let (request, _) = build(&mut session, "mini iris", "en", "de");

    assert_eq!(request.timestamp % 5, 0);
    assert!(request.timestamp > NOW_MS);
    assert!(request.timestamp <= NOW_MS + 5);
    assert_eq!(signed_timestamp(&request.jobs, NOW_MS), request.timestamp);
}

#[test]
fn test_segment_withWindowsLineEndings_shouldMatchUnix() {
    assert_eq!(segment("a\r\nb"), segment("a\nb"));
    assert!(segment("   ").is_empty());
}

#[test]
fn test_reassemble_shouldUndoSegmentationForLineBasedText() {
    let mut session = EndpointSession::new(1);
    let (request, _) = build(&mut session, "Good morning\nHow are you?\nBye", "en", "fr");

    let body = translation_body(&["Bonjour", "Comment allez-vous ?", "Au revoir"]);
    assert_eq!(
        reassemble(&body, &request).unwrap(),
        "Bonjour\nComment allez-vous ?\nAu revoir"
    );
}

#[test]
fn test_parse_candidates_shouldKeepOnlyFirstBeam() {
    let body = r#"{"result":{"translations":[{"beams":[
        {"postprocessed_sentence":"Hallo"},
        {"postprocessed_sentence":"Servus"}
    ]}]}}"#;
    assert_eq!(parse_candidates(body).unwrap(), vec![Some("Hallo".to_string())]);
}

#[test]
fn test_stitch_withNoText_shouldBeEmptyTranslation() {
    let candidates: Vec<Option<&str>> = vec![None, Some("")];
    assert!(matches!(stitch(&candidates, &[]), Err(AttemptError::EmptyTranslation)));
}
