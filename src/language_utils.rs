//! Language utilities for ISO language code handling
//!
//! This module provides functions for normalizing and matching ISO 639-1
//! (2-letter) and ISO 639-2 (3-letter) language codes, plus the
//! `LanguageService` used by the translator to describe languages.

use anyhow::{Result, anyhow};
use isolang::Language;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt::Debug;

/// ISO 639-2/B codes that differ from their ISO 639-2/T form
static PART2B_TO_PART2T: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("fre", "fra"),
        ("ger", "deu"),
        ("dut", "nld"),
        ("gre", "ell"),
        ("chi", "zho"),
        ("cze", "ces"),
        ("ice", "isl"),
        ("alb", "sqi"),
        ("arm", "hye"),
        ("baq", "eus"),
        ("bur", "mya"),
        ("per", "fas"),
        ("geo", "kat"),
        ("may", "msa"),
        ("mac", "mkd"),
        ("rum", "ron"),
        ("slo", "slk"),
        ("wel", "cym"),
    ])
});

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    if normalized_code.len() == 2 {
        if let Some(lang) = Language::from_639_1(&normalized_code) {
            return Ok(lang.to_639_3().to_string());
        }
    } else if normalized_code.len() == 3 {
        if Language::from_639_3(&normalized_code).is_some() {
            return Ok(normalized_code);
        }
        if let Some(part2t) = PART2B_TO_PART2T.get(normalized_code.as_str()) {
            return Ok((*part2t).to_string());
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-1 (2-letter) format if possible
/// Falls back to ISO 639-2/T if no ISO 639-1 code exists
pub fn normalize_to_part1_or_part2t(code: &str) -> Result<String> {
    let part2t = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&part2t)
        .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))?;

    Ok(lang
        .to_639_1()
        .map(|code_639_1| code_639_1.to_string())
        .unwrap_or(part2t))
}

/// Check if two language codes match (represent the same language)
///
/// Region or script subtags are ignored, so `en-US` matches `eng`.
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    let (base1, _) = split_language_id(code1);
    let (base2, _) = split_language_id(code2);

    match (normalize_to_part2t(base1), normalize_to_part2t(base2)) {
        (Ok(normalized1), Ok(normalized2)) => normalized1 == normalized2,
        _ => false,
    }
}

/// Split `pt-BR` / `pt_br` into the base code and the optional subtag
fn split_language_id(language_id: &str) -> (&str, Option<&str>) {
    let trimmed = language_id.trim();
    match trimmed.split_once(['-', '_']) {
        Some((base, subtag)) => (base, Some(subtag)),
        None => (trimmed, None),
    }
}

/// Canonical spelling of a region (`BR`) or script (`Hans`) subtag
fn normalize_subtag(subtag: &str) -> Result<String> {
    let subtag = subtag.trim();
    if !subtag.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(anyhow!("Invalid region subtag: {}", subtag));
    }

    match subtag.len() {
        2 | 3 => Ok(subtag.to_uppercase()),
        4 => {
            let lower = subtag.to_lowercase();
            let mut chars = lower.chars();
            Ok(chars
                .next()
                .map(|first| first.to_ascii_uppercase().to_string() + chars.as_str())
                .unwrap_or_default())
        }
        _ => Err(anyhow!("Invalid region subtag: {}", subtag)),
    }
}

/// Validate a language identifier (`en`, `eng`, `en-US`, `zh_hans`)
pub fn validate_language_id(language_id: &str) -> Result<()> {
    describe_language(language_id).map(|_| ())
}

/// Description of a language as the translator needs it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageDescriptor {
    /// Identifier as given by the caller
    pub language_id: String,
    /// Upper-cased ISO 639-1 code, or ISO 639-3 when no 2-letter code exists
    pub iso_code: String,
    /// Whether a regional variant was requested
    pub regional_variant: bool,
    /// Extended code such as `en-US`; equal to the lower-cased ISO code otherwise
    pub code: String,
}

impl LanguageDescriptor {
    /// Regional code to send, or an empty string when no variant applies
    pub fn regional_code(&self) -> &str {
        if self.regional_variant {
            &self.code
        } else {
            ""
        }
    }
}

/// Resolve a language identifier into a descriptor
pub fn describe_language(language_id: &str) -> Result<LanguageDescriptor> {
    let (base, subtag) = split_language_id(language_id);
    let short = normalize_to_part1_or_part2t(base)?;

    let (regional_variant, code) = match subtag {
        Some(subtag) => (true, format!("{}-{}", short, normalize_subtag(subtag)?)),
        None => (false, short.clone()),
    };

    Ok(LanguageDescriptor {
        language_id: language_id.trim().to_string(),
        iso_code: short.to_uppercase(),
        regional_variant,
        code,
    })
}

/// Language metadata lookup consumed by the translator
pub trait LanguageService: Send + Sync + Debug {
    /// Describe a language identifier
    fn describe(&self, language_id: &str) -> Result<LanguageDescriptor>;
}

/// Language service backed by the ISO 639 tables of `isolang`
#[derive(Debug, Default, Clone, Copy)]
pub struct IsoLanguageService;

impl LanguageService for IsoLanguageService {
    fn describe(&self, language_id: &str) -> Result<LanguageDescriptor> {
        describe_language(language_id)
    }
}
