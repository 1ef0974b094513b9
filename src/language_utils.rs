use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for the translation target
///
/// The target language is configured as an ISO 639-1 (2-letter) or
/// ISO 639-2 (3-letter) code and turned into an English display name
/// for the prompts.

/// ISO 639-2/B codes that differ from their ISO 639-2/T counterpart
const BIBLIOGRAPHIC_CODES: &[(&str, &str)] = &[
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
];

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

        if let Some((_, part2t)) = BIBLIOGRAPHIC_CODES
            .iter()
            .find(|(part2b, _)| *part2b == normalized_code)
        {
            return Ok(part2t.to_string());
        }
    }

    Err(anyhow!("Invalid language code: {}", code))
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}

/// Name used in prompts, e.g. "Classical Latin" for `la` + `Classical`
pub fn prompt_language_name(code: &str, variant: Option<&str>) -> Result<String> {
    let name = get_language_name(code)?;
    Ok(match variant.map(str::trim).filter(|v| !v.is_empty()) {
        Some(variant) => format!("{} {}", variant, name),
        None => name,
    })
}
