/*!
 * Tests for language utility functions
 */

use dialogai::language_utils::{get_language_name, normalize_to_part2t, prompt_language_name};

/// Test normalization of language codes to ISO 639-2/T format
#[test]
fn test_normalizeToPart2t_withValidCodes_shouldNormalizeCorrectly() {
    assert_eq!(normalize_to_part2t("la").unwrap(), "lat");
    assert_eq!(normalize_to_part2t("fr").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("fre").unwrap(), "fra");
    assert_eq!(normalize_to_part2t(" EN ").unwrap(), "eng");
}

#[test]
fn test_normalizeToPart2t_withInvalidCodes_shouldFail() {
    assert!(normalize_to_part2t("").is_err());
    assert!(normalize_to_part2t("e").is_err());
    assert!(normalize_to_part2t("123").is_err());
}

#[test]
fn test_getLanguageName_shouldReturnEnglishName() {
    assert_eq!(get_language_name("la").unwrap(), "Latin");
    assert_eq!(get_language_name("ja").unwrap(), "Japanese");
}

#[test]
fn test_promptLanguageName_shouldPrefixVariant() {
    assert_eq!(prompt_language_name("la", Some("Classical")).unwrap(), "Classical Latin");
    assert_eq!(prompt_language_name("pt", Some("Brazilian")).unwrap(), "Brazilian Portuguese");
    assert_eq!(prompt_language_name("de", None).unwrap(), "German");
}
