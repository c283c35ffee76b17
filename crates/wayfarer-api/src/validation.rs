use uuid::{Uuid, Variant};

use crate::error::ApiError;

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 15;
pub const DISPLAY_NAME_MAX: usize = 15;
pub const BIO_MAX: usize = 150;

/// Hyphenated, version 4, RFC 4122 variant. Braced, URN and simple forms
/// are rejected.
pub fn is_uuid_v4(s: &str) -> bool {
    if s.len() != 36 {
        return false;
    }
    match Uuid::parse_str(s) {
        Ok(id) => id.get_version_num() == 4 && id.get_variant() == Variant::RFC4122,
        Err(_) => false,
    }
}

/// Treats absent, empty and whitespace-only values alike.
pub fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

pub fn validate_user_id(id: &str) -> Result<(), ApiError> {
    if is_uuid_v4(id) {
        Ok(())
    } else {
        Err(ApiError::bad_request("userId is not a valid UUID v4"))
    }
}

/// Returns the trimmed username.
pub fn validate_username(raw: Option<&str>) -> Result<String, ApiError> {
    let name = raw.map(str::trim).unwrap_or_default();
    let len = char_len(name);
    if raw.is_none() || !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
        return Err(ApiError::bad_request(format!(
            "Username must be between {} and {} characters",
            USERNAME_MIN, USERNAME_MAX
        )));
    }
    Ok(name.to_string())
}

/// Returns the trimmed display name. Required, may be empty.
pub fn validate_display_name(raw: Option<&str>) -> Result<String, ApiError> {
    match raw.map(str::trim) {
        Some(name) if char_len(name) <= DISPLAY_NAME_MAX => Ok(name.to_string()),
        _ => Err(ApiError::bad_request(format!(
            "Invalid display name (at most {} characters)",
            DISPLAY_NAME_MAX
        ))),
    }
}

/// Returns the trimmed bio, if one was supplied.
pub fn validate_bio(raw: Option<&str>) -> Result<Option<String>, ApiError> {
    match raw.map(str::trim) {
        None => Ok(None),
        Some(bio) if char_len(bio) <= BIO_MAX => Ok(Some(bio.to_string())),
        Some(_) => Err(ApiError::bad_request(format!(
            "Bio cannot exceed {} characters",
            BIO_MAX
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_v4_uuids() {
        assert!(is_uuid_v4("6f1c2a3b-4d5e-4f60-8a71-92b3c4d5e6f7"));
        assert!(is_uuid_v4("6F1C2A3B-4D5E-4F60-BA71-92B3C4D5E6F7"));
        assert!(is_uuid_v4(&Uuid::new_v4().to_string()));
    }

    #[test]
    fn rejects_other_versions_and_variants() {
        // version 1
        assert!(!is_uuid_v4("6f1c2a3b-4d5e-1f60-8a71-92b3c4d5e6f7"));
        // nil
        assert!(!is_uuid_v4("00000000-0000-0000-0000-000000000000"));
        // variant nibble outside 8..b
        assert!(!is_uuid_v4("6f1c2a3b-4d5e-4f60-ca71-92b3c4d5e6f7"));
    }

    #[test]
    fn rejects_malformed_strings() {
        assert!(!is_uuid_v4(""));
        assert!(!is_uuid_v4("not-a-uuid"));
        assert!(!is_uuid_v4("6f1c2a3b4d5e4f608a7192b3c4d5e6f7"));
        assert!(!is_uuid_v4("{6f1c2a3b-4d5e-4f60-8a71-92b3c4d5e6f7}"));
        assert!(!is_uuid_v4("6f1c2a3b-4d5e-4f60-8a71-92b3c4d5e6fz"));
    }

    #[test]
    fn username_length_boundaries() {
        assert!(validate_username(Some("ab")).is_err());
        assert!(validate_username(Some("abc")).is_ok());
        assert!(validate_username(Some(&"a".repeat(15))).is_ok());
        assert!(validate_username(Some(&"a".repeat(16))).is_err());
        assert!(validate_username(None).is_err());
    }

    #[test]
    fn username_is_trimmed_before_counting() {
        assert_eq!(validate_username(Some("  abc  ")).unwrap(), "abc");
        assert!(validate_username(Some("  ab  ")).is_err());
    }

    #[test]
    fn username_counts_characters_not_bytes() {
        assert!(validate_username(Some("ñandú")).is_ok());
        assert!(validate_username(Some(&"é".repeat(15))).is_ok());
    }

    #[test]
    fn display_name_length_boundaries() {
        assert!(validate_display_name(Some("")).is_ok());
        assert!(validate_display_name(Some("ab")).is_ok());
        assert!(validate_display_name(Some("abc")).is_ok());
        assert!(validate_display_name(Some(&"d".repeat(15))).is_ok());
        assert!(validate_display_name(Some(&"d".repeat(16))).is_err());
        assert!(validate_display_name(None).is_err());
    }

    #[test]
    fn bio_is_optional_and_bounded() {
        assert_eq!(validate_bio(None).unwrap(), None);
        assert!(validate_bio(Some(&"b".repeat(150))).is_ok());
        assert!(validate_bio(Some(&"b".repeat(151))).is_err());
    }

    #[test]
    fn present_drops_blank_values() {
        assert_eq!(present(Some("  ".into())), None);
        assert_eq!(present(None), None);
        assert_eq!(present(Some("x".into())).as_deref(), Some("x"));
    }
}
