//! Remote record identifiers.
//!
//! Identifiers come in a case-sensitive 15-character form and a case-safe
//! 18-character form whose last three characters encode the capitalization of
//! the first fifteen. Records always store the 15-character form.

use nanoid::nanoid;

/// Length identifier fields are truncated to on construction.
pub const ID_LENGTH: usize = 15;
/// Length of the case-safe identifier form.
pub const CASE_SAFE_ID_LENGTH: usize = 18;

const CHECKSUM_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ012345";

const ID_ALPHABET: &[char] = &[
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M',
    'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j',
    'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];
const KEY_PREFIX_LENGTH: usize = 3;
const BODY_LENGTH: usize = ID_LENGTH - KEY_PREFIX_LENGTH;

/// Cuts an identifier down to its first 15 characters. Shorter values are returned unchanged.
pub fn truncate_id(value: &str) -> &str {
    match value.char_indices().nth(ID_LENGTH) {
        Some((index, _)) => &value[..index],
        None => value,
    }
}

/// Computes the three-character suffix of the case-safe form of a 15-character id.
///
/// Returns `None` when `id` is not exactly 15 ASCII alphanumeric characters.
pub fn checksum(id: &str) -> Option<String> {
    if id.len() != ID_LENGTH || !id.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }
    let suffix = id
        .as_bytes()
        .chunks(5)
        .map(|chunk| {
            let flags = chunk
                .iter()
                .enumerate()
                .filter(|(_, byte)| byte.is_ascii_uppercase())
                .fold(0usize, |acc, (bit, _)| acc | (1 << bit));
            CHECKSUM_ALPHABET[flags] as char
        })
        .collect();
    Some(suffix)
}

/// Converts a 15-character id to its 18-character case-safe form.
/// 18-character ids are returned as given; anything else yields `None`.
pub fn to_case_safe_id(id: &str) -> Option<String> {
    match id.len() {
        ID_LENGTH => checksum(id).map(|suffix| format!("{id}{suffix}")),
        CASE_SAFE_ID_LENGTH if is_valid_id(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Standalone identifier-shape check. Construction never calls this; callers opt in.
///
/// Accepts 15 alphanumeric characters, or 18 whose suffix matches the checksum
/// of the first 15.
pub fn is_valid_id(value: &str) -> bool {
    match value.len() {
        ID_LENGTH => value.bytes().all(|b| b.is_ascii_alphanumeric()),
        CASE_SAFE_ID_LENGTH => {
            let (head, suffix) = value.split_at(ID_LENGTH);
            checksum(head).is_some_and(|expected| expected == suffix)
        }
        _ => false,
    }
}

/// Generates a case-safe id with the given three-character key prefix.
/// Short prefixes are padded with `0`, long ones cut.
pub fn generate_id(key_prefix: &str) -> String {
    let mut prefix: String = key_prefix
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(KEY_PREFIX_LENGTH)
        .collect();
    while prefix.len() < KEY_PREFIX_LENGTH {
        prefix.push('0');
    }
    let body = nanoid!(BODY_LENGTH, ID_ALPHABET);
    let id = format!("{prefix}{body}");
    let suffix = checksum(&id).unwrap_or_default();
    format!("{id}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_to_fifteen_characters() {
        assert_eq!(truncate_id("123456789012345678"), "123456789012345");
        assert_eq!(truncate_id("12345"), "12345");
        assert_eq!(truncate_id(""), "");
    }

    #[test]
    fn case_safe_checksum() {
        assert_eq!(checksum("000000000000000").as_deref(), Some("AAA"));
        assert_eq!(checksum("A0000B0000C0000").as_deref(), Some("BBB"));
        assert_eq!(checksum("AAAAAaaaaa00000").as_deref(), Some("5AA"));
        assert_eq!(to_case_safe_id("A0000B0000C0000").as_deref(), Some("A0000B0000C0000BBB"));
        assert!(checksum("short").is_none());
    }

    #[test]
    fn validates_identifier_shape() {
        assert!(is_valid_id("001000000000001"));
        assert!(is_valid_id("A0000B0000C0000BBB"));
        assert!(!is_valid_id("A0000B0000C0000AAA"));
        assert!(!is_valid_id("not-an-id-value"));
        assert!(!is_valid_id("123"));
    }

    #[test]
    fn generated_ids_are_valid_and_prefixed() {
        let id = generate_id("001");
        assert_eq!(id.len(), CASE_SAFE_ID_LENGTH);
        assert!(id.starts_with("001"));
        assert!(is_valid_id(&id));
        assert!(generate_id("x").starts_with("x00"));
    }
}
