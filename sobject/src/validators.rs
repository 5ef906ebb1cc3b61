use std::sync::LazyLock;

use regex::Regex;

use crate::id;

static REMOTE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9]*(?:_[A-Za-z0-9]+)*(?:__[A-Za-z0-9]+(?:_[A-Za-z0-9]+)*)*$").expect("valid regex"));
static LOCAL_NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

/// Returns `true` if `value` is shaped like a remote object or field name,
/// including namespaced and suffixed custom names such as `Test__MyField__c`.
pub fn is_valid_remote_name(value: &str) -> bool {
    REMOTE_NAME.is_match(value)
}

/// Returns `true` if `value` can be used as a local field or accessor name.
pub fn is_valid_local_name(value: &str) -> bool {
    LOCAL_NAME.is_match(value)
}

/// Returns `true` if `value` is a 15-character id or a checksum-correct 18-character id.
pub fn is_valid_record_id(value: &str) -> bool {
    id::is_valid_id(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_name_validation() {
        assert!(is_valid_remote_name("MyField1"));
        assert!(is_valid_remote_name("Test__MyField2__c"));
        assert!(is_valid_remote_name("Billing_Street__c"));
        assert!(!is_valid_remote_name("1Field"));
        assert!(!is_valid_remote_name("My Field"));
        assert!(!is_valid_remote_name("Field_"));
    }

    #[test]
    fn local_name_validation() {
        assert!(is_valid_local_name("my_field1"));
        assert!(is_valid_local_name("external_id"));
        assert!(!is_valid_local_name("my-field"));
        assert!(!is_valid_local_name(""));
    }

    #[test]
    fn record_id_validation() {
        assert!(is_valid_record_id("001000000000001"));
        assert!(!is_valid_record_id("somefakeid"));
    }
}
