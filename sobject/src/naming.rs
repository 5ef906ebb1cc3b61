use heck::{ToPascalCase, ToSnakeCase};

use crate::types::CUSTOM_SUFFIX;

/// Remote-name construction helpers bound to the namespace in effect when a
/// schema is declared.
#[derive(Debug, Clone, Copy)]
pub struct NameContext<'a> {
    pub namespace: &'a str,
}

impl<'a> NameContext<'a> {
    pub fn new(namespace: &'a str) -> Self {
        Self { namespace }
    }

    /// `Field` becomes `Namespace__Field__c`, or `Field__c` without a namespace.
    pub fn custom_field(&self, remote: &str) -> String {
        if self.namespace.is_empty() {
            format!("{remote}{CUSTOM_SUFFIX}")
        } else {
            format!("{}__{remote}{CUSTOM_SUFFIX}", self.namespace)
        }
    }

    pub fn field(&self, remote: &str, custom: bool) -> String {
        if custom { self.custom_field(remote) } else { remote.to_string() }
    }
}

/// Appends the custom suffix unless the name already carries it.
pub fn custom_object(api_name: &str) -> String {
    if api_name.ends_with(CUSTOM_SUFFIX) {
        api_name.to_string()
    } else {
        format!("{api_name}{CUSTOM_SUFFIX}")
    }
}

/// Default local foreign-key name for a parent accessor: `account` -> `account_id`.
pub fn parent_foreign_key(field: &str) -> String {
    format!("{field}_id")
}

/// Default remote name for a local foreign key: `account_id` -> `AccountId`.
pub fn remote_foreign_key(local_foreign_key: &str) -> String {
    local_foreign_key.to_pascal_case()
}

/// Default foreign key children of `api_name` use to point back at it:
/// `Account` -> `account_id`, `Invoice__c` -> `invoice_id`.
pub fn children_foreign_key(api_name: &str) -> String {
    let base = api_name.strip_suffix(CUSTOM_SUFFIX).unwrap_or(api_name);
    format!("{}_id", base.to_snake_case())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_fields_are_namespaced_when_configured() {
        assert_eq!(NameContext::new("Test").custom_field("MyField2"), "Test__MyField2__c");
        assert_eq!(NameContext::new("").custom_field("MyField2"), "MyField2__c");
        assert_eq!(NameContext::new("Test").field("MyField1", false), "MyField1");
    }

    #[test]
    fn custom_object_suffix_is_idempotent() {
        assert_eq!(custom_object("Invoice"), "Invoice__c");
        assert_eq!(custom_object("Invoice__c"), "Invoice__c");
    }

    #[test]
    fn foreign_key_defaults() {
        assert_eq!(parent_foreign_key("parent"), "parent_id");
        assert_eq!(remote_foreign_key("parent_id"), "ParentId");
        assert_eq!(remote_foreign_key("billing_account_id"), "BillingAccountId");
        assert_eq!(children_foreign_key("Parent"), "parent_id");
        assert_eq!(children_foreign_key("OrderLine__c"), "order_line_id");
    }
}
