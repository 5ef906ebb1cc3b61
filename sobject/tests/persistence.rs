//! Saving records through the remote client.

mod support;

use serde_json::json;
use sobject::{Configuration, SObjectError, Session};
use support::{Call, RecordingClient, attributes, family, session, test_object};

// ============================================================================
// Create
// ============================================================================

#[test]
fn remote_attributes_are_sent_when_creating() {
    let client = RecordingClient::new();
    let repo = test_object(&session(client.clone()));

    let record = repo.try_create([("my_field1", "myvalue")]).expect("create");
    assert_eq!(record.external_id(), Some("somefakeid"));
    assert!(!record.is_new());

    assert_eq!(
        client.calls(),
        vec![Call::Create {
            api_name: "TestObject".into(),
            attributes: attributes(json!({
                "Id": null,
                "MyField1": "myvalue",
                "Test__MyField2__c": null,
            })),
        }]
    );
}

#[test]
fn blank_created_id_is_an_unsuccessful_save() {
    let client = RecordingClient::new();
    client.set_created_id("");
    let repo = test_object(&session(client.clone()));

    let mut record = repo.build([("my_field1", "myvalue")]);
    assert!(!record.save());
    assert!(record.is_new());

    assert!(matches!(
        repo.try_create([("my_field1", "myvalue")]),
        Err(SObjectError::SaveFailed { operation: "create", .. })
    ));
}

#[test]
fn failing_client_propagates_from_try_create() {
    let client = RecordingClient::failing("INVALID_SESSION_ID");
    let repo = test_object(&session(client));

    match repo.try_create([("my_field1", "myvalue")]) {
        Err(SObjectError::Remote(source)) => assert_eq!(source.to_string(), "INVALID_SESSION_ID"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn failing_client_makes_save_return_false() {
    let client = RecordingClient::failing("INVALID_SESSION_ID");
    let repo = test_object(&session(client));

    let mut record = repo.build([("my_field1", "myvalue")]);
    assert!(!record.save());
    assert_eq!(record.external_id(), None);

    let created = repo.create([("my_field1", "myvalue")]);
    assert!(created.is_new());
}

#[test]
fn parent_foreign_keys_are_not_sent() {
    let client = RecordingClient::new();
    let session = session(client.clone());
    let (_, child) = family(&session);

    child.try_create([("name", "kid"), ("parent_id", "001")]).expect("create");
    match &client.calls()[0] {
        Call::Create { attributes, .. } => {
            assert!(attributes.contains_key("Name"));
            assert!(!attributes.contains_key("ParentId"));
        }
        other => panic!("unexpected call: {other:?}"),
    }
}

// ============================================================================
// Update
// ============================================================================

#[test]
fn remote_attributes_are_sent_when_updating() {
    let client = RecordingClient::new();
    let repo = test_object(&session(client.clone()));

    let mut record = repo.build([("external_id", "somefakeid")]);
    record.try_update([("my_field1", "myvalue")]).expect("update");

    assert_eq!(
        client.calls(),
        vec![Call::Update {
            api_name: "TestObject".into(),
            attributes: attributes(json!({
                "Id": "somefakeid",
                "MyField1": "myvalue",
                "Test__MyField2__c": null,
            })),
        }]
    );
}

#[test]
fn falsy_update_is_reported() {
    let client = RecordingClient::new();
    client.set_update_result(false);
    let repo = test_object(&session(client));

    let mut record = repo.build([("external_id", "somefakeid")]);
    assert!(!record.update([("my_field1", "changed")]));
    assert_eq!(record.get("my_field1"), Some(&json!("changed")));
    assert!(matches!(
        record.try_save(),
        Err(SObjectError::SaveFailed { operation: "update", .. })
    ));
}

#[test]
fn update_ignores_unknown_fields() {
    let client = RecordingClient::new();
    let repo = test_object(&session(client.clone()));

    let mut record = repo.build([("external_id", "somefakeid")]);
    assert!(record.update([("my_field1", "a"), ("bogus", "b")]));
    match &client.calls()[0] {
        Call::Update { attributes, .. } => assert!(!attributes.contains_key("bogus")),
        other => panic!("unexpected call: {other:?}"),
    }
}

// ============================================================================
// Client availability
// ============================================================================

#[test]
fn missing_client_is_unavailable() {
    let session = Session::new(Configuration::new());
    let repo = test_object(&session);

    assert!(matches!(repo.try_create([("my_field1", "x")]), Err(SObjectError::ClientUnavailable)));
    assert!(matches!(repo.find("001"), Err(SObjectError::ClientUnavailable)));
    assert!(matches!(repo.all(), Err(SObjectError::ClientUnavailable)));
    assert!(matches!(repo.exists([("my_field1", "x")]), Err(SObjectError::ClientUnavailable)));
}

#[test]
fn client_factory_is_invoked_per_operation() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    let invocations = Arc::new(AtomicUsize::new(0));
    let client = RecordingClient::new();
    let config = {
        let invocations = Arc::clone(&invocations);
        let client = client.clone();
        Configuration::new().with_client_factory(move || {
            invocations.fetch_add(1, Ordering::SeqCst);
            Some(client.clone() as Arc<dyn sobject::RemoteClient>)
        })
    };
    let repo = test_object(&Session::new(config));
    assert_eq!(invocations.load(Ordering::SeqCst), 0);

    repo.all().expect("all");
    repo.all().expect("all");
    assert_eq!(invocations.load(Ordering::SeqCst), 2);
}
