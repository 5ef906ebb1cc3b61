//! End-to-end flows against the in-memory client.

use std::sync::Arc;

use serde_json::json;
use sobject::{ChildrenOptions, Configuration, MemoryClient, ParentOptions, Repo, Session, id};

fn crm() -> (Arc<MemoryClient>, Repo, Repo) {
    let client = Arc::new(MemoryClient::new());
    let session = Session::new(
        Configuration::new()
            .with_namespace("Acme")
            .with_client(Arc::clone(&client) as Arc<dyn sobject::RemoteClient>),
    );
    let accounts = session
        .register(
            session
                .declare("Account")
                .maps_object("Account")
                .maps_standard_field("name", "Name")
                .maps_custom_field("tier", "Tier")
                .maps_children("contacts", "Contact", ChildrenOptions::default()),
        )
        .expect("register Account");
    let contacts = session
        .register(
            session
                .declare("Contact")
                .maps_object("Contact")
                .maps_standard_field("last_name", "LastName")
                .maps_parent("account", "Account", ParentOptions::default()),
        )
        .expect("register Contact");
    (client, accounts, contacts)
}

#[test]
fn create_find_and_update() {
    let (client, accounts, _) = crm();

    let mut account = accounts.try_create([("name", "Acme"), ("tier", "gold")]).expect("create");
    let id = account.external_id().expect("id").to_string();
    assert!(id::is_valid_id(&id));

    let stored = client.rows("Account");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["Acme__Tier__c"], json!("gold"));

    let found = accounts.find(&id).expect("find");
    assert_eq!(found.external_id(), Some(id::truncate_id(&id)));
    assert_eq!(found.get("tier"), Some(&json!("gold")));

    account.try_update([("tier", "platinum")]).expect("update");
    assert_eq!(client.rows("Account")[0]["Acme__Tier__c"], json!("platinum"));
}

#[test]
fn finders_filter_rows() {
    let (_, accounts, _) = crm();
    for (name, tier) in [("Acme", "gold"), ("Globex", "gold"), ("Initech", "silver")] {
        accounts.try_create([("name", name), ("tier", tier)]).expect("create");
    }

    assert_eq!(accounts.all().expect("all").len(), 3);
    assert_eq!(accounts.find_where([("tier", "gold")]).expect("where").len(), 2);
    assert!(accounts.exists([("name", "Initech")]).expect("exists"));
    assert!(!accounts.exists([("name", "Hooli")]).expect("exists"));
    let globex = accounts.find_by([("name", "Globex")]).expect("find_by").expect("row");
    assert_eq!(globex.get("tier"), Some(&json!("gold")));
}

#[test]
fn children_are_found_through_rows_written_with_foreign_keys() {
    let (client, accounts, contacts) = crm();
    let account = accounts.try_create([("name", "Acme")]).expect("create");
    let account_id = account.external_id().expect("id").to_string();

    client.insert(
        "Contact",
        json!({"LastName": "Doe", "AccountId": account_id}).as_object().cloned().expect("object"),
    );
    client.insert(
        "Contact",
        json!({"LastName": "Roe", "AccountId": "001000000000999"}).as_object().cloned().expect("object"),
    );

    let children = account.children("contacts").expect("contacts").all().expect("all");
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].get("last_name"), Some(&json!("Doe")));

    let parent = children[0].parent("account").expect("resolve").expect("account");
    assert_eq!(parent.get("name"), Some(&json!("Acme")));
    assert_eq!(contacts.all().expect("all").len(), 2);
}
