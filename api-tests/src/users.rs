use crate::{delete_entity, get_entity, json_len, post_entity, put_entity, stub_request};
use base_request::{data::User, Method, Payload};
use serde_json::{json, Value};
use stub_server::collections_test;

fn user_list(body: &Value) -> Vec<User> {
    serde_json::from_value(body.clone()).unwrap()
}

/// Add new user: the updated user is stored in db.json.
#[collections_test("fixtures/db.json", crate::suite_stub)]
fn test_similar_name() {
    let user_info = get_entity(&stub_request(), "users", 2).unwrap();

    assert_eq!(user_info["name"], "sana");
}

/// Delete user: the removed user is no longer in db.json.
#[collections_test("fixtures/db.json", crate::suite_stub)]
fn test_deleted_data() {
    let users = stub_request().get_collection("users").unwrap().json().unwrap();
    let user_names: Vec<String> = user_list(&users).into_iter().map(|user| user.name).collect();

    assert!(!user_names.contains(&String::from("Amelie")));
}

/// Check 200 status for users with a given id.
#[collections_test("fixtures/db.json", crate::suite_stub)]
fn test_check_status() {
    let base_request = stub_request();

    for user_id in 1..=3 {
        let response = base_request
            .request(Method::GET, &base_request.url_for("users", user_id), None, true)
            .unwrap();

        assert_eq!(response.status_code, 200, "user #{}", user_id);
    }
}

/// Get info about a given user.
#[collections_test("fixtures/db.json", crate::suite_stub)]
fn test_get_user_info() {
    let base_request = stub_request();

    for user_id in 1..=3 {
        let response = base_request
            .request(Method::GET, &base_request.url_for("users", user_id), None, true)
            .unwrap();
        let user = response.json().unwrap();

        assert_eq!(response.status_code, 200);
        println!("User #{}: {}", user_id, user);
    }
}

/// Having photos: users carry no profile photo.
#[collections_test("fixtures/db.json", crate::suite_stub)]
fn test_photo_profile() {
    let users = stub_request().get_collection("users").unwrap().json().unwrap();

    for user in users.as_array().unwrap() {
        assert!(
            user.get("profile_photo").is_none(),
            "Profile photo found in user data"
        );
    }
}

/// Users count is greater than 0.
#[collections_test("fixtures/db.json", crate::suite_stub)]
fn test_user_value() {
    let users = stub_request().get_collection("users").unwrap().json().unwrap();

    assert!(json_len(&users) > 0);
}

/// Delete all data in users: the collection route answers with an empty body.
#[collections_test("fixtures/db.json", crate::suite_stub)]
fn test_user_delete() {
    let response = stub_request().delete_collection("users").unwrap();

    assert_eq!(json_len(&response.json().unwrap()), 0);
}

/// No user object has a "Mark" key.
#[collections_test("fixtures/db.json", crate::suite_stub)]
fn test_check_user_name() {
    let users = stub_request().get_collection("users").unwrap().json().unwrap();

    for user in users.as_array().unwrap() {
        assert!(user.get("Mark").is_none(), "Mark found as a key in user data");
    }
}

#[collections_test("fixtures/db.json", crate::suite_stub)]
fn test_create_update_and_delete_user() {
    let base_request = stub_request();

    let created = post_entity(
        &base_request,
        "users",
        json!({"id": 5, "name": "Amelie", "age": 10}),
    )
    .unwrap();
    assert_eq!(created.status_code, 201);

    let updated = put_entity(
        &base_request,
        "users",
        5,
        Payload::form(vec![("name", "sana"), ("age", "12")]),
    )
    .unwrap();
    assert_eq!(updated.label(), "Updated");
    assert!(updated.is_success());
    assert_eq!(updated.body.as_ref().unwrap()["name"], "sana");

    let deleted = delete_entity(&base_request, "users", 5).unwrap();
    assert_eq!(deleted.label(), "Deleted");

    let gone = base_request.get("users", 5, true).unwrap();
    assert_eq!(gone, json!({}));

    let users = base_request.get_collection("users").unwrap().json().unwrap();
    assert_eq!(user_list(&users).len(), 3);
}
