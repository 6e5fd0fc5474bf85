use crate::stub_request;
use base_request::data::Comment;
use stub_server::collections_test;

fn comments() -> Vec<Comment> {
    serde_json::from_value(
        stub_request()
            .get_collection("comments")
            .unwrap()
            .json()
            .unwrap(),
    )
    .unwrap()
}

/// Having this word: no comment is titled "Application".
#[collections_test("fixtures/db.json", crate::suite_stub)]
fn test_no_application_comment() {
    let com_info: Vec<Option<String>> = comments().into_iter().map(|comm| comm.title).collect();

    assert!(!com_info.contains(&Some(String::from("Application"))));
}

/// Get user Hyun: no comment object has a "Hyun" key.
#[collections_test("fixtures/db.json", crate::suite_stub)]
fn test_no_hyun_key_in_comments() {
    for comment in comments() {
        assert!(
            !comment.extra.contains_key("Hyun"),
            "Hyun found as a key in comment data"
        );
    }
}
