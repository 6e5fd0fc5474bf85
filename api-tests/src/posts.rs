use crate::{json_len, stub_request};
use base_request::data::Post;
use stub_server::collections_test;

/// Posts length: there are 3 posts.
#[collections_test("fixtures/db.json", crate::suite_stub)]
fn test_posts_count() {
    let posts = stub_request().get_collection("posts").unwrap().json().unwrap();

    assert_eq!(json_len(&posts), 3);
}

/// Check this author: some post is written by "Lorem".
#[collections_test("fixtures/db.json", crate::suite_stub)]
fn test_similar_posts() {
    let posts: Vec<Post> = serde_json::from_value(
        stub_request().get_collection("posts").unwrap().json().unwrap(),
    )
    .unwrap();

    let found = posts.iter().any(|post| post.author == "Lorem");

    assert!(found, "Author 'Lorem' not found in the response");
}
