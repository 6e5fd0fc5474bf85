use crate::stub_request;
use base_request::Method;
use stub_server::collections_test;

/// Get studio name for a given studio.
#[collections_test("fixtures/db.json", crate::suite_stub)]
fn test_get_studio() {
    let base_request = stub_request();

    for studio_id in 1..=3 {
        let response = base_request
            .request(Method::GET, &base_request.url_for("studio", studio_id), None, true)
            .unwrap();
        let studio = response.json().unwrap();
        let studio_name = studio["name"].as_str().unwrap();

        assert_eq!(response.status_code, 200);

        println!("Studio #{}: {}", studio_id, studio_name);
    }
}
