use crate::{json_len, stub_request};
use base_request::{data::DesignCourse, Method};
use stub_server::collections_test;

/// Count data < 5: there are fewer than 5 design courses.
#[collections_test("fixtures/db.json", crate::suite_stub)]
fn test_design_course_count() {
    let courses = stub_request()
        .get_collection("design_course")
        .unwrap()
        .json()
        .unwrap();

    assert!(json_len(&courses) < 5);
}

/// Check delete data: the collection route answers with an empty body.
#[collections_test("fixtures/db.json", crate::suite_stub)]
fn test_delete() {
    let response = stub_request().delete_collection("design_course").unwrap();

    assert_eq!(json_len(&response.json().unwrap()), 0);
}

/// Check this course: "Motion design" is offered.
#[collections_test("fixtures/db.json", crate::suite_stub)]
fn test_similar_courses() {
    let courses: Vec<DesignCourse> = serde_json::from_value(
        stub_request()
            .get_collection("design_course")
            .unwrap()
            .json()
            .unwrap(),
    )
    .unwrap();

    let found = courses.iter().any(|course| course.title == "Motion design");

    assert!(found, "Not found in the response");
}

/// Get info about a given course.
#[collections_test("fixtures/db.json", crate::suite_stub)]
fn test_get_design_course_info() {
    let base_request = stub_request();

    for course_id in 1..=3 {
        let response = base_request
            .request(
                Method::GET,
                &base_request.url_for("design_course", course_id),
                None,
                true,
            )
            .unwrap();
        let course = response.json().unwrap();

        assert_eq!(response.status_code, 200);

        println!("Course #{}: {}", course_id, course);
    }
}
