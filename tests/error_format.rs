use scrub::prelude::*;
use serde_json::json;

fn failing_outcome() -> ObjectError {
    let spec = scrub::object()
        .field(
            "person",
            scrub::nested(
                scrub::object()
                    .field("first", scrub::field(types::string()).required())
                    .field("last", scrub::field(types::string()).required()),
            ),
        )
        .field(
            "emails",
            scrub::values(scrub::object().field(RAW_VALUE, scrub::field(types::boolean()))),
        )
        .field(
            "rows",
            scrub::field(types::object())
                .ensure_array()
                .object_array(scrub::object().field("n", scrub::field(types::number()))),
        )
        .field(
            "ids",
            scrub::field(types::number())
                .delimiter(",")
                .parser(parsers::string_to_int()),
        );

    spec.validate_value(&json!({
        "person": {"first": "Dave"},
        "emails": {"test@test.com": "asdf"},
        "rows": [{"n": 1}, {"n": "two"}],
        "ids": "1,x",
    }))
    .unwrap()
    .error
    .unwrap()
}

#[test]
fn leaves_carry_full_paths() {
    let err = failing_outcome();
    let leaves: Vec<String> = err.leaves().iter().map(|l| l.to_string()).collect();
    assert_eq!(
        leaves,
        vec![
            "person.last: A value is required",
            "emails[\"test@test.com\"].rawValue: asdf is the wrong type",
            "rows[1].n: two is the wrong type",
            "ids: The value NaN is of the wrong type",
        ]
    );
    assert_eq!(
        err.leaves()[1].path,
        vec![
            PathSegment::Field("emails".into()),
            PathSegment::Key("test@test.com".into()),
            PathSegment::Field("rawValue".into()),
        ]
    );
}

#[test]
fn codes() {
    let err = failing_outcome();
    let codes: Vec<&str> = err.errors().iter().map(|f| f.error.code()).collect();
    assert_eq!(
        codes,
        vec!["object_validation", "map_validation", "nested_validation", "wrong_type"]
    );
    assert!(err.errors().iter().take(3).all(|f| f.error.is_nested()));
    assert_eq!(
        err.get("ids").unwrap().bad_value(),
        Some(&BadValue::NotANumber)
    );
}

#[test]
fn flatten_error() {
    let err = failing_outcome();
    let flat = scrub::format::flatten_error(&err);
    assert_eq!(flat.field_errors.len(), 4);
    assert_eq!(flat.field_errors["person"], vec!["A value is required"]);
    assert_eq!(flat.field_errors["rows"], vec!["two is the wrong type"]);
}

#[test]
fn treeify_error() {
    let err = failing_outcome();
    let tree = scrub::format::treeify_error(&err);
    assert_eq!(
        tree.properties["person"].properties["last"].errors,
        vec!["A value is required"]
    );
    assert!(tree.properties["emails"].properties["test@test.com"]
        .properties
        .contains_key("rawValue"));

    let rows = &tree.properties["rows"];
    assert_eq!(rows.items.len(), 2);
    assert!(rows.items[0].is_none());
    assert_eq!(
        rows.items[1].as_ref().unwrap().properties["n"].errors,
        vec!["two is the wrong type"]
    );
}

#[test]
fn prettify_error() {
    let err = failing_outcome();
    let pretty = scrub::format::prettify_error(&err);
    assert!(pretty.contains("✖ A value is required\n  → at .person.last"));
    assert!(pretty.contains("  → at .emails[\"test@test.com\"].rawValue, received asdf"));
    assert!(pretty.contains("  → at .rows[1].n, received two"));
    assert!(pretty.contains("  → at .ids, received NaN"));
    assert_eq!(pretty.lines().count(), 8);
}

#[test]
fn failure_source_chain() {
    use std::error::Error;

    let err = failing_outcome();
    let first = &err.errors()[0];
    let source = first.source().unwrap();
    assert_eq!(
        source.to_string(),
        "first of 1 error: Error validating last: A value is required"
    );
}

#[test]
fn empty_error_display() {
    assert_eq!(ObjectError::new().to_string(), "Validation failed for fields");
    let err = ObjectError::single("x", FieldError::UnknownField);
    assert!(err.is_unknown_field());
    assert_eq!(
        err.to_string(),
        "first of 1 error: Error validating x: Field is not present in specification"
    );
}

#[test]
fn map_keys_are_quoted_in_paths() {
    let spec = scrub::object().field(
        "labels",
        scrub::values(scrub::object().field(RAW_VALUE, scrub::field(types::string()))),
    );
    let outcome = spec
        .validate_value(&json!({"labels": {"a\"]b": 1}}))
        .unwrap();
    let err = outcome.error.unwrap();
    assert_eq!(err.leaves()[0].path_string(), r#"labels["a\"]b"].rawValue"#);
    assert!(scrub::format::prettify_error(&err).contains(r#"at .labels["a\"]b"].rawValue"#));
}

#[cfg(feature = "serialize")]
#[test]
fn serialized_error_carries_codes() {
    let spec = scrub::object()
        .field("name", scrub::field(types::string()).required())
        .field("age", scrub::field(types::number()));
    let err = spec
        .validate_value(&json!({"age": "old"}))
        .unwrap()
        .error
        .unwrap();
    let value = serde_json::to_value(&err).unwrap();
    assert_eq!(value["failures"][0]["field"], "name");
    assert_eq!(value["failures"][0]["error"]["code"], "required_missing");
    assert_eq!(value["failures"][1]["error"]["code"], "wrong_type");
}
