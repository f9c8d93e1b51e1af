use scrub::prelude::*;
use serde_json::json;

fn required(p: Predicate) -> Leaf {
    scrub::field(p).required().not_null()
}

fn person_spec() -> Spec {
    scrub::object().field(
        "person",
        scrub::nested(
            scrub::object().field(
                "name",
                scrub::nested(
                    scrub::object()
                        .field("first", required(types::string()))
                        .field("last", required(types::string())),
                ),
            ),
        ),
    )
}

fn with_emails(emails: FieldSpec) -> Spec {
    person_spec()
        .field("title", required(types::string()))
        .field("emailAddresses", emails)
}

#[test]
fn scalar_values() {
    let spec = with_emails(scrub::values(
        scrub::object().field(RAW_VALUE, scrub::field(types::boolean())),
    ));

    let ok = spec
        .validate_value(&json!({
            "emailAddresses": {"test@test.com": true},
            "person": {"name": {"first": "Dave", "last": "Finster"}},
            "title": "Something",
        }))
        .unwrap();
    assert!(ok.is_valid());
    assert_eq!(ok.get("emailAddresses"), Some(&json!({"test@test.com": true})));
    assert_eq!(ok.get("person").unwrap()["name"]["first"], "Dave");

    let bad = spec
        .validate_value(&json!({
            "emailAddresses": {"test@test.com": "asdf"},
            "person": {"name": {"first": "Dave", "last": "Finster"}},
            "title": "Something",
        }))
        .unwrap();
    let err = bad.error.unwrap();
    assert_eq!(err.len(), 1);
    assert_eq!(
        err.errors()[0].to_string(),
        "Error validating emailAddresses: first of 1 error: Error validating rawValue: asdf is the wrong type"
    );
    match err.get("emailAddresses") {
        Some(FieldError::MapValidation(map)) => {
            let key = map.get("test@test.com").unwrap();
            assert!(matches!(key.get(RAW_VALUE), Some(FieldError::WrongType { .. })));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn record_values() {
    let spec = with_emails(scrub::values(
        scrub::object().field("default", scrub::field(types::boolean())),
    ));

    let ok = spec
        .validate_value(&json!({
            "emailAddresses": {"test@test.com": {"default": true}},
            "person": {"name": {"first": "Dave", "last": "Finster"}},
            "title": "Something",
        }))
        .unwrap();
    assert_eq!(
        ok.get("emailAddresses"),
        Some(&json!({"test@test.com": {"default": true}}))
    );

    let bad = spec
        .validate_value(&json!({
            "emailAddresses": {"test@test.com": {"default": "asdf"}},
            "person": {"name": {"first": "Dave", "last": "Finster"}},
            "title": "Something",
        }))
        .unwrap();
    assert_eq!(
        bad.error.unwrap().errors()[0].to_string(),
        "Error validating emailAddresses: first of 1 error: Error validating default: asdf is the wrong type"
    );
}

#[test]
fn nested_maps() {
    let spec = with_emails(scrub::values(scrub::object().field(
        "default",
        scrub::values(scrub::object().field("booleanValue", scrub::field(types::boolean()))),
    )));

    let ok = spec
        .validate_value(&json!({
            "emailAddresses": {"test@test.com": {"default": {"veryDefaulty": {"booleanValue": true}}}},
            "person": {"name": {"first": "Dave", "last": "Finster"}},
            "title": "Something",
        }))
        .unwrap();
    assert!(ok.is_valid());
    assert_eq!(
        ok.get("emailAddresses").unwrap()["test@test.com"]["default"]["veryDefaulty"]
            ["booleanValue"],
        true
    );

    let bad = spec
        .validate_value(&json!({
            "emailAddresses": {"test@test.com": {"default": {"veryDefaulty": {"booleanValue": "wuiergnf"}}}},
            "person": {"name": {"first": "Dave", "last": "Finster"}},
            "title": "Something",
        }))
        .unwrap();
    assert_eq!(
        bad.error.unwrap().errors()[0].to_string(),
        "Error validating emailAddresses: first of 1 error: Error validating default: first of 1 error: Error validating booleanValue: wuiergnf is the wrong type"
    );
}

#[test]
fn every_failing_key_is_collected() {
    let spec = scrub::object().field(
        "scores",
        scrub::values(scrub::object().field(RAW_VALUE, required(types::number()))),
    );

    let outcome = spec
        .validate_value(&json!({"scores": {"a": 1, "b": "x", "c": null, "d": 4}}))
        .unwrap();
    let err = outcome.error.as_ref().unwrap();
    match err.get("scores") {
        Some(FieldError::MapValidation(map)) => {
            assert_eq!(map.len(), 2);
            assert!(matches!(
                map.get("b").unwrap().get(RAW_VALUE),
                Some(FieldError::WrongType { .. })
            ));
            assert!(matches!(
                map.get("c").unwrap().get(RAW_VALUE),
                Some(FieldError::NullNotAllowed)
            ));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    // passing keys survive
    assert_eq!(outcome.get("scores"), Some(&json!({"a": 1, "d": 4})));
}

#[test]
fn scalar_sees_other_declared_fields_as_absent() {
    let spec = scrub::object().field(
        "prefs",
        scrub::values(
            scrub::object()
                .field(RAW_VALUE, scrub::field(types::boolean()))
                .field("label", required(types::string())),
        ),
    );

    let outcome = spec
        .validate_value(&json!({"prefs": {"dark": true, "lang": {"rawValue": false, "label": "Language"}}}))
        .unwrap();
    let err = outcome.error.unwrap();
    match err.get("prefs") {
        Some(FieldError::MapValidation(map)) => {
            assert_eq!(map.len(), 1);
            assert!(matches!(
                map.get("dark").unwrap().get("label"),
                Some(FieldError::RequiredMissing)
            ));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn scalar_without_raw_value_rule() {
    let lenient = scrub::object().field(
        "m",
        scrub::values(scrub::object().field("x", scrub::field(types::number()))),
    );
    let outcome = lenient.validate_value(&json!({"m": {"k": 5}})).unwrap();
    assert!(outcome.is_valid());
    assert_eq!(outcome.get("m"), Some(&json!({})));

    let strict = scrub::object().field(
        "m",
        scrub::values(
            scrub::object()
                .field("x", scrub::field(types::number()))
                .fail_on_unknown_fields(),
        ),
    );
    let outcome = strict.validate_value(&json!({"m": {"k": 5}})).unwrap();
    assert_eq!(
        outcome.error.unwrap().errors()[0].to_string(),
        "Error validating m: first of 1 error: Error validating rawValue: Field is not present in specification"
    );
}

#[test]
fn map_field_presence_rules() {
    let spec = scrub::object()
        .field(
            "needed",
            scrub::values(scrub::object().field(RAW_VALUE, scrub::field(types::string())))
                .required(),
        )
        .field(
            "optional",
            scrub::values(scrub::object().field(RAW_VALUE, scrub::field(types::string()))),
        )
        .field(
            "shape",
            scrub::values(scrub::object().field(RAW_VALUE, scrub::field(types::string()))),
        );

    let outcome = spec.validate_value(&json!({"shape": [1, 2]})).unwrap();
    let err = outcome.error.as_ref().unwrap();
    assert!(matches!(err.get("needed"), Some(FieldError::RequiredMissing)));
    assert!(err.get("optional").is_none());
    assert!(outcome.get("optional").is_none());
    assert_eq!(
        err.get("shape").unwrap().to_string(),
        "Expected 1,2 to be an object"
    );
}
