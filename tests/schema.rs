//! Tests for validation rules: conversion, presence, constraints and composition.
//!
mod common;
use common::*;
use formwright::prelude::*;
use serde_json::json;
use std::result::Result;

#[cfg(test)]
mod schema_tests {
    use super::*;

    fn check(rule: &Rule, value: serde_json::Value) -> Result<serde_json::Value, ValidationError> {
        rule.validate(&value, &ValidationOptions::default())
    }

    #[test]
    fn test_strings_are_trimmed_and_empty_strings_rejected() {
        let rule = Rule::string().label("Name");
        assert_eq!(check(&rule, json!("  Ada  ")).unwrap(), json!("Ada"));

        let err = check(&rule, json!("   ")).unwrap_err();
        assert_eq!(err.details.len(), 1);
        assert_eq!(err.details[0].kind, "string.empty");
        assert_eq!(err.details[0].message, "\"Name\" is not allowed to be empty");
    }

    #[test]
    fn test_allowed_empty_string_passes() {
        let rule = Rule::string().allow(json!(""));
        assert_eq!(check(&rule, json!("")).unwrap(), json!(""));
    }

    #[test]
    fn test_numbers_are_converted_from_text() {
        let rule = Rule::number().label("Age");
        assert_eq!(check(&rule, json!("42")).unwrap(), json!(42));
        assert_eq!(check(&rule, json!("2.5")).unwrap(), json!(2.5));

        let err = check(&rule, json!("forty")).unwrap_err();
        assert_eq!(err.details[0].message, "\"Age\" must be a number");
        assert_eq!(err.details[0].kind, "number.base");
    }

    #[test]
    fn test_number_bounds_and_integer() {
        let rule = Rule::number().integer().min(1.0).max(31.0).label("Day");
        assert!(check(&rule, json!(15)).is_ok());

        let err = check(&rule, json!("32")).unwrap_err();
        assert_eq!(err.details[0].message, "\"Day\" must be less than or equal to 31");

        let err = check(&rule, json!("1.5")).unwrap_err();
        assert_eq!(err.details[0].kind, "number.integer");
    }

    #[test]
    fn test_string_length_limits() {
        let rule = Rule::string().min(2.0).max(4.0).label("Code");
        assert!(check(&rule, json!("abc")).is_ok());
        assert_eq!(check(&rule, json!("a")).unwrap_err().details[0].kind, "string.min");
        assert_eq!(check(&rule, json!("abcde")).unwrap_err().details[0].kind, "string.max");
    }

    #[test]
    fn test_email_format() {
        let rule = Rule::string().email().label("Email");
        assert!(check(&rule, json!("ada@example.com")).is_ok());
        let err = check(&rule, json!("not-an-email")).unwrap_err();
        assert_eq!(err.details[0].message, "\"Email\" must be a valid email");
    }

    #[test]
    fn test_booleans_accept_text() {
        let rule = Rule::boolean();
        assert_eq!(check(&rule, json!("true")).unwrap(), json!(true));
        assert_eq!(check(&rule, json!(false)).unwrap(), json!(false));
        assert!(check(&rule, json!("maybe")).is_err());
    }

    #[test]
    fn test_dates_are_canonicalised() {
        assert_eq!(check(&Rule::date(), json!("05/03/2024")).unwrap(), json!("2024-03-05"));
        assert_eq!(check(&Rule::date(), json!("2024-03-05")).unwrap(), json!("2024-03-05"));
        assert_eq!(
            check(&Rule::datetime(), json!("2024-03-05T14:30")).unwrap(),
            json!("2024-03-05T14:30:00")
        );

        let err = check(&Rule::date().label("Start"), json!("2024-11-31")).unwrap_err();
        assert_eq!(err.details[0].message, "\"Start\" must be a valid date");
    }

    #[test]
    fn test_valid_values_restrict_the_result() {
        let rule = Rule::string().valid(vec![json!("A"), json!("B")]).label("Letter");
        assert!(check(&rule, json!("A")).is_ok());
        let err = check(&rule, json!("D")).unwrap_err();
        assert_eq!(err.details[0].kind, "any.only");
        assert_eq!(err.details[0].message, "\"Letter\" must be one of [A, B]");
    }

    #[test]
    fn test_object_collects_every_failure() {
        let rule = Rule::object(
            SchemaKeys::new()
                .with("name", Rule::string().required())
                .with("age", Rule::number().required()),
        );
        let err = check(&rule, json!({ "age": "old", "extra": 1 })).unwrap_err();

        let kinds: Vec<&str> = err.details.iter().map(|d| d.kind.as_str()).collect();
        assert_eq!(kinds, vec!["any.required", "number.base", "object.unknown"]);
        assert_eq!(err.details[0].path, vec!["name".to_string()]);
        assert_eq!(err.details[0].message, "\"name\" is required");
        assert_eq!(err.details[2].message, "\"extra\" is not allowed");
    }

    #[test]
    fn test_unknown_keys_allowed_by_options() {
        let rule = Rule::object(SchemaKeys::new().with("name", Rule::string()));
        let options = ValidationOptions { allow_unknown: true };
        let value = rule
            .validate(&json!({ "name": "Ada", "extra": 1 }), &options)
            .expect("unknown keys should pass");
        assert_eq!(value, json!({ "name": "Ada", "extra": 1 }));
    }

    #[test]
    fn test_nested_paths() {
        let rule = Rule::object(SchemaKeys::new().with(
            "applicant",
            Rule::object(SchemaKeys::new().with("age", Rule::number().required())).required(),
        ));
        let err = check(&rule, json!({ "applicant": { "age": "x" } })).unwrap_err();
        assert_eq!(err.details[0].dotted_path(), "applicant.age");
    }

    #[test]
    fn test_alternatives_take_scalar_or_array() {
        let choice = Rule::string().valid(vec![json!("A"), json!("B"), json!("C")]);
        let rule = Rule::alternatives(vec![choice.clone(), Rule::array(choice)]).label("Letters");

        assert_eq!(check(&rule, json!("A")).unwrap(), json!("A"));
        assert_eq!(check(&rule, json!(["A", "B"])).unwrap(), json!(["A", "B"]));

        let err = check(&rule, json!("D")).unwrap_err();
        assert_eq!(err.details.len(), 1);
        assert_eq!(err.details[0].kind, "any.only");

        let err = check(&rule, json!(["A", "D"])).unwrap_err();
        assert_eq!(err.details[0].path, vec!["1".to_string()]);
    }

    #[test]
    fn test_when_switches_on_sibling_value() {
        let rule = Rule::object(
            SchemaKeys::new().with("contact", Rule::string()).with(
                "email",
                Rule::when(
                    "contact",
                    json!("email"),
                    Rule::string().required(),
                    Rule::string().optional().allow(json!("")),
                ),
            ),
        );

        assert!(check(&rule, json!({ "contact": "email" })).is_err());
        assert!(check(&rule, json!({ "contact": "email", "email": "a@b.com" })).is_ok());
        assert!(check(&rule, json!({ "contact": "phone", "email": "" })).is_ok());
        assert!(check(&rule, json!({ "contact": "phone" })).is_ok());
    }

    #[test]
    fn test_when_matches_inside_array_sibling() {
        let rule = Rule::object(
            SchemaKeys::new().with("c", Rule::array(Rule::string())).with(
                "why",
                Rule::when(
                    "c",
                    json!("A"),
                    Rule::string().required(),
                    Rule::string().optional().allow(json!("")),
                ),
            ),
        );

        let err = check(&rule, json!({ "c": ["B", "A"], "why": "" })).unwrap_err();
        assert_eq!(err.details[0].kind, "string.empty");
        assert!(check(&rule, json!({ "c": ["B", "A"], "why": "Closer to work" })).is_ok());
        assert!(check(&rule, json!({ "c": ["B"], "why": "" })).is_ok());
        assert!(check(&rule, json!({ "c": [] })).is_ok());
    }

    #[test]
    fn test_concat_and_append() {
        let base = Rule::object(SchemaKeys::new().with("a", Rule::string()));
        let other = Rule::object(SchemaKeys::new().with("b", Rule::number()));
        let combined = base.concat(&other).append("c", Rule::boolean());

        let names: Vec<&str> = combined.keys().expect("object rule").names().collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_null_allowed_when_listed() {
        let rule = Rule::date().allow(serde_json::Value::Null);
        assert_eq!(check(&rule, serde_json::Value::Null).unwrap(), serde_json::Value::Null);
        assert!(check(&Rule::date(), serde_json::Value::Null).is_err());
    }

    #[test]
    fn test_state_maps_validate_as_objects() {
        let rule = Rule::object(SchemaKeys::new().with("name", Rule::string().required())).required();
        let state = map(json!({ "name": "Ada" }));
        assert!(rule.validate(&serde_json::Value::Object(state), &ValidationOptions::default()).is_ok());
    }
}
