//! Tests for viewing and submitting pages through a state store.
//!
mod common;
use common::*;
use formwright::prelude::*;
use serde_json::json;

/// A store whose backend is always down.
struct OfflineStore;

impl StateStore for OfflineStore {
    fn read(&self) -> std::result::Result<State, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    fn merge(&self, _: State) -> std::result::Result<State, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

#[cfg(test)]
mod submit_tests {
    use super::*;

    #[test]
    fn test_valid_submission_is_stored_under_its_section() {
        let model = compile(household_definition());
        let store = MemoryStateStore::default();

        let outcome = model
            .submit("/age", &map(json!({ "age": "40" })), &store)
            .expect("submission succeeds");

        match outcome {
            Submission::Proceed { next_path, state } => {
                assert_eq!(next_path, "/address");
                assert_eq!(state, map(json!({ "applicant": { "age": 40 } })));
            }
            Submission::Rerender(view) => panic!("unexpected errors: {:?}", view.errors),
        }
        assert_eq!(store.read().expect("store readable"), map(json!({ "applicant": { "age": 40 } })));
    }

    #[test]
    fn test_submission_merges_with_earlier_answers() {
        let model = compile(household_definition());
        let store = MemoryStateStore::new(map(json!({ "applicant": { "fullName": "Tom" } })));

        let outcome = model
            .submit("/age", &map(json!({ "age": "9" })), &store)
            .expect("submission succeeds");

        assert!(outcome.is_proceed());
        assert_eq!(
            store.read().expect("store readable"),
            map(json!({ "applicant": { "fullName": "Tom", "age": 9 } }))
        );
        assert_eq!(
            outcome,
            Submission::Proceed {
                next_path: "/guardian".to_string(),
                state: map(json!({ "applicant": { "fullName": "Tom", "age": 9 } })),
            }
        );
    }

    #[test]
    fn test_invalid_submission_rerenders_without_storing() {
        let model = compile(household_definition());
        let store = MemoryStateStore::default();

        let outcome = model
            .submit("/age", &map(json!({ "age": "old" })), &store)
            .expect("submission handled");

        let Submission::Rerender(view) = outcome else {
            panic!("expected the page to be shown again");
        };
        let errors = view.errors.expect("errors present");
        assert_eq!(errors.title_text, "Fix the following errors");
        assert_eq!(errors.error_list.len(), 1);
        assert_eq!(errors.error_list[0].name, "age");
        assert_eq!(errors.error_list[0].href, "#age");
        assert_eq!(errors.error_list[0].text, "\"Age\" must be a number");

        let field = &view.components[1].model;
        assert_eq!(field.value, Some(json!("old")));
        assert_eq!(
            field.error_message.as_ref().map(|m| m.text.as_str()),
            Some("\"Age\" must be a number")
        );
        assert!(store.read().expect("store readable").is_empty());
    }

    #[test]
    fn test_missing_answer_is_required() {
        let model = compile(household_definition());
        let store = MemoryStateStore::default();

        let outcome = model.submit("/name", &FormData::new(), &store).expect("submission handled");
        let Submission::Rerender(view) = outcome else {
            panic!("expected the page to be shown again");
        };
        let errors = view.errors.expect("errors present");
        assert_eq!(errors.error_list[0].text, "\"Full name\" is required");
    }

    #[test]
    fn test_unsectioned_page_writes_top_level_keys() {
        let model = single_component_form(json!({ "type": "TextField", "name": "colour", "title": "Colour" }), json!([]));
        let store = MemoryStateStore::default();

        let outcome = model
            .submit("/question", &map(json!({ "colour": "  Blue " })), &store)
            .expect("submission succeeds");

        assert_eq!(
            outcome,
            Submission::Proceed {
                next_path: "/summary".to_string(),
                state: map(json!({ "colour": "Blue" })),
            }
        );
    }

    #[test]
    fn test_unknown_page() {
        let model = compile(household_definition());
        let store = MemoryStateStore::default();

        let err = model.submit("/nowhere", &FormData::new(), &store).unwrap_err();
        assert_eq!(err, SubmitError::UnknownPage("/nowhere".to_string()));
        assert!(matches!(model.view("/nowhere", &store), Err(SubmitError::UnknownPage(_))));
    }

    #[test]
    fn test_store_failures_are_propagated() {
        let model = compile(household_definition());

        let err = model.submit("/age", &map(json!({ "age": "40" })), &OfflineStore).unwrap_err();
        assert!(matches!(err, SubmitError::Store(StoreError::Unavailable(_))));
        assert!(matches!(model.view("/age", &OfflineStore), Err(SubmitError::Store(_))));
    }

    #[test]
    fn test_validation_failure_does_not_touch_the_store() {
        let model = compile(household_definition());
        let outcome = model
            .submit("/age", &map(json!({ "age": "old" })), &OfflineStore)
            .expect("validation happens before the store is used");
        assert!(!outcome.is_proceed());
    }
}

#[cfg(test)]
mod view_tests {
    use super::*;

    #[test]
    fn test_view_prefills_from_state() {
        let model = compile(household_definition());
        let store = MemoryStateStore::new(household_state());

        let view = model.view("/name", &store).expect("view renders");
        assert_eq!(view.components[0].model.value, Some(json!("Ada Lovelace")));
        assert!(view.errors.is_none());

        let view = model.view("/age", &store).expect("view renders");
        assert_eq!(view.components[1].model.value, Some(json!("36")));
    }

    #[test]
    fn test_single_field_becomes_the_page_heading() {
        let model = compile(household_definition());
        let view = model.view("/name", &MemoryStateStore::default()).expect("view renders");

        assert!(!view.show_title);
        assert_eq!(view.page_title, "Full name");
        assert_eq!(view.section_title.as_deref(), Some("About you"));

        let label = view.components[0].model.label.as_ref().expect("label present");
        assert!(label.is_page_heading);
        assert_eq!(label.classes.as_deref(), Some("govuk-label--xl"));
        assert_eq!(
            label.html.as_deref(),
            Some("<span class=\"govuk-caption-xl\">About you</span> Full name")
        );
    }

    #[test]
    fn test_heading_not_promoted_after_content() {
        let model = compile(household_definition());
        let view = model.view("/age", &MemoryStateStore::default()).expect("view renders");

        assert!(view.show_title);
        assert_eq!(view.page_title, "Your age");
        assert!(!view.components[0].is_form_component);
    }

    #[test]
    fn test_view_model_serialises_for_templates() {
        let model = compile(household_definition());
        let view = model.view("/name", &MemoryStateStore::default()).expect("view renders");
        let json = serde_json::to_value(&view).expect("view serialises");

        assert_eq!(json["pageTitle"], json!("Full name"));
        assert_eq!(json["showTitle"], json!(false));
        assert_eq!(json["components"][0]["type"], json!("TextField"));
        assert_eq!(json["components"][0]["model"]["label"]["isPageHeading"], json!(true));
        assert!(json.get("errors").is_none());
    }
}
