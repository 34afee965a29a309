//! Tests for the component families: schemas, state conversion, display and view models.
//!
mod common;
use common::*;
use formwright::prelude::*;
use serde_json::{Value, json};

/// The only form component on the single-page test form.
fn only_field(model: &Model) -> &dyn Component {
    model
        .page("/question")
        .and_then(|page| page.components().form_items().next())
        .expect("test form should have one form component")
}

fn page(model: &Model) -> &Page {
    model.page("/question").expect("test form should have /question")
}

#[cfg(test)]
mod text_field_tests {
    use super::*;

    #[test]
    fn test_text_round_trip() {
        let model = single_component_form(json!({ "type": "TextField", "name": "name", "title": "Name" }), json!([]));
        let field = only_field(&model);
        let state = map(json!({ "name": "Ada" }));

        let form_data = field.form_data_from_state(&state);
        assert_eq!(form_data.get("name"), Some(&json!("Ada")));
        assert_eq!(field.state_from_valid_form(&form_data), state);
    }

    #[test]
    fn test_number_round_trip_keeps_integers() {
        let model = single_component_form(json!({ "type": "NumberField", "name": "age", "title": "Age" }), json!([]));
        let field = only_field(&model);
        let state = map(json!({ "age": 42 }));

        let form_data = field.form_data_from_state(&state);
        assert_eq!(form_data.get("age"), Some(&json!("42")));
        assert_eq!(field.state_from_valid_form(&form_data), state);
    }

    #[test]
    fn test_required_text_rejects_blank() {
        let model = single_component_form(json!({ "type": "TextField", "name": "name", "title": "Name" }), json!([]));
        let errors = page(&model).validate_form(&map(json!({ "name": "  " }))).unwrap_err();

        assert_eq!(errors.title_text, "Fix the following errors");
        assert_eq!(errors.error_list.len(), 1);
        assert_eq!(errors.error_list[0].href, "#name");
        assert_eq!(errors.error_list[0].text, "\"Name\" is not allowed to be empty");
    }

    #[test]
    fn test_optional_text_accepts_blank_and_stores_null() {
        let model = single_component_form(
            json!({ "type": "TextField", "name": "nickname", "title": "Nickname", "options": { "required": false } }),
            json!([]),
        );
        let page = page(&model);
        let form_data = page.validate_form(&map(json!({ "nickname": "" }))).expect("blank is allowed");
        let state = page.state_from_valid_form(&form_data);

        assert_eq!(state.get("nickname"), Some(&Value::Null));
        assert!(page.validate_state(&state).is_ok());
    }

    #[test]
    fn test_schema_options_apply() {
        let model = single_component_form(
            json!({ "type": "TextField", "name": "code", "title": "Code", "schema": { "max": 3 } }),
            json!([]),
        );
        let errors = page(&model).validate_form(&map(json!({ "code": "ABCD" }))).unwrap_err();
        assert_eq!(errors.error_list[0].text, "\"Code\" length must be less than or equal to 3 characters long");
    }

    #[test]
    fn test_email_field_enforces_format() {
        let model = single_component_form(
            json!({ "type": "EmailAddressField", "name": "email", "title": "Email" }),
            json!([]),
        );
        assert!(page(&model).validate_form(&map(json!({ "email": "ada@example.com" }))).is_ok());
        assert!(page(&model).validate_form(&map(json!({ "email": "ada" }))).is_err());
    }

    #[test]
    fn test_view_model_shows_value_and_error() {
        let model = single_component_form(
            json!({ "type": "TelephoneNumberField", "name": "phone", "title": "Phone", "hint": "Include the area code" }),
            json!([]),
        );
        let form_data = map(json!({ "phone": "" }));
        let errors = page(&model).validate_form(&form_data).unwrap_err();
        let view = only_field(&model).view_model(&form_data, Some(&errors));

        assert_eq!(view.name.as_deref(), Some("phone"));
        assert_eq!(view.input_type.as_deref(), Some("tel"));
        assert_eq!(view.hint.as_ref().map(|h| h.html.as_str()), Some("Include the area code"));
        assert!(view.error_message.is_some());
    }
}

#[cfg(test)]
mod date_tests {
    use super::*;

    #[test]
    fn test_date_field_round_trip_and_display() {
        let model = single_component_form(json!({ "type": "DateField", "name": "start", "title": "Start" }), json!([]));
        let field = only_field(&model);
        let state = map(json!({ "start": "2024-03-05" }));

        assert_eq!(field.state_from_valid_form(&field.form_data_from_state(&state)), state);
        assert_eq!(field.display_string(&state), "5 March 2024");
    }

    #[test]
    fn test_datetime_field_round_trip() {
        let model = single_component_form(json!({ "type": "DateTimeField", "name": "at", "title": "At" }), json!([]));
        let field = only_field(&model);
        let state = map(json!({ "at": "2024-03-05T14:30:00" }));

        let form_data = field.form_data_from_state(&state);
        assert_eq!(form_data.get("at"), Some(&json!("2024-03-05T14:30")));
        assert_eq!(field.state_from_valid_form(&form_data), state);
        assert_eq!(field.display_string(&state), "5 March 2024 14:30");
    }

    #[test]
    fn test_date_parts_valid_date() {
        let model = single_component_form(json!({ "type": "DatePartsField", "name": "dob", "title": "Date of birth" }), json!([]));
        let page = page(&model);
        let payload = map(json!({ "dob__day": "5", "dob__month": "3", "dob__year": "2024" }));

        let form_data = page.validate_form(&payload).expect("parts are valid");
        let state = page.state_from_valid_form(&form_data);
        assert_eq!(state.get("dob"), Some(&json!("2024-03-05")));
        assert!(page.validate_state(&state).is_ok());
        assert_eq!(only_field(&model).display_string(&state), "5 March 2024");
    }

    #[test]
    fn test_date_parts_reject_impossible_date() {
        let model = single_component_form(json!({ "type": "DatePartsField", "name": "dob", "title": "Date of birth" }), json!([]));
        let page = page(&model);
        let payload = map(json!({ "dob__day": "31", "dob__month": "11", "dob__year": "2024" }));

        let form_data = page.validate_form(&payload).expect("each part is in range");
        let state = page.state_from_valid_form(&form_data);
        assert_eq!(state.get("dob"), Some(&json!("2024-11-31")));
        assert!(page.validate_state(&state).is_err());
    }

    #[test]
    fn test_optional_date_parts_partly_filled_in() {
        let model = single_component_form(
            json!({ "type": "DatePartsField", "name": "dob", "title": "Date of birth", "options": { "required": false } }),
            json!([]),
        );
        let page = page(&model);

        let blank = map(json!({ "dob__day": "", "dob__month": "", "dob__year": "" }));
        let state = page.state_from_valid_form(&page.validate_form(&blank).expect("blank parts are allowed"));
        assert_eq!(state.get("dob"), Some(&Value::Null));
        assert!(page.validate_state(&state).is_ok());

        let partial = map(json!({ "dob__day": "5", "dob__month": "", "dob__year": "" }));
        let state = page.state_from_valid_form(&page.validate_form(&partial).expect("each part is allowed"));
        assert_eq!(state.get("dob"), Some(&json!("--5")));
        let errors = page.validate_state(&state).unwrap_err();
        assert_eq!(errors.error_list[0].text, "\"Date of birth\" must be a valid date");

        let store = MemoryStateStore::default();
        assert!(!page.submit(&partial, &store).expect("store is available").is_proceed());
        assert!(store.read().expect("store readable").is_empty());
    }

    #[test]
    fn test_date_parts_out_of_range_part() {
        let model = single_component_form(json!({ "type": "DatePartsField", "name": "dob", "title": "Date of birth" }), json!([]));
        let payload = map(json!({ "dob__day": "5", "dob__month": "13", "dob__year": "2024" }));
        let errors = page(&model).validate_form(&payload).unwrap_err();

        assert_eq!(errors.error_list.len(), 1);
        assert_eq!(errors.error_list[0].name, "dob__month");
        assert_eq!(errors.error_list[0].text, "\"Date of birth month\" must be less than or equal to 12");
    }

    #[test]
    fn test_date_parts_round_trip() {
        let model = single_component_form(
            json!({ "type": "DateTimePartsField", "name": "at", "title": "Appointment" }),
            json!([]),
        );
        let field = only_field(&model);
        let state = map(json!({ "at": "2024-03-05T09:05:00" }));

        let form_data = field.form_data_from_state(&state);
        assert_eq!(form_data.get("at__day"), Some(&json!("5")));
        assert_eq!(form_data.get("at__minute"), Some(&json!("5")));
        assert_eq!(field.state_from_valid_form(&form_data), state);
    }

    #[test]
    fn test_date_parts_view_model_lifts_part_error() {
        let model = single_component_form(json!({ "type": "DatePartsField", "name": "dob", "title": "Date of birth" }), json!([]));
        let payload = map(json!({ "dob__day": "40", "dob__month": "3", "dob__year": "2024" }));
        let errors = page(&model).validate_form(&payload).unwrap_err();
        let view = only_field(&model).view_model(&payload, Some(&errors));

        assert_eq!(view.children.len(), 3);
        assert!(view.error_message.is_some());
        assert!(view.children[0].model.classes.as_deref().unwrap_or_default().contains("govuk-input--error"));
        assert!(view.fieldset.is_some());
        assert!(view.label.is_none());
    }
}

#[cfg(test)]
mod list_field_tests {
    use super::*;

    fn checkboxes() -> Model {
        single_component_form(
            json!({ "type": "CheckboxesField", "name": "letters", "title": "Letters", "options": { "list": "letters" } }),
            letters_list(),
        )
    }

    #[test]
    fn test_checkboxes_accept_scalar_or_array() {
        let model = checkboxes();
        let page = page(&model);
        assert!(page.validate_form(&map(json!({ "letters": "A" }))).is_ok());
        assert!(page.validate_form(&map(json!({ "letters": ["A", "B"] }))).is_ok());
        assert!(page.validate_form(&map(json!({ "letters": "D" }))).is_err());
    }

    #[test]
    fn test_checkboxes_store_submitted_shape_and_display_texts() {
        let model = checkboxes();
        let field = only_field(&model);

        let single = field.state_from_valid_form(&map(json!({ "letters": "A" })));
        assert_eq!(single.get("letters"), Some(&json!("A")));

        let many = field.state_from_valid_form(&map(json!({ "letters": ["A", "C"] })));
        assert_eq!(many.get("letters"), Some(&json!(["A", "C"])));
        assert_eq!(field.display_string(&many), "Alpha, Charlie");
        assert_eq!(field.state_from_valid_form(&field.form_data_from_state(&many)), many);
    }

    #[test]
    fn test_radios_restricted_to_list_values() {
        let model = single_component_form(
            json!({ "type": "RadiosField", "name": "letter", "title": "Letter", "options": { "list": "letters" } }),
            letters_list(),
        );
        let errors = page(&model).validate_form(&map(json!({ "letter": "Z" }))).unwrap_err();
        assert_eq!(errors.error_list[0].text, "\"Letter\" must be one of [A, B, C]");
    }

    #[test]
    fn test_select_form_schema_is_not_restricted() {
        let model = single_component_form(
            json!({ "type": "SelectField", "name": "letter", "title": "Letter", "options": { "list": "letters" } }),
            letters_list(),
        );
        let page = page(&model);
        let form_data = page.validate_form(&map(json!({ "letter": "Z" }))).expect("select accepts any text");
        let state = page.state_from_valid_form(&form_data);
        assert!(page.validate_state(&state).is_err());
    }

    #[test]
    fn test_select_view_model_has_blank_first_item() {
        let model = single_component_form(
            json!({ "type": "SelectField", "name": "letter", "title": "Letter", "options": { "list": "letters" } }),
            letters_list(),
        );
        let view = only_field(&model).view_model(&map(json!({ "letter": "B" })), None);

        assert_eq!(view.items.len(), 4);
        assert_eq!(view.items[0].text, "");
        assert!(!view.items[0].checked);
        assert!(view.items[2].checked);
    }

    #[test]
    fn test_yes_no_converts_to_boolean() {
        let model = single_component_form(json!({ "type": "YesNoField", "name": "agree", "title": "Do you agree?" }), json!([]));
        let page = page(&model);
        let form_data = page.validate_form(&map(json!({ "agree": "true" }))).expect("true is a list value");
        let state = page.state_from_valid_form(&form_data);

        assert_eq!(state.get("agree"), Some(&json!(true)));
        assert_eq!(only_field(&model).display_string(&state), "Yes");
        assert!(page.validate_form(&map(json!({ "agree": "perhaps" }))).is_err());
    }

    #[test]
    fn test_number_list_values_are_coerced() {
        let model = compile(household_definition());
        let page = model.page("/rooms").expect("rooms page");
        let form_data = page.validate_form(&map(json!({ "bedrooms": "2" }))).expect("2 is a list value");
        let state = page.state_from_valid_form(&form_data);
        assert_eq!(state.get("bedrooms"), Some(&json!(2)));
    }

    #[test]
    fn test_unknown_list_is_a_definition_error() {
        let result = Model::builder(json!({
            "pages": [{
                "path": "/q",
                "components": [{ "type": "RadiosField", "name": "x", "title": "X", "options": { "list": "missing" } }]
            }]
        }))
        .build();
        assert!(matches!(result, Err(DefinitionError::UnknownList { .. })));
    }
}

#[cfg(test)]
mod conditional_reveal_tests {
    use super::*;

    fn contact_form() -> Model {
        single_component_form(
            json!({ "type": "RadiosField", "name": "contact", "title": "How should we contact you?", "options": { "list": "contact" } }),
            json!([{
                "name": "contact",
                "title": "Contact",
                "type": "string",
                "items": [
                    {
                        "text": "Email",
                        "value": "email",
                        "conditional": {
                            "components": [{ "type": "EmailAddressField", "name": "contactEmail", "title": "Email address" }]
                        }
                    },
                    { "text": "Phone", "value": "phone" }
                ]
            }]),
        )
    }

    #[test]
    fn test_selected_item_requires_nested_field() {
        let model = contact_form();
        let page = page(&model);
        let store = MemoryStateStore::default();

        let submission = page
            .submit(&map(json!({ "contact": "email", "contactEmail": "" })), &store)
            .expect("store is available");
        assert!(!submission.is_proceed());

        let state = map(json!({ "contact": "email", "contactEmail": null }));
        assert!(page.validate_state(&state).is_err());
    }

    #[test]
    fn test_unselected_item_drops_empty_nested_field() {
        let model = contact_form();
        let page = page(&model);
        let form_data = page
            .validate_form(&map(json!({ "contact": "phone", "contactEmail": "" })))
            .expect("hidden field may be empty");
        let state = page.state_from_valid_form(&form_data);

        assert_eq!(state, map(json!({ "contact": "phone" })));
        assert!(page.validate_state(&state).is_ok());
    }

    #[test]
    fn test_selected_item_keeps_nested_answer() {
        let model = contact_form();
        let page = page(&model);
        let form_data = page
            .validate_form(&map(json!({ "contact": "email", "contactEmail": "ada@example.com" })))
            .expect("nested field is filled in");
        let state = page.state_from_valid_form(&form_data);

        assert_eq!(state.get("contactEmail"), Some(&json!("ada@example.com")));
        assert!(page.validate_state(&state).is_ok());
    }

    #[test]
    fn test_view_model_nests_revealed_components() {
        let model = contact_form();
        let view = only_field(&model).view_model(&map(json!({ "contact": "email" })), None);

        let revealed = view.items[0].conditional.as_ref().expect("email item reveals a field");
        assert_eq!(revealed.len(), 1);
        assert_eq!(revealed[0].model.name.as_deref(), Some("contactEmail"));
        assert!(view.items[1].conditional.is_none());
        assert!(view.items[0].checked);
    }

    fn reasons_form() -> Model {
        single_component_form(
            json!({ "type": "CheckboxesField", "name": "c", "title": "Choices", "options": { "list": "reasons" } }),
            json!([{
                "name": "reasons",
                "title": "Reasons",
                "type": "string",
                "items": [
                    {
                        "text": "Other",
                        "value": "A",
                        "conditional": {
                            "components": [{ "type": "TextField", "name": "why", "title": "Why" }]
                        }
                    },
                    { "text": "Moving house", "value": "B" }
                ]
            }]),
        )
    }

    #[test]
    fn test_checked_box_among_several_requires_nested_field() {
        let model = reasons_form();
        let errors = page(&model)
            .validate_form(&map(json!({ "c": ["A", "B"], "why": "" })))
            .unwrap_err();

        assert_eq!(errors.error_list.len(), 1);
        assert_eq!(errors.error_list[0].name, "why");
        assert_eq!(errors.error_list[0].text, "\"Why\" is not allowed to be empty");
    }

    #[test]
    fn test_unchecked_box_drops_empty_nested_field() {
        let model = reasons_form();
        let page = page(&model);
        let form_data = page
            .validate_form(&map(json!({ "c": ["B"], "why": "" })))
            .expect("hidden field may be empty");
        let state = page.state_from_valid_form(&form_data);

        assert_eq!(state, map(json!({ "c": ["B"] })));
        assert!(page.validate_state(&state).is_ok());
    }
}

#[cfg(test)]
mod address_tests {
    use super::*;

    fn address_form(options: Value) -> Model {
        single_component_form(
            json!({ "type": "UkAddressField", "name": "home", "title": "Home address", "options": options }),
            json!([]),
        )
    }

    #[test]
    fn test_address_round_trip_and_display() {
        let model = address_form(json!({}));
        let field = only_field(&model);
        let state = map(json!({
            "home": { "premises": "10", "street": "Downing Street", "locality": "", "town": "London", "postcode": "SW1A 2AA" }
        }));

        let form_data = field.form_data_from_state(&state);
        assert_eq!(form_data.get("home__town"), Some(&json!("London")));
        assert_eq!(field.state_from_valid_form(&form_data), state);
        assert_eq!(field.display_string(&state), "10, Downing Street, London, SW1A 2AA");
    }

    #[test]
    fn test_required_address_needs_core_parts() {
        let model = address_form(json!({}));
        let payload = map(json!({
            "home__premises": "", "home__street": "", "home__locality": "", "home__town": "", "home__postcode": "SW1A 2AA"
        }));
        let errors = page(&model).validate_form(&payload).unwrap_err();

        let names: Vec<&str> = errors.error_list.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["home__premises", "home__town"]);
    }

    #[test]
    fn test_postcode_format() {
        let model = address_form(json!({}));
        let payload = map(json!({
            "home__premises": "1", "home__street": "", "home__locality": "", "home__town": "Leeds", "home__postcode": "NOT A CODE"
        }));
        let errors = page(&model).validate_form(&payload).unwrap_err();
        assert_eq!(errors.error_list[0].name, "home__postcode");
    }

    #[test]
    fn test_optional_address_left_empty_stores_null() {
        let model = address_form(json!({ "required": false }));
        let page = page(&model);
        let payload = map(json!({
            "home__premises": "", "home__street": "", "home__locality": "", "home__town": "", "home__postcode": ""
        }));

        let form_data = page.validate_form(&payload).expect("optional address may be empty");
        let state = page.state_from_valid_form(&form_data);
        assert_eq!(state.get("home"), Some(&Value::Null));
        assert!(page.validate_state(&state).is_ok());
    }

    #[test]
    fn test_lookup_match_fills_the_parts() {
        let record = json!({
            "UPRN": "100023336956",
            "ADDRESS": "10, DOWNING STREET, LONDON, SW1A 2AA",
            "BUILDING_NUMBER": "10",
            "THOROUGHFARE_NAME": "DOWNING STREET",
            "POST_TOWN": "LONDON",
            "POSTCODE": "SW1A 2AA"
        });
        let chosen = AddressMatch::from_places_record(&record).expect("record has a UPRN");
        let form_data = chosen.form_data("home");

        assert_eq!(form_data.get("home__premises"), Some(&json!("10")));
        assert_eq!(form_data.get("home__postcode"), Some(&json!("SW1A 2AA")));

        let model = address_form(json!({}));
        assert!(page(&model).validate_form(&form_data).is_ok());
    }

    #[test]
    fn test_postcode_normalisation() {
        assert_eq!(formwright::address::normalise_postcode(" sw1a 2aa ").unwrap(), "SW1A 2AA");
        assert!(formwright::address::normalise_postcode("12345").is_err());
    }
}

#[cfg(test)]
mod content_tests {
    use super::*;

    #[test]
    fn test_content_blocks_take_no_input() {
        let model = compile(json!({
            "pages": [{
                "path": "/info",
                "components": [
                    { "type": "Para", "content": "Read this first." },
                    { "type": "Details", "title": "Help", "content": "More help." },
                    { "type": "WarningText", "content": "Be careful.", "icon": "Warning" }
                ]
            }]
        }));
        let page = model.page("/info").expect("info page");

        assert!(!page.has_form_components());
        assert!(page.state_from_valid_form(&map(json!({}))).is_empty());

        let view = page.view_model(&map(json!({})), None);
        assert_eq!(view.components.len(), 3);
        assert_eq!(view.components[1].model.summary_text.as_deref(), Some("Help"));
        assert_eq!(view.components[2].model.icon_fallback_text.as_deref(), Some("Warning"));
        assert!(view.show_title);
    }
}

#[cfg(test)]
mod registry_tests {
    use super::*;
    use formwright::component::TextField;

    #[test]
    fn test_unknown_component_type_is_rejected() {
        let result = Model::builder(json!({
            "pages": [{ "path": "/q", "components": [{ "type": "Signature", "name": "sig" }] }]
        }))
        .build();
        assert!(matches!(result, Err(DefinitionError::UnknownComponentType { .. })));
    }

    #[test]
    fn test_custom_component_type_and_alias() {
        let model = Model::builder(json!({
            "pages": [{
                "path": "/q",
                "components": [
                    { "type": "Signature", "name": "sig", "title": "Signature" },
                    { "type": "ShortText", "name": "note", "title": "Note" }
                ]
            }]
        }))
        .with_component_type("Signature", TextField::text)
        .with_type_alias("ShortText", "TextField")
        .build()
        .expect("custom types are registered");

        let page = model.page("/q").expect("page");
        assert_eq!(page.components().form_items().count(), 2);
    }

    #[test]
    fn test_duplicate_field_names_are_rejected() {
        let result = Model::builder(json!({
            "pages": [{
                "path": "/q",
                "components": [
                    { "type": "TextField", "name": "name", "title": "Name" },
                    { "type": "TextField", "name": "name", "title": "Name again" }
                ]
            }]
        }))
        .build();
        assert!(matches!(result, Err(DefinitionError::DuplicateName { .. })));
    }

    #[test]
    fn test_form_component_without_name_is_rejected() {
        let result = Model::builder(json!({
            "pages": [{ "path": "/q", "components": [{ "type": "TextField", "title": "Name" }] }]
        }))
        .build();
        assert!(matches!(result, Err(DefinitionError::MissingName { .. })));
    }
}
