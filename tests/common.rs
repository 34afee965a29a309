//! Common test utilities for building form definitions, form data and state.
use formwright::prelude::*;
use serde_json::{Value, json};

/// Converts a `json!` object into a `State` / `FormData` map.
#[allow(dead_code)]
pub fn map(value: Value) -> State {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {}", other),
    }
}

/// Compiles a definition, failing the test on any definition error.
#[allow(dead_code)]
pub fn compile(definition: Value) -> Model {
    Model::builder(definition)
        .build()
        .expect("Failed to compile form definition")
}

/// A single-page form holding one component, plus any lists it needs.
#[allow(dead_code)]
pub fn single_component_form(component: Value, lists: Value) -> Model {
    compile(json!({
        "pages": [{ "path": "/question", "title": "Question", "components": [component] }],
        "lists": lists
    }))
}

/// The list of three string values used by the list field tests.
#[allow(dead_code)]
pub fn letters_list() -> Value {
    json!([{
        "name": "letters",
        "title": "Letters",
        "type": "string",
        "items": [
            { "text": "Alpha", "value": "A" },
            { "text": "Bravo", "value": "B" },
            { "text": "Charlie", "value": "C" }
        ]
    }])
}

/// A two-section, four-page household form.
///
/// Sections: `applicant` (/name, /age) and `property` (/address, /rooms).
/// `/age` routes to `/address` when `isAdult` holds, otherwise to `/guardian`.
#[allow(dead_code)]
pub fn household_definition() -> Value {
    json!({
        "sections": [
            { "name": "applicant", "title": "About you" },
            { "name": "property", "title": "Your property" }
        ],
        "lists": [{
            "name": "rooms",
            "title": "Bedrooms",
            "type": "number",
            "items": [
                { "text": "One", "value": 1 },
                { "text": "Two", "value": 2 },
                { "text": "Three or more", "value": 3 }
            ]
        }],
        "conditions": [{ "name": "isAdult", "value": "age >= 18" }],
        "pages": [
            {
                "path": "/name",
                "title": "Your name",
                "section": "applicant",
                "components": [{ "type": "TextField", "name": "fullName", "title": "Full name" }],
                "next": [{ "path": "/age" }]
            },
            {
                "path": "/age",
                "title": "Your age",
                "section": "applicant",
                "components": [
                    { "type": "Para", "content": "We use this to check eligibility." },
                    { "type": "NumberField", "name": "age", "title": "Age" }
                ],
                "next": [{ "path": "/address", "if": "isAdult" }, { "path": "/guardian" }]
            },
            {
                "path": "/address",
                "title": "Your address",
                "section": "property",
                "components": [{ "type": "UkAddressField", "name": "home", "title": "Home address" }],
                "next": [{ "path": "/rooms" }]
            },
            {
                "path": "/rooms",
                "title": "Bedrooms",
                "section": "property",
                "components": [{
                    "type": "RadiosField",
                    "name": "bedrooms",
                    "title": "How many bedrooms?",
                    "options": { "list": "rooms" }
                }]
            }
        ]
    })
}

/// A complete, valid state for the household form.
#[allow(dead_code)]
pub fn household_state() -> State {
    map(json!({
        "applicant": { "fullName": "Ada Lovelace", "age": 36 },
        "property": {
            "home": {
                "premises": "10",
                "street": "Downing Street",
                "locality": "",
                "town": "London",
                "postcode": "SW1A 2AA"
            },
            "bedrooms": 2
        }
    }))
}
