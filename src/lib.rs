//! # Formwright - Declarative Multi-Page Form Engine
//!
//! **Formwright** compiles a JSON form definition (pages, sections, lists and conditions)
//! into an immutable runtime model. The model validates submitted form data, converts it
//! into typed application state, decides which page comes next, and projects everything
//! answered so far into a summary.
//!
//! ## Core Workflow
//!
//! 1.  **Compile**: Hand the raw definition to `Model::builder` (or `Model::from_json`).
//!     The definition is checked structurally first, collecting every issue, then each
//!     page, component and condition is compiled.
//! 2.  **Render**: `Page::view` reads state from an injected `StateStore` and produces a
//!     `PageViewModel` for whatever renders your HTML.
//! 3.  **Submit**: `Page::submit` validates the payload, stores the page's state scoped by
//!     section, and returns either the next path or a view model carrying the errors.
//! 4.  **Summarise**: `Model::summary` lists every answer and flags the ones that fail
//!     whole-state validation.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use formwright::prelude::*;
//! use serde_json::json;
//!
//! fn main() -> Result<()> {
//!     let model = Model::builder(json!({
//!         "pages": [
//!             {
//!                 "path": "/age",
//!                 "title": "Your age",
//!                 "components": [{ "type": "NumberField", "name": "age", "title": "Age" }],
//!                 "next": [{ "path": "/adult", "if": "isAdult" }, { "path": "/child" }]
//!             },
//!             { "path": "/adult", "components": [] },
//!             { "path": "/child", "components": [] }
//!         ],
//!         "conditions": [{ "name": "isAdult", "value": "age >= 18" }]
//!     }))
//!     .build()?;
//!
//!     let store = MemoryStateStore::default();
//!     let mut payload = FormData::new();
//!     payload.insert("age".to_string(), json!("42"));
//!
//!     match model.submit("/age", &payload, &store)? {
//!         Submission::Proceed { next_path, .. } => println!("-> {}", next_path),
//!         Submission::Rerender(view) => println!("Errors: {:?}", view.errors),
//!     }
//!     Ok(())
//! }
//! ```

pub mod address;
pub mod ast;
pub mod component;
pub mod condition;
pub mod definition;
pub mod error;
pub mod model;
pub mod options;
pub mod page;
pub mod prelude;
pub mod schema;
pub mod state;
pub mod summary;
pub mod trace;
pub mod view;
