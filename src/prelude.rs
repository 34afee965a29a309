//! Prelude module for convenient imports
//!
//! Re-exports the types most applications need to compile a form and drive its pages.
//!
//! # Example
//!
//! ```rust,no_run
//! use formwright::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let definition = std::fs::read_to_string("path/to/form.json")?;
//! let model: Model = definition.parse()?;
//!
//! let store = MemoryStateStore::default();
//! let summary = model.summary(&store.read()?);
//! println!("Ready to submit: {}", summary.ready);
//! # Ok(())
//! # }
//! ```

// Compilation
pub use crate::model::{Model, ModelBuilder};
pub use crate::options::EngineOptions;

// Pages and navigation
pub use crate::page::{NextCondition, NextDecision, Page, Submission};

// Components
pub use crate::component::{Component, ComponentContext, ComponentRegistry};

// State and collaborators
pub use crate::address::{AddressLookup, AddressMatch};
pub use crate::state::{FormData, MemoryStateStore, State, StateStore};

// Validation
pub use crate::schema::{Rule, SchemaKeys, ValidationOptions};

// View models
pub use crate::summary::SummaryViewModel;
pub use crate::view::{ErrorSummary, PageViewModel};

// Error types
pub use crate::error::{DefinitionError, LookupError, StoreError, SubmitError, ValidationError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
