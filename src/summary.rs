//! A read-only projection of every answer, grouped by section, with validation errors.

use crate::model::Model;
use crate::state::State;
use serde::Serialize;
use serde_json::Value;

/// One answer on the summary page.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SummaryItem {
    pub name: String,
    pub label: String,
    pub value: String,
    /// Link back to the page that asks the question.
    pub url: String,
    pub in_error: bool,
}

/// The answers of one section, or of the pages outside any section.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SummarySection {
    /// `None` for the pages that belong to no section.
    pub name: Option<String>,
    pub title: Option<String>,
    pub items: Vec<SummaryItem>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SummaryError {
    pub path: String,
    /// Path segments joined with `__`, matching field anchors.
    pub name: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SummaryViewModel {
    pub details: Vec<SummarySection>,
    pub errors: Vec<SummaryError>,
    pub has_errors: bool,
    /// The whole state is valid and can be submitted.
    pub ready: bool,
    /// The validated state when it is valid, otherwise the state as given.
    pub value: Value,
}

impl SummaryViewModel {
    pub fn new(model: &Model, state: &State) -> Self {
        let (value, failures) = match model.validate_state(state) {
            Ok(value) => (value, Vec::new()),
            Err(e) => (Value::Object(state.clone()), e.details),
        };

        let groups = std::iter::once(None).chain(model.sections().iter().map(Some));
        let details = groups
            .filter_map(|section| {
                let section_name = section.map(|s| s.name.as_str());
                let items: Vec<SummaryItem> = model
                    .pages()
                    .iter()
                    .filter(|page| page.section().map(|s| s.name.as_str()) == section_name)
                    .flat_map(|page| {
                        let page_state = page.page_state(state).cloned().unwrap_or_default();
                        let url = format!("{}?returnUrl={}", page.path(), model.options().summary_path);
                        page.components()
                            .form_items()
                            .map(|item| {
                                let row_path: Vec<&str> = section_name.into_iter().chain([item.name()]).collect();
                                SummaryItem {
                                    name: item.name().to_string(),
                                    label: item.title().to_string(),
                                    value: item.display_string(&page_state),
                                    url: url.clone(),
                                    in_error: failures.iter().any(|f| covers(&f.path, &row_path)),
                                }
                            })
                            .collect::<Vec<_>>()
                    })
                    .collect();
                if items.is_empty() {
                    return None;
                }
                Some(SummarySection {
                    name: section.map(|s| s.name.clone()),
                    title: section.map(|s| s.title.clone()),
                    items,
                })
            })
            .collect();

        let errors: Vec<SummaryError> = failures
            .iter()
            .map(|f| SummaryError {
                path: f.dotted_path(),
                name: f.path.join("__"),
                message: f.message.clone(),
            })
            .collect();
        let has_errors = !errors.is_empty();
        tracing::debug!(errors = errors.len(), "Built summary");

        Self {
            details,
            errors,
            has_errors,
            ready: !has_errors,
            value,
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &SummaryItem> {
        self.details.iter().flat_map(|section| section.items.iter())
    }
}

/// Whether a failure at `error_path` concerns the row at `row_path`: the failing value is
/// the row's own value, something inside it, or the section object holding it.
fn covers(error_path: &[String], row_path: &[&str]) -> bool {
    let shared = error_path.len().min(row_path.len());
    !error_path.is_empty() && error_path[..shared].iter().zip(&row_path[..shared]).all(|(a, b)| a == b)
}
