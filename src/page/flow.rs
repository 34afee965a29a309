use super::Page;
use crate::error::{StoreError, SubmitError};
use crate::state::{FormData, State, StateStore};
use crate::view::PageViewModel;

/// What to do after a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// The submission failed validation. Nothing was stored.
    Rerender(PageViewModel),
    /// The answers were stored; go to `next_path`.
    Proceed { next_path: String, state: State },
}

impl Submission {
    pub fn is_proceed(&self) -> bool {
        matches!(self, Submission::Proceed { .. })
    }
}

impl Page {
    /// Renders the page with the answers already held in the store.
    pub fn view(&self, store: &dyn StateStore) -> Result<PageViewModel, StoreError> {
        let state = store.read()?;
        let form_data = self.form_data_from_state(&state);
        Ok(self.view_model(&form_data, None))
    }

    /// Validates a submission, stores the resulting state and picks the next page.
    pub fn submit(&self, payload: &FormData, store: &dyn StateStore) -> Result<Submission, SubmitError> {
        let form_data = match self.validate_form(payload) {
            Ok(form_data) => form_data,
            Err(errors) => {
                tracing::debug!(page = %self.path, errors = errors.error_list.len(), "Form data failed validation");
                return Ok(Submission::Rerender(self.view_model(payload, Some(&errors))));
            }
        };

        let candidate = self.state_from_valid_form(&form_data);
        let page_state = match self.validate_state(&candidate) {
            Ok(page_state) => page_state,
            Err(errors) => {
                tracing::debug!(page = %self.path, errors = errors.error_list.len(), "Page state failed validation");
                return Ok(Submission::Rerender(self.view_model(payload, Some(&errors))));
            }
        };

        let state = store.merge(self.partial_merge_state(page_state))?;
        let next_path = self.get_next(&state);
        tracing::debug!(page = %self.path, next = %next_path, "Stored page answers");
        Ok(Submission::Proceed { next_path, state })
    }
}
