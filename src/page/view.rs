use super::Page;
use crate::state::FormData;
use crate::view::{ComponentViewModel, ErrorSummary, Label, PageViewModel};

const HEADING_CLASS: &str = "govuk-label--xl";

impl Page {
    /// Describes the page for rendering, with field values taken from `form_data`.
    pub fn view_model(&self, form_data: &FormData, errors: Option<&ErrorSummary>) -> PageViewModel {
        let mut components = self.components.view_model(form_data, errors);
        let section_title = self.section.as_ref().map(|s| s.title.clone());
        let mut page_title = self.title.clone();
        let mut show_title = true;

        if let Some(heading) = self.promotable_heading(&mut components) {
            if let Some(section) = &section_title {
                heading.html = Some(format!(
                    "<span class=\"govuk-caption-xl\">{}</span> {}",
                    section, heading.text
                ));
            }
            heading.is_page_heading = true;
            heading.classes = Some(HEADING_CLASS.to_string());
            page_title = heading.text.clone();
            show_title = false;
        }

        PageViewModel {
            path: self.path.clone(),
            page_title,
            section_title,
            show_title,
            components,
            errors: errors.filter(|e| !e.is_empty()).cloned(),
        }
    }

    /// The label to promote when the page's single form component comes first.
    fn promotable_heading<'v>(&self, components: &'v mut [ComponentViewModel]) -> Option<&'v mut Label> {
        if self.components.form_items().count() != 1 {
            return None;
        }
        let first = components.first_mut().filter(|c| c.is_form_component)?;
        let model = &mut first.model;
        match model.fieldset.as_mut() {
            Some(fieldset) => Some(&mut fieldset.legend),
            None => model.label.as_mut(),
        }
    }
}
