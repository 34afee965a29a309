use super::ListType;
use crate::error::{DefinitionError, StructureIssue};
use ahash::AHashSet;
use serde_json::{Map, Value};

const ROOT_KEYS: &[&str] = &["pages", "sections", "lists", "conditions"];
const PAGE_KEYS: &[&str] = &["path", "title", "section", "components", "next"];
const SECTION_KEYS: &[&str] = &["name", "title"];
const LIST_KEYS: &[&str] = &["name", "title", "type", "items"];
const ITEM_KEYS: &[&str] = &["text", "value", "description", "conditional"];
const CONDITIONAL_KEYS: &[&str] = &["components"];
const CONDITION_KEYS: &[&str] = &["name", "value"];
const NEXT_KEYS: &[&str] = &["path", "if"];
const COMPONENT_KEYS: &[&str] = &[
    "type", "name", "title", "hint", "content", "icon", "options", "schema",
];
const LIST_TYPES: &[&str] = &["string", "number", "boolean"];

/// Checks a raw definition against the fixed authoring structure.
///
/// Every problem is collected before returning, so a single run reports all of them.
pub fn validate_structure(definition: &Value) -> Result<(), DefinitionError> {
    let mut walker = StructureWalker::default();
    walker.root(definition);
    if walker.issues.is_empty() {
        Ok(())
    } else {
        tracing::debug!(issues = walker.issues.len(), "Form definition failed structural validation");
        Err(DefinitionError::InvalidStructure(walker.issues))
    }
}

#[derive(Default)]
struct StructureWalker {
    issues: Vec<StructureIssue>,
}

impl StructureWalker {
    fn root(&mut self, definition: &Value) {
        let Some(root) = self.object(definition, "") else {
            return;
        };
        self.check_keys(root, "", ROOT_KEYS);

        let sections = self.each(root, "", "sections", false, |w, section, path| {
            w.check_keys(section, path, SECTION_KEYS);
            w.required_str(section, path, "title");
            w.required_str(section, path, "name").map(str::to_string)
        });
        self.no_duplicates(&sections, "section name");

        let lists = self.each(root, "", "lists", false, |w, list, path| {
            w.list(list, path);
            w.required_str(list, path, "name").map(str::to_string)
        });
        self.no_duplicates(&lists, "list name");

        self.each(root, "", "conditions", false, |w, condition, path| {
            w.check_keys(condition, path, CONDITION_KEYS);
            w.required_str(condition, path, "name");
            w.required_str(condition, path, "value");
            None::<()>
        });

        let declared: AHashSet<&str> = sections.iter().map(|(_, name)| name.as_str()).collect();
        let pages = self.each(root, "", "pages", true, |w, page, path| w.page(page, path, &declared));
        self.no_duplicates(&pages, "page path");
    }

    fn page(&mut self, page: &Map<String, Value>, path: &str, sections: &AHashSet<&str>) -> Option<String> {
        self.check_keys(page, path, PAGE_KEYS);
        let route = self.required_str(page, path, "path");
        if let Some(route) = route.filter(|r| !r.starts_with('/')) {
            self.issue(join(path, "path"), format!("\"{}\" must start with '/'", route));
        }
        self.optional_str(page, path, "title");
        if let Some(section) = self.optional_str(page, path, "section") {
            if !sections.contains(section) {
                self.issue(join(path, "section"), format!("\"{}\" is not a declared section", section));
            }
        }
        self.components(page, path);
        self.each(page, path, "next", false, |w, next, next_path| {
            w.check_keys(next, next_path, NEXT_KEYS);
            w.required_str(next, next_path, "path");
            w.optional_str(next, next_path, "if");
            None::<()>
        });
        route.map(str::to_string)
    }

    fn list(&mut self, list: &Map<String, Value>, path: &str) {
        self.check_keys(list, path, LIST_KEYS);
        self.required_str(list, path, "title");
        let list_type = self.required_str(list, path, "type").and_then(|name| {
            let parsed = serde_json::from_value::<ListType>(Value::from(name)).ok();
            if parsed.is_none() {
                self.issue(
                    join(path, "type"),
                    format!("\"{}\" must be one of [{}]", name, LIST_TYPES.join(", ")),
                );
            }
            parsed
        });

        self.each(list, path, "items", true, |w, item, item_path| {
            w.check_keys(item, item_path, ITEM_KEYS);
            w.required_str(item, item_path, "text");
            w.optional_str(item, item_path, "description");
            match item.get("value") {
                None => w.issue(join(item_path, "value"), "is required".to_string()),
                Some(value) => {
                    if let Some(expected) = list_type.filter(|t| !t.admits(value)) {
                        w.issue(join(item_path, "value"), format!("must be a {}", expected.as_str()));
                    }
                }
            }
            if let Some(conditional) = item.get("conditional") {
                let conditional_path = join(item_path, "conditional");
                if let Some(conditional) = w.object(conditional, &conditional_path) {
                    w.check_keys(conditional, &conditional_path, CONDITIONAL_KEYS);
                    w.components(conditional, &conditional_path);
                }
            }
            None::<()>
        });
    }

    fn components(&mut self, parent: &Map<String, Value>, path: &str) {
        self.each(parent, path, "components", false, |w, component, component_path| {
            w.check_keys(component, component_path, COMPONENT_KEYS);
            w.required_str(component, component_path, "type");
            for key in ["name", "title", "hint", "content", "icon"] {
                w.optional_str(component, component_path, key);
            }
            if let Some(options) = component.get("options") {
                let options_path = join(component_path, "options");
                if let Some(options) = w.object(options, &options_path) {
                    w.optional_bool(options, &options_path, "required");
                    w.optional_bool(options, &options_path, "bold");
                    w.optional_str(options, &options_path, "classes");
                    w.optional_str(options, &options_path, "list");
                    w.optional_count(options, &options_path, "rows");
                }
            }
            if let Some(schema) = component.get("schema") {
                let schema_path = join(component_path, "schema");
                if let Some(schema) = w.object(schema, &schema_path) {
                    w.optional_number(schema, &schema_path, "min");
                    w.optional_number(schema, &schema_path, "max");
                    w.optional_bool(schema, &schema_path, "trim");
                }
            }
            None::<()>
        });
    }

    /// Visits every object in the array at `parent[key]`, collecting what `visit` returns
    /// alongside the element's path.
    fn each<T>(
        &mut self,
        parent: &Map<String, Value>,
        path: &str,
        key: &str,
        required: bool,
        mut visit: impl FnMut(&mut Self, &Map<String, Value>, &str) -> Option<T>,
    ) -> Vec<(String, T)> {
        let array_path = join(path, key);
        let Some(value) = parent.get(key) else {
            if required {
                self.issue(array_path, "is required".to_string());
            }
            return Vec::new();
        };
        let Some(elements) = value.as_array() else {
            self.issue(array_path, "must be an array".to_string());
            return Vec::new();
        };

        let mut collected = Vec::new();
        for (index, element) in elements.iter().enumerate() {
            let element_path = format!("{}[{}]", array_path, index);
            if let Some(object) = self.object(element, &element_path) {
                if let Some(found) = visit(self, object, &element_path) {
                    collected.push((element_path, found));
                }
            }
        }
        collected
    }

    fn no_duplicates(&mut self, entries: &[(String, String)], what: &str) {
        let mut seen = AHashSet::new();
        for (path, name) in entries {
            if !seen.insert(name.as_str()) {
                self.issue(path.clone(), format!("duplicate {} \"{}\"", what, name));
            }
        }
    }

    fn object<'v>(&mut self, value: &'v Value, path: &str) -> Option<&'v Map<String, Value>> {
        let object = value.as_object();
        if object.is_none() {
            self.issue(path.to_string(), "must be an object".to_string());
        }
        object
    }

    fn check_keys(&mut self, object: &Map<String, Value>, path: &str, allowed: &[&str]) {
        for key in object.keys().filter(|k| !allowed.contains(&k.as_str())) {
            self.issue(join(path, key), "is not allowed".to_string());
        }
    }

    fn required_str<'v>(&mut self, object: &'v Map<String, Value>, path: &str, key: &str) -> Option<&'v str> {
        if !object.contains_key(key) {
            self.issue(join(path, key), "is required".to_string());
            return None;
        }
        self.optional_str(object, path, key)
    }

    fn optional_str<'v>(&mut self, object: &'v Map<String, Value>, path: &str, key: &str) -> Option<&'v str> {
        let value = object.get(key)?;
        let text = value.as_str();
        if text.is_none() {
            self.issue(join(path, key), "must be a string".to_string());
        }
        text
    }

    fn optional_bool(&mut self, object: &Map<String, Value>, path: &str, key: &str) {
        if object.get(key).is_some_and(|v| !v.is_boolean()) {
            self.issue(join(path, key), "must be a boolean".to_string());
        }
    }

    fn optional_number(&mut self, object: &Map<String, Value>, path: &str, key: &str) {
        if object.get(key).is_some_and(|v| !v.is_number()) {
            self.issue(join(path, key), "must be a number".to_string());
        }
    }

    /// Whole numbers that fit a `u32`, such as `rows`.
    fn optional_count(&mut self, object: &Map<String, Value>, path: &str, key: &str) {
        let fits = |v: &Value| v.as_u64().is_some_and(|n| u32::try_from(n).is_ok());
        if object.get(key).is_some_and(|v| !fits(v)) {
            self.issue(join(path, key), "must be a whole number of at least 0".to_string());
        }
    }

    fn issue(&mut self, path: String, message: String) {
        self.issues.push(StructureIssue { path, message });
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}
