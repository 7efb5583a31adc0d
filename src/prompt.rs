//! Prompt templates with named placeholders, loadable from JSON files.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{QaError, Result};

/// A prompt template with `{name}`-style placeholders.
///
/// `input_variables` declares the placeholders the template expects;
/// [`render`](PromptTemplate::render) substitutes them and fails if any
/// declared variable is missing from the supplied values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptTemplate {
    /// The template text containing `{name}` placeholders.
    pub template: String,
    /// Placeholder names the template expects.
    pub input_variables: Vec<String>,
}

impl PromptTemplate {
    /// Create a template from text and its declared variables.
    pub fn new(template: impl Into<String>, input_variables: Vec<String>) -> Self {
        Self { template: template.into(), input_variables }
    }

    /// Load a template from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Template`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            QaError::Template(format!("failed to read '{}': {e}", path.display()))
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            QaError::Template(format!("failed to parse '{}': {e}", path.display()))
        })
    }

    /// Render the template by substituting all declared variables.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Template`] if a declared variable is missing from
    /// `values`.
    pub fn render(&self, values: &HashMap<String, String>) -> Result<String> {
        let mut rendered = self.template.clone();
        for variable in &self.input_variables {
            let value = values.get(variable).ok_or_else(|| {
                QaError::Template(format!("missing value for template variable '{variable}'"))
            })?;
            rendered = rendered.replace(&format!("{{{variable}}}"), value);
        }
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn renders_all_placeholders() {
        let template = PromptTemplate::new(
            "Explain '{paper}' in a {style} style.",
            vec!["paper".to_string(), "style".to_string()],
        );
        let rendered = template
            .render(&vars(&[("paper", "Attention Is All You Need"), ("style", "Technical")]))
            .unwrap();
        assert_eq!(rendered, "Explain 'Attention Is All You Need' in a Technical style.");
    }

    #[test]
    fn missing_variable_is_an_error() {
        let template = PromptTemplate::new("Hello {name}", vec!["name".to_string()]);
        let err = template.render(&vars(&[])).unwrap_err();
        assert!(matches!(err, QaError::Template(_)));
    }

    #[test]
    fn round_trips_through_json() {
        let template = PromptTemplate::new("Hi {who}", vec!["who".to_string()]);
        let json = serde_json::to_string(&template).unwrap();
        let back: PromptTemplate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, template);
    }
}
