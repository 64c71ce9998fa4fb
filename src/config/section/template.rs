//! `[template]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [template]
//! preserve_href_expressions = true
//!
//! [template.variables]
//! company = "ACME Corp"
//!
//! [template.documents."shop/invoice"]
//! title = "Invoice"
//! variables = { currency = "EUR" }
//! ```

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Decode `{{ ... }}` expressions the compiler percent-encodes in `href`s.
    pub preserve_href_expressions: bool,

    /// Variables available to every document.
    pub variables: Map<String, Value>,

    /// Per-document settings, keyed by document name.
    pub documents: FxHashMap<String, DocumentConfig>,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            preserve_href_expressions: true,
            variables: Map::new(),
            documents: FxHashMap::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Human-readable title, shown in the preview index.
    pub title: Option<String>,

    pub variables: Map<String, Value>,
}

impl TemplateConfig {
    /// Variables for `document`: globals, overridden key by key by the
    /// document's own table.
    pub fn data_for(&self, document: &str) -> Map<String, Value> {
        let mut data = self.variables.clone();
        if let Some(doc) = self.documents.get(document) {
            for (key, value) in &doc.variables {
                data.insert(key.clone(), value.clone());
            }
        }
        data
    }

    pub fn title_of(&self, document: &str) -> Option<&str> {
        self.documents.get(document)?.title.as_deref()
    }
}
