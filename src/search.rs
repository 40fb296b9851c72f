//! The search widget on doc pages. The widget is set up when a doc page loads
//! and torn down when the page is hidden, so each page owns its own instance
//! instead of initializing a global once per mount.

use gtmpl::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn default_input_selector() -> String {
    String::from(".search-item input")
}

/// Configures the hosted search widget. Loaded from the `search` section of
/// the project file.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SearchWidget {
    /// The public search API key.
    #[serde(rename = "apiKey", alias = "api_key")]
    pub api_key: String,

    /// The name of the search index.
    #[serde(rename = "indexName", alias = "index_name")]
    pub index_name: String,

    /// CSS selector for the sidebar's search input.
    #[serde(
        rename = "inputSelector",
        alias = "input_selector",
        default = "default_input_selector"
    )]
    pub input_selector: String,

    #[serde(default)]
    pub debug: bool,
}

impl SearchWidget {
    /// The widget options as a JSON object literal.
    pub fn options(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// A script that creates the widget and keeps a handle to it on
    /// `window.__docsearch`.
    pub fn setup_script(&self) -> serde_json::Result<String> {
        Ok(format!(
            "window.__docsearch = docsearch({});",
            self.options()?
        ))
    }

    /// A script that registers teardown of the widget created by
    /// [`SearchWidget::setup_script`] for when the page is hidden.
    pub fn teardown_script(&self) -> String {
        String::from(concat!(
            "window.addEventListener('pagehide', function () {",
            " var search = window.__docsearch;",
            " if (search && search.autocomplete) { search.autocomplete.autocomplete.destroy(); }",
            " window.__docsearch = undefined;",
            " }, { once: true });",
        ))
    }

    /// Converts the widget into a [`Value::Object`] with fields `options`,
    /// `setup`, and `teardown`, for the template to place in the page.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("options".to_owned(), Value::String(self.options()?));
        m.insert("setup".to_owned(), Value::String(self.setup_script()?));
        m.insert("teardown".to_owned(), Value::String(self.teardown_script()));
        Ok(Value::Object(m))
    }
}
