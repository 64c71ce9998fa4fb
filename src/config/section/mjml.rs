//! `[mjml]` section configuration.
//!
//! ```toml
//! [mjml]
//! keep_comments = false
//!
//! [mjml.fonts]
//! Roboto = "https://fonts.googleapis.com/css?family=Roboto"
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MjmlConfig {
    /// Keep source comments in compiled artifacts.
    pub keep_comments: bool,

    /// Web fonts made available to `mj-font`-less templates (name -> URL).
    pub fonts: BTreeMap<String, String>,
}
