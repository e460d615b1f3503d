//! Configuration for the fixture manager
//!
//! Defaults match a stock CMS install; every value can be overridden from
//! `FIXTURES_*` environment variables.

use serde::{Deserialize, Serialize};
use std::env;
use tracing::warn;

/// Fixture manager configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureConfig {
    /// Delimiter for nested `field:column` headers
    #[serde(default = "default_column_delimiter")]
    pub column_delimiter: char,

    /// Kind that file references resolve against
    #[serde(default = "default_file_kind")]
    pub file_kind: String,

    /// Property of the file kind holding the storage locator
    #[serde(default = "default_file_locator_key")]
    pub file_locator_key: String,

    /// Kind created by the menu-item fixture
    #[serde(default = "default_menu_link_kind")]
    pub menu_link_kind: String,

    /// Prefix turning a path into a menu link uri
    #[serde(default = "default_menu_link_uri_prefix")]
    pub menu_link_uri_prefix: String,

    /// Kind used for nested child fixtures
    #[serde(default = "default_child_kind")]
    pub child_kind: String,
}

fn default_column_delimiter() -> char {
    ':'
}

fn default_file_kind() -> String {
    "file".to_string()
}

fn default_file_locator_key() -> String {
    "uri".to_string()
}

fn default_menu_link_kind() -> String {
    "menu_link_content".to_string()
}

fn default_menu_link_uri_prefix() -> String {
    "internal:".to_string()
}

fn default_child_kind() -> String {
    "paragraph".to_string()
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            column_delimiter: default_column_delimiter(),
            file_kind: default_file_kind(),
            file_locator_key: default_file_locator_key(),
            menu_link_kind: default_menu_link_kind(),
            menu_link_uri_prefix: default_menu_link_uri_prefix(),
            child_kind: default_child_kind(),
        }
    }
}

impl FixtureConfig {
    /// Load configuration from the environment on top of the defaults
    pub fn load() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(delimiter) = lookup("FIXTURES_COLUMN_DELIMITER") {
            let mut chars = delimiter.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => config.column_delimiter = c,
                _ => warn!("Invalid FIXTURES_COLUMN_DELIMITER value: {}", delimiter),
            }
        }

        if let Some(file_kind) = lookup("FIXTURES_FILE_KIND") {
            config.file_kind = file_kind;
        }

        if let Some(key) = lookup("FIXTURES_FILE_LOCATOR_KEY") {
            config.file_locator_key = key;
        }

        if let Some(kind) = lookup("FIXTURES_MENU_LINK_KIND") {
            config.menu_link_kind = kind;
        }

        if let Some(prefix) = lookup("FIXTURES_MENU_LINK_URI_PREFIX") {
            config.menu_link_uri_prefix = prefix;
        }

        if let Some(kind) = lookup("FIXTURES_CHILD_KIND") {
            config.child_kind = kind;
        }

        config
    }
}
