//! Analysis settings.
//!
//! Settings arrive from the editor as loosely-shaped JSON, either flat or
//! nested under an `apielements` section. Anything not provided keeps its
//! default.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Section name settings may be nested under.
pub const SETTINGS_SECTION: &str = "apielements";

/// Parser output dialect the analysis understands.
pub const REFRACT: &str = "refract";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Ask the parser for source maps. Without them there is nothing to
    /// navigate to, so the outline is empty when this is off.
    pub export_sourcemap: bool,
    pub json: bool,
    pub require_blueprint_name: bool,
    /// Parser output dialect.
    #[serde(rename = "type")]
    pub output_type: String,
    pub parser: ParserSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            export_sourcemap: true,
            json: false,
            require_blueprint_name: false,
            output_type: REFRACT.to_string(),
            parser: ParserSettings::default(),
        }
    }
}

/// How to run the external parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParserSettings {
    /// Program to execute.
    pub command: String,
    /// Arguments replacing the ones derived from the parse options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            command: "drafter".to_string(),
            args: None,
        }
    }
}

impl Settings {
    /// Merge editor-provided settings over the defaults.
    ///
    /// `null` (no settings at all) yields the defaults.
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        let section = value.get(SETTINGS_SECTION).unwrap_or(value);
        match section {
            Value::Null => Ok(Self::default()),
            section => Self::deserialize(section),
        }
    }
}
