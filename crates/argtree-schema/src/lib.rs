//! Shared schema model for argtree declaration trees.
//!
//! A schema describes, as JSON, the same tree a program would build with
//! `argtree::Argument` constructors: typed options, flags and nested commands.
//! It is used by the `argtree` tool to drive the parser without writing Rust.
//!
//! ```json
//! {
//!   "name": "tool",
//!   "arguments": [
//!     { "name": "verbose", "short": "v", "type": "flag" },
//!     { "name": "level", "type": "range", "min": 0, "max": 3, "default": 1 },
//!     { "name": "deploy", "type": "command", "arguments": [
//!       { "name": "tag", "type": "repeated", "of": { "type": "string" } }
//!     ] }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SchemaError>;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid schema JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{path}: argument name must not be empty")]
    EmptyName { path: String },

    #[error("{path}: argument name '{name}' contains invalid character '='")]
    InvalidName { path: String, name: String },

    #[error("{path}: argument '{name}' is declared more than once")]
    DuplicateName { path: String, name: String },

    #[error("{path}: short name '{short}' of '{name}' conflicts with '{existing}'")]
    ShortNameConflict {
        path: String,
        name: String,
        short: String,
        existing: String,
    },

    #[error("{path}: choice list must not be empty")]
    EmptyChoices { path: String },

    #[error("{path}: choice '{value}' is listed more than once")]
    DuplicateChoice { path: String, value: String },

    #[error("{path}: default '{default}' is not one of the choices")]
    DefaultNotAChoice { path: String, default: String },

    #[error("{path}: default {default} is outside [{min}, {max}]")]
    DefaultOutOfRange {
        path: String,
        default: i64,
        min: i64,
        max: i64,
    },

    #[error("{path}: range takes either bounds or choices, not both")]
    MixedRange { path: String },

    #[error("{path}: repeated arguments must wrap an option, not a {kind}")]
    InvalidRepeated { path: String, kind: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct CommandSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<ArgumentSchema>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ArgumentSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(flatten)]
    pub kind: ArgumentKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ArgumentKind {
    Flag,
    String {
        #[serde(default)]
        default: String,
    },
    Boolean {
        #[serde(default)]
        default: bool,
    },
    Integer {
        #[serde(default)]
        default: i64,
    },
    Choice {
        choices: Vec<String>,
        default: String,
    },
    Range {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        choices: Vec<i64>,
        #[serde(default)]
        default: i64,
    },
    Repeated {
        of: Box<ArgumentKind>,
    },
    Command {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        arguments: Vec<ArgumentSchema>,
    },
}

impl ArgumentKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Flag => "flag",
            Self::String { .. } => "string",
            Self::Boolean { .. } => "boolean",
            Self::Integer { .. } => "integer",
            Self::Choice { .. } => "choice",
            Self::Range { .. } => "range",
            Self::Repeated { .. } => "repeated",
            Self::Command { .. } => "command",
        }
    }

    /// Effective bounds of a range: absent bounds are unbounded.
    pub fn range_bounds(min: Option<i64>, max: Option<i64>) -> (i64, i64) {
        (min.unwrap_or(i64::MIN), max.unwrap_or(i64::MAX))
    }
}

impl CommandSchema {
    /// Parse and validate a schema document.
    pub fn from_json(text: &str) -> Result<Self> {
        let schema: Self = serde_json::from_str(text)?;
        schema.validate()?;
        Ok(schema)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every rule the parser would otherwise enforce by panicking or
    /// by refusing a registration.
    pub fn validate(&self) -> Result<()> {
        validate_arguments(&self.name, &self.arguments)
    }
}

fn validate_arguments(path: &str, arguments: &[ArgumentSchema]) -> Result<()> {
    let mut seen: Vec<&ArgumentSchema> = Vec::new();

    for arg in arguments {
        if arg.name.is_empty() {
            return Err(SchemaError::EmptyName {
                path: path.to_string(),
            });
        }
        if arg.name.contains('=') {
            return Err(SchemaError::InvalidName {
                path: path.to_string(),
                name: arg.name.clone(),
            });
        }
        if seen.iter().any(|other| other.name == arg.name) {
            return Err(SchemaError::DuplicateName {
                path: path.to_string(),
                name: arg.name.clone(),
            });
        }
        if let Some(short) = arg.short.as_deref().filter(|s| !s.is_empty()) {
            let conflict = seen.iter().find(|other| {
                other
                    .short
                    .as_deref()
                    .filter(|s| !s.is_empty())
                    .is_some_and(|existing| existing.starts_with(short) || short.starts_with(existing))
            });
            if let Some(existing) = conflict {
                return Err(SchemaError::ShortNameConflict {
                    path: path.to_string(),
                    name: arg.name.clone(),
                    short: short.to_string(),
                    existing: existing.name.clone(),
                });
            }
        }

        let arg_path = format!("{path}/{}", arg.name);
        validate_kind(&arg_path, &arg.kind)?;
        seen.push(arg);
    }

    Ok(())
}

fn validate_kind(path: &str, kind: &ArgumentKind) -> Result<()> {
    match kind {
        ArgumentKind::Flag
        | ArgumentKind::String { .. }
        | ArgumentKind::Boolean { .. }
        | ArgumentKind::Integer { .. } => Ok(()),
        ArgumentKind::Choice { choices, default } => {
            validate_choices(path, choices, default)?;
            Ok(())
        }
        ArgumentKind::Range {
            min,
            max,
            choices,
            default,
        } => {
            if choices.is_empty() {
                let (min, max) = ArgumentKind::range_bounds(*min, *max);
                if !(min <= *default && *default <= max) {
                    return Err(SchemaError::DefaultOutOfRange {
                        path: path.to_string(),
                        default: *default,
                        min,
                        max,
                    });
                }
                Ok(())
            } else if min.is_some() || max.is_some() {
                Err(SchemaError::MixedRange {
                    path: path.to_string(),
                })
            } else {
                validate_choices(path, choices, default)
            }
        }
        ArgumentKind::Repeated { of } => match of.as_ref() {
            ArgumentKind::Flag | ArgumentKind::Repeated { .. } | ArgumentKind::Command { .. } => {
                Err(SchemaError::InvalidRepeated {
                    path: path.to_string(),
                    kind: of.type_name(),
                })
            }
            option => validate_kind(path, option),
        },
        ArgumentKind::Command { arguments } => validate_arguments(path, arguments),
    }
}

fn validate_choices<T>(path: &str, choices: &[T], default: &T) -> Result<()>
where
    T: Ord + ToString,
{
    if choices.is_empty() {
        return Err(SchemaError::EmptyChoices {
            path: path.to_string(),
        });
    }
    let mut unique = BTreeSet::new();
    for choice in choices {
        if !unique.insert(choice) {
            return Err(SchemaError::DuplicateChoice {
                path: path.to_string(),
                value: choice.to_string(),
            });
        }
    }
    if !unique.contains(default) {
        return Err(SchemaError::DefaultNotAChoice {
            path: path.to_string(),
            default: default.to_string(),
        });
    }
    Ok(())
}
