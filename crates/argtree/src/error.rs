//! Error types for normalization, registration and parsing.

use thiserror::Error;

/// Failure to turn platform input into a UTF-8 command line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("argument {index} is not valid UTF-8")]
    InvalidUtf8 { index: usize },

    #[error("argument {index} is not valid UTF-16")]
    InvalidUtf16 { index: usize },

    #[error("argument {index} cannot be decoded as {encoding}")]
    Unmappable {
        index: usize,
        encoding: &'static str,
    },

    #[error("unknown locale or encoding '{0}'")]
    UnknownLocale(String),
}

/// Rejected `Parser::add_argument` call. The registry stays usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("Argument name must not be empty.")]
    EmptyName,

    #[error("Argument name '{0}' contains invalid character '='.")]
    InvalidName(String),

    #[error("An argument with name '{0}' has already been added to the parser.")]
    DuplicateName(String),

    #[error(
        "The argument with name '{name}' has short name '{short_name}' which conflicts with existing argument '{existing}' with short name '{existing_short_name}'."
    )]
    ShortNameConflict {
        name: String,
        short_name: String,
        existing: String,
        existing_short_name: String,
    },
}

/// Fatal parse error. The message is also appended to the call's `Report`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("'{0}' is not a valid option.")]
    UnknownOption(String),

    #[error("The command line contains invalid flags '{0}'.")]
    InvalidFlags(String),

    #[error("Insufficient arguments for option '{0}'.")]
    MissingValue(String),

    #[error("Option '{0}' cannot be specified more than once.")]
    Repeated(String),

    #[error("Invalid argument for boolean option '{name}': '{value}'.")]
    InvalidBoolean { name: String, value: String },

    #[error("Failed to parse argument for integer option '{name}': '{value}'.")]
    InvalidInteger { name: String, value: String },

    #[error("Argument for integer option '{name}' contains invalid characters: '{rest}'.")]
    TrailingCharacters { name: String, rest: String },

    #[error("Argument for integer option '{name}' is out of range: '{value}'.")]
    IntegerOverflow { name: String, value: String },

    #[error("Invalid argument for choice option '{name}': '{value}'.")]
    InvalidChoice { name: String, value: String },

    #[error("Invalid argument for range option '{name}': '{value}'.")]
    OutOfRange { name: String, value: String },
}

pub type ParseResult<T> = Result<T, ParseError>;
