//! Argument declarations.
//!
//! An [`Argument`] is a named, typed value holder. The caller owns it; a
//! [`Parser`] only borrows it, so parse results are read straight from the
//! declaration (or through the parser by name) once parsing is done.
//!
//! Every declaration is one of a closed set of kinds:
//!
//! - flag: `--name`, or `-s` alone or inside a cluster such as `-abc`
//! - string / boolean / integer option: `--name value`, `--name=value`,
//!   `-svalue` or `-s value`
//! - choice option: a string option restricted to a fixed set of values
//! - range option: an integer option restricted to bounds and/or a set
//! - repeated option: any option kind that may occur several times, each
//!   occurrence stored as an independent instance
//! - command: a bare `name` token that hands the rest of the command line to
//!   its own nested [`Parser`]

use crate::command_line::CommandLine;
use crate::error::{ParseError, ParseResult, RegistrationError};
use crate::parser::{Parser, Registration};
use crate::report::Report;
use crate::value::{IntegerError, parse_boolean, parse_integer};
use serde::Serialize;
use std::cell::{Cell, Ref, RefCell};
use std::collections::BTreeSet;

/// What a declaration is, as reported by [`Argument::capability`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    Flag,
    Command,
    Boolean,
    Integer,
    String,
    Choice,
    Range,
    Repeated,
}

#[derive(Debug)]
pub struct Argument<'a> {
    name: String,
    short_name: String,
    description: String,
    is_set: Cell<bool>,
    kind: Kind<'a>,
}

#[derive(Debug)]
enum Kind<'a> {
    Flag,
    Option(OptionArg),
    Repeated {
        template: OptionArg,
        values: RefCell<Vec<Argument<'static>>>,
    },
    Command(RefCell<Parser<'a>>),
}

#[derive(Debug, Clone)]
struct OptionArg {
    kind: OptionKind,
    default_text: String,
    default: Scalar,
    text: RefCell<String>,
    value: Cell<Scalar>,
}

#[derive(Debug, Clone)]
enum OptionKind {
    String,
    Boolean,
    Integer,
    Choice(BTreeSet<String>),
    Range {
        minimum: i64,
        maximum: i64,
        choices: BTreeSet<i64>,
    },
}

/// Typed value of an option. String options keep only their text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scalar {
    Text,
    Boolean(bool),
    Integer(i64),
}

impl<'a> Argument<'a> {
    fn with_kind(name: impl Into<String>, kind: Kind<'a>) -> Self {
        Self {
            name: name.into(),
            short_name: String::new(),
            description: String::new(),
            is_set: Cell::new(false),
            kind,
        }
    }

    fn with_option(
        name: impl Into<String>,
        kind: OptionKind,
        default_text: String,
        default: Scalar,
    ) -> Self {
        Self::with_kind(
            name,
            Kind::Option(OptionArg {
                kind,
                text: RefCell::new(default_text.clone()),
                default_text,
                value: Cell::new(default),
                default,
            }),
        )
    }

    /// A flag, true when present on the command line.
    pub fn flag(name: impl Into<String>) -> Self {
        Self::with_kind(name, Kind::Flag)
    }

    pub fn string(name: impl Into<String>, default_value: impl Into<String>) -> Self {
        Self::with_option(name, OptionKind::String, default_value.into(), Scalar::Text)
    }

    /// Accepts `true`/`True`/`TRUE`/`1` and `false`/`False`/`FALSE`/`0`.
    pub fn boolean(name: impl Into<String>, default_value: bool) -> Self {
        Self::with_option(
            name,
            OptionKind::Boolean,
            default_value.to_string(),
            Scalar::Boolean(default_value),
        )
    }

    /// Accepts C integer literals: optional sign, `0x` hex, `0` octal.
    pub fn integer(name: impl Into<String>, default_value: i64) -> Self {
        Self::with_option(
            name,
            OptionKind::Integer,
            default_value.to_string(),
            Scalar::Integer(default_value),
        )
    }

    /// A string option that only accepts one of `choices`.
    ///
    /// # Panics
    ///
    /// If `choices` is empty, contains duplicates, or does not contain
    /// `default_value`.
    pub fn choice<I, S>(name: impl Into<String>, choices: I, default_value: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let default_value = default_value.into();
        let choices: Vec<String> = choices.into_iter().map(Into::into).collect();
        let set: BTreeSet<String> = choices.iter().cloned().collect();

        assert!(!set.is_empty(), "choice option '{name}' needs at least one choice");
        assert_eq!(
            set.len(),
            choices.len(),
            "choice option '{name}' has duplicate choices"
        );
        assert!(
            set.contains(&default_value),
            "default '{default_value}' of choice option '{name}' is not one of its choices"
        );

        Self::with_option(name, OptionKind::Choice(set), default_value, Scalar::Text)
    }

    /// An integer option bounded to `[minimum, maximum]`.
    ///
    /// # Panics
    ///
    /// If `default_value` lies outside the bounds.
    pub fn range(name: impl Into<String>, minimum: i64, maximum: i64, default_value: i64) -> Self {
        let name = name.into();
        assert!(
            minimum <= default_value && default_value <= maximum,
            "default {default_value} of range option '{name}' is outside [{minimum}, {maximum}]"
        );
        Self::with_option(
            name,
            OptionKind::Range {
                minimum,
                maximum,
                choices: BTreeSet::new(),
            },
            default_value.to_string(),
            Scalar::Integer(default_value),
        )
    }

    /// An integer option that only accepts one of `choices`.
    ///
    /// # Panics
    ///
    /// If `choices` is empty, contains duplicates, or does not contain
    /// `default_value`.
    pub fn range_choices(
        name: impl Into<String>,
        choices: impl IntoIterator<Item = i64>,
        default_value: i64,
    ) -> Self {
        let name = name.into();
        let choices: Vec<i64> = choices.into_iter().collect();
        let set: BTreeSet<i64> = choices.iter().copied().collect();

        assert!(!set.is_empty(), "range option '{name}' needs at least one choice");
        assert_eq!(
            set.len(),
            choices.len(),
            "range option '{name}' has duplicate choices"
        );
        assert!(
            set.contains(&default_value),
            "default {default_value} of range option '{name}' is not one of its choices"
        );

        Self::with_option(
            name,
            OptionKind::Range {
                minimum: i64::MIN,
                maximum: i64::MAX,
                choices: set,
            },
            default_value.to_string(),
            Scalar::Integer(default_value),
        )
    }

    /// Wrap an option so it may occur any number of times.
    ///
    /// Name, short name and description are taken from `option`.
    ///
    /// # Panics
    ///
    /// If `option` is a flag, a command or already repeated.
    pub fn repeated(option: Argument<'_>) -> Self {
        let Argument {
            name,
            short_name,
            description,
            kind,
            ..
        } = option;
        let Kind::Option(template) = kind else {
            panic!("repeated argument '{name}' must wrap an option");
        };
        Self {
            name,
            short_name,
            description,
            is_set: Cell::new(false),
            kind: Kind::Repeated {
                template,
                values: RefCell::new(Vec::new()),
            },
        }
    }

    /// A sub-command with its own set of arguments.
    pub fn command(name: impl Into<String>) -> Self {
        Self::with_kind(name, Kind::Command(RefCell::new(Parser::new())))
    }

    pub fn short(mut self, short_name: impl Into<String>) -> Self {
        self.short_name = short_name.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl<'a> Argument<'a> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Short name used with a single dash; empty when there is none.
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    pub fn help(&self) -> &str {
        &self.description
    }

    /// Whether the most recent parse matched this argument.
    pub fn is_set(&self) -> bool {
        self.is_set.get()
    }

    pub fn capability(&self) -> Capability {
        match &self.kind {
            Kind::Flag => Capability::Flag,
            Kind::Command(_) => Capability::Command,
            Kind::Repeated { .. } => Capability::Repeated,
            Kind::Option(option) => option.capability(),
        }
    }

    pub fn is_flag(&self) -> bool {
        matches!(self.kind, Kind::Flag)
    }

    pub fn is_command(&self) -> bool {
        matches!(self.kind, Kind::Command(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.kind, Kind::Repeated { .. })
    }

    pub fn is_boolean(&self) -> bool {
        match self.option() {
            Some(option) => matches!(option.kind, OptionKind::Boolean),
            None => !self.is_array(),
        }
    }

    pub fn is_integer(&self) -> bool {
        self.option().is_some_and(|option| {
            matches!(option.kind, OptionKind::Integer | OptionKind::Range { .. })
        })
    }

    pub fn is_string(&self) -> bool {
        self.option().is_some()
    }

    /// # Panics
    ///
    /// If the argument is not a flag, a command or a boolean option.
    pub fn value_boolean(&self) -> bool {
        match (&self.kind, self.option().map(|o| o.value.get())) {
            (Kind::Flag | Kind::Command(_), _) => self.is_set(),
            (_, Some(Scalar::Boolean(value))) => value,
            _ => panic!("{} is not convertible to a boolean.", self.name),
        }
    }

    /// # Panics
    ///
    /// If the argument is not an integer or range option.
    pub fn value_integer(&self) -> i64 {
        match self.option().map(|o| o.value.get()) {
            Some(Scalar::Integer(value)) => value,
            _ => panic!("{} is not convertible to an integer.", self.name),
        }
    }

    /// Textual value of any option, exactly as given on the command line.
    ///
    /// # Panics
    ///
    /// If the argument is a flag or a command.
    pub fn value_string(&self) -> String {
        match self.option() {
            Some(option) => option.text.borrow().clone(),
            None => panic!("{} is not convertible to a string.", self.name),
        }
    }

    /// Number of occurrences collected by a repeated option.
    ///
    /// # Panics
    ///
    /// If the argument is not repeated.
    pub fn array_size(&self) -> usize {
        self.repeated_values().borrow().len()
    }

    /// One occurrence of a repeated option, in command-line order.
    ///
    /// # Panics
    ///
    /// If the argument is not repeated or `index` is out of bounds.
    pub fn value_array(&self, index: usize) -> Ref<'_, Argument<'static>> {
        Ref::map(self.repeated_values().borrow(), |values| &values[index])
    }

    /// All occurrences of a repeated option.
    ///
    /// # Panics
    ///
    /// If the argument is not repeated.
    pub fn values(&self) -> Ref<'_, [Argument<'static>]> {
        Ref::map(self.repeated_values().borrow(), Vec::as_slice)
    }

    /// Register `arg` with this command's nested parser.
    ///
    /// # Panics
    ///
    /// If this argument is not a command.
    pub fn add_argument(&self, arg: &'a Argument<'a>) -> Result<Registration, RegistrationError> {
        self.command_parser().borrow_mut().add_argument(arg)
    }

    /// The nested parser of a command: its arguments, the command line it
    /// saw (starting at the command name) and what it left unconsumed.
    ///
    /// # Panics
    ///
    /// If this argument is not a command.
    pub fn subcommand(&self) -> Ref<'_, Parser<'a>> {
        self.command_parser().borrow()
    }

    fn option(&self) -> Option<&OptionArg> {
        match &self.kind {
            Kind::Option(option) | Kind::Repeated { template: option, .. } => Some(option),
            Kind::Flag | Kind::Command(_) => None,
        }
    }

    fn repeated_values(&self) -> &RefCell<Vec<Argument<'static>>> {
        match &self.kind {
            Kind::Repeated { values, .. } => values,
            _ => panic!("{} is not an array.", self.name),
        }
    }

    fn command_parser(&self) -> &RefCell<Parser<'a>> {
        match &self.kind {
            Kind::Command(parser) => parser,
            _ => panic!("{} is not a command.", self.name),
        }
    }
}

// Parsing entry points, driven by `Parser`.
impl<'a> Argument<'a> {
    /// Try to match the front of `tokens`.
    ///
    /// Returns the number of tokens consumed, `0` when the tokens are not
    /// meant for this argument, or an error when they are but are malformed.
    pub(crate) fn parse(&self, tokens: &[String], report: &mut Report) -> ParseResult<usize> {
        match &self.kind {
            Kind::Flag => Ok(self.parse_long_flag(tokens)),
            Kind::Option(option) => self.parse_option(option, tokens),
            Kind::Repeated { template, values } => {
                let instance = self.instantiate(template);
                let consumed = instance.parse(tokens, report)?;
                if consumed > 0 {
                    values.borrow_mut().push(instance);
                    self.is_set.set(true);
                }
                Ok(consumed)
            }
            Kind::Command(parser) => self.parse_command(parser, tokens, report),
        }
    }

    /// Length in bytes of this flag's short name if `cluster` starts with it.
    pub(crate) fn match_short_flag(&self, cluster: &str) -> usize {
        if self.is_flag() && !self.short_name.is_empty() && cluster.starts_with(&self.short_name) {
            self.short_name.len()
        } else {
            0
        }
    }

    pub(crate) fn mark_set(&self) {
        self.is_set.set(true);
    }

    /// Forget everything recorded by a previous parse.
    pub(crate) fn reset(&self) {
        self.is_set.set(false);
        match &self.kind {
            Kind::Flag => {}
            Kind::Option(option) => option.reset(),
            Kind::Repeated { values, .. } => values.borrow_mut().clear(),
            Kind::Command(parser) => parser.borrow_mut().reset(),
        }
    }

    fn parse_long_flag(&self, tokens: &[String]) -> usize {
        match tokens.first().and_then(|t| t.strip_prefix("--")) {
            Some(name) if name == self.name => {
                self.is_set.set(true);
                1
            }
            _ => 0,
        }
    }

    fn parse_option(&self, option: &OptionArg, tokens: &[String]) -> ParseResult<usize> {
        let Some((consumed, text)) = self.match_value(tokens)? else {
            return Ok(0);
        };
        if self.is_set() {
            return Err(ParseError::Repeated(self.name.clone()));
        }

        let value = option.convert(&self.name, text)?;
        option.record(text, value);
        self.is_set.set(true);
        Ok(consumed)
    }

    /// Locate the option's value: `--name=value`, `--name value`,
    /// `-svalue` or `-s value`.
    fn match_value<'t>(&self, tokens: &'t [String]) -> ParseResult<Option<(usize, &'t str)>> {
        let Some(token) = tokens.first() else {
            return Ok(None);
        };

        let is_long = token.starts_with("--");
        let prefix = if is_long || self.short_name.is_empty() {
            format!("--{}", self.name)
        } else {
            format!("-{}", self.short_name)
        };
        let Some(rest) = token.strip_prefix(prefix.as_str()) else {
            return Ok(None);
        };

        if is_long {
            if let Some(value) = rest.strip_prefix('=') {
                return Ok(Some((1, value)));
            }
        } else if !rest.is_empty() {
            return Ok(Some((1, rest)));
        }

        if !rest.is_empty() {
            return Ok(None);
        }
        match tokens.get(1) {
            Some(value) => Ok(Some((2, value.as_str()))),
            None => Err(ParseError::MissingValue(self.name.clone())),
        }
    }

    fn parse_command(
        &self,
        parser: &RefCell<Parser<'a>>,
        tokens: &[String],
        report: &mut Report,
    ) -> ParseResult<usize> {
        if tokens.first() != Some(&self.name) {
            return Ok(0);
        }

        tracing::debug!(command = %self.name, tokens = tokens.len(), "sub-command captured remainder");
        parser
            .borrow_mut()
            .run(CommandLine::from(tokens.to_vec()), report)?;
        self.is_set.set(true);
        Ok(tokens.len())
    }

    fn instantiate(&self, template: &OptionArg) -> Argument<'static> {
        let option = template.clone();
        option.reset();
        Argument {
            name: self.name.clone(),
            short_name: self.short_name.clone(),
            description: self.description.clone(),
            is_set: Cell::new(false),
            kind: Kind::Option(option),
        }
    }
}

impl OptionArg {
    fn capability(&self) -> Capability {
        match self.kind {
            OptionKind::String => Capability::String,
            OptionKind::Boolean => Capability::Boolean,
            OptionKind::Integer => Capability::Integer,
            OptionKind::Choice(_) => Capability::Choice,
            OptionKind::Range { .. } => Capability::Range,
        }
    }

    fn convert(&self, name: &str, text: &str) -> ParseResult<Scalar> {
        match &self.kind {
            OptionKind::String => Ok(Scalar::Text),
            OptionKind::Choice(choices) => {
                if choices.contains(text) {
                    Ok(Scalar::Text)
                } else {
                    Err(ParseError::InvalidChoice {
                        name: name.to_string(),
                        value: text.to_string(),
                    })
                }
            }
            OptionKind::Boolean => parse_boolean(text).map(Scalar::Boolean).ok_or_else(|| {
                ParseError::InvalidBoolean {
                    name: name.to_string(),
                    value: text.to_string(),
                }
            }),
            OptionKind::Integer => convert_integer(name, text).map(Scalar::Integer),
            OptionKind::Range {
                minimum,
                maximum,
                choices,
            } => {
                let value = convert_integer(name, text)?;
                let in_bounds = *minimum <= value && value <= *maximum;
                if in_bounds && (choices.is_empty() || choices.contains(&value)) {
                    Ok(Scalar::Integer(value))
                } else {
                    Err(ParseError::OutOfRange {
                        name: name.to_string(),
                        value: text.to_string(),
                    })
                }
            }
        }
    }

    fn record(&self, text: &str, value: Scalar) {
        *self.text.borrow_mut() = text.to_string();
        self.value.set(value);
    }

    fn reset(&self) {
        self.text.replace(self.default_text.clone());
        self.value.set(self.default);
    }
}

fn convert_integer(name: &str, text: &str) -> ParseResult<i64> {
    parse_integer(text).map_err(|err| match err {
        IntegerError::Empty => ParseError::InvalidInteger {
            name: name.to_string(),
            value: text.to_string(),
        },
        IntegerError::Trailing(rest) => ParseError::TrailingCharacters {
            name: name.to_string(),
            rest,
        },
        IntegerError::Overflow => ParseError::IntegerOverflow {
            name: name.to_string(),
            value: text.to_string(),
        },
    })
}
