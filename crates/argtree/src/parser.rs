//! Argument registry and dispatcher.
//!
//! A [`Parser`] borrows declarations, indexes them by name and short name and
//! routes each command-line token to the declaration that claims it. Tokens
//! nobody claims stay in [`Parser::remaining`] in their original order.

use crate::argument::Argument;
use crate::command_line::CommandLine;
use crate::error::{ParseError, ParseResult, RegistrationError};
use crate::report::Report;
use indexmap::IndexMap;
use std::ops::Index;

/// Outcome of a successful [`Parser::add_argument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Added,
    /// The very same declaration was registered before; nothing changed.
    ///
    /// This is the "The argument with name '<name>' has already been added
    /// to the parser." warning. Registration has no [`Report`], so the text
    /// is only logged.
    AlreadyAdded,
}

#[derive(Debug, Default)]
pub struct Parser<'a> {
    arguments: IndexMap<String, &'a Argument<'a>>,
    short_arguments: IndexMap<String, &'a Argument<'a>>,
    flags: Vec<&'a Argument<'a>>,
    commands: Vec<&'a Argument<'a>>,
    command_line: CommandLine,
    remaining: CommandLine,
}

impl<'a> Parser<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a declaration.
    ///
    /// Names must be non-empty, must not contain `=` and must be unique.
    /// A short name may not be a prefix of another short name (or the other
    /// way around), otherwise clusters such as `-ab` would be ambiguous.
    pub fn add_argument(
        &mut self,
        arg: &'a Argument<'a>,
    ) -> Result<Registration, RegistrationError> {
        let result = self.register(arg);
        match &result {
            Ok(Registration::AlreadyAdded) => {
                tracing::warn!(name = arg.name(), "argument has already been added to the parser");
            }
            Err(err) => tracing::warn!(name = arg.name(), "{err}"),
            Ok(Registration::Added) => {}
        }
        result
    }

    fn register(&mut self, arg: &'a Argument<'a>) -> Result<Registration, RegistrationError> {
        let name = arg.name();
        if name.is_empty() {
            return Err(RegistrationError::EmptyName);
        }
        if name.contains('=') {
            return Err(RegistrationError::InvalidName(name.to_string()));
        }
        if let Some(existing) = self.arguments.get(name) {
            if std::ptr::eq(*existing, arg) {
                return Ok(Registration::AlreadyAdded);
            }
            return Err(RegistrationError::DuplicateName(name.to_string()));
        }

        let short_name = arg.short_name();
        if !short_name.is_empty() {
            let conflict = self.short_arguments.values().find(|existing| {
                existing.short_name().starts_with(short_name)
                    || short_name.starts_with(existing.short_name())
            });
            if let Some(existing) = conflict {
                return Err(RegistrationError::ShortNameConflict {
                    name: name.to_string(),
                    short_name: short_name.to_string(),
                    existing: existing.name().to_string(),
                    existing_short_name: existing.short_name().to_string(),
                });
            }
            self.short_arguments.insert(short_name.to_string(), arg);
        }

        self.arguments.insert(name.to_string(), arg);
        if arg.is_flag() {
            self.flags.push(arg);
        } else if arg.is_command() {
            self.commands.push(arg);
        }
        Ok(Registration::Added)
    }

    /// Parse `command_line` into the registered declarations.
    ///
    /// Every declaration is reset first, so parsing is repeatable. Warnings
    /// are appended to `report` as they happen; a fatal error is appended
    /// once and also returned. After an error, already-matched declarations
    /// keep their values but [`remaining`](Self::remaining) is empty.
    pub fn parse(&mut self, command_line: &CommandLine, report: &mut Report) -> ParseResult<()> {
        let result = self.run(command_line.clone(), report);
        if let Err(err) = &result {
            report.error(err.to_string());
        }
        result
    }

    /// Shared by top-level parses and sub-commands. Errors are not recorded
    /// here so a nested failure lands in the report exactly once.
    pub(crate) fn run(&mut self, command_line: CommandLine, report: &mut Report) -> ParseResult<()> {
        tracing::debug!(argc = command_line.argc(), "parsing command line");
        self.reset();

        let mut args = command_line.as_slice().to_vec();
        self.command_line = command_line;

        let mut index = 0;
        while index < args.len() {
            let token = args[index].as_str();
            tracing::trace!(index, token, "classifying token");

            if token == "--" {
                args.remove(index);
                break;
            } else if token.starts_with("--") {
                let consumed = self.parse_long(&args[index..], report)?;
                args.drain(index..index + consumed);
            } else if token.starts_with('-') {
                let consumed = self.parse_short(&args[index..], report)?;
                args.drain(index..index + consumed);
            } else {
                let consumed = self.parse_command(&args[index..], report)?;
                if consumed > 0 {
                    args.drain(index..index + consumed);
                    break;
                }
                index += 1;
            }
        }

        self.remaining = CommandLine::from(args);
        tracing::debug!(remaining = self.remaining.argc(), "parsed command line");
        Ok(())
    }

    /// `--name`, `--name=value` or `--name value`.
    fn parse_long(&self, tokens: &[String], report: &mut Report) -> ParseResult<usize> {
        for arg in self.arguments.values() {
            let was_set = arg.is_set();
            let consumed = arg.parse(tokens, report)?;
            if consumed > 0 {
                if was_set && arg.is_flag() {
                    warn_flag_repeated(arg, report);
                }
                return Ok(consumed);
            }
        }
        Err(ParseError::UnknownOption(tokens[0][2..].to_string()))
    }

    /// `-svalue` / `-s value` for short-named options, otherwise a cluster of
    /// short flags. Options win because they are tried first.
    fn parse_short(&self, tokens: &[String], report: &mut Report) -> ParseResult<usize> {
        for arg in self.short_arguments.values().filter(|arg| !arg.is_flag()) {
            let consumed = arg.parse(tokens, report)?;
            if consumed > 0 {
                return Ok(consumed);
            }
        }
        self.parse_flags(&tokens[0], report)?;
        Ok(1)
    }

    fn parse_flags(&self, token: &str, report: &mut Report) -> ParseResult<()> {
        let mut cluster = &token[1..];
        let mut invalid = String::new();

        while let Some(c) = cluster.chars().next() {
            let matched = self.flags.iter().find_map(|flag| {
                let len = flag.match_short_flag(cluster);
                (len > 0).then_some((*flag, len))
            });
            match matched {
                Some((flag, len)) => {
                    if flag.is_set() {
                        warn_flag_repeated(flag, report);
                    }
                    flag.mark_set();
                    cluster = &cluster[len..];
                }
                None => {
                    invalid.push(c);
                    cluster = &cluster[c.len_utf8()..];
                }
            }
        }

        if invalid.is_empty() {
            Ok(())
        } else {
            Err(ParseError::InvalidFlags(invalid))
        }
    }

    fn parse_command(&self, tokens: &[String], report: &mut Report) -> ParseResult<usize> {
        for command in &self.commands {
            let consumed = command.parse(tokens, report)?;
            if consumed > 0 {
                return Ok(consumed);
            }
        }
        Ok(0)
    }

    pub(crate) fn reset(&mut self) {
        for arg in self.arguments.values() {
            arg.reset();
        }
        self.command_line = CommandLine::default();
        self.remaining = CommandLine::default();
    }

    /// Look up a registered declaration by its long name.
    pub fn get(&self, name: &str) -> Option<&'a Argument<'a>> {
        self.arguments.get(name).copied()
    }

    /// Registered declarations in registration order.
    pub fn arguments(&self) -> impl Iterator<Item = &'a Argument<'a>> + '_ {
        self.arguments.values().copied()
    }

    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    /// Number of tokens in the most recently parsed command line.
    pub fn argc(&self) -> usize {
        self.command_line.argc()
    }

    pub fn argv(&self, index: usize) -> Option<&str> {
        self.command_line.argv(index)
    }

    /// Number of tokens no declaration claimed.
    pub fn remaining_argc(&self) -> usize {
        self.remaining.argc()
    }

    pub fn remaining_argv(&self, index: usize) -> Option<&str> {
        self.remaining.argv(index)
    }

    pub fn command_line(&self) -> &CommandLine {
        &self.command_line
    }

    pub fn remaining(&self) -> &CommandLine {
        &self.remaining
    }
}

impl<'a> Index<&str> for Parser<'a> {
    type Output = Argument<'a>;

    /// # Panics
    ///
    /// If no declaration named `name` is registered.
    fn index(&self, name: &str) -> &Self::Output {
        self.get(name)
            .unwrap_or_else(|| panic!("no argument named '{name}' has been added to the parser"))
    }
}

fn warn_flag_repeated(flag: &Argument<'_>, report: &mut Report) {
    report.warning(format!(
        "The flag with name '{}' was set more than once.",
        flag.name()
    ));
}
