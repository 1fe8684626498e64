//! Canonical UTF-8 command line.
//!
//! Every input form (one shell-style string, a pre-split array, wide or narrow,
//! optionally in a legacy locale encoding) is normalized into the same ordered
//! list of UTF-8 tokens. Probing one past the end yields `None`, the
//! equivalent of `argv[argc] == NULL`.

use crate::error::EncodingError;
use crate::locale;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CommandLine {
    args: Vec<String>,
}

impl CommandLine {
    /// Build from tokens that are already split and UTF-8.
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Split one command-line string using shell-style quoting.
    ///
    /// Tokens are separated by runs of spaces or tabs outside double quotes.
    /// A run of `n` backslashes followed by `"` yields `n / 2` backslashes and,
    /// for odd `n`, a literal quote; for even `n` the quote toggles quoting.
    /// Backslashes anywhere else are literal.
    pub fn split(line: &str) -> Self {
        Self { args: split_line(line) }
    }

    /// Split one UTF-16 command-line string (e.g. `GetCommandLineW`).
    pub fn from_wide(line: &[u16]) -> Result<Self, EncodingError> {
        let line = String::from_utf16(until_nul(line))
            .map_err(|_| EncodingError::InvalidUtf16 { index: 0 })?;
        Ok(Self::split(&line))
    }

    /// Convert pre-split UTF-16 arguments.
    pub fn from_wide_argv(argv: &[&[u16]]) -> Result<Self, EncodingError> {
        let args = argv
            .iter()
            .enumerate()
            .map(|(index, arg)| {
                String::from_utf16(until_nul(arg)).map_err(|_| EncodingError::InvalidUtf16 { index })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { args })
    }

    /// Split one narrow command-line string stored in `locale`'s encoding.
    ///
    /// `None` means the bytes are already UTF-8 and no conversion happens;
    /// `Some("")` uses the process locale.
    pub fn from_bytes(line: &[u8], locale: Option<&str>) -> Result<Self, EncodingError> {
        let encoding = locale::resolve(locale)?;
        let line = locale::decode(until_nul(line), encoding, 0)?;
        Ok(Self::split(&line))
    }

    /// Convert pre-split narrow arguments stored in `locale`'s encoding.
    pub fn from_bytes_argv(argv: &[&[u8]], locale: Option<&str>) -> Result<Self, EncodingError> {
        let encoding = locale::resolve(locale)?;
        let args = argv
            .iter()
            .enumerate()
            .map(|(index, arg)| locale::decode(until_nul(arg), encoding, index))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { args })
    }

    /// The arguments of the current process, program name included.
    pub fn from_env() -> Result<Self, EncodingError> {
        let args = std::env::args_os()
            .enumerate()
            .map(|(index, arg)| {
                arg.into_string()
                    .map_err(|_| EncodingError::InvalidUtf8 { index })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { args })
    }

    pub fn argc(&self) -> usize {
        self.args.len()
    }

    /// Token at `index`, or `None` at and beyond `argc()`.
    pub fn argv(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.args
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.args.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for CommandLine {
    fn from(args: Vec<String>) -> Self {
        Self { args }
    }
}

impl<S: Into<String>> FromIterator<S> for CommandLine {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<'c> IntoIterator for &'c CommandLine {
    type Item = &'c String;
    type IntoIter = std::slice::Iter<'c, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.args.iter()
    }
}

fn until_nul<T: Copy + Default + PartialEq>(units: &[T]) -> &[T] {
    let end = units
        .iter()
        .position(|u| *u == T::default())
        .unwrap_or(units.len());
    &units[..end]
}

fn split_line(line: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        while chars.next_if(|c| *c == ' ' || *c == '\t').is_some() {}
        if chars.peek().is_none() {
            break;
        }

        let mut token = String::new();
        let mut quoted = false;
        while let Some(&c) = chars.peek() {
            match c {
                ' ' | '\t' if !quoted => break,
                '\\' => {
                    let mut backslashes = 0;
                    while chars.next_if_eq(&'\\').is_some() {
                        backslashes += 1;
                    }
                    if chars.peek() == Some(&'"') {
                        token.push_str(&"\\".repeat(backslashes / 2));
                        if backslashes % 2 == 1 {
                            token.push('"');
                            chars.next();
                        }
                    } else {
                        token.push_str(&"\\".repeat(backslashes));
                    }
                }
                '"' => {
                    quoted = !quoted;
                    chars.next();
                }
                _ => {
                    token.push(c);
                    chars.next();
                }
            }
        }
        args.push(token);
    }

    args
}
