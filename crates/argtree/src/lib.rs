//! Declarative command-line parsing with recursive sub-commands.
//!
//! The caller declares typed [`Argument`]s, registers them with a [`Parser`]
//! and parses a normalized [`CommandLine`]. Results are read back from the
//! declarations themselves. A command declaration owns a nested parser, so
//! `tool --verbose deploy --force target` is parsed as a tree.
//!
//! ```
//! use argtree::{Argument, CommandLine, Parser, Report};
//!
//! let verbose = Argument::flag("verbose").short("v");
//! let level = Argument::range("level", 0, 3, 1);
//! let force = Argument::flag("force").short("f");
//! let deploy = Argument::command("deploy");
//! deploy.add_argument(&force).unwrap();
//!
//! let mut parser = Parser::new();
//! parser.add_argument(&verbose).unwrap();
//! parser.add_argument(&level).unwrap();
//! parser.add_argument(&deploy).unwrap();
//!
//! let mut report = Report::new();
//! let line = CommandLine::split("-v --level=2 deploy -f target");
//! parser.parse(&line, &mut report).unwrap();
//!
//! assert!(verbose.is_set());
//! assert_eq!(level.value_integer(), 2);
//! assert!(deploy.is_set() && force.is_set());
//! assert_eq!(deploy.subcommand().remaining().as_slice(), ["deploy", "target"]);
//! assert_eq!(parser.remaining_argc(), 0);
//! ```

pub mod argument;
pub mod command_line;
pub mod error;
pub mod locale;
pub mod parser;
pub mod report;
pub mod value;

pub use argument::{Argument, Capability};
pub use command_line::CommandLine;
pub use error::{EncodingError, ParseError, ParseResult, RegistrationError};
pub use parser::{Parser, Registration};
pub use report::{Diagnostic, Report, Severity};
