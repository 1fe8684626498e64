use argtree::{Argument, Capability, CommandLine, Parser, Report};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// JSON document printed by `argtree parse`.
#[derive(Debug, Serialize)]
pub struct Outcome<'p> {
    pub ok: bool,
    pub report: &'p Report,
    pub arguments: IndexMap<String, ArgumentOutcome>,
    pub remaining: &'p CommandLine,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ArgumentOutcome {
    #[serde(rename = "type")]
    pub kind: Capability,
    pub set: bool,
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<CommandOutcome>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CommandOutcome {
    pub command_line: CommandLine,
    pub arguments: IndexMap<String, ArgumentOutcome>,
    pub remaining: CommandLine,
}

impl<'p> Outcome<'p> {
    pub fn new(ok: bool, report: &'p Report, parser: &'p Parser<'_>) -> Self {
        Self {
            ok,
            report,
            arguments: describe(parser),
            remaining: parser.remaining(),
        }
    }
}

fn describe(parser: &Parser<'_>) -> IndexMap<String, ArgumentOutcome> {
    parser
        .arguments()
        .map(|arg| (arg.name().to_string(), ArgumentOutcome::new(arg)))
        .collect()
}

impl ArgumentOutcome {
    fn new(arg: &Argument<'_>) -> Self {
        let command = arg.is_command().then(|| {
            let nested = arg.subcommand();
            CommandOutcome {
                command_line: nested.command_line().clone(),
                arguments: describe(&nested),
                remaining: nested.remaining().clone(),
            }
        });
        Self {
            kind: arg.capability(),
            set: arg.is_set(),
            value: value_of(arg),
            command,
        }
    }
}

fn value_of(arg: &Argument<'_>) -> Value {
    match arg.capability() {
        Capability::Flag | Capability::Command | Capability::Boolean => {
            Value::Bool(arg.value_boolean())
        }
        Capability::Integer | Capability::Range => Value::from(arg.value_integer()),
        Capability::String | Capability::Choice => Value::String(arg.value_string()),
        Capability::Repeated => Value::Array(arg.values().iter().map(value_of).collect()),
    }
}
