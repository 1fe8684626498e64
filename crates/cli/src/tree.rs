use anyhow::{Context, Result, bail};
use argtree::{Argument, Parser};
use argtree_schema::{ArgumentKind, ArgumentSchema, CommandSchema};

/// Build the declaration tree described by `schema`.
///
/// Declarations are leaked: the tool parses exactly once and exits, and the
/// parser borrows every declaration for its whole lifetime.
pub fn build(schema: &CommandSchema) -> Result<Parser<'static>> {
    let mut parser = Parser::new();
    for decl in &schema.arguments {
        let arg = declare(decl)?;
        parser
            .add_argument(arg)
            .with_context(|| format!("failed to register '{}'", decl.name))?;
    }
    tracing::debug!(schema = %schema.name, arguments = parser.len(), "built declaration tree");
    Ok(parser)
}

fn declare(decl: &ArgumentSchema) -> Result<&'static Argument<'static>> {
    let arg = match &decl.kind {
        ArgumentKind::Command { arguments } => {
            let command = leak(describe(Argument::command(&decl.name), decl));
            for child in arguments {
                command
                    .add_argument(declare(child)?)
                    .with_context(|| format!("failed to register '{}/{}'", decl.name, child.name))?;
            }
            return Ok(command);
        }
        ArgumentKind::Repeated { of } => Argument::repeated(option(&decl.name, of)?),
        kind => option(&decl.name, kind)?,
    };
    Ok(leak(describe(arg, decl)))
}

fn option(name: &str, kind: &ArgumentKind) -> Result<Argument<'static>> {
    let arg = match kind {
        ArgumentKind::Flag => Argument::flag(name),
        ArgumentKind::String { default } => Argument::string(name, default.as_str()),
        ArgumentKind::Boolean { default } => Argument::boolean(name, *default),
        ArgumentKind::Integer { default } => Argument::integer(name, *default),
        ArgumentKind::Choice { choices, default } => {
            Argument::choice(name, choices.iter().cloned(), default.as_str())
        }
        ArgumentKind::Range {
            min,
            max,
            choices,
            default,
        } if choices.is_empty() => {
            let (min, max) = ArgumentKind::range_bounds(*min, *max);
            Argument::range(name, min, max, *default)
        }
        ArgumentKind::Range {
            choices, default, ..
        } => Argument::range_choices(name, choices.iter().copied(), *default),
        ArgumentKind::Repeated { .. } | ArgumentKind::Command { .. } => {
            bail!("'{name}' cannot repeat a {}", kind.type_name())
        }
    };
    Ok(arg)
}

fn describe(arg: Argument<'static>, decl: &ArgumentSchema) -> Argument<'static> {
    let arg = match decl.short.as_deref() {
        Some(short) if !short.is_empty() => arg.short(short),
        _ => arg,
    };
    arg.description(decl.description.as_str())
}

fn leak(arg: Argument<'static>) -> &'static Argument<'static> {
    Box::leak(Box::new(arg))
}
