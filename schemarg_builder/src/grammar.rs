use indexmap::IndexMap;
use std::collections::HashMap;

use crate::constant::*;
use crate::error::{ConversionError, SchemaError, UsageError};
use crate::matcher::{ArgumentConfig, Bound, OptionConfig};
use crate::model::Nargs;
use crate::parser::*;
use crate::schema::{FieldDescriptor, Schema};
use crate::types::{resolve, ResolvedShape};
use crate::value::Value;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// One registered flag or positional argument.
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    field: String,
    flag: String,
    short: Option<char>,
    positional: bool,
    required: bool,
    help: String,
    shape: ResolvedShape,
}

impl Entry {
    pub(crate) fn field(&self) -> &str {
        &self.field
    }

    pub(crate) fn shape(&self) -> &ResolvedShape {
        &self.shape
    }

    pub(crate) fn is_required(&self) -> bool {
        self.required
    }
}

/// The flags and positionals of a schema, registered with the token matching engine.
///
/// Sub-command grammars nest; exactly one is active per invocation, selected by the first token the discriminator takes.
#[derive(Debug, Clone)]
pub struct Grammar {
    program: String,
    description: Option<String>,
    entries: Vec<Entry>,
    subcommands: IndexMap<String, Grammar>,
    subcommand_required: bool,
}

/// The converted values of one grammar level.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct Parsed {
    pub values: IndexMap<String, Value>,
    pub extras: Vec<String>,
    pub subcommand: Option<(String, Box<Parsed>)>,
}

#[derive(Debug)]
pub(crate) enum Failure {
    Help(String),
    Usage(UsageError, ErrorContext),
}

/// How the merge engine sees a grammar level: which flags exist and how many tokens each takes.
#[derive(Debug, Clone, Default)]
pub(crate) struct FlagTable {
    pub options: HashMap<String, Nargs>,
    pub shorts: HashMap<char, String>,
    pub subcommands: IndexMap<String, FlagTable>,
    pub positionals: bool,
}

impl Grammar {
    /// Register every field of `schema` (and its sub-commands), failing on malformed declarations.
    pub fn build(schema: &Schema) -> Result<Self, SchemaError> {
        let mut entries = Vec::default();

        for field in &schema.fields {
            let shape = resolve(field, &schema.settings, &schema.registry)?;
            let required = field.is_required() && shape.switch().is_none();
            let help = help_line(field, &shape, required);
            let entry = Entry {
                field: field.name.clone(),
                flag: field.flag_name(&schema.settings),
                short: field.flag.short,
                positional: field.flag.positional,
                required,
                help,
                shape,
            };
            #[cfg(feature = "tracing_debug")]
            {
                debug!(
                    "Registering '{}' as {}{} (nargs={}, required={}).",
                    entry.field,
                    if entry.positional { "" } else { "--" },
                    entry.flag,
                    entry.shape.nargs(),
                    entry.required
                );
            }
            entries.push(entry);
        }

        let mut subcommands = IndexMap::default();

        for (name, sub_schema) in &schema.subcommands {
            subcommands.insert(name.clone(), Grammar::build(sub_schema)?);
        }

        let grammar = Self {
            program: schema.program.clone(),
            description: schema.description.clone(),
            entries,
            subcommands,
            subcommand_required: schema.subcommand_required,
        };

        // Registering with the engine is what detects clashing flags, shorts included.
        grammar.parser(false)?;
        Ok(grammar)
    }

    #[allow(missing_docs)]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The sub-command names, in declaration order.
    pub fn subcommand_names(&self) -> Vec<String> {
        self.subcommands.keys().cloned().collect()
    }

    pub(crate) fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub(crate) fn subcommand(&self, name: &str) -> Option<&Grammar> {
        self.subcommands.get(name)
    }

    /// The rendered `-h/--help` output.
    pub fn help(&self) -> String {
        let interface = InMemoryInterface::default();
        self.printer().print_help(&self.program, &interface);
        interface.consume_message()
    }

    pub(crate) fn flag_table(&self) -> FlagTable {
        let mut table = FlagTable::default();
        table
            .options
            .insert(HELP_NAME.to_string(), Nargs::Precisely(0));
        table.shorts.insert(HELP_SHORT, HELP_NAME.to_string());

        for entry in self.entries.iter().filter(|e| !e.positional) {
            table.options.insert(entry.flag.clone(), entry.shape.nargs());

            if let Some(short) = entry.short {
                table.shorts.insert(short, entry.flag.clone());
            }
        }

        for (name, grammar) in &self.subcommands {
            table.subcommands.insert(name.clone(), grammar.flag_table());
        }

        table.positionals = self.entries.iter().any(|e| e.positional);

        table
    }

    fn parser(&self, known_only: bool) -> Result<Parser, SchemaError> {
        let mut options = Vec::default();
        let mut arguments = Vec::default();

        for entry in &self.entries {
            let bound = Bound::from(entry.shape.nargs());

            if entry.positional {
                arguments.push(ArgumentConfig::new(entry.flag.clone(), bound));
            } else {
                options.push(OptionConfig::new(entry.flag.clone(), entry.short, bound));
            }
        }

        let discriminator = if self.subcommands.is_empty() {
            None
        } else {
            // Optional at the matching level; a missing required sub-command is reported by name below.
            Some(ArgumentConfig::new(SUBCOMMAND_NAME, Bound::Range(0, 1)))
        };

        Parser::new(options, arguments, discriminator, known_only)
    }

    fn printer(&self) -> Printer {
        let (options, arguments) = self.parameters();
        Printer::terminal(self.description.clone(), options, arguments)
            .with_subcommands(self.subcommand_lines(), self.subcommand_required)
    }

    fn parameters(&self) -> (Vec<OptionParameter>, Vec<ArgumentParameter>) {
        let mut options = Vec::default();
        let mut arguments = Vec::default();

        for entry in &self.entries {
            let choices = entry.shape.choices().unwrap_or_default();

            if entry.positional {
                arguments.push(ArgumentParameter::new(
                    entry.flag.clone(),
                    entry.shape.nargs(),
                    Some(entry.help.clone()),
                    choices,
                ));
            } else {
                options.push(OptionParameter::new(
                    entry.flag.clone(),
                    entry.short,
                    entry.shape.nargs(),
                    entry.required,
                    Some(entry.help.clone()),
                    choices,
                ));
            }
        }

        (options, arguments)
    }

    fn subcommand_lines(&self) -> Vec<(String, Option<String>)> {
        self.subcommands
            .iter()
            .map(|(name, grammar)| (name.clone(), grammar.description.clone()))
            .collect()
    }

    /// Match and convert `tokens`.
    ///
    /// Conversion failures are gathered across every field before reporting.
    pub(crate) fn parse(&self, tokens: &[&str], known_only: bool) -> Result<Parsed, Failure> {
        let parser = self
            .parser(known_only)
            .expect("internal error - the grammar was validated when built");

        let (matches, discriminee, remaining) = match parser.consume(tokens) {
            Ok(Action::Continue {
                matches,
                discriminee,
                remaining,
            }) => (matches, discriminee, remaining),
            Ok(Action::PrintHelp) => {
                return Err(Failure::Help(self.help()));
            }
            Err((offset, error)) => {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Parse of '{}' failed at {offset}: {error}", self.program);
                }
                return Err(Failure::Usage(error, ErrorContext::new(offset, tokens)));
            }
        };

        let mut values = IndexMap::default();
        let mut errors: Vec<ConversionError> = Vec::default();
        let mut error_offset: Option<usize> = None;

        for entry in &self.entries {
            if let Some(match_tokens) = matches.get(&entry.flag) {
                match entry.shape.convert(&entry.field, &match_tokens.tokens()) {
                    Ok(value) => {
                        values.insert(entry.field.clone(), value);
                    }
                    Err(error) => {
                        errors.push(error);

                        if error_offset.is_none() {
                            error_offset = match_tokens.offset();
                        }
                    }
                }
            }
        }

        if !errors.is_empty() {
            return Err(Failure::Usage(
                UsageError::Conversions(errors),
                ErrorContext::new(error_offset.unwrap_or_default(), tokens),
            ));
        }

        let mut parsed = Parsed {
            values,
            extras: matches.extras,
            subcommand: None,
        };

        match discriminee {
            Some((offset, variant)) => match self.subcommands.get(&variant) {
                Some(grammar) => {
                    let remaining: Vec<&str> = remaining.iter().map(AsRef::as_ref).collect();
                    let mut sub_parsed = grammar.parse(remaining.as_slice(), known_only)?;
                    parsed.extras.append(&mut sub_parsed.extras);
                    parsed.subcommand.replace((variant, Box::new(sub_parsed)));
                }
                None => {
                    return Err(Failure::Usage(
                        UsageError::UnknownSubcommand(variant),
                        ErrorContext::new(offset, tokens),
                    ));
                }
            },
            None => {
                if !self.subcommands.is_empty() && self.subcommand_required {
                    let total = tokens.iter().map(|t| t.len()).sum();
                    return Err(Failure::Usage(
                        UsageError::MissingSubcommand(self.subcommand_names().join(", ")),
                        ErrorContext::new(total, tokens),
                    ));
                }
            }
        }

        #[cfg(feature = "tracing_debug")]
        {
            debug!(
                "Parsed '{}': {} value(s), {} extra token(s).",
                self.program,
                parsed.values.len(),
                parsed.extras.len()
            );
        }

        Ok(parsed)
    }
}

fn help_line(field: &FieldDescriptor, shape: &ResolvedShape, required: bool) -> String {
    let summary = if required {
        format!("({}, required)", shape.type_name())
    } else {
        match &field.default {
            Some(default) => format!("({}, default={})", shape.type_name(), default.render()),
            None => format!("({})", shape.type_name()),
        }
    };

    match &field.help {
        Some(help) => format!("{summary} {help}"),
        None => summary,
    }
}
