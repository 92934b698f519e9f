use indexmap::IndexMap;
use std::env;

use crate::argtype::ArgType;
use crate::error::{Error, MissingRequiredArgumentError, ValidationError, ValueError};
use crate::grammar::{Failure, Grammar, Parsed};
use crate::merge::{layer_defaults, resolve_tokens};
use crate::parser::{ConsoleInterface, ErrorContext, UserInterface};
use crate::schema::{introspect, Definition, HelpSource, NoDocs, Schema};
use crate::value::{Value, ValueMap};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// One materialized result of a parse: the declared fields and their typed values.
///
/// Attributes set outside the schema are kept apart from the fields, and never serialized.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    // Field name to whether it is required, in declaration order.
    declared: IndexMap<String, bool>,
    values: ValueMap,
    attributes: ValueMap,
    extra_args: Vec<String>,
    subcommand: Option<(String, Box<Instance>)>,
    // An unselected instance of each declared sub-command.
    subcommands: IndexMap<String, Instance>,
}

impl Instance {
    /// An instance of `schema` holding only the declared defaults.
    pub fn new(schema: &Schema) -> Self {
        let mut declared = IndexMap::default();
        let mut values = ValueMap::default();

        for field in &schema.fields {
            declared.insert(field.name.clone(), field.is_required());

            if let Some(default) = &field.default {
                values.insert(field.name.clone(), default.clone());
            }
        }

        Self {
            declared,
            values,
            attributes: ValueMap::default(),
            extra_args: Vec::default(),
            subcommand: None,
            subcommands: schema
                .subcommands
                .iter()
                .map(|(name, sub_schema)| (name.clone(), Instance::new(sub_schema)))
                .collect(),
        }
    }

    /// The value of a field (or of an attribute set outside the schema).
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name).or_else(|| self.attributes.get(name))
    }

    /// Set a field, or an attribute when `name` is not a declared field.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();

        if self.declared.contains_key(&name) {
            self.values.insert(name, value.into());
        } else {
            self.attributes.insert(name, value.into());
        }
    }

    /// The value of `name`, converted to `T`.
    pub fn value<T: ArgType>(&self, name: &str) -> Result<T, ValueError> {
        match self.get(name) {
            Some(value) => T::from_value(value.clone()),
            None => Err(ValueError {
                expected: T::annotation().to_string(),
                found: format!("no value for '{name}'"),
            }),
        }
    }

    /// Whether `name` is a declared field.
    pub fn is_declared(&self, name: &str) -> bool {
        self.declared.contains_key(name)
    }

    /// The declared field names, in declaration order.
    pub fn field_names(&self) -> Vec<String> {
        self.declared.keys().cloned().collect()
    }

    /// The required fields that hold no value.
    pub fn missing(&self) -> Vec<String> {
        self.declared
            .iter()
            .filter(|(name, required)| **required && !self.values.contains_key(*name))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// The unrecognized tokens, in known-only mode.
    pub fn extra_args(&self) -> &[String] {
        &self.extra_args
    }

    /// The selected sub-command and its instance.
    pub fn subcommand(&self) -> Option<(&str, &Instance)> {
        self.subcommand
            .as_ref()
            .map(|(name, instance)| (name.as_str(), instance.as_ref()))
    }

    /// The selected sub-command and its instance, for adjustment in a `process` hook.
    pub fn subcommand_mut(&mut self) -> Option<(&str, &mut Instance)> {
        self.subcommand
            .as_mut()
            .map(|(name, instance)| (name.as_str(), instance.as_mut()))
    }

    /// Select the sub-command `name`, holding only its declared defaults.
    ///
    /// Re-selecting the current sub-command keeps its values; an undeclared name selects nothing and returns `false`.
    pub fn select_subcommand(&mut self, name: &str) -> bool {
        if matches!(&self.subcommand, Some((current, _)) if current == name) {
            return true;
        }

        match self.subcommands.get(name) {
            Some(sub_instance) => {
                self.subcommand = Some((name.to_string(), Box::new(sub_instance.clone())));
                true
            }
            None => false,
        }
    }

    pub(crate) fn values(&self) -> &ValueMap {
        &self.values
    }
}

impl std::fmt::Display for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields = self
            .as_dict()
            .iter()
            .map(|(name, value)| format!("{name}: {}", value.render()))
            .collect::<Vec<String>>()
            .join(", ");
        write!(f, "{{{fields}}}")
    }
}

/// User hooks around parsing.
///
/// `configure` runs before the grammar is built, `process` after the instance is materialized.
pub trait Hooks {
    /// Adjust the schema, for example to add fields or change flag options.
    fn configure(&self, _schema: &mut Schema) {}

    /// Validate across fields or derive one field from another.
    /// Any error aborts the parse and is reported verbatim.
    fn process(&self, _instance: &mut Instance) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// No hooks.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl Hooks for NoHooks {}

/// Parse `tokens` against `schema` and build the instance.
///
/// No config files are read and no hooks run; see [`TypedParser`] for the full pipeline.
pub fn materialize(schema: &Schema, tokens: &[&str], known_only: bool) -> Result<Instance, Error> {
    let grammar = Grammar::build(schema)?;
    materialize_grammar(schema, &grammar, tokens, known_only).map_err(|(error, _)| error)
}

fn materialize_grammar(
    schema: &Schema,
    grammar: &Grammar,
    tokens: &[&str],
    known_only: bool,
) -> Result<Instance, (Error, Option<ErrorContext>)> {
    let parsed = grammar
        .parse(tokens, known_only)
        .map_err(|failure| match failure {
            Failure::Help(help) => (Error::HelpRequested(help), None),
            Failure::Usage(error, context) => (Error::Usage(error), Some(context)),
        })?;
    let mut missing = Vec::default();
    let mut instance = fill(schema, grammar, parsed, &mut missing);

    if !missing.is_empty() {
        return Err((MissingRequiredArgumentError(missing).into(), None));
    }

    instance.extra_args.shrink_to_fit();
    Ok(instance)
}

// Matched values first, then declared defaults; a switch that did not appear holds the opposite of its target.
fn fill(schema: &Schema, grammar: &Grammar, mut parsed: Parsed, missing: &mut Vec<String>) -> Instance {
    let mut instance = Instance::new(schema);

    for entry in grammar.entries() {
        let name = entry.field();

        if let Some(value) = parsed.values.shift_remove(name) {
            instance.values.insert(name.to_string(), value);
        } else if instance.values.contains_key(name) {
            // The declared default applies.
        } else if let Some(target) = entry.shape().switch() {
            instance.values.insert(name.to_string(), Value::Bool(!target));
        } else if entry.is_required() {
            missing.push(name.to_string());
        }
    }

    instance.extra_args = parsed.extras;

    if let Some((name, sub_parsed)) = parsed.subcommand {
        let sub_schema = schema.subcommands.get(&name);
        let sub_grammar = grammar.subcommand(&name);

        if let (Some(sub_schema), Some(sub_grammar)) = (sub_schema, sub_grammar) {
            let sub_instance = fill(sub_schema, sub_grammar, *sub_parsed, missing);
            instance.subcommand = Some((name, Box::new(sub_instance)));
        } else {
            unreachable!("internal error - the grammar and schema sub-commands are aligned");
        }
    }

    instance
}

/// The full parse pipeline over a [`Definition`]: introspection, the `configure` hook, grammar build, config file merge, parse, materialization and the `process` hook.
///
/// A parser is consumed by parsing, so it parses exactly once.
pub struct TypedParser {
    definition: Definition,
    docs: Box<dyn HelpSource>,
    hooks: Box<dyn Hooks>,
    explicit: ValueMap,
}

impl std::fmt::Debug for TypedParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedParser")
            .field("definition", &self.definition)
            .field("explicit", &self.explicit)
            .finish()
    }
}

impl TypedParser {
    #[allow(missing_docs)]
    pub fn new(definition: Definition) -> Self {
        Self {
            definition,
            docs: Box::new(NoDocs),
            hooks: Box::new(NoHooks),
            explicit: ValueMap::default(),
        }
    }

    /// Take help text from an external documentation extractor.
    pub fn docs(mut self, docs: impl HelpSource + 'static) -> Self {
        self.docs = Box::new(docs);
        self
    }

    #[allow(missing_docs)]
    pub fn hooks(mut self, hooks: impl Hooks + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    // Call-site values, layered over the declared defaults.
    pub(crate) fn explicit(mut self, explicit: ValueMap) -> Self {
        self.explicit = explicit;
        self
    }

    /// The schema the parser works from, after the `configure` hook.
    pub fn schema(&self) -> Result<Schema, Error> {
        let mut schema = introspect(&self.definition, self.docs.as_ref())?;
        self.hooks.configure(&mut schema);
        let unknown = layer_defaults(&mut schema, &self.explicit);

        if !unknown.is_empty() {
            return Err(Error::UnknownKeyword(unknown));
        }

        Ok(schema)
    }

    /// The rendered `-h/--help` output.
    pub fn help(&self) -> Result<String, Error> {
        Ok(Grammar::build(&self.schema()?)?.help())
    }

    /// Parse `tokens`; unrecognized tokens are an error.
    pub fn parse_tokens(self, tokens: &[&str]) -> Result<Instance, Error> {
        self.run(owned(tokens), false).map_err(|(error, _)| error)
    }

    /// Parse `tokens`, collecting unrecognized tokens into [`Instance::extra_args`].
    pub fn parse_known_tokens(self, tokens: &[&str]) -> Result<Instance, Error> {
        self.run(owned(tokens), true).map_err(|(error, _)| error)
    }

    /// Parse the command line ([`env::args`]).
    ///
    /// On `-h/--help` the help is printed and the process exits with `0`.
    /// On any error the message (and, for usage errors, the offending position) is printed to stderr and the process exits with `1`.
    pub fn parse(self) -> Instance {
        let command_input: Vec<String> = env::args().skip(1).collect();
        self.exit_on_error(command_input, false)
    }

    /// Like [`TypedParser::parse`], but collecting unrecognized tokens into [`Instance::extra_args`].
    pub fn parse_known(self) -> Instance {
        let command_input: Vec<String> = env::args().skip(1).collect();
        self.exit_on_error(command_input, true)
    }

    fn exit_on_error(self, tokens: Vec<String>, known_only: bool) -> Instance {
        match self.invoke(tokens, known_only, &ConsoleInterface::default()) {
            Ok(instance) => instance,
            Err(exit_code) => std::process::exit(exit_code),
        }
    }

    // Reports through the interface, returning the exit code on failure.
    fn invoke(
        self,
        tokens: Vec<String>,
        known_only: bool,
        user_interface: &dyn UserInterface,
    ) -> Result<Instance, i32> {
        match self.run(tokens, known_only) {
            Ok(instance) => Ok(instance),
            Err((Error::HelpRequested(help), _)) => {
                user_interface.print(help);
                Err(0)
            }
            Err((error, context)) => {
                user_interface.print_error(error.to_string());

                if let Some(error_context) = context {
                    user_interface.print_error_context(error_context);
                }

                Err(error.exit_code())
            }
        }
    }

    fn run(
        self,
        command_line: Vec<String>,
        known_only: bool,
    ) -> Result<Instance, (Error, Option<ErrorContext>)> {
        let schema = self.schema().map_err(|error| (error, None))?;
        let grammar = Grammar::build(&schema).map_err(|error| (error.into(), None))?;
        let tokens = resolve_tokens(
            &grammar,
            &schema.config_files,
            schema.settings.legacy_config_parsing,
            &command_line,
        )
        .map_err(|error| (error.into(), None))?;
        let token_refs: Vec<&str> = tokens.iter().map(AsRef::as_ref).collect();
        let mut instance = materialize_grammar(&schema, &grammar, &token_refs, known_only)?;
        self.hooks
            .process(&mut instance)
            .map_err(|error| (error.into(), None))?;
        #[cfg(feature = "tracing_debug")]
        {
            debug!("Materialized '{}': {instance}", schema.program);
        }
        Ok(instance)
    }
}

fn owned(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|s| s.to_string()).collect()
}
