use indexmap::IndexMap;
use std::collections::VecDeque;
use std::env;

use crate::argtype::ArgType;
use crate::error::{Error, ValueError};
use crate::materialize::{Instance, TypedParser};
use crate::parser::{ConsoleInterface, UserInterface};
use crate::schema::{Definition, HelpSource, Schema};
use crate::value::{Value, ValueMap};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// The parsed arguments handed to a function target.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Arguments {
    /// Values of the positional-only parameters, in declaration order.
    pub positional: VecDeque<Value>,
    /// Values of the remaining parameters, by name.
    pub keywords: ValueMap,
    /// Unrecognized `--key value` pairs, when the target accepts extra keywords.
    pub extra: IndexMap<String, String>,
}

impl Arguments {
    /// Remove the keyword `name`, converted to `T`.
    pub fn take<T: ArgType>(&mut self, name: &str) -> Result<T, ValueError> {
        match self.keywords.shift_remove(name) {
            Some(value) => T::from_value(value),
            None => Err(ValueError {
                expected: T::annotation().to_string(),
                found: format!("no keyword '{name}'"),
            }),
        }
    }

    /// Remove the next positional-only value, converted to `T`.
    pub fn take_positional<T: ArgType>(&mut self) -> Result<T, ValueError> {
        match self.positional.pop_front() {
            Some(value) => T::from_value(value),
            None => Err(ValueError {
                expected: T::annotation().to_string(),
                found: "no positional value".to_string(),
            }),
        }
    }
}

/// Run a function with arguments parsed from the command line.
///
/// Call-site values rank above the declared defaults and below config files and the command line.
///
/// ```
/// use schemarg_builder::{Annotation, Definition, Field, Tapify};
///
/// let definition = Definition::new("add")
///     .field(Field::new("a", Annotation::Int))
///     .field(Field::new("b", Annotation::Int).default(1));
/// let sum = Tapify::new(definition)
///     .explicit("b", 10)
///     .call_tokens(&["--a", "5"], |mut arguments| {
///         arguments.take::<i64>("a").unwrap() + arguments.take::<i64>("b").unwrap()
///     })
///     .unwrap();
/// assert_eq!(sum, 15);
/// ```
pub struct Tapify {
    parser: TypedParser,
    explicit: ValueMap,
    known_only: bool,
}

impl Tapify {
    #[allow(missing_docs)]
    pub fn new(definition: Definition) -> Self {
        Self {
            parser: TypedParser::new(definition),
            explicit: ValueMap::default(),
            known_only: false,
        }
    }

    /// Take help text from an external documentation extractor.
    pub fn docs(mut self, docs: impl HelpSource + 'static) -> Self {
        self.parser = self.parser.docs(docs);
        self
    }

    /// A call-site value for the parameter `name`.
    pub fn explicit(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.explicit.insert(name.into(), value.into());
        self
    }

    /// Tolerate unrecognized tokens and call-site values that name no parameter.
    pub fn known_only(mut self) -> Self {
        self.known_only = true;
        self
    }

    /// Parse `tokens` and call `target` with the result.
    pub fn call_tokens<F, R>(self, tokens: &[&str], target: F) -> Result<R, Error>
    where
        F: FnOnce(Arguments) -> R,
    {
        let schema = self.parser.schema()?;
        let known_only = self.known_only || schema.accepts_extra_keywords;
        let (explicit, unknown): (Vec<(String, Value)>, Vec<(String, Value)>) = self
            .explicit
            .into_iter()
            .partition(|(name, _)| schema.field(name).is_some());

        if !unknown.is_empty() {
            if !known_only {
                return Err(Error::UnknownKeyword(
                    unknown.into_iter().map(|(name, _)| name).collect(),
                ));
            }

            #[cfg(feature = "tracing_debug")]
            {
                debug!("Ignoring {} unknown keyword value(s).", unknown.len());
            }
        }

        let parser = self.parser.explicit(explicit.into_iter().collect());
        let instance = if known_only {
            parser.parse_known_tokens(tokens)?
        } else {
            parser.parse_tokens(tokens)?
        };

        Ok(target(arguments(&schema, &instance)))
    }

    /// Parse the command line ([`env::args`]) and call `target`.
    ///
    /// On `-h/--help` the help is printed and the process exits with `0`; on any error the message is printed to stderr and the process exits with `1`.
    pub fn call<F, R>(self, target: F) -> R
    where
        F: FnOnce(Arguments) -> R,
    {
        let command_input: Vec<String> = env::args().skip(1).collect();
        let tokens: Vec<&str> = command_input.iter().map(AsRef::as_ref).collect();
        let user_interface = ConsoleInterface::default();

        match self.call_tokens(&tokens, target) {
            Ok(result) => result,
            Err(Error::HelpRequested(help)) => {
                user_interface.print(help);
                std::process::exit(0);
            }
            Err(error) => {
                user_interface.print_error(error.to_string());
                std::process::exit(error.exit_code());
            }
        }
    }
}

fn arguments(schema: &Schema, instance: &Instance) -> Arguments {
    let mut arguments = Arguments::default();

    for field in &schema.fields {
        let value = instance.get(&field.name).cloned().unwrap_or(Value::None);

        if field.positional_only {
            arguments.positional.push_back(value);
        } else {
            arguments.keywords.insert(field.name.clone(), value);
        }
    }

    if schema.accepts_extra_keywords {
        arguments.extra = extra_keywords(instance.extra_args());
    }

    arguments
}

// `--key value` pairs; a key directly followed by another key (or nothing) gets the empty string.
fn extra_keywords(extra_args: &[String]) -> IndexMap<String, String> {
    let mut extra = IndexMap::default();
    let mut tokens = extra_args.iter().peekable();

    while let Some(token) = tokens.next() {
        let key = token.trim_start_matches('-').to_string();
        let value = match tokens.peek() {
            Some(next) if !next.starts_with("--") => tokens.next().cloned().unwrap_or_default(),
            _ => String::default(),
        };
        extra.insert(key, value);
    }

    extra
}

/// Parse the command line against `definition` and call `target`; see [`Tapify`].
pub fn tapify<F, R>(definition: Definition, target: F) -> R
where
    F: FnOnce(Arguments) -> R,
{
    Tapify::new(definition).call(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MissingRequiredArgumentError;
    use crate::schema::Field;
    use crate::test::assert_contains;
    use crate::types::Annotation;
    use rstest::rstest;
    use std::collections::HashMap;

    fn power() -> Definition {
        Definition::new("power")
            .field(Field::new("base", Annotation::Int).positional_only())
            .field(Field::new("exponent", Annotation::Int).default(2))
    }

    fn apply(mut arguments: Arguments) -> i64 {
        let base: i64 = arguments.take_positional().unwrap();
        let exponent: i64 = arguments.take("exponent").unwrap();
        base.pow(exponent as u32)
    }

    #[test]
    fn call_positional_only() {
        let result = Tapify::new(power())
            .call_tokens(&["--base", "3"], apply)
            .unwrap();

        assert_eq!(result, 9);
    }

    #[test]
    fn call_arguments() {
        let arguments = Tapify::new(power())
            .call_tokens(&["--base", "3", "--exponent", "4"], |arguments| arguments)
            .unwrap();

        assert_eq!(arguments.positional, VecDeque::from([Value::Int(3)]));
        assert_eq!(
            arguments.keywords.into_iter().collect::<Vec<(String, Value)>>(),
            vec![("exponent".to_string(), Value::Int(4))]
        );
        assert!(arguments.extra.is_empty());
    }

    // Call-site values sit between the declared defaults and the command line.
    #[rstest]
    #[case(vec!["--base", "2"], 8)]
    #[case(vec!["--base", "2", "--exponent", "5"], 32)]
    fn explicit_precedence(#[case] tokens: Vec<&str>, #[case] expected: i64) {
        let result = Tapify::new(power())
            .explicit("exponent", 3)
            .call_tokens(tokens.as_slice(), apply)
            .unwrap();

        assert_eq!(result, expected);
    }

    #[test]
    fn explicit_below_config_file() {
        let directory = tempfile::tempdir().unwrap();
        let config = directory.path().join("power.args");
        std::fs::write(&config, "--exponent 4").unwrap();

        let result = Tapify::new(power().config_file(&config))
            .explicit("exponent", 3)
            .call_tokens(&["--base", "2"], apply)
            .unwrap();

        assert_eq!(result, 16);
    }

    #[test]
    fn explicit_satisfies_required() {
        let result = Tapify::new(power())
            .explicit("base", 5)
            .call_tokens(&[], apply)
            .unwrap();

        assert_eq!(result, 25);
    }

    #[test]
    fn unknown_keyword() {
        let error = Tapify::new(power())
            .explicit("nope", 1)
            .call_tokens(&["--base", "2"], apply)
            .unwrap_err();

        assert_matches!(error, Error::UnknownKeyword(names) => {
            assert_eq!(names, vec!["nope"]);
        });
    }

    #[test]
    fn unknown_keyword_known_only() {
        let result = Tapify::new(power())
            .explicit("nope", 1)
            .known_only()
            .call_tokens(&["--base", "2", "--other", "x"], apply)
            .unwrap();

        assert_eq!(result, 4);
    }

    #[test]
    fn missing_required() {
        assert_matches!(
            Tapify::new(power()).call_tokens(&[], apply),
            Err(Error::MissingRequired(MissingRequiredArgumentError(names))) if names == vec!["base"]
        );
    }

    #[test]
    fn extra_keywords_forwarded() {
        let definition = Definition::new("program")
            .field(Field::new("a", Annotation::Int).default(0))
            .extra_keywords();

        let arguments = Tapify::new(definition)
            .call_tokens(&["--a", "1", "--b", "two", "--c", "--d", "4"], |arguments| {
                arguments
            })
            .unwrap();

        assert_eq!(arguments.keywords.get("a"), Some(&Value::Int(1)));
        assert_eq!(
            arguments.extra.into_iter().collect::<Vec<(String, String)>>(),
            vec![
                ("b".to_string(), "two".to_string()),
                ("c".to_string(), String::default()),
                ("d".to_string(), "4".to_string()),
            ]
        );
    }

    #[test]
    fn docs_reach_help() {
        let docs: HashMap<String, String> =
            HashMap::from([("exponent".to_string(), "The power to raise to.".to_string())]);

        let error = Tapify::new(power().program("power"))
            .docs(docs)
            .explicit("exponent", 3)
            .call_tokens(&["-h"], apply)
            .unwrap_err();

        assert_matches!(error, Error::HelpRequested(help) => {
            assert_contains!(help, "usage: power");
            assert_contains!(help, "The power to raise to.");
        });
    }

    #[test]
    fn take_errors() {
        let mut arguments = Arguments::default();

        assert_matches!(arguments.take::<i64>("x"), Err(ValueError { .. }));
        assert_matches!(arguments.take_positional::<i64>(), Err(ValueError { .. }));
    }
}
