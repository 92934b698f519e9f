#[macro_use]
extern crate assert_matches;

use rstest::rstest;
use schemarg::derive::*;
use schemarg::{
    introspect, Annotation, ConversionError, Definition, Error, Field, Instance,
    MissingRequiredArgumentError, NoDocs, Trust, TypedArgs, TypedParser, UsageError, Value,
};
use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::path::PathBuf;

fn write(directory: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = directory.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn round_trip_through_dict() {
    // Setup
    let definition = Definition::new("program")
        .field(Field::new("name", Annotation::Str))
        .field(Field::new("count", Annotation::Int).default(1))
        .field(Field::new("ratio", Annotation::Float).default(0.5))
        .field(Field::new("xs", Annotation::list(Annotation::Int)).default(vec![1, 2]))
        .field(Field::new("maybe", Annotation::optional(Annotation::Str)).default(Value::None));
    let schema = introspect(&definition, &NoDocs).unwrap();
    let instance = TypedParser::new(definition)
        .parse_tokens(&["--name", "x", "--count", "3"])
        .unwrap();

    // Execute
    let mut restored = Instance::new(&schema);
    restored.from_dict(instance.as_dict()).unwrap();

    // Verify
    assert_eq!(restored, instance);
    assert_eq!(restored.get("count"), Some(&Value::Int(3)));
}

#[test]
fn precedence_defaults_config_command_line() {
    // Setup
    let directory = tempfile::tempdir().unwrap();
    let first = write(&directory, "first.args", "--a 10");
    let second = write(&directory, "second.args", "--a 99");
    let definition = Definition::new("program")
        .field(Field::new("a", Annotation::Int).default(1))
        .field(Field::new("b", Annotation::Int).default(2));

    // Execute
    let defaults = TypedParser::new(definition.clone())
        .parse_tokens(&[])
        .unwrap();
    let one_file = TypedParser::new(definition.clone().config_file(&first))
        .parse_tokens(&["--b", "20"])
        .unwrap();
    let two_files = TypedParser::new(definition.config_file(&first).config_file(&second))
        .parse_tokens(&["--b", "20"])
        .unwrap();

    // Verify
    assert_eq!(defaults.to_string(), "{a: 1, b: 2}");
    assert_eq!(one_file.get("a"), Some(&Value::Int(10)));
    assert_eq!(one_file.get("b"), Some(&Value::Int(20)));
    assert_eq!(two_files.get("a"), Some(&Value::Int(99)));
    assert_eq!(two_files.get("b"), Some(&Value::Int(20)));
}

#[rstest]
#[case(false, &[], false)]
#[case(false, &["--flag"], true)]
#[case(true, &[], true)]
#[case(true, &["--flag"], false)]
fn boolean_polarity(#[case] default: bool, #[case] tokens: &[&str], #[case] expected: bool) {
    let definition =
        Definition::new("program").field(Field::new("flag", Annotation::Bool).default(default));

    let instance = TypedParser::new(definition).parse_tokens(tokens).unwrap();

    assert_eq!(instance.get("flag"), Some(&Value::Bool(expected)));
}

#[test]
fn variadic_replaces_config_value() {
    // Setup
    let directory = tempfile::tempdir().unwrap();
    let config = write(&directory, "config.args", "--xs 9");
    let definition = Definition::new("program")
        .field(Field::new("xs", Annotation::list(Annotation::Int)))
        .config_file(&config);

    // Execute
    let instance = TypedParser::new(definition)
        .parse_tokens(&["--xs", "1", "2", "3"])
        .unwrap();

    // Verify
    assert_eq!(
        instance.get("xs"),
        Some(&Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]))
    );
}

#[test]
fn required_fields_aggregate() {
    let definition = Definition::new("program")
        .field(Field::new("a", Annotation::Int))
        .field(Field::new("b", Annotation::Str))
        .field(Field::new("c", Annotation::Float));

    let error = TypedParser::new(definition).parse_tokens(&[]).unwrap_err();

    assert_eq!(
        error.to_string(),
        "Parse error: the following arguments are required: a, b, c."
    );
    assert_matches!(
        error,
        Error::MissingRequired(MissingRequiredArgumentError(missing)) if missing == vec!["a", "b", "c"]
    );
}

fn tuple_definition() -> Definition {
    Definition::new("program").field(Field::new(
        "t",
        Annotation::tuple([Annotation::Str, Annotation::Int, Annotation::Bool]),
    ))
}

#[test]
fn fixed_arity_tuple() {
    let instance = TypedParser::new(tuple_definition())
        .parse_tokens(&["--t", "x", "5", "true"])
        .unwrap();

    assert_eq!(
        instance.get("t"),
        Some(&Value::Tuple(vec![
            Value::from("x"),
            Value::Int(5),
            Value::Bool(true)
        ]))
    );
}

#[rstest]
#[case(&["--t", "x", "5"])]
#[case(&["--t", "x", "5", "true", "y"])]
fn fixed_arity_tuple_mismatch(#[case] tokens: &[&str]) {
    assert_matches!(
        TypedParser::new(tuple_definition()).parse_tokens(tokens),
        Err(Error::Usage(_))
    );
}

#[test]
fn choice_validation() {
    let definition = Definition::new("program").field(Field::new(
        "choice",
        Annotation::literal(vec![Value::from("H"), Value::Int(1), Value::Bool(false)]),
    ));

    assert_matches!(
        TypedParser::new(definition.clone()).parse_tokens(&["--choice", "true"]),
        Err(Error::Usage(UsageError::Conversions(errors))) => {
            assert_matches!(&errors[..], [ConversionError::InvalidChoice { token, .. }] if token == "true");
        }
    );

    let instance = TypedParser::new(definition)
        .parse_tokens(&["--choice", "false"])
        .unwrap();
    assert_eq!(instance.get("choice"), Some(&Value::Bool(false)));
}

#[test]
fn known_only_mode() {
    let definition = Definition::new("program").field(Field::new("declared", Annotation::Str));
    let tokens = ["--declared", "x", "--undeclared", "y"];

    assert_matches!(
        TypedParser::new(definition.clone()).parse_tokens(&tokens),
        Err(Error::Usage(_))
    );

    let instance = TypedParser::new(definition)
        .parse_known_tokens(&tokens)
        .unwrap();
    assert_eq!(instance.get("declared"), Some(&Value::from("x")));
    assert_eq!(instance.extra_args(), &["--undeclared", "y"]);
}

#[derive(Debug, Clone, PartialEq)]
struct Address(Ipv4Addr);

impl std::str::FromStr for Address {
    type Err = std::net::AddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Address)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

schemarg::arg_type!(Address);

#[derive(Debug, PartialEq, TypedArgs)]
#[schemarg(program = "common")]
struct Common {
    #[schemarg(default = false, short = 'v')]
    verbose: bool,
    #[schemarg(default = 1)]
    retries: u8,
}

/// Sums the items.
#[derive(Debug, PartialEq, TypedArgs)]
#[schemarg(program = "summer", underscores_to_dashes)]
struct Summer {
    #[schemarg(flatten)]
    common: Common,
    /// The items to sum.
    #[schemarg(positional)]
    items: Vec<u32>,
    #[schemarg(default = 10, short = 'm')]
    max_len: u8,
    label: Option<String>,
    #[schemarg(default = "add", choices = ["add", "mul"])]
    mode: String,
    // Replaces the composed default.
    #[schemarg(default = 3)]
    retries: u8,
}

#[test]
fn derive_parse() {
    let summer = Summer::parse_tokens(&["1", "2", "3", "-m", "5", "--verbose"]).unwrap();

    assert_eq!(
        summer,
        Summer {
            common: Common {
                verbose: true,
                retries: 3,
            },
            items: vec![1, 2, 3],
            max_len: 5,
            label: None,
            mode: "add".to_string(),
            retries: 3,
        }
    );
}

#[test]
fn derive_parse_options() {
    let summer =
        Summer::parse_tokens(&["4", "--max-len", "2", "--label", "x", "--mode", "mul"]).unwrap();

    assert_eq!(summer.max_len, 2);
    assert_eq!(summer.label, Some("x".to_string()));
    assert_eq!(summer.mode, "mul");
    assert!(!summer.common.verbose);
}

#[rstest]
#[case(&[])]
#[case(&["1", "--mode", "div"])]
#[case(&["1", "--max-len", "300"])]
#[case(&["1", "--max_len", "3"])]
fn derive_parse_errors(#[case] tokens: &[&str]) {
    assert_matches!(
        Summer::parse_tokens(tokens),
        Err(Error::MissingRequired(_) | Error::Usage(_) | Error::Value(_))
    );
}

#[test]
fn derive_help() {
    let help = Summer::parser().help().unwrap();

    assert!(help.contains("usage: summer"), "{help}");
    assert!(help.contains("Sums the items."), "{help}");
    assert!(help.contains("The items to sum."), "{help}");
    assert!(help.contains("--max-len"), "{help}");
    assert!(help.contains("-m"), "{help}");

    assert_matches!(
        Summer::parse_tokens(&["--help"]),
        Err(Error::HelpRequested(_))
    );
}

#[test]
fn derive_known() {
    let (summer, extras) = Summer::parse_known_tokens(&["1", "--other", "x"]).unwrap();

    assert_eq!(summer.items, vec![1]);
    assert_eq!(extras, vec!["--other", "x"]);
}

#[test]
fn derive_save_load() {
    // Setup
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("summer.json");
    let summer = Summer::parse_tokens(&["7", "8", "--label", "saved"]).unwrap();

    // Execute
    summer.save(&path, false).unwrap();
    let loaded = Summer::load(&path, Trust::Untrusted, false).unwrap();

    // Verify
    assert_eq!(loaded, summer);
}

#[derive(Debug, PartialEq, TypedArgs)]
#[schemarg(program = "pinger", explicit_bool)]
struct Pinger {
    #[schemarg(positional)]
    address: Address,
    #[schemarg(default = true)]
    wait: bool,
    tags: HashSet<String>,
    pair: Option<(String, i32)>,
}

#[test]
fn derive_user_types() {
    let pinger = Pinger::parse_tokens(&[
        "10.0.0.1", "--wait", "no", "--tags", "a", "b", "a", "--pair", "x", "-3",
    ]);

    // `no` is not a boolean literal.
    assert_matches!(pinger, Err(Error::Usage(_)));

    let pinger = Pinger::parse_tokens(&[
        "10.0.0.1", "--wait", "f", "--tags", "a", "b", "a", "--pair", "x", "-3",
    ])
    .unwrap();

    assert_eq!(
        pinger,
        Pinger {
            address: Address(Ipv4Addr::new(10, 0, 0, 1)),
            wait: false,
            tags: HashSet::from(["a".to_string(), "b".to_string()]),
            pair: Some(("x".to_string(), -3)),
        }
    );
}

#[test]
fn derive_opaque_requires_trust() {
    // Setup
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("pinger.json");
    let pinger = Pinger::parse_tokens(&["127.0.0.1", "--tags", "x"]).unwrap();
    pinger.save(&path, false).unwrap();

    // Execute
    let untrusted = Pinger::load(&path, Trust::Untrusted, false);
    let trusted = Pinger::load(&path, Trust::Trusted, false).unwrap();

    // Verify
    assert_matches!(untrusted, Err(Error::UnsafeDeserialization(_)));
    assert_eq!(trusted, pinger);
}
