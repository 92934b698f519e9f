//! Derive Api for `schemarg` configuration.
//!
//! ### Getting Started
//! Instrument a struct `S` with named fields with `#[derive(TypedArgs)]`.
//! This implements [`TypedArgs`](../trait.TypedArgs.html) for `S`, so that `S::parse()` parses the command line into `S`.
//! Each field is an argument whose type drives how its tokens are parsed (see [`ArgType`](../trait.ArgType.html)).
//!
//! ```no_run
#![doc = include_str!("../demos/demo_derived.rs")]
//! ```
//!
//! This generates a Cli program along the lines of:
//! ```console
//! $ summer -h
//! usage: summer [-h] [-v] [--mode {add, mul}] [--max-total MAX_TOTAL] ITEMS [...]
//! Sum (or multiply) the items.
//! positional arguments:
//!  ITEMS [...]            (List<int>, required) The items to combine.
//! options:
//!  -h, --help             Show this help message and exit.
//!  -v, --verbose          (bool, default=false) Print the intermediate totals.
//!  --mode {add, mul}      {add, mul} (Literal{add, mul}, default=add)
//!  --max-total MAX_TOTAL  (Optional<int>, default=None) Stop once the total exceeds this.
//! ```
//!
//! ### Struct Configuration
//! * `#[schemarg(program = "..")]` names the program (default: the crate name).
//! * `#[schemarg(description = "..")]` describes the program; the struct's doc comment is used otherwise.
//! * `#[schemarg(explicit_bool)]` makes boolean fields take an explicit value (`--flag true`) instead of acting as switches.
//! * `#[schemarg(underscores_to_dashes)]` registers the field `max_total` as `--max-total`.
//!
//! ### Field Configuration
//! * `#[schemarg(default = EXPR)]` sets the default; `EXPR` must evaluate to the field's type.
//! `String`/`PathBuf` fields also accept a string literal.
//! Fields without a default are required, except `Option<T>` fields, which default to `None`.
//! * `#[schemarg(help = "..")]` sets the help message; the field's doc comment is used otherwise.
//! * `#[schemarg(short = 'c')]` adds the short flag `-c`.
//! * `#[schemarg(positional)]` makes the field a positional argument.
//! * `#[schemarg(choices = [..])]` restricts the values to the listed literals.
//! * `#[schemarg(flatten)]` composes the fields of another `TypedArgs` struct ahead of this struct's own fields.
//! A later field with the same name replaces the composed one.
//!
//! ### Field Types
//! `bool`, `String`, `PathBuf`, the integers up to 32 bits (and `i64`), `f32`, `f64`, `Option<T>`, `Vec<T>`, `HashSet<T>`, `BTreeSet<T>` and tuples of up to 4 elements are supported out of the box.
//! Any other `FromStr + Display` type opts in with [`arg_type!`](../macro.arg_type.html):
//! ```ignore
//! #[derive(Clone)]
//! struct Address(Ipv4Addr);
//! // impl FromStr for Address { .. }
//! // impl Display for Address { .. }
//! schemarg::arg_type!(Address);
//! ```
pub use schemarg_derive::*;
