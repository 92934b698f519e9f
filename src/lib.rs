//! `schemarg` is a typed, schema driven command line parser for Rust.
//!
//! A program declares its arguments once, as a schema of typed fields (see [`Definition`]).
//! From that single declaration `schemarg` derives the whole Cli:
//! * *Type driven parsing*:
//! each field's declared type decides how many tokens it consumes and how they convert (see [`Annotation`]).
//! Booleans become switches, lists take one or more values, tuples take exactly as many values as they have elements, literals restrict the choices.
//! * *Layered sources*:
//! declared defaults, then config files (in the order declared), then the command line.
//! A later source replaces a field's value outright; it never appends to it.
//! * *Aggregated errors*:
//! every field that fails to convert is reported in one error, as are all the missing required fields.
//! * *Round-tripping*:
//! a parsed [`Instance`] converts to and from a mapping (`as_dict`/`from_dict`), and saves to and loads from a JSON file, optionally with a [`Reproducibility`] record of how it was produced.
//!
//! # Usage
//! via [derive Api](./derive/index.html):
//! ```no_run
#![doc = include_str!("../demos/demo_derived.rs")]
//! ```
//! or equivalently via builder Api (this page):
//! ```no_run
#![doc = include_str!("../demos/demo_builder.rs")]
//! ```
//!
//! ```console
//! $ summer 1 2 3
//! Total: 6
//!
//! $ summer 1 2 3 --mode mul
//! Total: 6
//!
//! $ summer
//! Parse error: the following arguments are required: items.
//!
//! $ summer 1 blah
//! Parse error: argument 'items': cannot convert 'blah' (invalid digit found in string).
//! 1 blah
//!   ^
//! ```
//!
//! # Builder Api
//! Start with a [`Definition`] and add [`Field`]s.
//! Each field has a name and an [`Annotation`], and optionally a default, a help message, a short flag, choices, or a positional placement.
//! Fields without a default are required.
//!
//! Parse with a [`TypedParser`]:
//! * [`TypedParser::parse`] reads the process arguments, printing help or errors and exiting the process as needed.
//! * [`TypedParser::parse_tokens`] parses the given tokens, returning any error (including [`Error::HelpRequested`]) to the caller.
//! * `parse_known` / `parse_known_tokens` tolerate unrecognized tokens, collecting them in [`Instance::extra_args`].
//!
//! A [`TypedParser`] may attach [`Hooks`]: `configure` adjusts the introspected [`Schema`] before parsing, and `process` validates or post-processes the [`Instance`] after it.
//! A [`ValidationError`] from `process` aborts the parse.
//!
//! ### Sub-commands
//! [`Definition::subcommand`] nests a whole definition under a name.
//! The sub-command's values materialize in their own [`Instance`], reachable through [`Instance::subcommand`].
//!
//! ```no_run
#![doc = include_str!("../demos/demo_sub_command.rs")]
//! ```
//!
//! ### Config files
//! [`Definition::config_file`] reads flag tokens from a file before the command line.
//! A `.json` file holds an object of values (`{"a": 1, "xs": [1, 2]}`), and any other file holds shell-style text (`--a 1 --xs 1 2`, with `#` comments and quoting).
//!
//! ```no_run
#![doc = include_str!("../demos/demo_config_files.rs")]
//! ```
//!
//! ### Function targets
//! [`tapify`] (or [`Tapify`]) parses the arguments of a function instead of a struct.
//! Call-site values rank above the declared defaults and below config files and the command line.
//!
//! ```no_run
#![doc = include_str!("../demos/demo_tapify.rs")]
//! ```
//!
//! # Persistence
//! [`Instance::save`] writes the declared fields as JSON (sorted keys, 4-space indentation).
//! Sets and tuples are written in a structured envelope, which always loads safely.
//! Values JSON cannot represent (user types, non-finite floats) are written in an opaque envelope, which only loads with [`Trust::Trusted`].
//! Only load opaque values from documents you produced yourself.
//!
//! # Features
//! * `tracing_debug`: emit `tracing` debug events while building grammars, merging sources and parsing.
pub mod derive;
pub use schemarg_builder::*;
