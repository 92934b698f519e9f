mod config;

use indexmap::IndexMap;
use std::path::PathBuf;

use crate::constant::END_OF_OPTIONS;
use crate::error::ConfigFileError;
use crate::grammar::{FlagTable, Grammar};
use crate::model::Nargs;
use crate::schema::Schema;
use crate::value::Value;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// Layer call-site values over the declared defaults of `schema`.
///
/// Explicit values sit above the declared defaults and below config files and the command line.
/// Returns the names that match no field.
pub fn layer_defaults(schema: &mut Schema, explicit: &IndexMap<String, Value>) -> Vec<String> {
    let mut unknown = Vec::default();

    for (name, value) in explicit {
        match schema.field_mut(name) {
            Some(field) => {
                field.default.replace(value.clone());
            }
            None => unknown.push(name.clone()),
        }
    }

    unknown
}

/// Merge the tokens of `config_files` (in order) and then `command_line` into one token stream.
///
/// A flag in a later source replaces that flag from every earlier source, variadic flags included (their values are not appended).
/// Positionals from a later source replace earlier positionals, and sub-command tails merge the same way one level down.
pub fn resolve_tokens(
    grammar: &Grammar,
    config_files: &[PathBuf],
    legacy: bool,
    command_line: &[String],
) -> Result<Vec<String>, ConfigFileError> {
    if config_files.is_empty() {
        return Ok(command_line.to_vec());
    }

    let mut sources = Vec::default();

    for path in config_files {
        sources.push(config::load(path, legacy)?);
    }

    sources.push(command_line.to_vec());
    let tokens = merge_sources(&grammar.flag_table(), sources);
    #[cfg(feature = "tracing_debug")]
    {
        debug!("Merged {} source(s) into: {tokens:?}", config_files.len() + 1);
    }
    Ok(tokens)
}

fn merge_sources(table: &FlagTable, sources: Vec<Vec<String>>) -> Vec<String> {
    let mut merged = Overlay::default();

    for tokens in sources {
        merged = merged.overlay(Overlay::segment(&tokens, table), table);
    }

    merged.render()
}

/// The tokens of one source, grouped by the flag they belong to.
#[derive(Debug, Default, PartialEq, Eq)]
struct Overlay {
    flags: IndexMap<String, Vec<String>>,
    positionals: Vec<String>,
    subcommand: Option<(String, Vec<String>)>,
}

impl Overlay {
    fn segment(tokens: &[String], table: &FlagTable) -> Self {
        let mut overlay = Overlay::default();
        let mut options_ended = false;
        let mut index = 0;

        while index < tokens.len() {
            let token = &tokens[index];
            index += 1;

            if !options_ended && token == END_OF_OPTIONS {
                options_ended = true;
                continue;
            }

            if options_ended || !is_flag(token, table) {
                if table.subcommands.contains_key(token) {
                    overlay.subcommand = Some((token.clone(), tokens[index..].to_vec()));
                    break;
                }

                overlay.positionals.push(token.clone());
                continue;
            }

            for (key, mut group, nargs) in canonicalize(token, table) {
                // Only a group still waiting on values takes the following tokens.
                if let Some(nargs) = nargs {
                    let mut taken = 0;

                    while index < tokens.len()
                        && tokens[index] != END_OF_OPTIONS
                        && !is_flag(&tokens[index], table)
                        && (table.options.contains_key(&key)
                            || !table.subcommands.contains_key(&tokens[index]))
                        && wants_more(nargs, taken)
                    {
                        group.push(tokens[index].clone());
                        index += 1;
                        taken += 1;
                    }
                }

                overlay.flags.shift_remove(&key);
                overlay.flags.insert(key, group);
            }
        }

        overlay
    }

    fn overlay(mut self, top: Overlay, table: &FlagTable) -> Self {
        for (key, group) in top.flags {
            self.flags.shift_remove(&key);
            self.flags.insert(key, group);
        }

        if !top.positionals.is_empty() {
            self.positionals = top.positionals;
        }

        self.subcommand = match (self.subcommand.take(), top.subcommand) {
            (Some((base_name, base_tail)), Some((top_name, top_tail))) if base_name == top_name => {
                let tail = match table.subcommands.get(&base_name) {
                    Some(sub_table) => merge_sources(sub_table, vec![base_tail, top_tail]),
                    None => top_tail,
                };
                Some((base_name, tail))
            }
            (_, Some(top)) => Some(top),
            (base, None) => base,
        };

        self
    }

    fn render(self) -> Vec<String> {
        let Overlay {
            flags,
            positionals,
            subcommand,
        } = self;
        let trailing = !positionals.is_empty() || subcommand.is_some();
        let dashed = positionals.iter().any(|p| p.starts_with('-'));
        let mut tokens: Vec<String> = flags.into_values().flatten().collect();

        // Keep a greedy flag from swallowing what follows it.
        if trailing && (!tokens.is_empty() || dashed) {
            tokens.push(END_OF_OPTIONS.to_string());
        }

        tokens.extend(positionals);

        if let Some((name, tail)) = subcommand {
            tokens.push(name);
            tokens.extend(tail);
        }

        tokens
    }
}

fn wants_more(nargs: Nargs, taken: usize) -> bool {
    match nargs {
        Nargs::Precisely(n) => taken < n as usize,
        Nargs::Any | Nargs::AtLeastOne => true,
    }
}

fn is_flag(token: &str, table: &FlagTable) -> bool {
    token.len() > 1 && token.starts_with('-') && !is_negative_number(token, table)
}

fn is_negative_number(token: &str, table: &FlagTable) -> bool {
    match token[1..].chars().next() {
        Some(c) if c.is_ascii_digit() || c == '.' => {
            !table.shorts.contains_key(&c) && token.parse::<f64>().is_ok()
        }
        _ => false,
    }
}

// Rewrites a flag token into per-flag groups keyed by the long name.
// The nargs is absent when the group already carries its value (`--name=value`).
fn canonicalize(token: &str, table: &FlagTable) -> Vec<(String, Vec<String>, Option<Nargs>)> {
    let (flag, value) = match token.split_once('=') {
        Some((flag, value)) => (flag, Some(value)),
        None => (token, None),
    };

    let group = |name: &str| -> (String, Vec<String>, Option<Nargs>) {
        match value {
            Some(value) => (name.to_string(), vec![format!("--{name}={value}")], None),
            None => (
                name.to_string(),
                vec![format!("--{name}")],
                table.options.get(name).copied(),
            ),
        }
    };

    if let Some(long) = flag.strip_prefix("--") {
        if table.options.contains_key(long) {
            return vec![group(long)];
        }
    } else {
        let shorts: Vec<char> = flag[1..].chars().collect();
        let names: Option<Vec<&String>> = shorts.iter().map(|s| table.shorts.get(s)).collect();

        if let Some(names) = names {
            let last = names.len().saturating_sub(1);
            return names
                .into_iter()
                .enumerate()
                .map(|(i, name)| {
                    if i == last {
                        group(name)
                    } else {
                        (name.clone(), vec![format!("--{name}")], None)
                    }
                })
                .collect();
        }
    }

    // Unknown to the grammar: kept verbatim, with at most one value when no positional could claim it.
    let nargs = if value.is_some() || table.positionals {
        None
    } else {
        Some(Nargs::Precisely(1))
    };
    vec![(flag.to_string(), vec![token.to_string()], nargs)]
}
