use std::path::Path;

use crate::error::ConfigFileError;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// Read the flag tokens of one config file.
///
/// `.json` files are flattened into flags; anything else is split shell-style (or on whitespace alone, in legacy mode).
pub(crate) fn load(path: &Path, legacy: bool) -> Result<Vec<String>, ConfigFileError> {
    let display = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|e| ConfigFileError::Io {
        path: display.clone(),
        reason: e.to_string(),
    })?;

    let tokens = if path.extension().map_or(false, |e| e == "json") {
        flatten_json(&text, &display)?
    } else if legacy {
        text.split_whitespace().map(str::to_string).collect()
    } else {
        tokenize(&text, &display)?
    };

    #[cfg(feature = "tracing_debug")]
    {
        debug!("Loaded {} token(s) from '{display}'.", tokens.len());
    }

    Ok(tokens)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
    None,
    Single,
    Double,
}

/// Split `text` the way a POSIX shell splits words.
///
/// Quotes group, backslashes escape, and `#` starting a word comments out the rest of its line.
fn tokenize(text: &str, path: &str) -> Result<Vec<String>, ConfigFileError> {
    let mut tokens = Vec::default();
    let mut current = String::default();
    // Tracks `""`, which is an empty token rather than nothing.
    let mut in_token = false;
    let mut quote = Quote::None;
    let mut characters = text.chars();

    while let Some(c) = characters.next() {
        match quote {
            Quote::Single => {
                if c == '\'' {
                    quote = Quote::None;
                } else {
                    current.push(c);
                }
            }
            Quote::Double => match c {
                '"' => quote = Quote::None,
                '\\' => match characters.next() {
                    Some(escaped @ ('"' | '\\' | '$' | '`')) => current.push(escaped),
                    Some('\n') => {}
                    Some(other) => {
                        current.push('\\');
                        current.push(other);
                    }
                    None => {
                        return Err(ConfigFileError::UnterminatedQuote {
                            path: path.to_string(),
                        })
                    }
                },
                _ => current.push(c),
            },
            Quote::None => match c {
                '\'' => {
                    quote = Quote::Single;
                    in_token = true;
                }
                '"' => {
                    quote = Quote::Double;
                    in_token = true;
                }
                '\\' => match characters.next() {
                    Some('\n') => {}
                    Some(escaped) => {
                        current.push(escaped);
                        in_token = true;
                    }
                    None => {
                        return Err(ConfigFileError::DanglingEscape {
                            path: path.to_string(),
                        })
                    }
                },
                '#' if !in_token => {
                    for skipped in characters.by_ref() {
                        if skipped == '\n' {
                            break;
                        }
                    }
                }
                c if c.is_whitespace() => {
                    if in_token {
                        tokens.push(std::mem::take(&mut current));
                        in_token = false;
                    }
                }
                _ => {
                    current.push(c);
                    in_token = true;
                }
            },
        }
    }

    if quote != Quote::None {
        return Err(ConfigFileError::UnterminatedQuote {
            path: path.to_string(),
        });
    }

    if in_token {
        tokens.push(current);
    }

    Ok(tokens)
}

/// `{"a": 1, "xs": [1, 2], "flag": true}` becomes `--a 1 --xs 1 2 --flag`.
///
/// `false` and `null` emit nothing, leaving the flag at whatever the lower layers decided.
fn flatten_json(text: &str, path: &str) -> Result<Vec<String>, ConfigFileError> {
    let json_error = |reason: String| ConfigFileError::Json {
        path: path.to_string(),
        reason,
    };
    let document: serde_json::Value =
        serde_json::from_str(text).map_err(|e| json_error(e.to_string()))?;
    let object = match document {
        serde_json::Value::Object(object) => object,
        other => return Err(json_error(format!("expected an object, found '{other}'"))),
    };
    let mut tokens = Vec::default();

    for (key, value) in object {
        let flag = format!("--{key}");

        match value {
            serde_json::Value::Null | serde_json::Value::Bool(false) => {}
            serde_json::Value::Bool(true) => tokens.push(flag),
            serde_json::Value::Array(items) => {
                tokens.push(flag);

                for item in items {
                    tokens.push(scalar(&key, item).map_err(json_error)?);
                }
            }
            other => {
                tokens.push(flag);
                tokens.push(scalar(&key, other).map_err(json_error)?);
            }
        }
    }

    Ok(tokens)
}

fn scalar(key: &str, value: serde_json::Value) -> Result<String, String> {
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        other => Err(format!("'{key}' holds the nested value '{other}'")),
    }
}
