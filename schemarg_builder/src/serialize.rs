use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{
    Error, MissingRequiredArgumentError, SerializationError, UnsafeDeserializationError,
};
use crate::materialize::Instance;
use crate::reproducibility::Reproducibility;
use crate::value::{Value, ValueMap};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

const REPRODUCIBILITY: &str = "reproducibility";
const SUBCOMMAND_KEY: &str = "_subcommand";
const TYPE_KEY: &str = "_type";
const VALUE_KEY: &str = "_value";
const STRING_KEY: &str = "_string";
const OPAQUE_PREFIX: &str = "opaque (tag = ";

// The byte payload of the opaque envelope.
#[derive(Serialize, Deserialize)]
enum Opaque {
    Float(u64),
    Custom { tag: String, text: String },
}

/// Whether a persisted document may decode opaque values.
///
/// Values JSON cannot express natively (user-constructible values, non-finite floats) are persisted as an opaque byte envelope.
/// Decoding it rebuilds values of arbitrary registered types from bytes the document alone vouches for, so only documents you produced yourself should be loaded as [`Trust::Trusted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trust {
    /// Decode opaque envelopes.
    Trusted,
    /// Refuse opaque envelopes with [`UnsafeDeserializationError`].
    Untrusted,
}

/// How [`Instance::save_with`] writes a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveOptions {
    /// Add the [`Reproducibility`] record of this process.
    pub with_reproducibility: bool,
    /// Leave out the fields whose value needs the opaque envelope, so the document loads without trust.
    pub skip_opaque: bool,
}

/// How [`Instance::load_with`] reads a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    #[allow(missing_docs)]
    pub trust: Trust,
    /// Require the saved record to match the current source-control state.
    pub check_reproducibility: bool,
    /// Skip the entries that cannot be set (opaque values without trust, malformed envelopes) instead of failing.
    pub skip_unsettable: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            trust: Trust::Untrusted,
            check_reproducibility: false,
            skip_unsettable: false,
        }
    }
}

impl Instance {
    /// The declared fields that hold a value, in declaration order.
    ///
    /// The fields of the selected sub-command follow, with the selected sub-command names under `_subcommand`.
    /// A sub-command field sharing its name with an enclosing field takes its place.
    /// Attributes set outside the schema are excluded.
    pub fn as_dict(&self) -> ValueMap {
        let mut mapping = self.own_fields();
        let mut path = Vec::default();
        let mut level = self;

        while let Some((name, sub_instance)) = level.subcommand() {
            path.push(Value::from(name));
            mapping.extend(sub_instance.own_fields());
            level = sub_instance;
        }

        if !path.is_empty() {
            mapping.insert(SUBCOMMAND_KEY.to_string(), Value::List(path));
        }

        mapping
    }

    /// Overwrite fields with the values of `mapping`.
    ///
    /// A `_subcommand` entry selects those sub-commands first; every other entry is set on each selected level that declares it, or kept as an attribute.
    /// Fails when a required field still lacks a value afterwards.
    pub fn from_dict(&mut self, mut mapping: ValueMap) -> Result<(), MissingRequiredArgumentError> {
        if !self.is_declared(SUBCOMMAND_KEY) {
            if let Some(path) = mapping.shift_remove(SUBCOMMAND_KEY) {
                let selected = match &path {
                    Value::List(names) => self.select_path(names),
                    _ => false,
                };

                if !selected {
                    self.set(SUBCOMMAND_KEY, path);
                }
            }
        }

        for (name, value) in mapping {
            if !self.assign(&name, &value) {
                self.set(name, value);
            }
        }

        let missing = self.missing_selected();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(MissingRequiredArgumentError(missing))
        }
    }

    /// The fields as a JSON document, with sorted keys and 4-space indentation.
    pub fn to_json(&self) -> Result<String, SerializationError> {
        render(&self.json_fields(false)?)
    }

    /// Overwrite fields from a document produced by [`Instance::to_json`].
    ///
    /// A `reproducibility` record in the document is ignored.
    pub fn from_json(&mut self, document: &str, trust: Trust) -> Result<(), Error> {
        let options = LoadOptions {
            trust,
            ..LoadOptions::default()
        };
        let (mapping, _) = self.decode_document(document, &options)?;
        self.from_dict(mapping)?;
        Ok(())
    }

    /// Write the fields to `path` as JSON, optionally with the [`Reproducibility`] record of this process.
    pub fn save(&self, path: impl AsRef<Path>, with_reproducibility: bool) -> Result<(), Error> {
        self.save_with(
            path,
            SaveOptions {
                with_reproducibility,
                ..SaveOptions::default()
            },
        )
    }

    #[allow(missing_docs)]
    pub fn save_with(&self, path: impl AsRef<Path>, options: SaveOptions) -> Result<(), Error> {
        let path = path.as_ref();
        let mut document = self.json_fields(options.skip_opaque)?;

        if options.with_reproducibility && !self.is_declared(REPRODUCIBILITY) {
            let record = serde_json::to_value(Reproducibility::current())
                .map_err(|e| SerializationError::Json(e.to_string()))?;
            document.insert(REPRODUCIBILITY.to_string(), record);
        }

        std::fs::write(path, render(&document)?).map_err(|e| SerializationError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        #[cfg(feature = "tracing_debug")]
        {
            debug!("Saved {} field(s) to '{}'.", document.len(), path.display());
        }
        Ok(())
    }

    /// Read fields saved by [`Instance::save`].
    ///
    /// With `check_reproducibility`, the saved record must match the current source-control state.
    pub fn load(
        &mut self,
        path: impl AsRef<Path>,
        trust: Trust,
        check_reproducibility: bool,
    ) -> Result<(), Error> {
        self.load_with(
            path,
            LoadOptions {
                trust,
                check_reproducibility,
                ..LoadOptions::default()
            },
        )
    }

    #[allow(missing_docs)]
    pub fn load_with(&mut self, path: impl AsRef<Path>, options: LoadOptions) -> Result<(), Error> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path).map_err(|e| SerializationError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let (mapping, saved) = self.decode_document(&document, &options)?;

        if options.check_reproducibility {
            let saved = saved
                .map(serde_json::from_value::<Reproducibility>)
                .transpose()
                .map_err(|e| SerializationError::Value {
                    field: REPRODUCIBILITY.to_string(),
                    reason: e.to_string(),
                })?;
            Reproducibility::current().enforce(saved.as_ref())?;
        }

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Loaded {} field(s) from '{}'.", mapping.len(), path.display());
        }
        self.from_dict(mapping)?;
        Ok(())
    }

    fn own_fields(&self) -> ValueMap {
        self.field_names()
            .into_iter()
            .filter_map(|name| self.values().get(&name).map(|v| (name, v.clone())))
            .collect()
    }

    fn select_path(&mut self, names: &[Value]) -> bool {
        match names.split_first() {
            None => true,
            Some((Value::Str(name), rest)) => {
                self.select_subcommand(name)
                    && match self.subcommand_mut() {
                        Some((_, sub_instance)) => sub_instance.select_path(rest),
                        None => false,
                    }
            }
            Some(_) => false,
        }
    }

    // Sets `name` on every selected level that declares it.
    fn assign(&mut self, name: &str, value: &Value) -> bool {
        let mut assigned = false;

        if self.is_declared(name) {
            self.set(name, value.clone());
            assigned = true;
        }

        if let Some((_, sub_instance)) = self.subcommand_mut() {
            assigned |= sub_instance.assign(name, value);
        }

        assigned
    }

    fn missing_selected(&self) -> Vec<String> {
        let mut missing = self.missing();

        if let Some((_, sub_instance)) = self.subcommand() {
            missing.extend(sub_instance.missing_selected());
        }

        missing
    }

    fn json_fields(
        &self,
        skip_opaque: bool,
    ) -> Result<BTreeMap<String, serde_json::Value>, SerializationError> {
        self.as_dict()
            .into_iter()
            .filter(|(_, value)| !(skip_opaque && needs_opaque(value)))
            .map(|(name, value)| encode(&value).map(|json| (name, json)))
            .collect()
    }

    fn decode_document(
        &self,
        document: &str,
        options: &LoadOptions,
    ) -> Result<(ValueMap, Option<serde_json::Value>), Error> {
        let document: serde_json::Value = serde_json::from_str(document)
            .map_err(|e| SerializationError::Json(e.to_string()))?;
        let object = match document {
            serde_json::Value::Object(object) => object,
            other => {
                return Err(SerializationError::Json(format!("expected an object, found '{other}'")).into())
            }
        };
        let mut mapping = ValueMap::default();
        let mut saved = None;

        for (name, json) in object {
            if name == REPRODUCIBILITY && !self.is_declared(REPRODUCIBILITY) {
                saved = Some(json);
                continue;
            }

            match decode(&name, json, options.trust) {
                Ok(value) => {
                    mapping.insert(name, value);
                }
                Err(_error) if options.skip_unsettable => {
                    #[cfg(feature = "tracing_debug")]
                    {
                        debug!("Skipping '{name}': {_error}");
                    }
                }
                Err(error) => return Err(error),
            }
        }

        Ok((mapping, saved))
    }
}

fn needs_opaque(value: &Value) -> bool {
    match value {
        Value::Float(f) => !f.is_finite(),
        Value::Custom { .. } => true,
        Value::List(items) | Value::Set(items) | Value::Tuple(items) => items.iter().any(needs_opaque),
        _ => false,
    }
}

fn render(document: &BTreeMap<String, serde_json::Value>) -> Result<String, SerializationError> {
    let mut out = Vec::default();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    document
        .serialize(&mut serializer)
        .map_err(|e| SerializationError::Json(e.to_string()))?;
    String::from_utf8(out).map_err(|e| SerializationError::Json(e.to_string()))
}

fn encode(value: &Value) -> Result<serde_json::Value, SerializationError> {
    Ok(match value {
        Value::None => serde_json::Value::Null,
        Value::Bool(b) => json!(b),
        Value::Int(i) => json!(i),
        Value::Float(f) if f.is_finite() => json!(f),
        Value::Str(s) => json!(s),
        Value::List(items) => serde_json::Value::Array(encode_all(items)?),
        Value::Set(items) => json!({TYPE_KEY: "set", VALUE_KEY: encode_all(items)?}),
        Value::Tuple(items) => json!({TYPE_KEY: "tuple", VALUE_KEY: encode_all(items)?}),
        Value::Float(f) => opaque("float", Opaque::Float(f.to_bits()), value)?,
        Value::Custom { tag, text } => opaque(
            tag,
            Opaque::Custom {
                tag: tag.clone(),
                text: text.clone(),
            },
            value,
        )?,
    })
}

fn encode_all(items: &[Value]) -> Result<Vec<serde_json::Value>, SerializationError> {
    items.iter().map(encode).collect()
}

fn opaque(tag: &str, payload: Opaque, value: &Value) -> Result<serde_json::Value, SerializationError> {
    let bytes = serde_json::to_vec(&payload).map_err(|e| SerializationError::Json(e.to_string()))?;
    Ok(json!({
        TYPE_KEY: format!("{OPAQUE_PREFIX}{tag})"),
        VALUE_KEY: STANDARD.encode(bytes),
        STRING_KEY: value.render(),
    }))
}

fn decode(field: &str, json: serde_json::Value, trust: Trust) -> Result<Value, Error> {
    let malformed = |reason: String| SerializationError::Value {
        field: field.to_string(),
        reason,
    };

    Ok(match json {
        serde_json::Value::Null => Value::None,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(
                n.as_f64()
                    .ok_or_else(|| malformed(format!("the number '{n}' is out of range")))?,
            ),
        },
        serde_json::Value::String(s) => Value::Str(s),
        serde_json::Value::Array(items) => Value::List(decode_all(field, items, trust)?),
        serde_json::Value::Object(mut object) => {
            let kind = match object.remove(TYPE_KEY) {
                Some(serde_json::Value::String(kind)) => kind,
                _ => return Err(malformed("an object without a type envelope".to_string()).into()),
            };
            let inner = object
                .remove(VALUE_KEY)
                .ok_or_else(|| malformed(format!("the '{kind}' envelope has no value")))?;

            match (kind.as_str(), inner) {
                ("set", serde_json::Value::Array(items)) => {
                    Value::set(decode_all(field, items, trust)?)
                }
                ("tuple", serde_json::Value::Array(items)) => {
                    Value::Tuple(decode_all(field, items, trust)?)
                }
                (opaque, serde_json::Value::String(encoded)) if opaque.starts_with(OPAQUE_PREFIX) => {
                    let tag = opaque
                        .trim_start_matches(OPAQUE_PREFIX)
                        .trim_end_matches(')')
                        .to_string();

                    if trust == Trust::Untrusted {
                        return Err(UnsafeDeserializationError {
                            field: field.to_string(),
                            tag,
                        }
                        .into());
                    }

                    let bytes = STANDARD
                        .decode(encoded)
                        .map_err(|e| malformed(e.to_string()))?;
                    match serde_json::from_slice(&bytes).map_err(|e| malformed(e.to_string()))? {
                        Opaque::Float(bits) => Value::Float(f64::from_bits(bits)),
                        Opaque::Custom { tag, text } => Value::Custom { tag, text },
                    }
                }
                (kind, _) => return Err(malformed(format!("the unknown envelope '{kind}'")).into()),
            }
        }
    })
}

fn decode_all(field: &str, items: Vec<serde_json::Value>, trust: Trust) -> Result<Vec<Value>, Error> {
    items
        .into_iter()
        .map(|item| decode(field, item, trust))
        .collect()
}
