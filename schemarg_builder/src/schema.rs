use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::SchemaError;
use crate::model::Nargs;
use crate::types::{Annotation, Converter, ConverterRegistry};
use crate::value::Value;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// Explicit flag options for one field, overriding what would otherwise be derived from its name and annotation.
#[derive(Clone, Default)]
pub struct FlagSpec {
    /// The external long name (`--long`), instead of the field name.
    pub long: Option<String>,
    /// A short alias (`-s`).
    pub short: Option<char>,
    /// Register the field as a positional argument (no leading marker).
    pub positional: bool,
    /// The arity, instead of the annotation's.
    pub nargs: Option<Nargs>,
    /// The element converter, bypassing annotation resolution entirely.
    pub converter: Option<Converter>,
}

impl std::fmt::Debug for FlagSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlagSpec")
            .field("long", &self.long)
            .field("short", &self.short)
            .field("positional", &self.positional)
            .field("nargs", &self.nargs)
            .field("converter", &self.converter.as_ref().map(|_| ".."))
            .finish()
    }
}

impl FlagSpec {
    #[allow(missing_docs)]
    pub fn long(mut self, long: impl Into<String>) -> Self {
        self.long.replace(long.into());
        self
    }

    #[allow(missing_docs)]
    pub fn short(mut self, short: char) -> Self {
        self.short.replace(short);
        self
    }

    #[allow(missing_docs)]
    pub fn positional(mut self) -> Self {
        self.positional = true;
        self
    }

    #[allow(missing_docs)]
    pub fn nargs(mut self, nargs: Nargs) -> Self {
        self.nargs.replace(nargs);
        self
    }

    #[allow(missing_docs)]
    pub fn converter(
        mut self,
        converter: impl Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        self.converter.replace(Arc::new(converter));
        self
    }
}

/// One declared argument: name, annotation, default-or-absent, help text and flag options.
///
/// A field without a default is required.
/// `Some(Value::None)` is a declared default of the absent value, which is not the same as no default.
#[derive(Debug, Clone, Default)]
pub struct FieldDescriptor {
    #[allow(missing_docs)]
    pub name: String,
    /// Mandatory; `None` fails introspection.
    pub annotation: Option<Annotation>,
    #[allow(missing_docs)]
    pub default: Option<Value>,
    #[allow(missing_docs)]
    pub help: Option<String>,
    #[allow(missing_docs)]
    pub flag: FlagSpec,
    /// For the function entry point: the value is handed to the target positionally.
    pub positional_only: bool,
}

impl FieldDescriptor {
    /// Whether the field has no declared default.
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    /// The external flag name (without leading dashes).
    pub fn flag_name(&self, settings: &Settings) -> String {
        let name = self.flag.long.as_ref().unwrap_or(&self.name);

        if settings.underscores_to_dashes && !self.flag.positional {
            name.replace('_', "-")
        } else {
            name.clone()
        }
    }
}

/// A field declaration, built fluently.
///
/// ```
/// use schemarg_builder::{Annotation, Field};
///
/// let field = Field::new("count", Annotation::Int)
///     .default(1)
///     .short('c')
///     .help("How many.");
/// ```
#[derive(Debug, Clone)]
pub struct Field(FieldDescriptor);

impl Field {
    /// Declare a field of the given type.
    pub fn new(name: impl Into<String>, annotation: Annotation) -> Self {
        Field(FieldDescriptor {
            name: name.into(),
            annotation: Some(annotation),
            ..FieldDescriptor::default()
        })
    }

    /// Declare a field without a type annotation.
    /// Introspection rejects it, which is what dynamic schema sources need to report.
    pub fn unannotated(name: impl Into<String>) -> Self {
        Field(FieldDescriptor {
            name: name.into(),
            ..FieldDescriptor::default()
        })
    }

    #[allow(missing_docs)]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.0.default.replace(value.into());
        self
    }

    #[allow(missing_docs)]
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.0.help.replace(help.into());
        self
    }

    #[allow(missing_docs)]
    pub fn short(mut self, short: char) -> Self {
        self.0.flag = self.0.flag.short(short);
        self
    }

    #[allow(missing_docs)]
    pub fn long(mut self, long: impl Into<String>) -> Self {
        self.0.flag = self.0.flag.long(long);
        self
    }

    #[allow(missing_docs)]
    pub fn positional(mut self) -> Self {
        self.0.flag = self.0.flag.positional();
        self
    }

    #[allow(missing_docs)]
    pub fn nargs(mut self, nargs: Nargs) -> Self {
        self.0.flag = self.0.flag.nargs(nargs);
        self
    }

    #[allow(missing_docs)]
    pub fn converter(
        mut self,
        converter: impl Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        self.0.flag = self.0.flag.converter(converter);
        self
    }

    /// Restrict the values to the literal `choices`.
    pub fn choices(mut self, choices: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        let choices: Vec<Value> = choices.into_iter().map(Into::into).collect();
        self.0.annotation = self.0.annotation.map(|a| a.with_choices(choices));
        self
    }

    /// Pass the value to a function target positionally.
    pub fn positional_only(mut self) -> Self {
        self.0.positional_only = true;
        self
    }
}

impl From<Field> for FieldDescriptor {
    fn from(value: Field) -> Self {
        value.0
    }
}

impl From<FieldDescriptor> for Field {
    fn from(value: FieldDescriptor) -> Self {
        Field(value)
    }
}

/// Behaviour switches for a parseable unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Booleans take an explicit `true`/`false` token instead of being switches.
    pub explicit_bool: bool,
    /// Field `max_len` registers as `--max-len`.
    pub underscores_to_dashes: bool,
    /// Config files split on whitespace only (no quoting, no comments).
    pub legacy_config_parsing: bool,
}

/// Help text supplied by an external documentation extractor.
pub trait HelpSource {
    /// The help text of `field`.
    fn field_help(&self, field: &str) -> Option<String>;

    /// The description of the parseable unit.
    fn description(&self) -> Option<String> {
        None
    }
}

/// A help source without any documentation.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDocs;

impl HelpSource for NoDocs {
    fn field_help(&self, _field: &str) -> Option<String> {
        None
    }
}

impl HelpSource for HashMap<String, String> {
    fn field_help(&self, field: &str) -> Option<String> {
        self.get(field).cloned()
    }
}

/// The declaration of a parseable unit: fields, bases, sub-commands, config files and settings.
///
/// Bases compose explicitly: their fields come first, and a later field with the same name replaces the earlier one (default and position).
#[derive(Debug, Clone)]
pub struct Definition {
    program: Option<String>,
    description: Option<String>,
    bases: Vec<Definition>,
    fields: Vec<FieldDescriptor>,
    subcommands: Vec<(String, Definition)>,
    subcommand_required: bool,
    config_files: Vec<PathBuf>,
    settings: Settings,
    registry: ConverterRegistry,
    accepts_extra_keywords: bool,
}

impl Default for Definition {
    fn default() -> Self {
        Self {
            program: None,
            description: None,
            bases: Vec::default(),
            fields: Vec::default(),
            subcommands: Vec::default(),
            subcommand_required: true,
            config_files: Vec::default(),
            settings: Settings::default(),
            registry: ConverterRegistry::default(),
            accepts_extra_keywords: false,
        }
    }
}

impl Definition {
    /// Create a definition for the program.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: Some(program.into()),
            ..Self::default()
        }
    }

    #[allow(missing_docs)]
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program.replace(program.into());
        self
    }

    #[allow(missing_docs)]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description.replace(description.into());
        self
    }

    /// Compose the fields of `base` ahead of this definition's fields.
    pub fn base(mut self, base: Definition) -> Self {
        self.bases.push(base);
        self
    }

    #[allow(missing_docs)]
    pub fn field(mut self, field: impl Into<FieldDescriptor>) -> Self {
        self.fields.push(field.into());
        self
    }

    /// Add a sub-command; its description doubles as its help line.
    pub fn subcommand(mut self, name: impl Into<String>, definition: Definition) -> Self {
        self.subcommands.push((name.into(), definition));
        self
    }

    /// Allow parsing without selecting a sub-command.
    pub fn optional_subcommand(mut self) -> Self {
        self.subcommand_required = false;
        self
    }

    /// Read flag tokens from `path` before the command line.
    /// Files apply in the order added; later files override earlier ones.
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_files.push(path.into());
        self
    }

    #[allow(missing_docs)]
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    #[allow(missing_docs)]
    pub fn explicit_bool(mut self, explicit_bool: bool) -> Self {
        self.settings.explicit_bool = explicit_bool;
        self
    }

    #[allow(missing_docs)]
    pub fn underscores_to_dashes(mut self, underscores_to_dashes: bool) -> Self {
        self.settings.underscores_to_dashes = underscores_to_dashes;
        self
    }

    #[allow(missing_docs)]
    pub fn legacy_config_parsing(mut self, legacy_config_parsing: bool) -> Self {
        self.settings.legacy_config_parsing = legacy_config_parsing;
        self
    }

    /// Register the converter for the user-constructible type `tag`.
    pub fn register(
        mut self,
        tag: impl Into<String>,
        converter: impl Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        self.registry.register(tag, converter);
        self
    }

    /// Register a `FromStr + Display` type under `tag`.
    pub fn register_from_str<T>(mut self, tag: impl Into<String>) -> Self
    where
        T: FromStr + Display + 'static,
        <T as FromStr>::Err: Display,
    {
        self.registry.register_from_str::<T>(tag);
        self
    }

    /// The function target accepts arbitrary extra keyword arguments.
    pub fn extra_keywords(mut self) -> Self {
        self.accepts_extra_keywords = true;
        self
    }

    #[allow(missing_docs)]
    pub fn registry_mut(&mut self) -> &mut ConverterRegistry {
        &mut self.registry
    }

    // Fields, config files and converters of the bases first, then our own; last wins by name.
    fn flatten(
        &self,
        fields: &mut IndexMap<String, FieldDescriptor>,
        config_files: &mut Vec<PathBuf>,
        registry: &mut ConverterRegistry,
    ) {
        for base in &self.bases {
            base.flatten(fields, config_files, registry);
        }

        for field in &self.fields {
            fields.shift_remove(&field.name);
            fields.insert(field.name.clone(), field.clone());
        }

        config_files.extend(self.config_files.iter().cloned());
        registry.extend(&self.registry);
    }
}

/// The flattened, ordered field descriptors of one parseable unit.
#[derive(Debug, Clone)]
pub struct Schema {
    #[allow(missing_docs)]
    pub program: String,
    #[allow(missing_docs)]
    pub description: Option<String>,
    #[allow(missing_docs)]
    pub fields: Vec<FieldDescriptor>,
    /// Sub-command name to its nested schema, in declaration order.
    pub subcommands: IndexMap<String, Schema>,
    #[allow(missing_docs)]
    pub subcommand_required: bool,
    #[allow(missing_docs)]
    pub config_files: Vec<PathBuf>,
    #[allow(missing_docs)]
    pub settings: Settings,
    #[allow(missing_docs)]
    pub registry: ConverterRegistry,
    #[allow(missing_docs)]
    pub accepts_extra_keywords: bool,
}

impl Schema {
    /// The descriptor of `name`.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The descriptor of `name`, for adjustment before the grammar is built.
    pub fn field_mut(&mut self, name: &str) -> Option<&mut FieldDescriptor> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Add a field, replacing any field of the same name in place.
    pub fn push(&mut self, field: impl Into<FieldDescriptor>) {
        let field = field.into();

        match self.field_mut(&field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
    }

    /// The field names, in declaration order.
    pub fn names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }
}

/// Build the [`Schema`] of `definition`, taking help text from `docs` where the field declares none.
pub fn introspect(definition: &Definition, docs: &dyn HelpSource) -> Result<Schema, SchemaError> {
    let mut fields: IndexMap<String, FieldDescriptor> = IndexMap::default();
    let mut config_files = Vec::default();
    let mut registry = ConverterRegistry::default();
    definition.flatten(&mut fields, &mut config_files, &mut registry);

    let mut descriptors = Vec::default();

    for (name, mut field) in fields.into_iter() {
        if field.annotation.is_none() {
            return Err(SchemaError::MissingAnnotation(name));
        }

        if field.help.is_none() {
            field.help = docs.field_help(&name);
        }

        descriptors.push(field);
    }

    let program = match &definition.program {
        Some(program) => program.clone(),
        None => default_program(),
    };
    let mut subcommands = IndexMap::default();

    for (name, sub_definition) in &definition.subcommands {
        let mut sub_schema = introspect(sub_definition, &NoDocs)?;
        sub_schema.program = format!("{program} {name}");

        if subcommands.insert(name.clone(), sub_schema).is_some() {
            return Err(SchemaError::DuplicateSubcommand(name.clone()));
        }
    }

    #[cfg(feature = "tracing_debug")]
    {
        debug!(
            "Introspected '{program}': {} field(s), {} sub-command(s).",
            descriptors.len(),
            subcommands.len()
        );
    }

    Ok(Schema {
        program,
        description: definition
            .description
            .clone()
            .or_else(|| docs.description()),
        fields: descriptors,
        subcommands,
        subcommand_required: definition.subcommand_required,
        config_files,
        settings: definition.settings.clone(),
        registry,
        accepts_extra_keywords: definition.accepts_extra_keywords,
    })
}

fn default_program() -> String {
    std::env::args()
        .next()
        .and_then(|arg| {
            PathBuf::from(arg)
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
        })
        .unwrap_or_else(|| "program".to_string())
}
