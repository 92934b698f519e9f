use std::sync::Arc;

use crate::error::{ConversionError, SchemaError};
use crate::model::Nargs;
use crate::schema::{FieldDescriptor, Settings};
use crate::types::{Annotation, Container, Converter, ConverterRegistry};
use crate::value::Value;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// The closed set of argument shapes an annotation resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    #[allow(missing_docs)]
    Scalar,
    /// A switch (arity 0), or an explicit `true`/`false` token (arity 1).
    Boolean,
    #[allow(missing_docs)]
    OptionalScalar,
    #[allow(missing_docs)]
    FixedTuple,
    #[allow(missing_docs)]
    VariadicSequence,
    #[allow(missing_docs)]
    EnumeratedChoice,
    /// A registered or explicitly supplied converter.
    UserConstructible,
}

/// How the converted elements become the final value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reconstructor {
    /// Exactly one element, taken as is.
    Single,
    #[allow(missing_docs)]
    List,
    /// Duplicates collapse.
    Set,
    #[allow(missing_docs)]
    Tuple,
}

#[derive(Clone)]
enum Element {
    Str,
    Int,
    Float,
    Bool,
    Choice(Vec<Value>),
    Converted(Converter),
}

impl std::fmt::Debug for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Element::Str => write!(f, "Str"),
            Element::Int => write!(f, "Int"),
            Element::Float => write!(f, "Float"),
            Element::Bool => write!(f, "Bool"),
            Element::Choice(members) => f.debug_tuple("Choice").field(members).finish(),
            Element::Converted(_) => write!(f, "Converted(..)"),
        }
    }
}

impl Element {
    fn convert(&self, field: &str, token: &str) -> Result<Value, ConversionError> {
        match self {
            Element::Str => Ok(Value::Str(token.to_string())),
            Element::Int => token
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|error| conversion(field, token, error.to_string())),
            Element::Float => token
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|error| conversion(field, token, error.to_string())),
            Element::Bool => {
                parse_bool(token)
                    .map(Value::Bool)
                    .ok_or_else(|| ConversionError::InvalidBooleanLiteral {
                        field: field.to_string(),
                        token: token.to_string(),
                    })
            }
            Element::Choice(members) => members
                .iter()
                .find(|member| member.render() == token)
                .cloned()
                .ok_or_else(|| ConversionError::InvalidChoice {
                    field: field.to_string(),
                    token: token.to_string(),
                    choices: render_choices(members).join(", "),
                }),
            Element::Converted(converter) => {
                converter(token).map_err(|reason| conversion(field, token, reason))
            }
        }
    }
}

fn conversion(field: &str, token: &str, reason: String) -> ConversionError {
    ConversionError::ArgumentConversion {
        field: field.to_string(),
        token: token.to_string(),
        reason,
    }
}

fn render_choices(members: &[Value]) -> Vec<String> {
    members.iter().map(Value::render).collect()
}

#[derive(Debug, Clone)]
enum ElementConverter {
    Uniform(Element),
    Positional(Vec<Element>),
}

/// The parsing behaviour derived from a field's annotation.
#[derive(Debug, Clone)]
pub struct ResolvedShape {
    kind: ShapeKind,
    nargs: Nargs,
    nullable: bool,
    switch: Option<bool>,
    converter: ElementConverter,
    reconstructor: Reconstructor,
    type_name: String,
}

impl ResolvedShape {
    fn new(
        kind: ShapeKind,
        nargs: Nargs,
        converter: ElementConverter,
        reconstructor: Reconstructor,
    ) -> Self {
        Self {
            kind,
            nargs,
            nullable: false,
            switch: None,
            converter,
            reconstructor,
            type_name: String::default(),
        }
    }

    #[allow(missing_docs)]
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// The number of tokens the flag consumes.
    pub fn nargs(&self) -> Nargs {
        self.nargs
    }

    /// Whether the absent value is acceptable.
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// For a boolean switch, the value stored when the flag is present.
    pub fn switch(&self) -> Option<bool> {
        self.switch
    }

    #[allow(missing_docs)]
    pub fn reconstructor(&self) -> Reconstructor {
        self.reconstructor
    }

    /// The rendered annotation, shown in help.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The canonical forms of the literal members, when the elements are restricted to them.
    pub fn choices(&self) -> Option<Vec<String>> {
        match &self.converter {
            ElementConverter::Uniform(Element::Choice(members)) => Some(render_choices(members)),
            _ => None,
        }
    }

    /// Convert the raw tokens matched for `field` into its final value.
    pub fn convert(&self, field: &str, tokens: &[String]) -> Result<Value, ConversionError> {
        if let Some(target) = self.switch {
            return Ok(Value::Bool(target));
        }

        match &self.converter {
            ElementConverter::Positional(elements) => {
                if tokens.len() != elements.len() {
                    return Err(ConversionError::ArityMismatch {
                        field: field.to_string(),
                        expected: elements.len(),
                        provided: tokens.len(),
                    });
                }

                let values = elements
                    .iter()
                    .zip(tokens)
                    .map(|(element, token)| element.convert(field, token))
                    .collect::<Result<Vec<Value>, ConversionError>>()?;
                Ok(Value::Tuple(values))
            }
            ElementConverter::Uniform(element) => {
                let mut values = tokens
                    .iter()
                    .map(|token| element.convert(field, token))
                    .collect::<Result<Vec<Value>, ConversionError>>()?;

                match self.reconstructor {
                    Reconstructor::Single => {
                        if values.len() == 1 {
                            Ok(values.remove(0))
                        } else {
                            Err(ConversionError::ArityMismatch {
                                field: field.to_string(),
                                expected: 1,
                                provided: values.len(),
                            })
                        }
                    }
                    Reconstructor::List => Ok(Value::List(values)),
                    Reconstructor::Set => Ok(Value::set(values)),
                    Reconstructor::Tuple => Ok(Value::Tuple(values)),
                }
            }
        }
    }
}

/// Parse a boolean literal: `1`/`0`, or a non-empty case-insensitive prefix of `true`/`false`.
pub fn parse_bool(token: &str) -> Option<bool> {
    let lower = token.to_ascii_lowercase();

    if lower == "1" {
        Some(true)
    } else if lower == "0" {
        Some(false)
    } else if !lower.is_empty() && "true".starts_with(&lower) {
        Some(true)
    } else if !lower.is_empty() && "false".starts_with(&lower) {
        Some(false)
    } else {
        None
    }
}

/// Classify the field's annotation into a [`ResolvedShape`].
///
/// An explicit converter on the field's [`crate::FlagSpec`] bypasses classification altogether.
pub fn resolve(
    field: &FieldDescriptor,
    settings: &Settings,
    registry: &ConverterRegistry,
) -> Result<ResolvedShape, SchemaError> {
    let annotation = field
        .annotation
        .as_ref()
        .ok_or_else(|| SchemaError::MissingAnnotation(field.name.clone()))?;

    if let Some(converter) = &field.flag.converter {
        let nargs = field.flag.nargs.unwrap_or(Nargs::Precisely(1));
        let reconstructor = if nargs == Nargs::Precisely(1) {
            Reconstructor::Single
        } else {
            Reconstructor::List
        };
        let mut shape = ResolvedShape::new(
            ShapeKind::UserConstructible,
            nargs,
            ElementConverter::Uniform(Element::Converted(Arc::clone(converter))),
            reconstructor,
        );
        shape.type_name = annotation.to_string();
        return Ok(shape);
    }

    let mut shape = resolve_annotation(
        &field.name,
        &annotation.normalized(),
        field.default.as_ref(),
        settings.explicit_bool,
        registry,
    )?;

    if let (Some(nargs), None) = (field.flag.nargs, shape.switch) {
        shape.nargs = nargs;
    }

    shape.type_name = annotation.to_string();
    #[cfg(feature = "tracing_debug")]
    {
        debug!(
            "Resolved '{}' as {:?} (nargs={}, nullable={}).",
            field.name, shape.kind, shape.nargs, shape.nullable
        );
    }
    Ok(shape)
}

fn explicit_bool() -> ResolvedShape {
    ResolvedShape::new(
        ShapeKind::Boolean,
        Nargs::Precisely(1),
        ElementConverter::Uniform(Element::Bool),
        Reconstructor::Single,
    )
}

fn resolve_annotation(
    name: &str,
    annotation: &Annotation,
    default: Option<&Value>,
    explicit: bool,
    registry: &ConverterRegistry,
) -> Result<ResolvedShape, SchemaError> {
    match annotation {
        Annotation::Bool => {
            if explicit {
                Ok(explicit_bool())
            } else {
                // The polarity is fixed by the default: a `true` default can only be lowered.
                let mut shape = ResolvedShape::new(
                    ShapeKind::Boolean,
                    Nargs::Precisely(0),
                    ElementConverter::Uniform(Element::Bool),
                    Reconstructor::Single,
                );
                shape.switch = Some(!matches!(default, Some(Value::Bool(true))));
                Ok(shape)
            }
        }
        Annotation::Optional(inner) => {
            let inner = inner.normalized();
            let mut shape = match inner {
                // A switch cannot express the absent value.
                Annotation::Bool => explicit_bool(),
                other => resolve_annotation(name, &other, default, explicit, registry)?,
            };
            shape.nullable = true;

            if shape.kind == ShapeKind::Scalar {
                shape.kind = ShapeKind::OptionalScalar;
            }

            Ok(shape)
        }
        Annotation::Tuple(elements) => {
            if elements.is_empty() {
                return Err(SchemaError::EmptyTuple(name.to_string()));
            }

            let arity = u8::try_from(elements.len()).map_err(|_| SchemaError::UnsupportedType {
                field: name.to_string(),
                annotation: annotation.to_string(),
            })?;
            let elements = elements
                .iter()
                .map(|element| resolve_element(name, element, registry))
                .collect::<Result<Vec<Element>, SchemaError>>()?;
            Ok(ResolvedShape::new(
                ShapeKind::FixedTuple,
                Nargs::Precisely(arity),
                ElementConverter::Positional(elements),
                Reconstructor::Tuple,
            ))
        }
        Annotation::Variadic(container, element) => {
            let element = resolve_element(name, element, registry)?;
            let reconstructor = match container {
                Container::List => Reconstructor::List,
                Container::Set => Reconstructor::Set,
                Container::Tuple => Reconstructor::Tuple,
            };
            Ok(ResolvedShape::new(
                ShapeKind::VariadicSequence,
                Nargs::AtLeastOne,
                ElementConverter::Uniform(element),
                reconstructor,
            ))
        }
        Annotation::Literal(members) => {
            check_literals(name, members)?;
            Ok(ResolvedShape::new(
                ShapeKind::EnumeratedChoice,
                Nargs::Precisely(1),
                ElementConverter::Uniform(Element::Choice(members.clone())),
                Reconstructor::Single,
            ))
        }
        Annotation::Union(_) => Err(SchemaError::AmbiguousUnion(name.to_string())),
        Annotation::Str | Annotation::Int | Annotation::Float => {
            let element = resolve_element(name, annotation, registry)?;
            Ok(ResolvedShape::new(
                ShapeKind::Scalar,
                Nargs::Precisely(1),
                ElementConverter::Uniform(element),
                Reconstructor::Single,
            ))
        }
        Annotation::Named(_) => {
            let element = resolve_element(name, annotation, registry)?;
            Ok(ResolvedShape::new(
                ShapeKind::UserConstructible,
                Nargs::Precisely(1),
                ElementConverter::Uniform(element),
                Reconstructor::Single,
            ))
        }
        Annotation::NoneType => Err(SchemaError::UnsupportedType {
            field: name.to_string(),
            annotation: annotation.to_string(),
        }),
    }
}

fn resolve_element(
    name: &str,
    annotation: &Annotation,
    registry: &ConverterRegistry,
) -> Result<Element, SchemaError> {
    match annotation.normalized() {
        Annotation::Str => Ok(Element::Str),
        Annotation::Int => Ok(Element::Int),
        Annotation::Float => Ok(Element::Float),
        // Booleans inside containers always take an explicit literal.
        Annotation::Bool => Ok(Element::Bool),
        Annotation::Optional(inner) => resolve_element(name, &inner, registry),
        Annotation::Literal(members) => {
            check_literals(name, &members)?;
            Ok(Element::Choice(members))
        }
        Annotation::Named(tag) => match registry.get(&tag) {
            Some(converter) => Ok(Element::Converted(converter)),
            None => Err(SchemaError::UnsupportedType {
                field: name.to_string(),
                annotation: tag,
            }),
        },
        Annotation::Union(_) => Err(SchemaError::AmbiguousUnion(name.to_string())),
        other => Err(SchemaError::UnsupportedType {
            field: name.to_string(),
            annotation: other.to_string(),
        }),
    }
}

fn check_literals(name: &str, members: &[Value]) -> Result<(), SchemaError> {
    let mut seen: Vec<String> = Vec::default();

    for member in members {
        let rendered = member.render();

        if seen.contains(&rendered) {
            return Err(SchemaError::DuplicateLiteral {
                field: name.to_string(),
                literal: rendered,
            });
        }

        seen.push(rendered);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FlagSpec;
    use rstest::rstest;

    fn field(annotation: Annotation, default: Option<Value>) -> FieldDescriptor {
        FieldDescriptor {
            name: "f".to_string(),
            annotation: Some(annotation),
            default,
            ..FieldDescriptor::default()
        }
    }

    fn tokens(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn shape_of(annotation: Annotation, default: Option<Value>) -> ResolvedShape {
        resolve(
            &field(annotation, default),
            &Settings::default(),
            &ConverterRegistry::default(),
        )
        .unwrap()
    }

    #[rstest]
    #[case("1", Some(true))]
    #[case("0", Some(false))]
    #[case("t", Some(true))]
    #[case("TRU", Some(true))]
    #[case("true", Some(true))]
    #[case("F", Some(false))]
    #[case("fals", Some(false))]
    #[case("False", Some(false))]
    #[case("", None)]
    #[case("truee", None)]
    #[case("yes", None)]
    #[case("2", None)]
    fn boolean_literal(#[case] token: &str, #[case] expected: Option<bool>) {
        assert_eq!(parse_bool(token), expected);
    }

    #[rstest]
    #[case(None, true)]
    #[case(Some(Value::Bool(false)), true)]
    #[case(Some(Value::Bool(true)), false)]
    fn boolean_polarity(#[case] default: Option<Value>, #[case] target: bool) {
        let shape = shape_of(Annotation::Bool, default);
        assert_eq!(shape.kind(), ShapeKind::Boolean);
        assert_eq!(shape.nargs(), Nargs::Precisely(0));
        assert_eq!(shape.switch(), Some(target));
        assert_eq!(shape.convert("f", &[]).unwrap(), Value::Bool(target));
    }

    #[test]
    fn boolean_explicit() {
        let settings = Settings {
            explicit_bool: true,
            ..Settings::default()
        };
        let shape = resolve(
            &field(Annotation::Bool, Some(Value::Bool(true))),
            &settings,
            &ConverterRegistry::default(),
        )
        .unwrap();

        assert_eq!(shape.nargs(), Nargs::Precisely(1));
        assert_eq!(shape.switch(), None);
        assert_eq!(
            shape.convert("f", &tokens(&["Fa"])).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            shape.convert("f", &tokens(&["maybe"])).unwrap_err(),
            ConversionError::InvalidBooleanLiteral {
                field: "f".to_string(),
                token: "maybe".to_string(),
            }
        );
    }

    #[test]
    fn optional_bool_is_explicit() {
        let shape = shape_of(Annotation::optional(Annotation::Bool), Some(Value::None));
        assert_eq!(shape.kind(), ShapeKind::Boolean);
        assert!(shape.is_nullable());
        assert_eq!(shape.nargs(), Nargs::Precisely(1));
        assert_eq!(shape.convert("f", &tokens(&["t"])).unwrap(), Value::Bool(true));
    }

    #[test]
    fn optional_scalar() {
        let shape = shape_of(
            Annotation::union(vec![Annotation::NoneType, Annotation::Int]),
            Some(Value::None),
        );
        assert_eq!(shape.kind(), ShapeKind::OptionalScalar);
        assert!(shape.is_nullable());
        assert_eq!(shape.convert("f", &tokens(&["7"])).unwrap(), Value::Int(7));
    }

    #[rstest]
    #[case(Annotation::Str, "abc", Value::from("abc"))]
    #[case(Annotation::Int, "-5", Value::Int(-5))]
    #[case(Annotation::Float, "2.5", Value::Float(2.5))]
    fn scalar(#[case] annotation: Annotation, #[case] token: &str, #[case] expected: Value) {
        let shape = shape_of(annotation, None);
        assert_eq!(shape.kind(), ShapeKind::Scalar);
        assert_eq!(shape.nargs(), Nargs::Precisely(1));
        assert_eq!(shape.convert("f", &tokens(&[token])).unwrap(), expected);
    }

    #[test]
    fn scalar_conversion_error() {
        let shape = shape_of(Annotation::Int, None);
        assert_matches!(
            shape.convert("f", &tokens(&["abc"])),
            Err(ConversionError::ArgumentConversion { field, token, .. }) if field == "f" && token == "abc"
        );
    }

    #[rstest]
    #[case(vec!["x", "5", "true"], Ok(Value::Tuple(vec![Value::from("x"), Value::Int(5), Value::Bool(true)])))]
    #[case(vec!["x", "5"], Err(2))]
    #[case(vec!["x", "5", "true", "y"], Err(4))]
    fn fixed_tuple(#[case] input: Vec<&str>, #[case] expected: Result<Value, usize>) {
        let shape = shape_of(
            Annotation::tuple(vec![Annotation::Str, Annotation::Int, Annotation::Bool]),
            None,
        );
        assert_eq!(shape.kind(), ShapeKind::FixedTuple);
        assert_eq!(shape.nargs(), Nargs::Precisely(3));

        match expected {
            Ok(value) => assert_eq!(shape.convert("f", &tokens(&input)).unwrap(), value),
            Err(provided) => assert_eq!(
                shape.convert("f", &tokens(&input)).unwrap_err(),
                ConversionError::ArityMismatch {
                    field: "f".to_string(),
                    expected: 3,
                    provided,
                }
            ),
        }
    }

    #[test]
    fn empty_tuple() {
        let error = resolve(
            &field(Annotation::tuple(vec![]), None),
            &Settings::default(),
            &ConverterRegistry::default(),
        )
        .unwrap_err();
        assert_eq!(error, SchemaError::EmptyTuple("f".to_string()));
    }

    #[rstest]
    #[case(Annotation::list(Annotation::Int), Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(1)]))]
    #[case(Annotation::set(Annotation::Int), Value::set(vec![Value::Int(1), Value::Int(2)]))]
    #[case(Annotation::variadic_tuple(Annotation::Int), Value::Tuple(vec![Value::Int(1), Value::Int(2), Value::Int(1)]))]
    fn variadic(#[case] annotation: Annotation, #[case] expected: Value) {
        let shape = shape_of(annotation, None);
        assert_eq!(shape.kind(), ShapeKind::VariadicSequence);
        assert_eq!(shape.nargs(), Nargs::AtLeastOne);
        assert_eq!(
            shape.convert("f", &tokens(&["1", "2", "1"])).unwrap(),
            expected
        );
    }

    #[test]
    fn variadic_bool_elements() {
        let shape = shape_of(Annotation::list(Annotation::Bool), None);
        assert_eq!(
            shape.convert("f", &tokens(&["t", "0"])).unwrap(),
            Value::List(vec![Value::Bool(true), Value::Bool(false)])
        );
    }

    #[rstest]
    #[case("false", Ok(Value::Bool(false)))]
    #[case("H", Ok(Value::from("H")))]
    #[case("1", Ok(Value::Int(1)))]
    #[case("true", Err(()))]
    #[case("h", Err(()))]
    fn literal_choice(#[case] token: &str, #[case] expected: Result<Value, ()>) {
        let shape = shape_of(
            Annotation::literal(vec![Value::from("H"), Value::Int(1), Value::Bool(false)]),
            None,
        );
        assert_eq!(shape.kind(), ShapeKind::EnumeratedChoice);
        assert_eq!(
            shape.choices(),
            Some(vec!["H".to_string(), "1".to_string(), "false".to_string()])
        );

        match expected {
            Ok(value) => assert_eq!(shape.convert("f", &tokens(&[token])).unwrap(), value),
            Err(()) => assert_matches!(
                shape.convert("f", &tokens(&[token])),
                Err(ConversionError::InvalidChoice { choices, .. }) if choices == "H, 1, false"
            ),
        }
    }

    #[test]
    fn literal_duplicate() {
        let error = resolve(
            &field(
                Annotation::literal(vec![Value::Int(1), Value::from("1")]),
                None,
            ),
            &Settings::default(),
            &ConverterRegistry::default(),
        )
        .unwrap_err();
        assert_eq!(
            error,
            SchemaError::DuplicateLiteral {
                field: "f".to_string(),
                literal: "1".to_string(),
            }
        );
    }

    #[test]
    fn list_of_literals() {
        let shape = shape_of(
            Annotation::list(Annotation::literal(vec!["a", "b"])),
            None,
        );
        assert_eq!(shape.kind(), ShapeKind::VariadicSequence);
        assert_eq!(shape.choices(), Some(vec!["a".to_string(), "b".to_string()]));
        assert_matches!(
            shape.convert("f", &tokens(&["a", "c"])),
            Err(ConversionError::InvalidChoice { token, .. }) if token == "c"
        );
    }

    #[test]
    fn union_is_ambiguous() {
        let error = resolve(
            &field(Annotation::union(vec![Annotation::Int, Annotation::Str]), None),
            &Settings::default(),
            &ConverterRegistry::default(),
        )
        .unwrap_err();
        assert_eq!(error, SchemaError::AmbiguousUnion("f".to_string()));
    }

    #[test]
    fn union_with_converter() {
        let mut descriptor = field(Annotation::union(vec![Annotation::Int, Annotation::Str]), None);
        descriptor.flag = FlagSpec::default().converter(|token: &str| {
            Ok(match token.parse::<i64>() {
                Ok(i) => Value::Int(i),
                Err(_) => Value::from(token),
            })
        });
        let shape = resolve(&descriptor, &Settings::default(), &ConverterRegistry::default())
            .unwrap();

        assert_eq!(shape.kind(), ShapeKind::UserConstructible);
        assert_eq!(shape.convert("f", &tokens(&["3"])).unwrap(), Value::Int(3));
        assert_eq!(shape.convert("f", &tokens(&["x"])).unwrap(), Value::from("x"));
    }

    #[test]
    fn named() {
        let mut registry = ConverterRegistry::default();
        registry.register("Even", |token: &str| match token.parse::<i64>() {
            Ok(i) if i % 2 == 0 => Ok(Value::custom("Even", token)),
            _ => Err("not an even number".to_string()),
        });
        let shape = resolve(
            &field(Annotation::named("Even"), None),
            &Settings::default(),
            &registry,
        )
        .unwrap();

        assert_eq!(shape.kind(), ShapeKind::UserConstructible);
        assert_eq!(
            shape.convert("f", &tokens(&["4"])).unwrap(),
            Value::custom("Even", "4")
        );
        assert_matches!(
            shape.convert("f", &tokens(&["3"])),
            Err(ConversionError::ArgumentConversion { reason, .. }) if reason == "not an even number"
        );
    }

    #[test]
    fn named_unregistered() {
        let error = resolve(
            &field(Annotation::named("Missing"), None),
            &Settings::default(),
            &ConverterRegistry::default(),
        )
        .unwrap_err();
        assert_matches!(error, SchemaError::UnsupportedType { annotation, .. } if annotation == "Missing");
    }

    #[test]
    fn missing_annotation() {
        let mut descriptor = field(Annotation::Int, None);
        descriptor.annotation = None;
        let error = resolve(&descriptor, &Settings::default(), &ConverterRegistry::default())
            .unwrap_err();
        assert_eq!(error, SchemaError::MissingAnnotation("f".to_string()));
    }

    #[test]
    fn nargs_override() {
        let mut descriptor = field(Annotation::list(Annotation::Int), None);
        descriptor.flag = FlagSpec::default().nargs(Nargs::Any);
        let shape = resolve(&descriptor, &Settings::default(), &ConverterRegistry::default())
            .unwrap();
        assert_eq!(shape.nargs(), Nargs::Any);
        assert_eq!(shape.convert("f", &[]).unwrap(), Value::List(vec![]));
    }
}
