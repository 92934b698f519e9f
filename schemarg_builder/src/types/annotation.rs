use crate::value::Value;

/// The container a variadic annotation reconstructs into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    #[allow(missing_docs)]
    List,
    #[allow(missing_docs)]
    Set,
    /// A homogeneous tuple of any length.
    Tuple,
}

/// A declared type expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    #[allow(missing_docs)]
    Str,
    #[allow(missing_docs)]
    Int,
    #[allow(missing_docs)]
    Float,
    #[allow(missing_docs)]
    Bool,
    /// The type of the absent value; only meaningful inside a union.
    NoneType,
    /// The inner type, or absent.
    Optional(Box<Annotation>),
    /// A fixed tuple with one annotation per position.
    Tuple(Vec<Annotation>),
    /// Any number of elements of one type.
    Variadic(Container, Box<Annotation>),
    /// One of a set of literal values, possibly of mixed types.
    Literal(Vec<Value>),
    /// One of several types.
    Union(Vec<Annotation>),
    /// A user-constructible type, looked up in the converter registry by this tag.
    Named(String),
}

impl Annotation {
    #[allow(missing_docs)]
    pub fn optional(inner: Annotation) -> Self {
        Annotation::Optional(Box::new(inner))
    }

    #[allow(missing_docs)]
    pub fn list(element: Annotation) -> Self {
        Annotation::Variadic(Container::List, Box::new(element))
    }

    #[allow(missing_docs)]
    pub fn set(element: Annotation) -> Self {
        Annotation::Variadic(Container::Set, Box::new(element))
    }

    /// A homogeneous tuple of any length.
    pub fn variadic_tuple(element: Annotation) -> Self {
        Annotation::Variadic(Container::Tuple, Box::new(element))
    }

    #[allow(missing_docs)]
    pub fn tuple(elements: impl IntoIterator<Item = Annotation>) -> Self {
        Annotation::Tuple(elements.into_iter().collect())
    }

    #[allow(missing_docs)]
    pub fn literal(members: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        Annotation::Literal(members.into_iter().map(Into::into).collect())
    }

    #[allow(missing_docs)]
    pub fn union(members: impl IntoIterator<Item = Annotation>) -> Self {
        Annotation::Union(members.into_iter().collect())
    }

    #[allow(missing_docs)]
    pub fn named(tag: impl Into<String>) -> Self {
        Annotation::Named(tag.into())
    }

    /// Restrict the innermost element type to the literal `choices`.
    ///
    /// `Str` with choices `["a", "b"]` becomes `Literal["a", "b"]`, and `List<Str>` becomes `List<Literal["a", "b"]>`.
    pub fn with_choices(self, choices: Vec<Value>) -> Self {
        match self {
            Annotation::Optional(inner) => Annotation::optional(inner.with_choices(choices)),
            Annotation::Variadic(container, element) => {
                Annotation::Variadic(container, Box::new(element.with_choices(choices)))
            }
            _ => Annotation::Literal(choices),
        }
    }

    /// Collapse a union that includes the absent type into an optional.
    pub(crate) fn normalized(&self) -> Annotation {
        match self {
            Annotation::Union(members) if members.contains(&Annotation::NoneType) => {
                let mut rest: Vec<Annotation> = members
                    .iter()
                    .filter(|m| *m != &Annotation::NoneType)
                    .cloned()
                    .collect();

                match rest.len() {
                    0 => Annotation::NoneType,
                    1 => Annotation::optional(rest.remove(0)),
                    _ => Annotation::optional(Annotation::Union(rest)),
                }
            }
            other => other.clone(),
        }
    }
}

impl std::fmt::Display for Annotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Annotation::Str => write!(f, "str"),
            Annotation::Int => write!(f, "int"),
            Annotation::Float => write!(f, "float"),
            Annotation::Bool => write!(f, "bool"),
            Annotation::NoneType => write!(f, "None"),
            Annotation::Optional(inner) => write!(f, "Optional<{inner}>"),
            Annotation::Tuple(elements) => write!(f, "({})", join(elements)),
            Annotation::Variadic(Container::List, element) => write!(f, "List<{element}>"),
            Annotation::Variadic(Container::Set, element) => write!(f, "Set<{element}>"),
            Annotation::Variadic(Container::Tuple, element) => write!(f, "Tuple<{element}, ...>"),
            Annotation::Literal(members) => write!(
                f,
                "Literal{{{}}}",
                members
                    .iter()
                    .map(Value::render)
                    .collect::<Vec<String>>()
                    .join(", ")
            ),
            Annotation::Union(members) => write!(f, "Union<{}>", join(members)),
            Annotation::Named(tag) => write!(f, "{tag}"),
        }
    }
}

fn join(annotations: &[Annotation]) -> String {
    annotations
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<String>>()
        .join(", ")
}
