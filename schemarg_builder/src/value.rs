use indexmap::IndexMap;

/// Field name to value, in declaration order.
pub type ValueMap = IndexMap<String, Value>;

/// A typed argument value.
///
/// Every field of an [`crate::Instance`] holds one of these.
/// Container variants keep the requested reconstruction (list, set, tuple) so that it survives persistence.
#[derive(Debug, Clone)]
pub enum Value {
    /// The absent value of a nullable field.
    None,
    #[allow(missing_docs)]
    Bool(bool),
    #[allow(missing_docs)]
    Int(i64),
    #[allow(missing_docs)]
    Float(f64),
    #[allow(missing_docs)]
    Str(String),
    /// An ordered sequence.
    List(Vec<Value>),
    /// An unordered collection without duplicates.
    /// Build via [`Value::set`] to collapse duplicates.
    Set(Vec<Value>),
    /// A fixed or variadic tuple.
    Tuple(Vec<Value>),
    /// A user-constructible value: the registry tag of its type and its string form.
    Custom {
        /// The converter registry tag.
        tag: String,
        /// The value's `Display` form, which its converter accepts back.
        text: String,
    },
}

impl Value {
    /// Build a set, collapsing duplicates (first occurrence wins).
    pub fn set(items: impl IntoIterator<Item = Value>) -> Self {
        let mut out: Vec<Value> = Vec::default();

        for item in items {
            if !out.contains(&item) {
                out.push(item);
            }
        }

        Value::Set(out)
    }

    /// Build a user-constructible value.
    pub fn custom(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Value::Custom {
            tag: tag.into(),
            text: text.into(),
        }
    }

    /// Whether this is the absent value.
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// The canonical string form.
    /// Literal choices are matched against this, and help text displays it.
    pub fn render(&self) -> String {
        match self {
            Value::None => "None".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format!("{f:?}"),
            Value::Str(s) => s.clone(),
            Value::List(items) => format!("[{}]", render_all(items)),
            Value::Set(items) => format!("{{{}}}", render_all(items)),
            Value::Tuple(items) => format!("({})", render_all(items)),
            Value::Custom { text, .. } => text.clone(),
        }
    }

    /// A short name for the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Tuple(_) => "tuple",
            Value::Custom { .. } => "custom",
        }
    }
}

fn render_all(items: &[Value]) -> String {
    items
        .iter()
        .map(Value::render)
        .collect::<Vec<String>>()
        .join(", ")
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            // NaN equals NaN so that persisted values compare equal to their originals.
            (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => {
                a.len() == b.len() && a.iter().all(|item| b.contains(item))
            }
            (
                Value::Custom { tag: ta, text: xa },
                Value::Custom { tag: tb, text: xb },
            ) => ta == tb && xa == xb,
            _ => false,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

macro_rules! value_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Value::Int(i64::from(value))
                }
            }
        )*
    };
}

value_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(inner) => inner.into(),
            None => Value::None,
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}
