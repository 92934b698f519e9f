use std::collections::{BTreeSet, HashSet};
use std::hash::Hash;
use std::path::{Path, PathBuf};

use crate::error::{Error, ValueError};
use crate::materialize::{Instance, TypedParser};
use crate::parser::{ConsoleInterface, UserInterface};
use crate::schema::{introspect, Definition, NoDocs};
use crate::serialize::{LoadOptions, SaveOptions, Trust};
use crate::types::{Annotation, ConverterRegistry};
use crate::value::Value;

/// A Rust type usable as a field of a [`TypedArgs`] struct.
///
/// The annotation drives parsing; `from_value`/`into_value` move between the type and its [`Value`].
pub trait ArgType: Sized + Clone {
    /// The declared type expression of the field.
    fn annotation() -> Annotation;

    #[allow(missing_docs)]
    fn from_value(value: Value) -> Result<Self, ValueError>;

    #[allow(missing_docs)]
    fn into_value(self) -> Value;

    /// Register the converters the type needs (only user-constructible types have any).
    fn register(_registry: &mut ConverterRegistry) {}
}

fn mismatch<T: ArgType>(found: &Value) -> ValueError {
    ValueError {
        expected: T::annotation().to_string(),
        found: format!("{} {}", found.kind(), found.render()),
    }
}

impl ArgType for bool {
    fn annotation() -> Annotation {
        Annotation::Bool
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl ArgType for String {
    fn annotation() -> Annotation {
        Annotation::Str
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Str(s) => Ok(s),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn into_value(self) -> Value {
        Value::Str(self)
    }
}

impl ArgType for PathBuf {
    fn annotation() -> Annotation {
        Annotation::Str
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Str(s) => Ok(PathBuf::from(s)),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn into_value(self) -> Value {
        Value::Str(self.to_string_lossy().into_owned())
    }
}

macro_rules! arg_type_int {
    ($($t:ty),*) => {
        $(
            impl ArgType for $t {
                fn annotation() -> Annotation {
                    Annotation::Int
                }

                fn from_value(value: Value) -> Result<Self, ValueError> {
                    match value {
                        Value::Int(i) => <$t>::try_from(i).map_err(|_| ValueError {
                            expected: stringify!($t).to_string(),
                            found: i.to_string(),
                        }),
                        other => Err(mismatch::<Self>(&other)),
                    }
                }

                fn into_value(self) -> Value {
                    Value::Int(i64::from(self))
                }
            }
        )*
    };
}

// Only the integers every value of which an `Int` holds.
arg_type_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! arg_type_float {
    ($($t:ty),*) => {
        $(
            impl ArgType for $t {
                fn annotation() -> Annotation {
                    Annotation::Float
                }

                fn from_value(value: Value) -> Result<Self, ValueError> {
                    match value {
                        Value::Float(f) => Ok(f as $t),
                        Value::Int(i) => Ok(i as $t),
                        other => Err(mismatch::<Self>(&other)),
                    }
                }

                fn into_value(self) -> Value {
                    Value::Float(f64::from(self))
                }
            }
        )*
    };
}

arg_type_float!(f32, f64);

impl<T: ArgType> ArgType for Option<T> {
    fn annotation() -> Annotation {
        Annotation::optional(T::annotation())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::None => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }

    fn into_value(self) -> Value {
        match self {
            Some(inner) => inner.into_value(),
            None => Value::None,
        }
    }

    fn register(registry: &mut ConverterRegistry) {
        T::register(registry);
    }
}

// Any sequence variant is accepted, so a loaded list still fills a set.
fn elements<T: ArgType, C: ArgType>(value: Value) -> Result<Vec<T>, ValueError> {
    match value {
        Value::List(items) | Value::Set(items) | Value::Tuple(items) => {
            items.into_iter().map(T::from_value).collect()
        }
        other => Err(mismatch::<C>(&other)),
    }
}

impl<T: ArgType> ArgType for Vec<T> {
    fn annotation() -> Annotation {
        Annotation::list(T::annotation())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        elements::<T, Self>(value)
    }

    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(ArgType::into_value).collect())
    }

    fn register(registry: &mut ConverterRegistry) {
        T::register(registry);
    }
}

impl<T: ArgType + Eq + Hash> ArgType for HashSet<T> {
    fn annotation() -> Annotation {
        Annotation::set(T::annotation())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        Ok(elements::<T, Self>(value)?.into_iter().collect())
    }

    fn into_value(self) -> Value {
        Value::set(self.into_iter().map(ArgType::into_value))
    }

    fn register(registry: &mut ConverterRegistry) {
        T::register(registry);
    }
}

impl<T: ArgType + Ord> ArgType for BTreeSet<T> {
    fn annotation() -> Annotation {
        Annotation::set(T::annotation())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        Ok(elements::<T, Self>(value)?.into_iter().collect())
    }

    fn into_value(self) -> Value {
        Value::set(self.into_iter().map(ArgType::into_value))
    }

    fn register(registry: &mut ConverterRegistry) {
        T::register(registry);
    }
}

macro_rules! arg_type_tuple {
    ($arity:expr; $($t:ident $v:ident),+) => {
        impl<$($t: ArgType),+> ArgType for ($($t,)+) {
            fn annotation() -> Annotation {
                Annotation::tuple([$($t::annotation()),+])
            }

            fn from_value(value: Value) -> Result<Self, ValueError> {
                match value {
                    Value::Tuple(items) | Value::List(items) if items.len() == $arity => {
                        let mut items = items.into_iter();
                        Ok(($(
                            $t::from_value(
                                items
                                    .next()
                                    .expect("internal error - the arity was checked"),
                            )?,
                        )+))
                    }
                    other => Err(mismatch::<Self>(&other)),
                }
            }

            fn into_value(self) -> Value {
                let ($($v,)+) = self;
                Value::Tuple(vec![$($v.into_value()),+])
            }

            fn register(registry: &mut ConverterRegistry) {
                $($t::register(registry);)+
            }
        }
    };
}

arg_type_tuple!(1; A a);
arg_type_tuple!(2; A a, B b);
arg_type_tuple!(3; A a, B b, C c);
arg_type_tuple!(4; A a, B b, C c, D d);

/// Opt a `FromStr + Display + Clone` type in as a user-constructible [`ArgType`].
///
/// The converter is registered under the type's name, or under the given tag.
///
/// ```
/// use schemarg_builder::arg_type;
/// use std::net::Ipv4Addr;
///
/// #[derive(Clone)]
/// struct Address(Ipv4Addr);
///
/// impl std::str::FromStr for Address {
///     type Err = std::net::AddrParseError;
///
///     fn from_str(s: &str) -> Result<Self, Self::Err> {
///         s.parse().map(Address)
///     }
/// }
///
/// impl std::fmt::Display for Address {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         write!(f, "{}", self.0)
///     }
/// }
///
/// arg_type!(Address);
/// ```
#[macro_export]
macro_rules! arg_type {
    ($t:ty) => {
        $crate::arg_type!($t, stringify!($t));
    };
    ($t:ty, $tag:expr) => {
        impl $crate::ArgType for $t {
            fn annotation() -> $crate::Annotation {
                $crate::Annotation::named($tag)
            }

            fn from_value(value: $crate::Value) -> ::std::result::Result<Self, $crate::ValueError> {
                let text = match value {
                    $crate::Value::Custom { text, .. } | $crate::Value::Str(text) => text,
                    other => {
                        return ::std::result::Result::Err($crate::ValueError {
                            expected: ::std::string::ToString::to_string($tag),
                            found: other.render(),
                        })
                    }
                };
                <$t as ::std::str::FromStr>::from_str(&text).map_err(|error| $crate::ValueError {
                    expected: ::std::string::ToString::to_string($tag),
                    found: format!("{text} ({error})"),
                })
            }

            fn into_value(self) -> $crate::Value {
                $crate::Value::custom($tag, ::std::string::ToString::to_string(&self))
            }

            fn register(registry: &mut $crate::ConverterRegistry) {
                registry.register_from_str::<$t>($tag);
            }
        }
    };
}

/// A struct whose fields are the arguments of a program.
///
/// Usually implemented with `#[derive(TypedArgs)]`.
pub trait TypedArgs: Sized {
    /// The explicit field-descriptor table of the struct.
    fn definition() -> Definition;

    /// Read each field from a materialized instance.
    fn from_instance(instance: &Instance) -> Result<Self, Error>;

    /// Write each field into an instance of [`TypedArgs::definition`].
    fn to_instance(&self) -> Result<Instance, Error>;

    /// The parser over [`TypedArgs::definition`], for adding docs or hooks.
    fn parser() -> TypedParser {
        TypedParser::new(Self::definition())
    }

    /// Parse the command line, exiting the process on help or error.
    fn parse() -> Self {
        let instance = Self::parser().parse();

        match Self::from_instance(&instance) {
            Ok(value) => value,
            Err(error) => {
                ConsoleInterface::default().print_error(error.to_string());
                std::process::exit(error.exit_code());
            }
        }
    }

    #[allow(missing_docs)]
    fn parse_tokens(tokens: &[&str]) -> Result<Self, Error> {
        let instance = Self::parser().parse_tokens(tokens)?;
        Self::from_instance(&instance)
    }

    /// Parse `tokens`, also returning the unrecognized ones.
    fn parse_known_tokens(tokens: &[&str]) -> Result<(Self, Vec<String>), Error> {
        let instance = Self::parser().parse_known_tokens(tokens)?;
        Ok((Self::from_instance(&instance)?, instance.extra_args().to_vec()))
    }

    /// Persist the fields as JSON; see [`Instance::save`].
    fn save(&self, path: impl AsRef<Path>, with_reproducibility: bool) -> Result<(), Error> {
        self.to_instance()?.save(path, with_reproducibility)
    }

    /// Persist the fields as JSON; see [`Instance::save_with`].
    fn save_with(&self, path: impl AsRef<Path>, options: SaveOptions) -> Result<(), Error> {
        self.to_instance()?.save_with(path, options)
    }

    /// Restore the fields from JSON; see [`Instance::load`].
    fn load(path: impl AsRef<Path>, trust: Trust, check_reproducibility: bool) -> Result<Self, Error> {
        Self::load_with(
            path,
            LoadOptions {
                trust,
                check_reproducibility,
                ..LoadOptions::default()
            },
        )
    }

    /// Restore the fields from JSON; see [`Instance::load_with`].
    fn load_with(path: impl AsRef<Path>, options: LoadOptions) -> Result<Self, Error> {
        let schema = introspect(&Self::definition(), &NoDocs)?;
        let mut instance = Instance::new(&schema);
        instance.load_with(path, options)?;
        Self::from_instance(&instance)
    }
}
