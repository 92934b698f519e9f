use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use crate::value::Value;

/// Converts one raw token into a value, or explains why it cannot.
pub type Converter = Arc<dyn Fn(&str) -> Result<Value, String> + Send + Sync>;

/// The converters for user-constructible types, keyed by type tag.
///
/// Populated once while the definition is built; read-only during parsing.
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    converters: HashMap<String, Converter>,
}

impl std::fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tags: Vec<&String> = self.converters.keys().collect();
        tags.sort();
        f.debug_struct("ConverterRegistry")
            .field("tags", &tags)
            .finish()
    }
}

impl ConverterRegistry {
    /// Register (or replace) the converter for `tag`.
    pub fn register(
        &mut self,
        tag: impl Into<String>,
        converter: impl Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
    ) {
        self.converters.insert(tag.into(), Arc::new(converter));
    }

    /// Register a type that round-trips through `FromStr` and `Display`.
    ///
    /// Converted values are stored as [`Value::Custom`] holding the `Display` form of the parsed value.
    pub fn register_from_str<T>(&mut self, tag: impl Into<String>)
    where
        T: FromStr + Display + 'static,
        <T as FromStr>::Err: Display,
    {
        let tag: String = tag.into();
        let value_tag = tag.clone();
        self.register(tag, move |token: &str| {
            T::from_str(token)
                .map(|parsed| Value::custom(value_tag.clone(), parsed.to_string()))
                .map_err(|error| error.to_string())
        });
    }

    /// The converter registered for `tag`.
    pub fn get(&self, tag: &str) -> Option<Converter> {
        self.converters.get(tag).cloned()
    }

    /// Whether a converter is registered for `tag`.
    pub fn contains(&self, tag: &str) -> bool {
        self.converters.contains_key(tag)
    }

    /// Add every converter of `other`, replacing same-tag entries.
    pub fn extend(&mut self, other: &ConverterRegistry) {
        for (tag, converter) in &other.converters {
            self.converters.insert(tag.clone(), Arc::clone(converter));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn register_from_str() {
        let mut registry = ConverterRegistry::default();
        registry.register_from_str::<Ipv4Addr>("Ipv4Addr");
        let converter = registry.get("Ipv4Addr").unwrap();

        assert_eq!(
            converter("127.0.0.1").unwrap(),
            Value::custom("Ipv4Addr", "127.0.0.1")
        );
        assert_matches!(converter("localhost"), Err(_));
        assert!(registry.get("Missing").is_none());
    }

    #[test]
    fn register_replaces() {
        let mut registry = ConverterRegistry::default();
        registry.register("Tag", |_| Ok(Value::Int(1)));
        registry.register("Tag", |_| Ok(Value::Int(2)));

        assert_eq!(registry.get("Tag").unwrap()("x").unwrap(), Value::Int(2));
    }

    #[test]
    fn extend() {
        let mut a = ConverterRegistry::default();
        a.register("A", |_| Ok(Value::Int(1)));
        let mut b = ConverterRegistry::default();
        b.register("B", |_| Ok(Value::Int(2)));

        a.extend(&b);
        assert!(a.contains("A"));
        assert!(a.contains("B"));
        assert_eq!(format!("{a:?}"), r#"ConverterRegistry { tags: ["A", "B"] }"#);
    }
}
