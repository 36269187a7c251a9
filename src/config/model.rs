// src/config/model.rs

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// A scalar leaf of a configuration tree.
///
/// `Bool` and `Int` are distinct variants: a boolean is never treated as an
/// integer, neither when merging nor when converting strings.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ConfigValue {
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigValue::Bool(_) => "bool",
            ConfigValue::Int(_) => "int",
            ConfigValue::Float(_) => "float",
            ConfigValue::Str(_) => "string",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ConfigValue::Float(f) => Some(*f),
            _ => None,
        }
    }
}

/// Rendering used when a value is spliced into a larger string.
///
/// Floats keep a fractional part (`1.0`, not `1`) so the text converts back
/// to a float. Booleans are capitalized (`True` / `False`); string typing
/// ignores case, so they still convert back to booleans.
impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Bool(b) => f.write_str(if *b { "True" } else { "False" }),
            ConfigValue::Int(i) => write!(f, "{i}"),
            ConfigValue::Float(x) => write!(f, "{x:?}"),
            ConfigValue::Str(s) => f.write_str(s),
        }
    }
}

macro_rules! impl_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for ConfigValue {
                fn from(v: $ty) -> Self {
                    ConfigValue::$variant(v.into())
                }
            }
        )*
    };
}

impl_value_from! {
    bool => Bool,
    i32 => Int,
    i64 => Int,
    f64 => Float,
    &str => Str,
    String => Str,
}

/// Anything that can sit under a key of a [`ConfigNode`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigEntry {
    Value(ConfigValue),
    List(Vec<ConfigValue>),
    Node(ConfigNode),
}

impl ConfigEntry {
    /// Variant name used in warnings and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigEntry::Value(v) => v.kind(),
            ConfigEntry::List(_) => "list",
            ConfigEntry::Node(_) => "mapping",
        }
    }

    /// Two entries are of the same variant when an overlay may replace one
    /// with the other without a type change. All lists count as one variant.
    pub fn same_variant(&self, other: &ConfigEntry) -> bool {
        self.kind() == other.kind()
    }

    pub fn as_value(&self) -> Option<&ConfigValue> {
        match self {
            ConfigEntry::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(ConfigValue::as_str)
    }

    pub fn as_list(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigEntry::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&ConfigNode> {
        match self {
            ConfigEntry::Node(node) => Some(node),
            _ => None,
        }
    }
}

impl From<ConfigValue> for ConfigEntry {
    fn from(v: ConfigValue) -> Self {
        ConfigEntry::Value(v)
    }
}

impl From<Vec<ConfigValue>> for ConfigEntry {
    fn from(items: Vec<ConfigValue>) -> Self {
        ConfigEntry::List(items)
    }
}

impl From<ConfigNode> for ConfigEntry {
    fn from(node: ConfigNode) -> Self {
        ConfigEntry::Node(node)
    }
}

impl From<FlatEntry> for ConfigEntry {
    fn from(entry: FlatEntry) -> Self {
        match entry {
            FlatEntry::Value(v) => ConfigEntry::Value(v),
            FlatEntry::List(items) => ConfigEntry::List(items),
        }
    }
}

macro_rules! impl_entry_from_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ConfigEntry {
                fn from(v: $ty) -> Self {
                    ConfigEntry::Value(v.into())
                }
            }

            impl From<$ty> for FlatEntry {
                fn from(v: $ty) -> Self {
                    FlatEntry::Value(v.into())
                }
            }
        )*
    };
}

impl_entry_from_scalar!(bool, i32, i64, f64, &str, String);

/// A configuration tree: string keys (no `.` inside) mapping to values,
/// lists of values, or nested trees.
///
/// Keys are kept sorted; insertion order carries no meaning.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigNode {
    entries: BTreeMap<String, ConfigEntry>,
}

impl ConfigNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&ConfigEntry> {
        self.entries.get(key)
    }

    /// Look up a dotted path such as `"model.optim.lr"`.
    pub fn get_path(&self, path: &str) -> Option<&ConfigEntry> {
        let mut segments = path.split('.');
        let mut current = self.entries.get(segments.next()?)?;
        for segment in segments {
            current = current.as_node()?.get(segment)?;
        }
        Some(current)
    }

    pub fn insert(&mut self, key: impl Into<String>, entry: impl Into<ConfigEntry>) -> Option<ConfigEntry> {
        self.entries.insert(key.into(), entry.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<ConfigEntry> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, ConfigEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut ConfigEntry> {
        self.entries.get_mut(key)
    }
}

impl<K: Into<String>, E: Into<ConfigEntry>> FromIterator<(K, E)> for ConfigNode {
    fn from_iter<I: IntoIterator<Item = (K, E)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, e)| (k.into(), e.into())).collect(),
        }
    }
}

impl IntoIterator for ConfigNode {
    type Item = (String, ConfigEntry);
    type IntoIter = btree_map::IntoIter<String, ConfigEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a ConfigNode {
    type Item = (&'a String, &'a ConfigEntry);
    type IntoIter = btree_map::Iter<'a, String, ConfigEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// A leaf of a [`FlatConfig`]: never a nested tree.
#[derive(Debug, Clone, PartialEq)]
pub enum FlatEntry {
    Value(ConfigValue),
    List(Vec<ConfigValue>),
}

impl FlatEntry {
    pub fn kind(&self) -> &'static str {
        match self {
            FlatEntry::Value(v) => v.kind(),
            FlatEntry::List(_) => "list",
        }
    }

    pub fn as_value(&self) -> Option<&ConfigValue> {
        match self {
            FlatEntry::Value(v) => Some(v),
            FlatEntry::List(_) => None,
        }
    }
}

impl From<ConfigValue> for FlatEntry {
    fn from(v: ConfigValue) -> Self {
        FlatEntry::Value(v)
    }
}

impl From<Vec<ConfigValue>> for FlatEntry {
    fn from(items: Vec<ConfigValue>) -> Self {
        FlatEntry::List(items)
    }
}

impl fmt::Display for FlatEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlatEntry::Value(v) => fmt::Display::fmt(v, f),
            FlatEntry::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    fmt::Display::fmt(item, f)?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Dotted-path view of a [`ConfigNode`]: `{"a": {"b": 1}}` is `{"a.b": 1}`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlatConfig {
    entries: BTreeMap<String, FlatEntry>,
}

impl FlatConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&FlatEntry> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut FlatEntry> {
        self.entries.get_mut(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, entry: impl Into<FlatEntry>) -> Option<FlatEntry> {
        self.entries.insert(key.into(), entry.into())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, FlatEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, E: Into<FlatEntry>> FromIterator<(K, E)> for FlatConfig {
    fn from_iter<I: IntoIterator<Item = (K, E)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, e)| (k.into(), e.into())).collect(),
        }
    }
}

impl IntoIterator for FlatConfig {
    type Item = (String, FlatEntry);
    type IntoIter = btree_map::IntoIter<String, FlatEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a FlatConfig {
    type Item = (&'a String, &'a FlatEntry);
    type IntoIter = btree_map::Iter<'a, String, FlatEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Serialize for ConfigValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConfigValue::Bool(b) => serializer.serialize_bool(*b),
            ConfigValue::Int(i) => serializer.serialize_i64(*i),
            ConfigValue::Float(x) => serializer.serialize_f64(*x),
            ConfigValue::Str(s) => serializer.serialize_str(s),
        }
    }
}

impl Serialize for ConfigEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConfigEntry::Value(v) => v.serialize(serializer),
            ConfigEntry::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ConfigEntry::Node(node) => node.serialize(serializer),
        }
    }
}

impl Serialize for ConfigNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, entry) in &self.entries {
            map.serialize_entry(key, entry)?;
        }
        map.end()
    }
}
