#![allow(dead_code)]

use expconf::config::{ConfigEntry, ConfigNode, ConfigValue, FlatConfig, FlatEntry};

/// Builder for `ConfigNode` to simplify test setup.
///
/// ```ignore
/// let cfg = NodeBuilder::new()
///     .value("seed", 666)
///     .node("training", NodeBuilder::new().value("seed", "{seed}"))
///     .build();
/// ```
#[derive(Debug, Default)]
pub struct NodeBuilder {
    node: ConfigNode,
}

impl NodeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(mut self, key: &str, value: impl Into<ConfigValue>) -> Self {
        self.node.insert(key, ConfigEntry::Value(value.into()));
        self
    }

    pub fn list<V: Into<ConfigValue>>(mut self, key: &str, items: impl IntoIterator<Item = V>) -> Self {
        let items: Vec<ConfigValue> = items.into_iter().map(Into::into).collect();
        self.node.insert(key, items);
        self
    }

    pub fn node(mut self, key: &str, child: NodeBuilder) -> Self {
        self.node.insert(key, child.build());
        self
    }

    pub fn build(self) -> ConfigNode {
        self.node
    }
}

/// Builder for `FlatConfig`, for tests that bypass `flatten`.
#[derive(Debug, Default)]
pub struct FlatBuilder {
    flat: FlatConfig,
}

impl FlatBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(mut self, key: &str, value: impl Into<ConfigValue>) -> Self {
        self.flat.insert(key, FlatEntry::Value(value.into()));
        self
    }

    pub fn list<V: Into<ConfigValue>>(mut self, key: &str, items: impl IntoIterator<Item = V>) -> Self {
        let items: Vec<ConfigValue> = items.into_iter().map(Into::into).collect();
        self.flat.insert(key, items);
        self
    }

    pub fn build(self) -> FlatConfig {
        self.flat
    }
}
