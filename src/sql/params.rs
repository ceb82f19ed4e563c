use indexmap::IndexMap;
use serde_json::Value;

/// Runtime values for the `Param` placeholders of one lowered query, in
/// registration order. Names are unique within one translation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamTable(IndexMap<String, Value>);

impl ParamTable {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}
