use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Positional constructor arguments for one filter.
///
/// Accepts a list, a single value, or null in configuration:
///
/// ```yaml
/// Filters:
///   replace: ["\\$VERSION", "1.4.2"]
///   prepend: "/* (c) example */"
///   strip-source-maps: ~
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawArguments", into = "Vec<Value>")]
pub struct FilterArguments(Vec<Value>);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawArguments {
    List(Vec<Value>),
    Single(Value),
}

impl From<RawArguments> for FilterArguments {
    fn from(raw: RawArguments) -> Self {
        match raw {
            RawArguments::List(values) => Self(values),
            RawArguments::Single(Value::Null) => Self(Vec::new()),
            RawArguments::Single(value) => Self(vec![value]),
        }
    }
}

impl From<FilterArguments> for Vec<Value> {
    fn from(arguments: FilterArguments) -> Self {
        arguments.0
    }
}

impl From<Vec<Value>> for FilterArguments {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl FilterArguments {
    pub fn args(&self) -> &[Value] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
