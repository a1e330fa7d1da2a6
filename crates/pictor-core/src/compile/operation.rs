//! Compiled transformation operations.

use serde::{Deserialize, Serialize};

/// Value of a single operation parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl ParamValue {
    pub fn text(s: impl Into<String>) -> Self {
        ParamValue::Text(s.into())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub value: ParamValue,
}

/// One step of the delivery pipeline, e.g. `{ width: 200, height: 100 }`.
///
/// Parameters keep the order of the registry field list so that compiling
/// the same input always produces the same sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Registry key of the transformation kind that produced this step.
    pub kind: String,
    pub params: Vec<Param>,
}

impl Operation {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            params: Vec::new(),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, value: ParamValue) {
        self.params.push(Param {
            name: name.into(),
            value,
        });
    }

    pub fn with(mut self, name: impl Into<String>, value: ParamValue) -> Self {
        self.push(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.params.iter().find(|p| p.name == name).map(|p| &p.value)
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}
