// Copyright (c) 2025 - Cowboy AI, Inc.
//! Template Expressions
//!
//! Property values are either literals or intrinsic functions that the
//! provisioning tool resolves at deploy time (`Ref`, `Fn::Join`).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};

/// Pseudo parameter holding the deployed stack's name
pub const PSEUDO_STACK_NAME: &str = "AWS::StackName";

/// Pseudo parameter holding the deployment region
pub const PSEUDO_REGION: &str = "AWS::Region";

/// Whether `id` names a provider pseudo parameter
pub fn is_pseudo_parameter(id: &str) -> bool {
    id.starts_with("AWS::")
}

/// A property value inside a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Literal string
    Literal(String),
    /// `{"Ref": id}`
    Ref(String),
    /// `{"Fn::Join": [delimiter, [values...]]}`
    Join {
        delimiter: String,
        values: Vec<Expr>,
    },
}

impl Expr {
    /// Reference to a parameter, resource, or pseudo parameter
    pub fn reference(id: impl Into<String>) -> Self {
        Self::Ref(id.into())
    }

    /// Join `values` with `delimiter`
    pub fn join(delimiter: impl Into<String>, values: impl IntoIterator<Item = Expr>) -> Self {
        Self::Join {
            delimiter: delimiter.into(),
            values: values.into_iter().collect(),
        }
    }

    /// `Ref(AWS::StackName)`
    pub fn stack_name() -> Self {
        Self::reference(PSEUDO_STACK_NAME)
    }

    /// `Ref(AWS::Region)`
    pub fn region() -> Self {
        Self::reference(PSEUDO_REGION)
    }

    /// Target of a bare `Ref`, if this is one
    pub fn ref_target(&self) -> Option<&str> {
        match self {
            Self::Ref(id) => Some(id),
            _ => None,
        }
    }

    /// Every `Ref` target reachable from this expression, in order
    pub fn references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Literal(_) => {}
            Self::Ref(id) => out.push(id),
            Self::Join { values, .. } => {
                for value in values {
                    value.collect_references(out);
                }
            }
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Self::Literal(s) => Value::String(s.clone()),
            Self::Ref(id) => json!({ "Ref": id }),
            Self::Join { delimiter, values } => {
                let values: Vec<Value> = values.iter().map(Expr::to_value).collect();
                json!({ "Fn::Join": [delimiter, values] })
            }
        }
    }

    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::String(s) => Ok(Self::Literal(s.clone())),
            Value::Object(map) if map.len() == 1 => {
                if let Some(target) = map.get("Ref") {
                    return target
                        .as_str()
                        .map(Self::reference)
                        .ok_or_else(|| format!("Ref target must be a string: {target}"));
                }
                match map.get("Fn::Join").and_then(Value::as_array).map(Vec::as_slice) {
                    Some([Value::String(delimiter), Value::Array(values)]) => Ok(Self::Join {
                        delimiter: delimiter.clone(),
                        values: values
                            .iter()
                            .map(Self::from_value)
                            .collect::<Result<_, _>>()?,
                    }),
                    _ => Err(format!("unsupported intrinsic function: {value}")),
                }
            }
            other => Err(format!("unsupported expression: {other}")),
        }
    }
}

impl From<&str> for Expr {
    fn from(s: &str) -> Self {
        Self::Literal(s.to_string())
    }
}

impl From<String> for Expr {
    fn from(s: String) -> Self {
        Self::Literal(s)
    }
}

impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Expr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(serde::de::Error::custom)
    }
}
