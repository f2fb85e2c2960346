use std::collections::BTreeMap;

use crate::foundation::error::{AnimError, AnimResult};

/// A named n-dimensional array of `f64` values stored in row-major order.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Variable {
    pub(crate) dims: Vec<String>,
    pub(crate) shape: Vec<usize>,
    pub(crate) data: Vec<f64>,
}

impl Variable {
    /// Build a variable, checking that `dims`, `shape` and `data` agree.
    pub fn new(dims: Vec<String>, shape: Vec<usize>, data: Vec<f64>) -> AnimResult<Self> {
        if dims.len() != shape.len() {
            return Err(AnimError::config(format!(
                "variable has {} dims but a shape of rank {}",
                dims.len(),
                shape.len()
            )));
        }
        let expected = shape.iter().product::<usize>();
        if expected != data.len() {
            return Err(AnimError::config(format!(
                "variable shape {shape:?} needs {expected} values, got {}",
                data.len()
            )));
        }
        Ok(Self { dims, shape, data })
    }

    /// One-dimensional variable along `dim`.
    pub fn vector(dim: impl Into<String>, data: Vec<f64>) -> Self {
        Self {
            dims: vec![dim.into()],
            shape: vec![data.len()],
            data,
        }
    }

    /// Zero-dimensional variable holding one value.
    pub fn scalar(value: f64) -> Self {
        Self {
            dims: Vec::new(),
            shape: Vec::new(),
            data: vec![value],
        }
    }

    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn values(&self) -> &[f64] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// In-memory size of the values.
    pub fn byte_size(&self) -> u64 {
        (self.data.len() * std::mem::size_of::<f64>()) as u64
    }
}

// Dataset semantics: missing values (NaN) compare equal to each other.
impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.dims == other.dims
            && self.shape == other.shape
            && self.data.len() == other.data.len()
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| a == b || (a.is_nan() && b.is_nan()))
    }
}

/// Scalar metadata attached to a [`Frame`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

/// One unit of domain data destined for rendering into one image.
///
/// A frame is a small dataset: data variables, coordinate variables and attributes. Frames are
/// immutable once handed to the pipeline.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Frame {
    pub(crate) variables: BTreeMap<String, Variable>,
    pub(crate) coords: BTreeMap<String, Variable>,
    pub(crate) attrs: BTreeMap<String, AttrValue>,
}

impl Frame {
    /// An empty frame (no variables, no coordinates, no attributes).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_variable(mut self, name: impl Into<String>, var: Variable) -> Self {
        self.variables.insert(name.into(), var);
        self
    }

    pub fn with_coord(mut self, name: impl Into<String>, var: Variable) -> Self {
        self.coords.insert(name.into(), var);
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    pub fn coord(&self, name: &str) -> Option<&Variable> {
        self.coords.get(name)
    }

    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn coords(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.coords.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty() && self.coords.is_empty() && self.attrs.is_empty()
    }

    /// In-memory size of all variable and coordinate values, in bytes.
    pub fn byte_size(&self) -> u64 {
        self.variables
            .values()
            .chain(self.coords.values())
            .map(Variable::byte_size)
            .sum()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/frame/model.rs"]
mod tests;
