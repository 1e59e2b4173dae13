//! Multi-valued header container.
//!
//! # Design Decisions
//! - Names are matched exactly; no case folding is performed
//! - Every present name maps to at least one value
//! - Instances are immutable; mutation goes through [`HeaderSetBuilder`]

use std::collections::HashMap;

use crate::error::ValueCountError;

/// Well-known header names.
pub mod names {
    pub const ACCESS_CONTROL_ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";
    pub const ACCESS_CONTROL_ALLOW_METHODS: &str = "Access-Control-Allow-Methods";
    pub const ACCEPT: &str = "Accept";
    pub const ACCEPT_LANGUAGE: &str = "Accept-Language";
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const CONTENT_LANGUAGE: &str = "Content-Language";
}

/// HTTP request or response headers as name to ordered values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    headers: HashMap<String, Vec<String>>,
}

impl HeaderSet {
    /// A header set with no headers.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> HeaderSetBuilder {
        HeaderSetBuilder::default()
    }

    /// Copy this set into a builder for further changes.
    pub fn to_builder(&self) -> HeaderSetBuilder {
        HeaderSetBuilder {
            headers: self.headers.clone(),
        }
    }

    /// The values associated with `name`, in insertion order.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.headers.get(name).map(Vec::as_slice)
    }

    /// The single value associated with `name`.
    ///
    /// Fails unless exactly one value is present.
    pub fn get_only(&self, name: &str) -> Result<&str, ValueCountError> {
        match self.get(name) {
            Some([only]) => Ok(only.as_str()),
            other => Err(ValueCountError {
                name: name.to_string(),
                count: other.map_or(0, <[String]>::len),
            }),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.headers.contains_key(name)
    }

    /// True if some header has exactly `[value]` as its values.
    pub fn contains_value(&self, value: &str) -> bool {
        self.headers
            .values()
            .any(|values| matches!(values.as_slice(), [only] if only == value))
    }

    /// True if some header has exactly `values` as its values.
    pub fn contains_values<S: AsRef<str>>(&self, values: &[S]) -> bool {
        self.headers.values().any(|existing| {
            existing.len() == values.len()
                && existing.iter().zip(values).all(|(a, b)| a == b.as_ref())
        })
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.headers
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }
}

impl From<&axum::http::HeaderMap> for HeaderSet {
    fn from(map: &axum::http::HeaderMap) -> Self {
        let mut builder = HeaderSet::builder();
        for (name, value) in map {
            builder = builder.add(name.as_str(), String::from_utf8_lossy(value.as_bytes()));
        }
        builder.build()
    }
}

/// Accumulating builder for [`HeaderSet`].
#[derive(Debug, Clone, Default)]
pub struct HeaderSetBuilder {
    headers: HashMap<String, Vec<String>>,
}

impl HeaderSetBuilder {
    /// Append a value to the header.
    pub fn add(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.entry(name.into()).or_default().push(value.into());
        self
    }

    /// Append all the values to the header.
    pub fn add_all<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let mut values: Vec<String> = values.into_iter().map(Into::into).collect();
        // An empty batch must not leave a key with no values behind.
        if !values.is_empty() {
            self.headers.entry(name).or_default().append(&mut values);
        }
        self
    }

    /// Replace all values of the header with `value`.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), vec![value.into()]);
        self
    }

    /// Remove the header entirely.
    pub fn remove(mut self, name: &str) -> Self {
        self.headers.remove(name);
        self
    }

    pub fn build(self) -> HeaderSet {
        HeaderSet {
            headers: self.headers,
        }
    }
}
