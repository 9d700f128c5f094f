//! Query parameters and their declared schemas
//!
//! Every catalog parameter is an integer (years, months, top-N limits);
//! ranking direction is encoded in the query id itself. Specs carry the
//! allowed range and an optional default, and validation resolves a caller's
//! sparse parameter map into a fully populated one.

use crate::error::{Result, VarejoError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A sparse, named parameter assignment. BTreeMap keeps the canonical cache
/// key independent of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params(BTreeMap<String, i64>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: i64) -> Self {
        self.0.insert(name.into(), value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: i64) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.0.get(name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.0.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Parameter required by the executor after validation filled defaults.
    /// Absence at that point is a catalog definition bug.
    pub(crate) fn expect(&self, query: &str, name: &str) -> Result<i64> {
        self.get(name).ok_or_else(|| VarejoError::InvalidParameter {
            query: query.to_string(),
            name: name.to_string(),
            reason: "parameter missing after validation".to_string(),
        })
    }
}

impl fmt::Display for Params {
    /// Canonical `name=value&...` form, used in cache keys and error output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, value) in &self.0 {
            if !first {
                write!(f, "&")?;
            }
            write!(f, "{name}={value}")?;
            first = false;
        }
        Ok(())
    }
}

/// Declared schema for one query parameter.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    /// Filled in when the caller omits the parameter. None means required.
    pub default: Option<i64>,
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl ParamSpec {
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            default: None,
            min: None,
            max: None,
        }
    }

    pub const fn optional(name: &'static str, default: i64) -> Self {
        Self {
            name,
            default: Some(default),
            min: None,
            max: None,
        }
    }

    pub const fn range(mut self, min: i64, max: i64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub const fn at_least(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }
}

/// Validate caller parameters against a query's declared specs.
///
/// Rejects unknown names, missing required values, and out-of-range values;
/// returns a resolved map with defaults applied. Note that "in range" here
/// is structural (e.g. month 1-12): a year that simply does not occur in the
/// data passes validation and yields an empty result instead.
pub fn validate(query: &str, specs: &[ParamSpec], params: &Params) -> Result<Params> {
    for (name, _) in params.iter() {
        if !specs.iter().any(|s| s.name == name) {
            return Err(VarejoError::InvalidParameter {
                query: query.to_string(),
                name: name.to_string(),
                reason: "unknown parameter".to_string(),
            });
        }
    }

    let mut resolved = Params::new();
    for spec in specs {
        let value = match params.get(spec.name).or(spec.default) {
            Some(v) => v,
            None => {
                return Err(VarejoError::InvalidParameter {
                    query: query.to_string(),
                    name: spec.name.to_string(),
                    reason: "required parameter missing".to_string(),
                })
            }
        };
        if let Some(min) = spec.min {
            if value < min {
                return Err(VarejoError::InvalidParameter {
                    query: query.to_string(),
                    name: spec.name.to_string(),
                    reason: format!("{value} is below minimum {min}"),
                });
            }
        }
        if let Some(max) = spec.max {
            if value > max {
                return Err(VarejoError::InvalidParameter {
                    query: query.to_string(),
                    name: spec.name.to_string(),
                    reason: format!("{value} is above maximum {max}"),
                });
            }
        }
        resolved.set(spec.name, value);
    }
    Ok(resolved)
}
