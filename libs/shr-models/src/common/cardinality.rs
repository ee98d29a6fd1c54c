//! Cardinality ranges

use super::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A `min..max` range; `max = None` means unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cardinality {
    pub min: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
}

impl Cardinality {
    pub fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    pub fn bounded(min: u32, max: u32) -> Self {
        Self::new(min, Some(max))
    }

    pub fn unbounded(min: u32) -> Self {
        Self::new(min, None)
    }

    /// Check if this range lies inside `other`
    pub fn fits_within(&self, other: &Cardinality) -> bool {
        if self.min < other.min {
            return false;
        }
        match (self.max, other.max) {
            (_, None) => true,
            (None, Some(_)) => false,
            (Some(max), Some(other_max)) => max <= other_max,
        }
    }

    /// Check if the range prohibits any occurrence
    pub fn is_zeroed_out(&self) -> bool {
        self.max == Some(0)
    }

    /// Check if more than one occurrence is allowed
    pub fn is_list(&self) -> bool {
        self.max.map_or(true, |max| max > 1)
    }

    pub fn is_required(&self) -> bool {
        self.min > 0
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}..{}", self.min, max),
            None => write!(f, "{}..*", self.min),
        }
    }
}

impl FromStr for Cardinality {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidCardinality(s.to_string());
        let (min, max) = s.trim().split_once("..").ok_or_else(invalid)?;
        let min = min.parse::<u32>().map_err(|_| invalid())?;
        let max = match max {
            "*" => None,
            m => Some(m.parse::<u32>().map_err(|_| invalid())?),
        };
        if max.is_some_and(|max| max < min) {
            return Err(invalid());
        }
        Ok(Self::new(min, max))
    }
}
