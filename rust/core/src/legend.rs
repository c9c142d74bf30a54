// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Legend of wall-type classification rules
//!
//! A legend maps drawing-specific codes (e.g. `B-01`) to human-readable wall
//! types, optionally constrained to a thickness interval. Iteration order is
//! insertion order; the thickness tier of the classifier depends on it, so
//! the caller controls tie-breaking by controlling rule order.

use crate::error::{Error, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A single legend entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LegendRule {
    /// Code or label string as it appears in the drawing legend
    pub code: String,
    /// Human-readable wall type name
    pub type_name: String,
    /// Inclusive lower thickness bound; absent = unbounded below
    pub min_thickness: Option<f64>,
    /// Inclusive upper thickness bound; absent = unbounded above
    pub max_thickness: Option<f64>,
}

impl LegendRule {
    pub fn new(code: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            type_name: type_name.into(),
            min_thickness: None,
            max_thickness: None,
        }
    }

    pub fn with_min_thickness(mut self, min: f64) -> Self {
        self.min_thickness = Some(min);
        self
    }

    pub fn with_max_thickness(mut self, max: f64) -> Self {
        self.max_thickness = Some(max);
        self
    }

    /// Whether this rule constrains thickness at all
    pub fn has_thickness_rule(&self) -> bool {
        self.min_thickness.is_some() || self.max_thickness.is_some()
    }

    /// Inclusive interval test, widened by `tolerance` on both sides
    pub fn thickness_in_range(&self, thickness: f64, tolerance: f64) -> bool {
        let above_min = self
            .min_thickness
            .map_or(true, |min| thickness >= min - tolerance);
        let below_max = self
            .max_thickness
            .map_or(true, |max| thickness <= max + tolerance);
        above_min && below_max
    }
}

/// An insertion-ordered collection of legend rules with normalized lookup.
///
/// Codes are compared trimmed and upper-cased. Two rules with the same
/// normalized code must be identical; conflicting duplicates are rejected at
/// construction so downstream classification stays deterministic.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Legend {
    rules: Vec<LegendRule>,
    #[serde(skip)]
    by_code: FxHashMap<String, usize>,
}

// Deserialization goes back through `from_rules` so the code index is
// rebuilt and duplicate validation re-applies.
impl<'de> Deserialize<'de> for Legend {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            rules: Vec<LegendRule>,
        }

        let raw = Raw::deserialize(deserializer)?;
        Legend::from_rules(raw.rules).map_err(serde::de::Error::custom)
    }
}

impl Legend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a legend from rules, validating as it goes
    pub fn from_rules(rules: impl IntoIterator<Item = LegendRule>) -> Result<Self> {
        let mut legend = Self::new();
        for rule in rules {
            legend.insert(rule)?;
        }
        Ok(legend)
    }

    /// Trim and upper-case a code for comparison.
    ///
    /// The same normalization is applied to candidate labels by the
    /// classifier, so `" b-01 "` matches the code `B-01`.
    pub fn normalize_code(code: &str) -> String {
        code.trim().to_uppercase()
    }

    /// Append a rule, keeping insertion order.
    ///
    /// A byte-identical duplicate is silently dropped; a duplicate code with
    /// a different type or interval is a configuration error.
    pub fn insert(&mut self, rule: LegendRule) -> Result<()> {
        let key = Self::normalize_code(&rule.code);
        if key.is_empty() {
            return Err(Error::EmptyLegendCode);
        }
        if let (Some(min), Some(max)) = (rule.min_thickness, rule.max_thickness) {
            if min > max {
                return Err(Error::InvalidThicknessRange {
                    code: rule.code.clone(),
                    min,
                    max,
                });
            }
        }

        if let Some(&existing) = self.by_code.get(&key) {
            if self.rules[existing] == rule {
                return Ok(());
            }
            return Err(Error::ConflictingLegendCode(rule.code));
        }

        self.by_code.insert(key, self.rules.len());
        self.rules.push(rule);
        Ok(())
    }

    /// Look up a rule by code, normalizing first
    pub fn get(&self, code: &str) -> Option<&LegendRule> {
        self.by_code
            .get(&Self::normalize_code(code))
            .map(|&i| &self.rules[i])
    }

    /// Rules in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &LegendRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
