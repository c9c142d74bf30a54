// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall classification: label, layer and thickness tiers
//!
//! Each candidate is classified independently through a fixed precedence,
//! short-circuiting at the first tier that matches:
//!
//! 1. Label: the candidate's text, normalized, equals a legend code
//! 2. Layer: the candidate's layer matches a configured layer rule
//! 3. Thickness: the first legend entry (in legend order) whose interval
//!    contains the candidate thickness
//! 4. Default: `Unknown`
//!
//! The function is pure: it never mutates the legend or the candidates,
//! so identical inputs always classify identically.

use crate::error::{Error, Result};
use planwall_core::{
    ClassifiedWall, Legend, RuleTier, WallCandidate, UNKNOWN_TYPE,
};
use serde::{Deserialize, Serialize};

/// How a layer name is matched against a rule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum LayerPattern {
    /// Whole-name match, case-insensitive
    Exact(String),
    /// Leading-substring match, case-insensitive
    Prefix(String),
}

impl LayerPattern {
    fn text(&self) -> &str {
        match self {
            LayerPattern::Exact(s) | LayerPattern::Prefix(s) => s,
        }
    }

    pub fn matches(&self, layer: &str) -> bool {
        let layer = layer.trim().to_uppercase();
        match self {
            LayerPattern::Exact(p) => layer == p.trim().to_uppercase(),
            LayerPattern::Prefix(p) => layer.starts_with(&p.trim().to_uppercase()),
        }
    }
}

/// One entry of the layer-name to wall-type table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayerRule {
    pub pattern: LayerPattern,
    pub type_name: String,
}

impl LayerRule {
    pub fn exact(pattern: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            pattern: LayerPattern::Exact(pattern.into()),
            type_name: type_name.into(),
        }
    }

    pub fn prefix(pattern: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            pattern: LayerPattern::Prefix(pattern.into()),
            type_name: type_name.into(),
        }
    }
}

/// Configuration for the classification pass
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClassifyConfig {
    /// Layer rules, evaluated in table order
    pub layer_rules: Vec<LayerRule>,
    /// Widens every legend thickness interval by this much on both sides
    pub thickness_tolerance: f64,
}

/// Per-tier match counts from a classification pass
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassifyStats {
    pub label_matches: usize,
    pub layer_matches: usize,
    pub thickness_matches: usize,
    pub unclassified: usize,
}

/// Result of a classification pass
#[derive(Debug, Clone)]
pub struct ClassifyOutcome {
    pub walls: Vec<ClassifiedWall>,
    pub stats: ClassifyStats,
}

/// Classify candidates against a legend and a layer-rule table.
///
/// Identifiers are assigned in candidate order (`WALL_0001`, ...). Fails
/// fast on a malformed layer rule before touching any candidate; an
/// unmatched candidate is the valid `Unknown` outcome, never an error.
pub fn classify(
    candidates: &[WallCandidate],
    legend: &Legend,
    config: &ClassifyConfig,
) -> Result<ClassifyOutcome> {
    validate_layer_rules(&config.layer_rules)?;

    let mut stats = ClassifyStats::default();
    let walls = candidates
        .iter()
        .enumerate()
        .map(|(i, candidate)| {
            let id = format!("WALL_{:04}", i + 1);
            let (type_name, tier) = decide(candidate, legend, config);
            match tier {
                RuleTier::Label => stats.label_matches += 1,
                RuleTier::Layer => stats.layer_matches += 1,
                RuleTier::Thickness => stats.thickness_matches += 1,
                RuleTier::Unclassified => stats.unclassified += 1,
            }
            ClassifiedWall::from_candidate(id, candidate.clone(), type_name, tier)
        })
        .collect();

    tracing::debug!(
        label = stats.label_matches,
        layer = stats.layer_matches,
        thickness = stats.thickness_matches,
        unclassified = stats.unclassified,
        "wall classification finished"
    );

    Ok(ClassifyOutcome { walls, stats })
}

/// The four-tier decision for a single candidate
fn decide(
    candidate: &WallCandidate,
    legend: &Legend,
    config: &ClassifyConfig,
) -> (String, RuleTier) {
    // Tier 1: text label against legend codes
    if let Some(label) = &candidate.label {
        if let Some(rule) = legend.get(label) {
            return (rule.type_name.clone(), RuleTier::Label);
        }
    }

    // Tier 2: layer name against the rule table, in table order
    if let Some(layer) = &candidate.layer {
        for rule in &config.layer_rules {
            if rule.pattern.matches(layer) {
                return (rule.type_name.clone(), RuleTier::Layer);
            }
        }
    }

    // Tier 3: thickness against legend intervals, in legend order;
    // entries without bounds are label-only and never match here
    for rule in legend.iter() {
        if rule.has_thickness_rule()
            && rule.thickness_in_range(candidate.thickness, config.thickness_tolerance)
        {
            return (rule.type_name.clone(), RuleTier::Thickness);
        }
    }

    (UNKNOWN_TYPE.to_string(), RuleTier::Unclassified)
}

fn validate_layer_rules(rules: &[LayerRule]) -> Result<()> {
    for (index, rule) in rules.iter().enumerate() {
        if rule.pattern.text().trim().is_empty() {
            return Err(Error::MalformedLayerRule {
                index,
                reason: "empty pattern".into(),
            });
        }
        if rule.type_name.trim().is_empty() {
            return Err(Error::MalformedLayerRule {
                index,
                reason: "empty type name".into(),
            });
        }
    }
    Ok(())
}
