//! # Posture
//!
//! A posture is a named set of toe positions, one per leg, parsed from a comma separated list of
//! entries. Each entry is `[leg:]transform`, where the transform uses the grammar of
//! [`Transform`]'s `FromStr`. Entries without a leg name apply to `all` legs, and a leg with no
//! entry of its own falls back to the `all` entry.
//!
//! Posture translations are given with z as the height of the body above the toe, so a posture
//! of `6 0 6` puts the toe 6 forward of and 6 below its hip.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::geometry::{Point, Transform, TransformParseError};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Name of the entry used by legs without their own entry.
pub const ALL_LEGS: &str = "all";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Per-leg toe positions.
#[derive(Clone, Debug, PartialEq)]
pub struct Posture {
    entries: BTreeMap<String, Transform>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PostureError {
    #[error("Posture has no entries")]
    Empty,

    #[error("Posture entry \"{0}\" has an empty leg name")]
    EmptyLegName(String),

    #[error("Posture entry \"{entry}\" is invalid: {source}")]
    InvalidEntry {
        entry: String,
        source: TransformParseError,
    },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Posture {
    /// The transform of a leg, falling back to the `all` entry.
    pub fn get_transform(&self, leg: &str) -> Option<&Transform> {
        self.entries
            .get(leg)
            .or_else(|| self.entries.get(ALL_LEGS))
    }

    /// The posture translation of a leg, falling back to the `all` entry.
    pub fn get(&self, leg: &str) -> Option<Point> {
        self.get_transform(leg).map(|t| t.translation())
    }

    /// The posture as a toe target in the leg's local frame, where z points up.
    pub fn toe_target(&self, leg: &str) -> Option<Point> {
        self.get(leg).map(|p| p.with_z(-p.z()))
    }

    /// Leg names given explicit entries, excluding `all`.
    pub fn leg_names(&self) -> impl Iterator<Item = &str> {
        self.entries
            .keys()
            .map(String::as_str)
            .filter(|k| *k != ALL_LEGS)
    }
}

impl FromStr for Posture {
    type Err = PostureError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let mut entries = BTreeMap::new();

        for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (leg, transform) = match entry.find(':') {
                Some(i) => (entry[..i].trim(), entry[i + 1..].trim()),
                None => (ALL_LEGS, entry),
            };

            if leg.is_empty() {
                return Err(PostureError::EmptyLegName(entry.to_string()));
            }

            let transform = transform
                .parse::<Transform>()
                .map_err(|source| PostureError::InvalidEntry {
                    entry: entry.to_string(),
                    source,
                })?;

            entries.insert(leg.to_string(), transform);
        }

        if entries.is_empty() {
            return Err(PostureError::Empty);
        }

        Ok(Self { entries })
    }
}

impl fmt::Display for Posture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (leg, t)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}:{}", leg, t.translation())?;
        }

        Ok(())
    }
}
