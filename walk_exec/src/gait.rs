//! # Gait
//!
//! A gait is the cyclic order in which groups of legs lift. The grammar is a comma separated list
//! of lift groups, each a `+` joined list of leg names, for example `fl,rl,rr,fr` (four single leg
//! groups) or `fl+rr,fr+rl` (two diagonal pairs).

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::fmt;
use std::str::FromStr;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An ordered set of lift groups.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Gait {
    groups: Vec<Vec<String>>,
}

/// Resumable position within a gait's cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GaitCursor {
    index: usize,
}

/// Infinite iterator over a gait's groups.
pub struct Cycle<'a> {
    gait: &'a Gait,
    cursor: GaitCursor,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GaitError {
    #[error("Invalid gait \"{spec}\": {reason}")]
    InvalidGaitSpec { spec: String, reason: String },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Gait {
    /// Number of steps in a full cycle of the gait.
    pub fn step_count(&self) -> usize {
        self.groups.len()
    }

    pub fn groups(&self) -> &[Vec<String>] {
        &self.groups
    }

    /// The lift group at the cursor.
    pub fn group(&self, cursor: GaitCursor) -> &[String] {
        &self.groups[cursor.index % self.groups.len()]
    }

    /// Check every leg named by the gait exists.
    pub fn validate<F>(&self, is_leg: F) -> Result<(), GaitError>
    where
        F: Fn(&str) -> bool,
    {
        for name in self.groups.iter().flatten() {
            if !is_leg(name) {
                return Err(GaitError::InvalidGaitSpec {
                    spec: self.to_string(),
                    reason: format!("unknown leg \"{}\"", name),
                });
            }
        }

        Ok(())
    }

    /// Cycle through the groups forever, starting from group 0.
    pub fn cycle(&self) -> Cycle<'_> {
        Cycle {
            gait: self,
            cursor: GaitCursor::default(),
        }
    }
}

impl FromStr for Gait {
    type Err = GaitError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| GaitError::InvalidGaitSpec {
            spec: spec.to_string(),
            reason: reason.to_string(),
        };

        let mut groups: Vec<Vec<String>> = Vec::new();

        for group_spec in spec.split(',') {
            let mut group: Vec<String> = Vec::new();

            for name in group_spec.split('+').map(str::trim) {
                if name.is_empty() {
                    return Err(invalid("empty leg name"));
                }
                if groups.iter().flatten().chain(group.iter()).any(|n: &String| n == name) {
                    return Err(invalid("leg appears more than once"));
                }
                group.push(name.to_string());
            }

            groups.push(group);
        }

        Ok(Self { groups })
    }
}

impl fmt::Display for Gait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let groups: Vec<String> = self.groups.iter().map(|g| g.join("+")).collect();
        write!(f, "{}", groups.join(","))
    }
}

impl GaitCursor {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Move to the next group of a gait with `step_count` groups.
    pub fn advance(&mut self, step_count: usize) {
        self.index = if step_count == 0 {
            0
        }
        else {
            (self.index + 1) % step_count
        };
    }
}

impl<'a> Iterator for Cycle<'a> {
    type Item = &'a [String];

    fn next(&mut self) -> Option<Self::Item> {
        let group = self.gait.group(self.cursor);
        self.cursor.advance(self.gait.step_count());
        Some(group)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_and_cycle() {
        let gait: Gait = "fl,rr,fr,rl".parse().unwrap();
        assert_eq!(gait.step_count(), 4);

        let seq: Vec<&[String]> = gait.cycle().take(8).collect();
        let names: Vec<&str> = seq.iter().map(|g| g[0].as_str()).collect();
        assert_eq!(names, vec!["fl", "rr", "fr", "rl", "fl", "rr", "fr", "rl"]);

        for pair in seq.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn test_trot() {
        let gait: Gait = "fl+rr, fr+rl".parse().unwrap();
        assert_eq!(gait.step_count(), 2);
        assert_eq!(gait.groups()[1], vec!["fr".to_string(), "rl".to_string()]);
        assert_eq!(gait.to_string(), "fl+rr,fr+rl");
    }

    #[test]
    fn test_cursor_resumes() {
        let gait: Gait = "a,b,c".parse().unwrap();
        let mut cursor = GaitCursor::default();

        assert_eq!(gait.group(cursor), ["a".to_string()]);
        cursor.advance(gait.step_count());
        cursor.advance(gait.step_count());
        assert_eq!(gait.group(cursor), ["c".to_string()]);
        cursor.advance(gait.step_count());
        assert_eq!(cursor.index(), 0);
    }

    #[test]
    fn test_invalid() {
        assert!("fl,,rr".parse::<Gait>().is_err());
        assert!("fl+".parse::<Gait>().is_err());
        assert!("fl,fl".parse::<Gait>().is_err());

        // Names are only checked against the legs when attached
        let gait: Gait = "fl,xx".parse().unwrap();
        let legs = ["fl", "fr"];
        assert!(gait.validate(|n| legs.contains(&n)).is_err());
        assert!("fl,fr"
            .parse::<Gait>()
            .unwrap()
            .validate(|n| legs.contains(&n))
            .is_ok());
    }
}
