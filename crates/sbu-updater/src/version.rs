//! Version parsing and comparison.
//!
//! Versions are plain `major.minor.patch` triples. Release tags may carry a
//! leading `v` ("v1.2.0"). Anything that does not parse into exactly three
//! integers is rejected instead of being compared.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{LaunchError, Result};

/// A `major.minor.patch` version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Version {
    /// Major version number.
    pub major: u32,
    /// Minor version number.
    pub minor: u32,
    /// Patch version number.
    pub patch: u32,
}

impl Version {
    /// Create a new version.
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

/// Parses a single numeric component. Only ASCII digits are accepted.
fn component(part: &str, input: &str) -> Result<u32> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LaunchError::Parse(format!("invalid version '{input}'")));
    }
    part.parse()
        .map_err(|_| LaunchError::Parse(format!("invalid version '{input}'")))
}

impl FromStr for Version {
    type Err = LaunchError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);

        let parts: Vec<&str> = digits.split('.').collect();
        if parts.len() != 3 {
            return Err(LaunchError::Parse(format!(
                "invalid version '{trimmed}': expected MAJOR.MINOR.PATCH"
            )));
        }

        Ok(Self {
            major: component(parts[0], trimmed)?,
            minor: component(parts[1], trimmed)?,
            patch: component(parts[2], trimmed)?,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch))
    }
}

/// Returns `true` if `candidate` is strictly newer than `current`.
///
/// # Errors
///
/// Returns [`LaunchError::Parse`] if either string is not a valid version.
/// Callers must treat that as "cannot determine", never as "not newer".
pub fn is_newer(current: &str, candidate: &str) -> Result<bool> {
    let current: Version = current.parse()?;
    let candidate: Version = candidate.parse()?;
    Ok(candidate > current)
}
