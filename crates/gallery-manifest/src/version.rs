//! Dotted numeric versions as used by `.vsixmanifest` files.
//!
//! Visual Studio versions carry two to four dot-separated numeric
//! components (`17.0`, `17.9.34622.32`). Parsing and re-serializing a
//! version through [`VsVersion`] yields the canonical form: exactly the
//! components that were present, with no padding or trailing zeros added.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A dotted version with 2–4 numeric components.
///
/// Ordering treats an absent `build`/`revision` as smaller than any
/// present value, so `17.0 < 17.0.0`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VsVersion {
    pub major: u64,
    pub minor: u64,
    pub build: Option<u64>,
    pub revision: Option<u64>,
}

impl VsVersion {
    pub fn new(major: u64, minor: u64) -> Self {
        Self {
            major,
            minor,
            build: None,
            revision: None,
        }
    }
}

impl FromStr for VsVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() < 2 || parts.len() > 4 {
            return Err(Error::InvalidVersion {
                version: s.to_string(),
                reason: format!("expected 2 to 4 components, got {}", parts.len()),
            });
        }

        let mut components = Vec::with_capacity(parts.len());
        for part in &parts {
            let n: u64 = part.trim().parse().map_err(|_| Error::InvalidVersion {
                version: s.to_string(),
                reason: format!("component '{part}' is not a non-negative integer"),
            })?;
            components.push(n);
        }

        Ok(Self {
            major: components[0],
            minor: components[1],
            build: components.get(2).copied(),
            revision: components.get(3).copied(),
        })
    }
}

impl fmt::Display for VsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(build) = self.build {
            write!(f, ".{build}")?;
        }
        if let Some(revision) = self.revision {
            write!(f, ".{revision}")?;
        }
        Ok(())
    }
}
