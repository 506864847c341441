//! Host versions, release identifiers and package version pins
//!
//! Host runtimes report versions such as `9.14.0.2206163 (R2023a)`. The
//! interop package follows the host's major.minor numbering, so a pin is
//! either an exact version (`==9.14.3`) or a wildcard over everything after
//! a dotted prefix (`==9.14.*`).

use mlprobe_errors::VersionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of leading dotted segments shared by the host and the package
const HOST_SEGMENTS: usize = 2;

fn is_dotted_numeric(s: &str) -> bool {
    !s.is_empty()
        && s
            .split('.')
            .all(|seg| !seg.is_empty() && seg.bytes().all(|b| b.is_ascii_digit()))
}

/// True when `prefix` equals `version` or is followed by a `.` in it.
///
/// `9.14` is a dotted prefix of `9.14.0.2206163` but not of `9.140`.
#[must_use]
pub fn is_dotted_prefix(prefix: &str, version: &str) -> bool {
    match version.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => rest.starts_with('.'),
        None => false,
    }
}

fn leading_segments(version: &str, count: usize) -> Option<String> {
    let segments: Vec<&str> = version.split('.').take(count).collect();
    (segments.len() == count).then(|| segments.join("."))
}

/// A version pin for the interop package
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "version", rename_all = "snake_case")]
pub enum VersionConstraint {
    /// `==9.14.3`
    Exact(String),
    /// `==9.14.*`, stored without the trailing `.*`
    Wildcard(String),
}

impl VersionConstraint {
    /// Derive a wildcard pin from the host's own version string.
    ///
    /// Keeps the major and minor segments and wildcards the rest, so
    /// `9.14.0.2206163` becomes `9.14.*`.
    ///
    /// # Errors
    ///
    /// Returns an error if the host version is not dotted numeric or has
    /// fewer than two segments.
    pub fn wildcard_from_host(host_version: &str) -> Result<Self, VersionError> {
        let host_version = host_version.trim();
        if !is_dotted_numeric(host_version) {
            return Err(VersionError::InvalidVersion {
                input: host_version.to_string(),
            });
        }
        leading_segments(host_version, HOST_SEGMENTS)
            .map(Self::Wildcard)
            .ok_or_else(|| VersionError::InvalidVersion {
                input: host_version.to_string(),
            })
    }

    /// Check whether an installed package version satisfies this pin
    #[must_use]
    pub fn matches(&self, installed: &str) -> bool {
        let installed = installed.trim();
        match self {
            Self::Exact(v) => installed == v,
            Self::Wildcard(prefix) => is_dotted_prefix(prefix, installed),
        }
    }

    /// The part of the pin that must line up with the host version.
    ///
    /// Wildcards pin the host prefix directly. Exact pins carry their own
    /// patch level, so only the leading major.minor is compared.
    #[must_use]
    pub fn host_prefix(&self) -> &str {
        match self {
            Self::Wildcard(prefix) => prefix,
            Self::Exact(v) => {
                let end = v
                    .match_indices('.')
                    .nth(HOST_SEGMENTS - 1)
                    .map_or(v.len(), |(idx, _)| idx);
                &v[..end]
            }
        }
    }
}

impl FromStr for VersionConstraint {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let body = trimmed.strip_prefix("==").unwrap_or(trimmed).trim();

        if let Some(prefix) = body.strip_suffix(".*") {
            if is_dotted_numeric(prefix) {
                return Ok(Self::Wildcard(prefix.to_string()));
            }
        } else if is_dotted_numeric(body) {
            return Ok(Self::Exact(body.to_string()));
        }

        Err(VersionError::InvalidConstraint {
            input: s.to_string(),
        })
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(v) => write!(f, "=={v}"),
            Self::Wildcard(prefix) => write!(f, "=={prefix}.*"),
        }
    }
}

/// Half-year marker of a host release
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseHalf {
    A,
    B,
}

/// Host release identifier such as `R2023a`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Release {
    pub year: u16,
    pub half: ReleaseHalf,
}

impl FromStr for Release {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || VersionError::InvalidRelease {
            input: s.to_string(),
        };
        let trimmed = s.trim();
        let body = trimmed
            .strip_prefix('R')
            .or_else(|| trimmed.strip_prefix('r'))
            .unwrap_or(trimmed);

        if body.len() != 5 || !body.is_ascii() {
            return Err(invalid());
        }
        let (year, half) = body.split_at(4);
        let year = year.parse::<u16>().map_err(|_| invalid())?;
        let half = match half {
            "a" | "A" => ReleaseHalf::A,
            "b" | "B" => ReleaseHalf::B,
            _ => return Err(invalid()),
        };
        Ok(Self { year, half })
    }
}

impl fmt::Display for Release {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let half = match self.half {
            ReleaseHalf::A => 'a',
            ReleaseHalf::B => 'b',
        };
        write!(f, "R{}{half}", self.year)
    }
}

impl Serialize for Release {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Release {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Version and release reported by the host runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostVersion {
    pub version: String,
    pub release: Release,
}

impl HostVersion {
    /// Parse the host's `version` output, e.g. `9.14.0.2206163 (R2023a)`.
    ///
    /// Batch mode may print banner lines first, so the last line with a
    /// parenthesised release is used.
    ///
    /// # Errors
    ///
    /// Returns an error if no line has the `<version> (<release>)` shape.
    pub fn parse(output: &str) -> Result<Self, VersionError> {
        output
            .lines()
            .rev()
            .find_map(Self::parse_line)
            .ok_or_else(|| VersionError::InvalidVersion {
                input: output.trim().to_string(),
            })
    }

    fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        let (version, rest) = line.split_once('(')?;
        let release = rest.strip_suffix(')')?;
        let version = version.trim();
        if !is_dotted_numeric(version) {
            return None;
        }
        Some(Self {
            version: version.to_string(),
            release: release.parse().ok()?,
        })
    }
}

impl fmt::Display for HostVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.version, self.release)
    }
}
