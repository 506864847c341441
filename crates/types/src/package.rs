//! Package specification for the interop package under test

use crate::version::{is_dotted_prefix, VersionConstraint};
use mlprobe_errors::{PackageManagerError, VersionError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Package name plus an optional version pin (absent means latest)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSpec {
    pub name: String,
    pub version_constraint: Option<VersionConstraint>,
}

impl PackageSpec {
    /// Unpinned spec, installs the latest available build
    pub fn latest(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version_constraint: None,
        }
    }

    /// Spec pinned to the given constraint
    pub fn pinned(name: impl Into<String>, constraint: VersionConstraint) -> Self {
        Self {
            name: name.into(),
            version_constraint: Some(constraint),
        }
    }

    /// Requirement string handed to the package manager (`name` or `name==pin`)
    #[must_use]
    pub fn requirement(&self) -> String {
        self.to_string()
    }

    /// Reject names that are empty or carry anything besides `[A-Za-z0-9._-]`
    ///
    /// # Errors
    ///
    /// Returns `PackageManagerError::InvalidName` for malformed names.
    pub fn validate(&self) -> Result<(), PackageManagerError> {
        let valid = !self.name.is_empty()
            && self
                .name
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-' | b'_'));
        if valid {
            Ok(())
        } else {
            Err(PackageManagerError::InvalidName {
                name: self.name.clone(),
            })
        }
    }

    /// Check that the pin, if any, lines up with the host's version
    ///
    /// # Errors
    ///
    /// Returns `VersionError::NotHostPrefix` when the pin's host prefix is
    /// not a dotted prefix of `host_version`.
    pub fn check_against_host(&self, host_version: &str) -> Result<(), VersionError> {
        match &self.version_constraint {
            Some(constraint) if !is_dotted_prefix(constraint.host_prefix(), host_version) => {
                Err(VersionError::NotHostPrefix {
                    constraint: constraint.to_string(),
                    version: host_version.to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version_constraint {
            Some(constraint) => write!(f, "{}{constraint}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// A package as reported installed by the package manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledPackage {
    pub name: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requirement_encoding() {
        assert_eq!(PackageSpec::latest("matlabengine").requirement(), "matlabengine");
        let spec = PackageSpec::pinned("matlabengine", VersionConstraint::Wildcard("9.14".into()));
        assert_eq!(spec.requirement(), "matlabengine==9.14.*");
        let spec = PackageSpec::pinned("matlabengine", VersionConstraint::Exact("9.14.3".into()));
        assert_eq!(spec.requirement(), "matlabengine==9.14.3");
    }

    #[test]
    fn test_validate_name() {
        assert!(PackageSpec::latest("matlabengine").validate().is_ok());
        assert!(PackageSpec::latest("matlab_engine-2.0").validate().is_ok());
        assert!(PackageSpec::latest("").validate().is_err());
        assert!(PackageSpec::latest("evil; rm -rf /").validate().is_err());
    }

    #[test]
    fn test_check_against_host() {
        let spec = PackageSpec::pinned("matlabengine", VersionConstraint::Wildcard("9.14".into()));
        assert!(spec.check_against_host("9.14.0.2206163").is_ok());
        assert!(spec.check_against_host("9.15.0.2249021").is_err());

        let exact = PackageSpec::pinned("matlabengine", VersionConstraint::Exact("9.14.3".into()));
        assert!(exact.check_against_host("9.14.0.2206163").is_ok());

        assert!(PackageSpec::latest("matlabengine")
            .check_against_host("anything")
            .is_ok());
    }
}
