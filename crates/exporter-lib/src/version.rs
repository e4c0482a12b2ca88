//! Stack version parsing
//!
//! Accepts `MAJOR.MINOR.PATCH` with an optional leading `v`, an optional
//! `-prerelease` and an optional `+build` part, e.g. `8.1.0` or
//! `8.2.0-SNAPSHOT`. The prerelease is limited to `[0-9A-Za-z.-]` since
//! the printed version is used as a label value.

use crate::error::VersionParseError;
use std::fmt;

/// A parsed stack version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StackVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre: Option<String>,
}

impl StackVersion {
    /// Parse a version string
    pub fn parse(input: &str) -> Result<Self, VersionParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(VersionParseError::Empty);
        }

        let without_prefix = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let without_build = without_prefix
            .split_once('+')
            .map_or(without_prefix, |(core, _)| core);
        let (core, pre) = match without_build.split_once('-') {
            Some((core, pre)) => (core, Some(pre.to_string())),
            None => (without_build, None),
        };

        let mut parts = core.split('.');
        let major = component(input, "major", parts.next())?;
        let minor = component(input, "minor", parts.next())?;
        let patch = component(input, "patch", parts.next())?;

        if let Some(extra) = parts.next() {
            return Err(VersionParseError::InvalidComponent {
                input: input.to_string(),
                component: "patch",
                value: format!("{}.{}", patch, extra),
            });
        }

        if let Some(pre) = &pre {
            let valid = !pre.is_empty()
                && pre
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'-');
            if !valid {
                return Err(VersionParseError::InvalidComponent {
                    input: input.to_string(),
                    component: "prerelease",
                    value: pre.clone(),
                });
            }
        }

        Ok(Self {
            major,
            minor,
            patch,
            pre,
        })
    }
}

fn component(
    input: &str,
    name: &'static str,
    value: Option<&str>,
) -> Result<u64, VersionParseError> {
    let value = value.ok_or_else(|| VersionParseError::MissingComponent {
        input: input.to_string(),
        component: name,
    })?;

    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(VersionParseError::InvalidComponent {
            input: input.to_string(),
            component: name,
            value: value.to_string(),
        });
    }

    value
        .parse()
        .map_err(|_| VersionParseError::InvalidComponent {
            input: input.to_string(),
            component: name,
            value: value.to_string(),
        })
}

impl fmt::Display for StackVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.pre {
            write!(f, "-{}", pre)?;
        }
        Ok(())
    }
}
