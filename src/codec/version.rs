//! Protocol version carried by every request.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::DecodeError;

/// Payload encoding selected per call by the request's 16-bit version field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolVersion {
    /// Tag-addressed binary encoding.
    #[default]
    Tars,
    /// Name-addressed attribute bag of binary blobs.
    Tup,
    /// One JSON object keyed by argument name.
    Json,
}

impl ProtocolVersion {
    pub const TARS: u16 = 1;
    pub const TUP: u16 = 3;
    pub const JSON: u16 = 5;

    pub fn from_u16(version: u16) -> Result<Self, DecodeError> {
        match version {
            Self::TARS => Ok(Self::Tars),
            Self::TUP => Ok(Self::Tup),
            Self::JSON => Ok(Self::Json),
            other => Err(DecodeError::UnsupportedVersion(other)),
        }
    }

    pub fn as_u16(self) -> u16 {
        match self {
            Self::Tars => Self::TARS,
            Self::Tup => Self::TUP,
            Self::Json => Self::JSON,
        }
    }
}

impl TryFrom<u16> for ProtocolVersion {
    type Error = DecodeError;

    fn try_from(version: u16) -> Result<Self, Self::Error> {
        Self::from_u16(version)
    }
}

impl From<ProtocolVersion> for u16 {
    fn from(version: ProtocolVersion) -> Self {
        version.as_u16()
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tars => f.write_str("tars"),
            Self::Tup => f.write_str("tup"),
            Self::Json => f.write_str("json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_versions() {
        for v in [ProtocolVersion::Tars, ProtocolVersion::Tup, ProtocolVersion::Json] {
            assert_eq!(ProtocolVersion::from_u16(v.as_u16()).unwrap(), v);
        }
        assert_eq!(ProtocolVersion::Tup.as_u16(), 3);
    }

    #[test]
    fn test_unsupported_version() {
        assert_eq!(
            ProtocolVersion::from_u16(2),
            Err(DecodeError::UnsupportedVersion(2))
        );
    }
}
