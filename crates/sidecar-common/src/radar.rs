//! Radar site identifiers.

use serde::{Deserialize, Serialize};

use crate::{SidecarError, SidecarResult};

/// Four-character radar site identifier (e.g. "KMPX").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RadarId(String);

impl RadarId {
    /// Validate and normalise a site identifier to upper case.
    pub fn new(id: impl AsRef<str>) -> SidecarResult<Self> {
        let id = id.as_ref().trim();
        if id.chars().count() != 4 || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(SidecarError::InvalidRadarId(format!(
                "{} is not a valid radar. Make sure the radar is a 4 character identifier (e.g., KMPX)",
                id
            )));
        }
        Ok(Self(id.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RadarId {
    type Error = SidecarError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        RadarId::new(value)
    }
}

impl From<RadarId> for String {
    fn from(id: RadarId) -> Self {
        id.0
    }
}

impl std::fmt::Display for RadarId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radar_id_uppercased() {
        assert_eq!(RadarId::new("kmpx").unwrap().as_str(), "KMPX");
    }

    #[test]
    fn test_radar_id_length() {
        assert!(RadarId::new("KMP").is_err());
        assert!(RadarId::new("KMPXX").is_err());
        assert!(RadarId::new("").is_err());
    }

    #[test]
    fn test_radar_id_characters() {
        assert!(RadarId::new("K-PX").is_err());
        assert!(RadarId::new("TJUA").is_ok());
    }

    #[test]
    fn test_radar_id_serde() {
        let id: RadarId = serde_json::from_str("\"ktlx\"").unwrap();
        assert_eq!(id.to_string(), "KTLX");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"KTLX\"");
        assert!(serde_json::from_str::<RadarId>("\"KT\"").is_err());
    }
}
