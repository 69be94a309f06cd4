// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use serde::{Deserialize, Serialize};
use voltura_core::{UpdateOffer, Version};

/// Discovery response. Two shapes share one type: an available update
/// carries `filename` (and usually `checksum`); an empty inventory is
/// `{"version": "0.0", "source": ...}` with both omitted.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CheckUpdateResponse {
    pub version: Version,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    pub source: String,
}

impl CheckUpdateResponse {
    pub fn available(offer: UpdateOffer) -> Self {
        CheckUpdateResponse {
            version: offer.version,
            filename: Some(offer.filename),
            checksum: offer.checksum,
            source: offer.source,
        }
    }

    /// The "nothing to offer" form, still carrying the declared identity.
    pub fn empty(source: impl Into<String>) -> Self {
        CheckUpdateResponse {
            version: Version::ZERO,
            filename: None,
            checksum: None,
            source: source.into(),
        }
    }

    /// Collapse back into an offer; the empty form becomes `None`.
    pub fn into_offer(self) -> Option<UpdateOffer> {
        let filename = self.filename?;
        Some(UpdateOffer {
            version: self.version,
            filename,
            checksum: self.checksum,
            source: self.source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_form_has_no_filename_key() {
        let json = serde_json::to_value(CheckUpdateResponse::empty("oem")).unwrap();
        assert_eq!(json["version"], "0.0");
        assert_eq!(json["source"], "oem");
        assert!(json.get("filename").is_none());
        assert!(json.get("checksum").is_none());
    }

    #[test]
    fn test_into_offer() {
        assert!(CheckUpdateResponse::empty("oem").into_offer().is_none());

        let resp = CheckUpdateResponse {
            version: Version::new(1, 1),
            filename: Some("firmware_v1.1.bin".into()),
            checksum: Some("abc".into()),
            source: "oem".into(),
        };
        let offer = resp.into_offer().unwrap();
        assert_eq!(offer.version, Version::new(1, 1));
        assert_eq!(offer.source, "oem");
    }
}
