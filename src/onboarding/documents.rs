//! KYC document slots and their upload state

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Number of documents an investor must provide
pub const REQUIRED_DOCUMENTS: usize = 4;

/// One of the four required KYC document categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DocumentSlot {
    #[serde(rename = "passport")]
    Identity,
    #[serde(rename = "address")]
    ProofOfAddress,
    #[serde(rename = "tax")]
    TaxId,
    #[serde(rename = "source")]
    SourceOfFunds,
}

impl DocumentSlot {
    /// All slots in upload order
    pub const ALL: [DocumentSlot; REQUIRED_DOCUMENTS] = [
        DocumentSlot::Identity,
        DocumentSlot::ProofOfAddress,
        DocumentSlot::TaxId,
        DocumentSlot::SourceOfFunds,
    ];

    /// Identifier used on the wire and in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentSlot::Identity => "passport",
            DocumentSlot::ProofOfAddress => "address",
            DocumentSlot::TaxId => "tax",
            DocumentSlot::SourceOfFunds => "source",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocumentSlot::Identity => "Passport / ID",
            DocumentSlot::ProofOfAddress => "Proof of address",
            DocumentSlot::TaxId => "Tax ID / Certificate",
            DocumentSlot::SourceOfFunds => "Source of funds",
        }
    }

    /// Name used in upload validation messages
    pub fn display_name(&self) -> &'static str {
        match self {
            DocumentSlot::SourceOfFunds => "source of funds",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for DocumentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentSlot {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "passport" | "identity" => Ok(DocumentSlot::Identity),
            "address" | "proof-of-address" => Ok(DocumentSlot::ProofOfAddress),
            "tax" | "tax-id" => Ok(DocumentSlot::TaxId),
            "source" | "source-of-funds" => Ok(DocumentSlot::SourceOfFunds),
            other => Err(AppError::Validation(format!(
                "Unknown document slot '{}'",
                other
            ))),
        }
    }
}

/// Upload state of a single slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    #[default]
    Pending,
    Uploaded,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Pending => "pending",
            DocumentStatus::Uploaded => "uploaded",
        }
    }
}

impl FromStr for DocumentStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(DocumentStatus::Pending),
            "uploaded" => Ok(DocumentStatus::Uploaded),
            other => Err(AppError::Validation(format!(
                "Unknown document status '{}'",
                other
            ))),
        }
    }
}

/// Per-user slot -> status mapping. Slots never written read as pending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentStatusMap {
    entries: BTreeMap<DocumentSlot, DocumentStatus>,
}

impl DocumentStatusMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: DocumentSlot) -> DocumentStatus {
        self.entries.get(&slot).copied().unwrap_or_default()
    }

    pub fn set(&mut self, slot: DocumentSlot, status: DocumentStatus) {
        self.entries.insert(slot, status);
    }

    /// Number of slots in the uploaded state
    pub fn uploaded_count(&self) -> usize {
        DocumentSlot::ALL
            .iter()
            .filter(|slot| self.get(**slot) == DocumentStatus::Uploaded)
            .count()
    }

    /// Slots still pending, in upload order
    pub fn missing(&self) -> Vec<DocumentSlot> {
        DocumentSlot::ALL
            .iter()
            .copied()
            .filter(|slot| self.get(*slot) == DocumentStatus::Pending)
            .collect()
    }

    /// All four slots with their status, defaults filled in
    pub fn iter(&self) -> impl Iterator<Item = (DocumentSlot, DocumentStatus)> + '_ {
        DocumentSlot::ALL.iter().map(move |slot| (*slot, self.get(*slot)))
    }
}

impl FromIterator<(DocumentSlot, DocumentStatus)> for DocumentStatusMap {
    fn from_iter<I: IntoIterator<Item = (DocumentSlot, DocumentStatus)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_parsing_accepts_aliases() {
        assert_eq!("passport".parse::<DocumentSlot>().unwrap(), DocumentSlot::Identity);
        assert_eq!("identity".parse::<DocumentSlot>().unwrap(), DocumentSlot::Identity);
        assert_eq!(
            "Proof-of-Address".parse::<DocumentSlot>().unwrap(),
            DocumentSlot::ProofOfAddress
        );
        assert_eq!(
            "source-of-funds".parse::<DocumentSlot>().unwrap(),
            DocumentSlot::SourceOfFunds
        );
        assert!("selfie".parse::<DocumentSlot>().is_err());
    }

    #[test]
    fn test_missing_slots_default_to_pending() {
        let map = DocumentStatusMap::new();
        assert_eq!(map.uploaded_count(), 0);
        assert_eq!(map.missing().len(), REQUIRED_DOCUMENTS);
        assert!(map.iter().all(|(_, s)| s == DocumentStatus::Pending));
    }

    #[test]
    fn test_uploaded_count() {
        let mut map = DocumentStatusMap::new();
        map.set(DocumentSlot::Identity, DocumentStatus::Uploaded);
        map.set(DocumentSlot::TaxId, DocumentStatus::Uploaded);
        map.set(DocumentSlot::SourceOfFunds, DocumentStatus::Pending);

        assert_eq!(map.uploaded_count(), 2);
        assert_eq!(
            map.missing(),
            vec![DocumentSlot::ProofOfAddress, DocumentSlot::SourceOfFunds]
        );
    }

    #[test]
    fn test_json_shape_uses_wire_ids() {
        let mut map = DocumentStatusMap::new();
        map.set(DocumentSlot::Identity, DocumentStatus::Uploaded);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"passport":"uploaded"}"#);

        let parsed: DocumentStatusMap =
            serde_json::from_str(r#"{"address":"uploaded","tax":"pending"}"#).unwrap();
        assert_eq!(parsed.get(DocumentSlot::ProofOfAddress), DocumentStatus::Uploaded);
        assert_eq!(parsed.uploaded_count(), 1);
    }
}
