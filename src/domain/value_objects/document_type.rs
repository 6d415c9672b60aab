use serde::{Deserialize, Serialize};
use std::fmt;

const MP_MARKER: &str = ".LUCEED.04.";
const SKL_MARKER: &str = ".LUCEED.01.";

/// ERP document family encoded in a scanned barcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentType {
    #[serde(rename = "MP")]
    Mp,
    #[serde(rename = "SKL")]
    Skl,
}

impl DocumentType {
    pub fn detect(barcode: &str) -> Option<Self> {
        if barcode.contains(MP_MARKER) {
            Some(DocumentType::Mp)
        } else if barcode.contains(SKL_MARKER) {
            Some(DocumentType::Skl)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Mp => "MP",
            DocumentType::Skl => "SKL",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Free-function form used by scanners.
pub fn detect_document_type(barcode: &str) -> Option<DocumentType> {
    DocumentType::detect(barcode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_known_markers() {
        assert_eq!(detect_document_type("A.LUCEED.04.123"), Some(DocumentType::Mp));
        assert_eq!(detect_document_type("B.LUCEED.01.77"), Some(DocumentType::Skl));
        assert_eq!(detect_document_type("X"), None);
    }

    #[test]
    fn marker_needs_surrounding_dots() {
        assert_eq!(detect_document_type("LUCEED.04.1"), None);
        assert_eq!(detect_document_type("A.LUCEED.02.1"), None);
    }

    #[test]
    fn serializes_as_erp_code() {
        assert_eq!(serde_json::to_string(&DocumentType::Skl).unwrap(), "\"SKL\"");
    }
}
