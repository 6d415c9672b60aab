use crate::domain::value_objects::Coordinates;
use crate::shared::validation::require_non_empty;
use crate::shared::AppError;
use serde::{Deserialize, Serialize};

/// An image captured on the device (signature pad, camera or gallery).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    #[serde(with = "base64_bytes")]
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn png(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: "image/png".to_string(),
            bytes,
        }
    }

    pub fn jpeg(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: "image/jpeg".to_string(),
            bytes,
        }
    }
}

/// Evidence submitted when a stop is completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofOfDelivery {
    pub stop_id: String,
    pub recipient_name: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub location: Option<Coordinates>,
    #[serde(default)]
    pub signature: Option<Attachment>,
    #[serde(default)]
    pub photos: Vec<Attachment>,
}

impl ProofOfDelivery {
    pub fn validate(&self) -> Result<(), AppError> {
        require_non_empty("Stop id", &self.stop_id)?;
        require_non_empty("Recipient name", &self.recipient_name)?;
        if let Some(location) = &self.location {
            Coordinates::new(location.latitude, location.longitude)?;
        }
        for attachment in self.signature.iter().chain(self.photos.iter()) {
            if attachment.bytes.is_empty() {
                return Err(AppError::validation(format!(
                    "Attachment {} is empty",
                    attachment.file_name
                )));
            }
        }
        Ok(())
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
