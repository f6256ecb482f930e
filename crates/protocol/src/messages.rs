use serde::{Deserialize, Serialize};

/// Body of the "request upload slot" call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadRequest {
    pub data: UploadRequestData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadRequestData {
    pub file_size: u64,
    pub file_name: String,
    pub content_type: String,
    pub origin: String,
}

impl UploadRequest {
    pub fn new(
        file_size: u64,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            data: UploadRequestData {
                file_size,
                file_name: file_name.into(),
                content_type: content_type.into(),
                origin: origin.into(),
            },
        }
    }
}

/// Raw response of the "request upload slot" call.
///
/// Both fields are required for the upload to proceed; they are optional
/// here so a partial response can still be decoded and reported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadSlotResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_profile_id: Option<String>,
}

/// A validated upload slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSlot {
    pub upload_url: String,
    pub material_profile_id: String,
}

/// Why an upload-slot response could not be used.
#[derive(Debug, thiserror::Error)]
pub enum SlotError {
    #[error("response is not valid JSON: {0}")]
    Corrupted(#[from] serde_json::Error),

    #[error("response is missing the `{0}` field")]
    MissingField(&'static str),
}

impl UploadSlotResponse {
    /// Decodes a response body, accepting both the flat form and the
    /// `{"data": {...}}` envelope.
    pub fn from_body(body: &[u8]) -> Result<Self, SlotError> {
        let value: serde_json::Value = serde_json::from_slice(body)?;
        let inner = match value.get("data") {
            Some(data) if data.is_object() && value.get("upload_url").is_none() => data,
            _ => &value,
        };
        if !inner.is_object() {
            return Ok(Self::default());
        }
        Ok(Self {
            upload_url: string_field(inner, "upload_url"),
            material_profile_id: string_field(inner, "material_profile_id"),
        })
    }

    /// Checks that both required fields are present.
    pub fn into_slot(self) -> Result<UploadSlot, SlotError> {
        let upload_url = self
            .upload_url
            .filter(|u| !u.is_empty())
            .ok_or(SlotError::MissingField("upload_url"))?;
        let material_profile_id = self
            .material_profile_id
            .filter(|id| !id.is_empty())
            .ok_or(SlotError::MissingField("material_profile_id"))?;
        Ok(UploadSlot {
            upload_url,
            material_profile_id,
        })
    }
}

fn string_field(value: &serde_json::Value, key: &str) -> Option<String> {
    value.get(key).and_then(|v| v.as_str()).map(str::to_owned)
}

/// Decodes and validates an upload-slot response in one step.
pub fn parse_upload_slot(body: &[u8]) -> Result<UploadSlot, SlotError> {
    UploadSlotResponse::from_body(body)?.into_slot()
}
