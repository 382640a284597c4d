use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::StudioError;

/// Image MIME types the generative endpoint accepts as input.
pub const ACCEPTED_IMAGE_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// An inline media payload: a MIME type plus base64-encoded bytes.
///
/// Used both as request input (client photo, reference photo) and as the
/// decoded form of generated images coming back from the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaPart {
    pub mime_type: String,
    pub data: String,
}

impl MediaPart {
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Result<Self, StudioError> {
        if bytes.is_empty() {
            return Err(StudioError::InvalidMedia("empty media body".to_string()));
        }
        Ok(Self {
            mime_type: mime_type.into(),
            data: BASE64.encode(bytes),
        })
    }

    /// Builds a part from already-encoded data, verifying it decodes to a
    /// non-empty body.
    pub fn from_base64(
        mime_type: impl Into<String>,
        data: impl Into<String>,
    ) -> Result<Self, StudioError> {
        let part = Self {
            mime_type: mime_type.into(),
            data: data.into(),
        };
        let decoded = part.decode()?;
        if decoded.is_empty() {
            return Err(StudioError::InvalidMedia("empty media body".to_string()));
        }
        Ok(part)
    }

    /// Parses a `data:<mime>;base64,<payload>` URL.
    pub fn from_data_url(url: &str) -> Result<Self, StudioError> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| StudioError::InvalidMedia("missing data: prefix".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| StudioError::InvalidMedia("missing data URL payload".to_string()))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| StudioError::InvalidMedia("data URL is not base64".to_string()))?;
        if mime_type.is_empty() {
            return Err(StudioError::InvalidMedia("missing MIME type".to_string()));
        }
        Self::from_base64(mime_type, payload)
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    pub fn decode(&self) -> Result<Vec<u8>, StudioError> {
        BASE64
            .decode(self.data.as_bytes())
            .map_err(|err| StudioError::InvalidMedia(format!("base64 decode failed: {err}")))
    }

    pub fn is_accepted_input(&self) -> bool {
        let lowered = self.mime_type.to_ascii_lowercase();
        ACCEPTED_IMAGE_MIME_TYPES
            .iter()
            .any(|accepted| *accepted == lowered)
    }

    /// Validates the invariants required of a request input image.
    pub fn ensure_accepted_input(&self) -> Result<(), StudioError> {
        if !self.is_accepted_input() {
            return Err(StudioError::InvalidMedia(format!(
                "unsupported input MIME type '{}'",
                self.mime_type
            )));
        }
        if self.decode()?.is_empty() {
            return Err(StudioError::InvalidMedia("empty media body".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{MediaPart, ACCEPTED_IMAGE_MIME_TYPES};

    #[test]
    fn from_bytes_rejects_empty_body() {
        assert!(MediaPart::from_bytes("image/png", &[]).is_err());
    }

    #[test]
    fn data_url_round_trip() -> anyhow::Result<()> {
        let part = MediaPart::from_bytes("image/jpeg", b"fake-jpeg-bytes")?;
        let url = part.to_data_url();
        assert!(url.starts_with("data:image/jpeg;base64,"));
        let parsed = MediaPart::from_data_url(&url)?;
        assert_eq!(parsed, part);
        assert_eq!(parsed.decode()?, b"fake-jpeg-bytes");
        Ok(())
    }

    #[test]
    fn rejects_non_base64_data_url() {
        assert!(MediaPart::from_data_url("data:image/png,plain-payload").is_err());
        assert!(MediaPart::from_data_url("http://example.com/a.png").is_err());
    }

    #[test]
    fn accepted_input_check_is_case_insensitive() -> anyhow::Result<()> {
        let part = MediaPart::from_bytes("IMAGE/PNG", b"png")?;
        assert!(part.is_accepted_input());
        let tiff = MediaPart::from_bytes("image/tiff", b"tiff")?;
        assert!(!tiff.is_accepted_input());
        assert!(tiff.ensure_accepted_input().is_err());
        assert_eq!(ACCEPTED_IMAGE_MIME_TYPES.len(), 3);
        Ok(())
    }
}
