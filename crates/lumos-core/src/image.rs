//! Encoded images sent between processes

use crate::topic::Topic;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A JPEG encoded image. The bytes travel as a base64 string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageJpeg {
    #[serde(serialize_with = "serialize_base64", deserialize_with = "deserialize_base64")]
    pub data: Vec<u8>,
}

fn serialize_base64<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(data))
}

fn deserialize_base64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let encoded = String::deserialize(deserializer)?;
    STANDARD
        .decode(encoded.as_bytes())
        .map_err(serde::de::Error::custom)
}

impl ImageJpeg {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }
}

impl From<Vec<u8>> for ImageJpeg {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl Topic for ImageJpeg {
    const TYPE_NAME: &'static str = "lumos::render::ImageJpeg";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn test_empty_image() {
        let image = ImageJpeg::default();
        assert_eq!(image.to_json().unwrap(), r#"{"data":""}"#);
        assert_eq!(ImageJpeg::from_json(r#"{"data":""}"#).unwrap(), image);
    }

    #[test]
    fn test_data_is_base64() {
        // JPEG start-of-image marker
        let image = ImageJpeg::new(vec![0xFF, 0xD8, 0xFF, 0xE0]);
        let json = image.to_json().unwrap();
        assert_eq!(json, r#"{"data":"/9j/4A=="}"#);
        assert_eq!(ImageJpeg::from_json(&json).unwrap(), image);
    }

    #[test]
    fn test_invalid_input() {
        assert!(matches!(
            ImageJpeg::from_json("blubb"),
            Err(CoreError::Parse(_))
        ));
        assert!(ImageJpeg::from_json(r#"{"data":"not base64!"}"#).is_err());
    }
}
