//! Request records consumed by the simulation.
//!
//! Requests are produced outside the crate (by a workload generator or a
//! trace file) and are read-only here.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContentType {
    #[default]
    Html,
    Image,
    Video,
    Audio,
    Zip,
}

impl ContentType {
    /// Typical object size in KB for this kind of content.
    pub fn typical_size(self) -> u64 {
        match self {
            ContentType::Html => 50,
            ContentType::Image => 500,
            ContentType::Video => 5_000,
            ContentType::Audio => 3_000,
            ContentType::Zip => 10_000,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ContentType::Html => "HTML",
            ContentType::Image => "IMAGE",
            ContentType::Video => "VIDEO",
            ContentType::Audio => "AUDIO",
            ContentType::Zip => "ZIP",
        })
    }
}

/// One client request for a piece of content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub id: u64,
    /// Requesting client node.
    pub client: String,
    pub content_id: String,
    #[serde(default)]
    pub content_type: ContentType,
    /// Content size in KB.
    pub size: u64,
    #[serde(default)]
    pub timestamp: u64,
    /// Region hint used to pick the origin on a miss.
    #[serde(default)]
    pub region: Option<String>,
}

impl Request {
    /// Builds an HTML request whose timestamp equals its id.
    pub fn new(
        id: u64,
        client: impl Into<String>,
        content_id: impl Into<String>,
        size: u64,
    ) -> Self {
        Self {
            id,
            client: client.into(),
            content_id: content_id.into(),
            content_type: ContentType::default(),
            size,
            timestamp: id,
            region: None,
        }
    }

    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_optional_fields() {
        let req = Request::new(7, "client_0", "content_3", 500)
            .with_content_type(ContentType::Image)
            .with_region("EU")
            .with_timestamp(42);
        assert_eq!(req.timestamp, 42);
        assert_eq!(req.region.as_deref(), Some("EU"));
        assert_eq!(req.content_type, ContentType::Image);
    }

    #[test]
    fn deserializes_trace_record_without_optional_fields() {
        let req: Request = serde_json::from_str(
            r#"{"id": 3, "client": "client_1", "content_id": "content_9", "size": 120}"#,
        )
        .unwrap();
        assert_eq!(req.content_type, ContentType::Html);
        assert_eq!(req.timestamp, 0);
        assert!(req.region.is_none());
    }

    #[test]
    fn content_type_uses_upper_case_names() {
        let json = serde_json::to_string(&ContentType::Video).unwrap();
        assert_eq!(json, "\"VIDEO\"");
        assert_eq!(ContentType::Zip.to_string(), "ZIP");
        assert_eq!(ContentType::Audio.typical_size(), 3_000);
    }
}
