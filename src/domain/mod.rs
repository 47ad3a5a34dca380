/// Domain models shared by the proxy and the dashboard
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Astronomy Picture of the Day as the dashboard stores it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Apod {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image: Option<ApodImage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApodImage {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl Apod {
    /// Build from a raw upstream APOD payload.
    ///
    /// NASA returns a flat record; image entries additionally get the nested
    /// `image` block the renderer reads from.
    pub fn from_payload(payload: Value) -> Result<Self, serde_json::Error> {
        let mut apod: Apod = serde_json::from_value(payload)?;
        if apod.image.is_none() && !apod.is_video() {
            apod.image = Some(ApodImage {
                url: apod.url.clone(),
                explanation: apod.explanation.clone(),
            });
        }
        Ok(apod)
    }

    pub fn is_video(&self) -> bool {
        self.media_type.as_deref() == Some("video")
    }
}

/// Rover metadata nested inside every photo record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoverMeta {
    pub name: String,
    #[serde(default)]
    pub launch_date: Option<String>,
    #[serde(default)]
    pub landing_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// One raw Mars-photos record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub img_src: String,
    pub earth_date: String,
    pub rover: RoverMeta,
}

/// Display-ready projection of a [`PhotoRecord`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayImage {
    pub src: String,
    pub date: String,
}

/// `GET /apod` envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ApodEnvelope {
    pub image: Value,
}

/// `GET /rover` envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct RoverEnvelope {
    pub data: Value,
}

/// Health check response
#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
    pub now: DateTime<Utc>,
}
