/// External API clients module
use crate::domain::{Apod, ApodEnvelope, PhotoRecord, RoverEnvelope};
use crate::errors::{ApiError, ApiResult};
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;

const UPSTREAM_BODY_LIMIT: usize = 512;

/// HTTP client wrapper with common configuration
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("mars-dashboard/0.1")
            .build()?;
        Ok(Self { client })
    }

    pub fn get_client(&self) -> &Client {
        &self.client
    }
}

/// Turn a response into JSON, mapping non-2xx statuses to [`ApiError::Upstream`]
async fn read_json(resp: Response) -> ApiResult<Value> {
    let status = resp.status();
    if !status.is_success() {
        let mut body = resp.text().await.unwrap_or_default();
        if body.len() > UPSTREAM_BODY_LIMIT {
            let mut cut = UPSTREAM_BODY_LIMIT;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        return Err(ApiError::Upstream {
            status: status.as_u16(),
            body,
        });
    }
    Ok(resp.json().await?)
}

/// NASA APIs client (APOD, Mars rover photos)
pub struct NasaClient {
    http_client: HttpClient,
    base_url: String,
    api_key: String,
    sol: u64,
}

impl NasaClient {
    pub fn new(base_url: String, api_key: String, sol: u64, timeout: Duration) -> ApiResult<Self> {
        Ok(Self {
            http_client: HttpClient::new(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            sol,
        })
    }

    /// Fetch Astronomy Picture of the Day
    pub async fn fetch_apod(&self) -> ApiResult<Value> {
        let url = format!("{}/planetary/apod", self.base_url);
        let mut req = self.http_client.get_client().get(url);

        if !self.api_key.is_empty() {
            req = req.query(&[("api_key", &self.api_key)]);
        }

        read_json(req.send().await?).await
    }

    /// Fetch the configured sol's photos for one rover
    pub async fn fetch_rover_photos(&self, rover: &str) -> ApiResult<Value> {
        let url = format!(
            "{}/mars-photos/api/v1/rovers/{}/photos",
            self.base_url,
            rover.to_ascii_lowercase()
        );
        let mut req = self
            .http_client
            .get_client()
            .get(url)
            .query(&[("sol", self.sol)]);

        if !self.api_key.is_empty() {
            req = req.query(&[("api_key", &self.api_key)]);
        }

        read_json(req.send().await?).await
    }
}

/// Client for the dashboard's own proxy server
#[derive(Clone)]
pub struct ProxyClient {
    http_client: HttpClient,
    base_url: String,
}

impl ProxyClient {
    pub fn new(base_url: String, timeout: Duration) -> ApiResult<Self> {
        Ok(Self {
            http_client: HttpClient::new(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch today's APOD through the proxy
    pub async fn fetch_apod(&self) -> ApiResult<Apod> {
        let url = format!("{}/apod", self.base_url);
        let resp = self.http_client.get_client().get(url).send().await?;

        let envelope: ApodEnvelope = serde_json::from_value(read_json(resp).await?)?;
        Ok(Apod::from_payload(envelope.image)?)
    }

    /// Fetch photo records for `rover` through the proxy
    pub async fn fetch_rover_photos(&self, rover: &str) -> ApiResult<Vec<PhotoRecord>> {
        let url = format!("{}/rover", self.base_url);
        let resp = self
            .http_client
            .get_client()
            .get(url)
            .query(&[("rover", rover)])
            .send()
            .await?;

        let envelope: RoverEnvelope = serde_json::from_value(read_json(resp).await?)?;
        let photos = envelope
            .data
            .get("photos")
            .cloned()
            .ok_or_else(|| ApiError::Internal("rover payload is missing data.photos".into()))?;

        Ok(serde_json::from_value(photos)?)
    }
}
