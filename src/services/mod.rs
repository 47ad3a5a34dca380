/// Proxy service layer: validates requests and forwards them upstream
use crate::clients::NasaClient;
use crate::errors::{ApiError, ApiResult};
use serde_json::Value;
use tracing::{error, info};

/// Pass-through access to NASA's APOD and Mars-photos APIs
pub struct ProxyService {
    nasa: NasaClient,
}

impl ProxyService {
    pub fn new(nasa: NasaClient) -> Self {
        Self { nasa }
    }

    /// Fetch today's APOD payload
    pub async fn apod(&self) -> ApiResult<Value> {
        self.nasa.fetch_apod().await.map_err(|e| {
            error!("APOD fetch error: {}", e);
            e
        })
    }

    /// Fetch the Mars-photos payload for `rover`
    pub async fn rover_photos(&self, rover: &str) -> ApiResult<Value> {
        let rover = validate_rover(rover)?;
        info!("Received request for rover: {}", rover);

        self.nasa.fetch_rover_photos(rover).await.map_err(|e| {
            error!("Rover fetch error for {}: {}", rover, e);
            e
        })
    }
}

/// Rover names become an upstream path segment, so only plain letters pass
fn validate_rover(rover: &str) -> ApiResult<&str> {
    let rover = rover.trim();
    if rover.is_empty() {
        return Err(ApiError::InvalidInput("rover name is required".into()));
    }
    if !rover.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ApiError::InvalidInput(format!(
            "rover name {:?} must contain only letters",
            rover
        )));
    }
    Ok(rover)
}
