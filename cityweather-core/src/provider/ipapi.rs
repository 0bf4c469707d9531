use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::{Result, Service},
    model::Coordinates,
};

use super::{IpLocation, IpLocator, get_json};

/// ipapi.co lookup of the caller's public address.
#[derive(Debug, Clone)]
pub struct IpApiClient {
    http: Client,
    url: String,
}

impl IpApiClient {
    pub fn new(http: Client, url: String) -> Self {
        Self { http, url }
    }
}

// Rate-limited answers come back as 200 with an `error` object, so every
// field is optional.
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
    city: Option<String>,
    region: Option<String>,
    country_name: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<IpApiResponse> for IpLocation {
    fn from(res: IpApiResponse) -> Self {
        let coordinates = match (res.latitude, res.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => None,
        };

        IpLocation {
            coordinates,
            city: non_empty(res.city),
            region: non_empty(res.region),
            country: non_empty(res.country_name),
        }
    }
}

#[async_trait]
impl IpLocator for IpApiClient {
    async fn locate(&self) -> Result<IpLocation> {
        let body: IpApiResponse = get_json(&self.http, Service::IpLocation, &self.url, &[]).await?;
        Ok(body.into())
    }
}
