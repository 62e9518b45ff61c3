//! Access to the remote book manager API
//!
//! `Gateway` is the seam between the data cache and the network. The cache only
//! needs list/create/update/delete per item type; `HttpGateway` maps those onto
//! the REST endpoints.

use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::http::{USER_AGENT, build_agent, encode_segment, form_urlencode};
use crate::models::{Item, ItemData, ItemType, decode_collection};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("could not decode {item_type} list: {message}")]
    Decode { item_type: ItemType, message: String },
}

/// Operations the data cache performs against the backend.
///
/// Mutations return the HTTP status the server answered with; the body is
/// never used.
pub trait Gateway: Send + Sync + 'static {
    fn list(&self, item_type: ItemType) -> Result<Vec<Item>, GatewayError>;
    fn create(&self, item_type: ItemType, data: &ItemData) -> Result<u16, GatewayError>;
    fn update(&self, item_type: ItemType, id: &str, data: &ItemData) -> Result<u16, GatewayError>;
    fn delete(&self, item_type: ItemType, id: &str) -> Result<u16, GatewayError>;
}

/// Endpoint URLs for one base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: String,
}

impl Endpoints {
    pub fn new(base: impl Into<String>) -> Self {
        let base: String = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn list(&self, item_type: ItemType) -> String {
        format!("{}/{}", self.base, item_type.domain())
    }

    pub fn create(&self, item_type: ItemType) -> String {
        format!("{}/{}/create", self.base, item_type.domain())
    }

    pub fn update(&self, item_type: ItemType, id: &str) -> String {
        format!(
            "{}/{}/{}/update",
            self.base,
            item_type.domain(),
            encode_segment(id)
        )
    }

    pub fn delete(&self, item_type: ItemType, id: &str) -> String {
        format!(
            "{}/{}/{}/delete",
            self.base,
            item_type.domain(),
            encode_segment(id)
        )
    }
}

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Gateway backed by the real HTTP API
pub struct HttpGateway {
    agent: ureq::Agent,
    endpoints: Endpoints,
}

impl HttpGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            agent: build_agent(timeout),
            endpoints: Endpoints::new(base_url),
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }
}

fn transport(url: &str, err: ureq::Error) -> GatewayError {
    GatewayError::Transport {
        url: url.to_string(),
        message: err.to_string(),
    }
}

impl Gateway for HttpGateway {
    fn list(&self, item_type: ItemType) -> Result<Vec<Item>, GatewayError> {
        let url = self.endpoints.list(item_type);
        debug!(%url, "GET");

        let response = self
            .agent
            .get(&url)
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .call()
            .map_err(|e| transport(&url, e))?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            return Err(GatewayError::Status { url, status });
        }

        let value: serde_json::Value =
            response
                .into_body()
                .read_json()
                .map_err(|e| GatewayError::Decode {
                    item_type,
                    message: e.to_string(),
                })?;

        decode_collection(item_type, value).map_err(|e| GatewayError::Decode {
            item_type,
            message: e.to_string(),
        })
    }

    fn create(&self, item_type: ItemType, data: &ItemData) -> Result<u16, GatewayError> {
        let url = self.endpoints.create(item_type);
        debug!(%url, "POST");

        let response = self
            .agent
            .post(&url)
            .header("Content-Type", FORM_CONTENT_TYPE)
            .header("User-Agent", USER_AGENT)
            .send(form_urlencode(data))
            .map_err(|e| transport(&url, e))?;
        Ok(response.status().as_u16())
    }

    fn update(&self, item_type: ItemType, id: &str, data: &ItemData) -> Result<u16, GatewayError> {
        let url = self.endpoints.update(item_type, id);
        debug!(%url, "PUT");

        let response = self
            .agent
            .put(&url)
            .header("Content-Type", FORM_CONTENT_TYPE)
            .header("User-Agent", USER_AGENT)
            .send(form_urlencode(data))
            .map_err(|e| transport(&url, e))?;
        Ok(response.status().as_u16())
    }

    fn delete(&self, item_type: ItemType, id: &str) -> Result<u16, GatewayError> {
        let url = self.endpoints.delete(item_type, id);
        debug!(%url, "DELETE");

        let response = self
            .agent
            .delete(&url)
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .call()
            .map_err(|e| transport(&url, e))?;
        Ok(response.status().as_u16())
    }
}
