//! Outbound call placement.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::TelephonyConfig;

use super::error::{client_with_timeout, endpoint, ensure_success, CapabilityError};

/// Request to place a call through a SIP media application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutboundCallRequest {
    /// Carried in the URL path, not the body.
    #[serde(skip)]
    pub sip_media_application_id: String,
    pub from_phone_number: String,
    pub to_phone_number: String,
    #[serde(default)]
    pub sip_headers: BTreeMap<String, String>,
}

/// Async interface to outbound call placement.
#[async_trait]
pub trait OutboundCaller: Send + Sync {
    /// Place the call; returns the platform transaction id when reported.
    async fn place_call(&self, request: &OutboundCallRequest)
        -> Result<Option<String>, CapabilityError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PlacedCallEnvelope {
    sip_media_application_call: Option<PlacedCall>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PlacedCall {
    transaction_id: Option<String>,
}

/// Places calls through a JSON/HTTP gateway:
/// `POST {base_url}/sip-media-applications/{id}/calls`.
pub struct HttpOutboundCaller {
    client: reqwest::Client,
    base_url: String,
}

impl HttpOutboundCaller {
    pub fn from_config(config: &TelephonyConfig) -> Self {
        Self {
            client: client_with_timeout(config.timeout_secs),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl OutboundCaller for HttpOutboundCaller {
    async fn place_call(
        &self,
        request: &OutboundCallRequest,
    ) -> Result<Option<String>, CapabilityError> {
        let url = endpoint(
            &self.base_url,
            &["sip-media-applications", request.sip_media_application_id.as_str(), "calls"],
        )?;
        let response = self.client.post(url).json(request).send().await?;
        let response = ensure_success(response).await?;

        // A body we cannot read still means the call was accepted.
        let transaction_id = match response.json::<PlacedCallEnvelope>().await {
            Ok(envelope) => envelope
                .sip_media_application_call
                .and_then(|call| call.transaction_id),
            Err(e) => {
                log::debug!("outbound call accepted with unreadable body: {e}");
                None
            }
        };
        Ok(transaction_id)
    }
}
