// HTTP implementation of the agent gateway

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::error::{GatewayError, Result};
use crate::traits::{AgentGateway, AgentReply, AgentRequest};

const QUERY_FIELD: &str = "query";
const DATABASE_FIELD: &str = "database";

/// Posts each query as a multipart form and expects `{"response": "..."}` back
#[derive(Debug)]
pub struct HttpAgentGateway {
    http_client: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    response: String,
}

impl HttpAgentGateway {
    pub fn builder() -> HttpAgentGatewayBuilder {
        HttpAgentGatewayBuilder::default()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_form(request: AgentRequest) -> Result<Form> {
        let mut form = Form::new().text(QUERY_FIELD, request.query);
        if let Some(attachment) = request.attachment {
            let part = Part::bytes(attachment.bytes)
                .file_name(attachment.name)
                .mime_str("application/octet-stream")?;
            form = form.part(DATABASE_FIELD, part);
        }
        Ok(form)
    }
}

#[async_trait]
impl AgentGateway for HttpAgentGateway {
    async fn ask(&self, request: AgentRequest) -> Result<AgentReply> {
        tracing::debug!(
            endpoint = %self.endpoint,
            has_attachment = request.attachment.is_some(),
            "Sending query to agent"
        );

        let form = Self::build_form(request)?;
        let response = self
            .http_client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: QueryResponse =
            serde_json::from_str(&body).map_err(|e| GatewayError::Decode(e.to_string()))?;
        Ok(AgentReply::new(parsed.response))
    }
}

/// Builder for HttpAgentGateway
#[derive(Default)]
pub struct HttpAgentGatewayBuilder {
    endpoint: Option<String>,
    api_key: Option<String>,
    timeout: Option<Duration>,
}

impl HttpAgentGatewayBuilder {
    /// Full URL of the query endpoint, e.g. "http://127.0.0.1:8000/query"
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sent as a bearer token when set
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<HttpAgentGateway> {
        let endpoint = self
            .endpoint
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| GatewayError::Config("Endpoint is required".to_string()))?;

        let mut headers = HeaderMap::new();
        if let Some(api_key) = self.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|_| GatewayError::Config("Invalid API key format".to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        Ok(HttpAgentGateway {
            http_client,
            endpoint,
        })
    }
}
