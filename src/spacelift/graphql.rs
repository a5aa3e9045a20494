use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

const USER_AGENT: &str = concat!("stackbulk/", env!("CARGO_PKG_VERSION"));

/// POSTs GraphQL documents to a single endpoint.
#[derive(Clone)]
pub struct GraphQlClient {
    client: Client,
    endpoint: String,
}

impl GraphQlClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Execute one document and decode its `data` member.
    ///
    /// A non-2xx status fails with the raw body. A non-empty `errors` list
    /// fails even when the status was 200.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Option<serde_json::Value>,
        token: Option<&str>,
    ) -> Result<T> {
        let mut request = self.client.post(&self.endpoint).json(&Request { query, variables });
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AppError::Status { status, body });
        }

        let envelope: Response<T> = serde_json::from_str(&body)?;
        if let Some(first) = envelope.errors.first() {
            return Err(AppError::GraphQl(first.message.clone()));
        }

        envelope
            .data
            .ok_or_else(|| AppError::GraphQl("response contained no data".to_string()))
    }
}

#[derive(Debug, Serialize)]
struct Request<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Response<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<ResponseError>,
}

#[derive(Debug, Deserialize)]
struct ResponseError {
    message: String,
}
