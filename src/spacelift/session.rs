use async_trait::async_trait;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::spacelift::graphql::GraphQlClient;
use crate::spacelift::queries;
use crate::spacelift::types::*;
use crate::spacelift::StackApi;

/// An authenticated connection to the Spacelift GraphQL API.
pub struct Session {
    client: GraphQlClient,
    token: String,
}

// Manual Debug impl to avoid leaking the bearer token
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("endpoint", &self.client.endpoint())
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl Session {
    /// Exchange an API key for a JWT. Any failure here is fatal to the run.
    pub async fn authenticate(
        client: GraphQlClient,
        key_id: &str,
        key_secret: &str,
    ) -> Result<Self> {
        let variables = json!({
            "keyId": key_id,
            "keySecret": key_secret,
        });

        let data: ApiKeyUserData = client
            .execute(queries::API_KEY_USER, Some(variables), None)
            .await
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        let token = data
            .api_key_user
            .and_then(|user| user.jwt)
            .filter(|jwt| !jwt.is_empty())
            .ok_or_else(|| AppError::Authentication("No JWT in response".to_string()))?;

        Ok(Self { client, token })
    }
}

#[async_trait]
impl StackApi for Session {
    async fn list_stacks(&self) -> Result<Vec<Stack>> {
        let data: StacksData = self
            .client
            .execute(queries::LIST_STACKS, None, Some(&self.token))
            .await
            .map_err(|e| AppError::Listing(e.to_string()))?;

        Ok(data.stacks)
    }

    async fn update_stack(&self, stack_id: &str, input: &StackInput) -> Result<()> {
        let variables = json!({
            "stackId": stack_id,
            "input": input,
        });

        let data: StackUpdateData = self
            .client
            .execute(queries::UPDATE_STACK, Some(variables), Some(&self.token))
            .await?;

        match data.stack_update {
            Some(updated) => {
                tracing::debug!(stack = %updated.id, "stackUpdate acknowledged");
                Ok(())
            }
            None => Err(AppError::Mutation(format!(
                "stackUpdate returned no stack for {stack_id}"
            ))),
        }
    }
}
