pub mod graphql;
pub mod queries;
pub mod session;
pub mod types;

use async_trait::async_trait;

use crate::error::Result;
use types::*;

pub use session::Session;

/// Remote operations the bulk executor depends on.
#[async_trait]
pub trait StackApi: Send + Sync {
    /// Fetch every stack visible to the session in one call.
    async fn list_stacks(&self) -> Result<Vec<Stack>>;

    /// Apply `input` to the stack identified by `stack_id`.
    async fn update_stack(&self, stack_id: &str, input: &StackInput) -> Result<()>;
}
