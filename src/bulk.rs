use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};

use crate::plan::{self, Overlay};
use crate::spacelift::types::{Stack, TERRAFORM_VENDOR};
use crate::spacelift::StackApi;

/// Result of one update attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub stack_id: String,
    pub success: bool,
    pub error: Option<String>,
}

impl UpdateOutcome {
    pub fn succeeded(stack_id: &str) -> Self {
        Self {
            stack_id: stack_id.to_string(),
            success: true,
            error: None,
        }
    }

    pub fn failed(stack_id: &str, error: impl ToString) -> Self {
        Self {
            stack_id: stack_id.to_string(),
            success: false,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExecuteOptions {
    /// Cap on simultaneous mutations. `None` starts them all at once.
    pub max_concurrency: Option<usize>,
    /// Plan payloads without sending them.
    pub dry_run: bool,
}

/// Only Terraform stacks are updated.
pub fn is_terraform(stack: &Stack) -> bool {
    stack.vendor() == Some(TERRAFORM_VENDOR)
}

/// Update every stack accepted by `eligible`, one task per stack.
///
/// Returns exactly one outcome per eligible stack, in completion order.
/// Failures are reported as outcomes and never stop the other updates.
pub async fn execute<P>(
    stacks: Vec<Stack>,
    eligible: P,
    overlay: Arc<Overlay>,
    api: Arc<dyn StackApi>,
    options: ExecuteOptions,
) -> Vec<UpdateOutcome>
where
    P: Fn(&Stack) -> bool,
{
    let targets: Vec<Stack> = stacks.into_iter().filter(|s| eligible(s)).collect();
    let launched = targets.len();
    if launched == 0 {
        return Vec::new();
    }

    tracing::info!(
        stacks = launched,
        max_concurrency = ?options.max_concurrency,
        dry_run = options.dry_run,
        "Starting bulk update"
    );

    let limiter = options
        .max_concurrency
        .map(|n| Arc::new(Semaphore::new(n.clamp(1, Semaphore::MAX_PERMITS))));
    let (tx, mut rx) = mpsc::channel::<UpdateOutcome>(launched);
    let mut handles = Vec::with_capacity(launched);

    for stack in targets {
        let tx = tx.clone();
        let overlay = Arc::clone(&overlay);
        let api = Arc::clone(&api);
        let limiter = limiter.clone();
        let stack_id = stack.id.clone();

        let handle = tokio::spawn(async move {
            // Held until the outcome is sent.
            let _permit = match limiter {
                Some(sem) => sem.acquire_owned().await.ok(),
                None => None,
            };

            let outcome = update_one(&stack, &overlay, api.as_ref(), options.dry_run).await;
            // Capacity equals the number of tasks, so this never waits.
            let _ = tx.send(outcome).await;
        });
        handles.push((stack_id, handle));
    }
    drop(tx);

    let mut outcomes = Vec::with_capacity(launched);
    while let Some(outcome) = rx.recv().await {
        outcomes.push(outcome);
    }

    // A task that panicked dropped its sender without reporting.
    for (stack_id, handle) in handles {
        if let Err(e) = handle.await {
            tracing::error!(stack = %stack_id, error = %e, "Update task aborted");
            outcomes.push(UpdateOutcome::failed(&stack_id, format!("update task aborted: {e}")));
        }
    }

    outcomes
}

async fn update_one(
    stack: &Stack,
    overlay: &Overlay,
    api: &dyn StackApi,
    dry_run: bool,
) -> UpdateOutcome {
    let input = plan::build_payload(stack, overlay);

    if dry_run {
        match serde_json::to_string(&input) {
            Ok(json) => tracing::info!(
                stack = %stack.id,
                terraform_version = stack.terraform_version.as_deref().unwrap_or("default"),
                input = %json,
                "Planned update"
            ),
            Err(e) => return UpdateOutcome::failed(&stack.id, e),
        }
        return UpdateOutcome::succeeded(&stack.id);
    }

    tracing::info!(stack = %stack.id, "Updating stack");

    match api.update_stack(&stack.id, &input).await {
        Ok(()) => {
            tracing::info!(stack = %stack.id, "Successfully updated stack");
            UpdateOutcome::succeeded(&stack.id)
        }
        Err(e) => {
            tracing::error!(stack = %stack.id, error = %e, "Failed to update stack");
            UpdateOutcome::failed(&stack.id, e)
        }
    }
}
