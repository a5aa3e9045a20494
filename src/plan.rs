use crate::spacelift::types::{AdministrativeInput, Stack, StackInput};

/// Per-run override values. `None` keeps the stack's current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overlay {
    pub administrative: Option<String>,
    pub name: Option<String>,
    pub branch: Option<String>,
    pub namespace: Option<String>,
    pub provider: Option<String>,
    pub repository: Option<String>,
    pub repository_url: Option<String>,
    pub project_root: Option<String>,
    pub space: Option<String>,
    /// Comma-separated labels appended to the existing ones.
    pub labels: Option<String>,
    pub worker_pool_id: Option<String>,
}

impl Overlay {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Labels to append, split on commas and trimmed.
    pub fn extra_labels(&self) -> Vec<String> {
        match override_value(&self.labels) {
            Some(raw) => raw.split(',').map(|l| l.trim().to_string()).collect(),
            None => Vec::new(),
        }
    }
}

fn override_value(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn pick(value: &Option<String>, current: &str) -> String {
    override_value(value).unwrap_or(current).to_string()
}

fn pick_optional(value: &Option<String>, current: &Option<String>) -> Option<String> {
    override_value(value)
        .map(str::to_string)
        .or_else(|| current.clone())
}

/// Build the `StackInput` for one stack by merging `overlay` onto its
/// current state.
///
/// Every field takes the override when one is set and the stack's value
/// otherwise, except:
/// - labels: overrides are appended to the existing labels, duplicates kept;
/// - worker pool: left out entirely when neither side has one.
pub fn build_payload(stack: &Stack, overlay: &Overlay) -> StackInput {
    let administrative = match override_value(&overlay.administrative) {
        Some(raw) => AdministrativeInput::Override(raw.to_string()),
        None => AdministrativeInput::Current(stack.administrative),
    };

    let mut labels = stack.labels.clone();
    labels.extend(overlay.extra_labels());

    let worker_pool = override_value(&overlay.worker_pool_id)
        .map(str::to_string)
        .or_else(|| stack.worker_pool.as_ref().map(|pool| pool.id.clone()));

    StackInput {
        administrative,
        name: pick(&overlay.name, &stack.name),
        branch: pick(&overlay.branch, &stack.branch),
        namespace: pick(&overlay.namespace, &stack.namespace),
        provider: pick(&overlay.provider, &stack.provider),
        repository: pick(&overlay.repository, &stack.repository),
        repository_url: pick_optional(&overlay.repository_url, &stack.repository_url),
        project_root: pick_optional(&overlay.project_root, &stack.project_root),
        space: pick(&overlay.space, &stack.space),
        labels,
        worker_pool,
        description: stack.description.clone(),
        vcs_integration_id: stack.vcs_integration.as_ref().map(|vcs| vcs.id.clone()),
    }
}
