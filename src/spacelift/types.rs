use serde::{Deserialize, Serialize};

/// Vendor typename carried by stacks managed with Terraform/OpenTofu.
pub const TERRAFORM_VENDOR: &str = "StackConfigVendorTerraform";

/// A stack as returned by the `stacks` query.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stack {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub administrative: bool,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub repository: String,
    #[serde(rename = "repositoryURL", default)]
    pub repository_url: Option<String>,
    #[serde(default)]
    pub project_root: Option<String>,
    #[serde(default)]
    pub space: String,
    #[serde(default)]
    pub labels: Vec<String>,
    pub description: Option<String>,
    pub terraform_version: Option<String>,
    pub worker_pool: Option<WorkerPool>,
    pub vcs_integration: Option<VcsIntegration>,
    pub vendor_config: Option<VendorConfig>,
}

impl Stack {
    pub fn vendor(&self) -> Option<&str> {
        self.vendor_config.as_ref().map(|v| v.typename.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkerPool {
    pub id: String,
    pub space: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VcsIntegration {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VendorConfig {
    #[serde(rename = "__typename")]
    pub typename: String,
}

/// `administrative` is a boolean remotely, but overrides are forwarded as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AdministrativeInput {
    Current(bool),
    Override(String),
}

/// The `StackInput` sent with `stackUpdate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StackInput {
    pub administrative: AdministrativeInput,
    pub name: String,
    pub branch: String,
    pub namespace: String,
    pub provider: String,
    pub repository: String,
    #[serde(rename = "repositoryURL")]
    pub repository_url: Option<String>,
    pub project_root: Option<String>,
    pub space: String,
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_pool: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcs_integration_id: Option<String>,
}

// --- Response envelopes ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiKeyUserData {
    pub api_key_user: Option<ApiKeyUser>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiKeyUser {
    pub jwt: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StacksData {
    pub stacks: Vec<Stack>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StackUpdateData {
    pub stack_update: Option<UpdatedStack>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpdatedStack {
    pub id: String,
}
