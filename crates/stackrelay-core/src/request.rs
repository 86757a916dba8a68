//! Create-stack request

use crate::error::{DeploymentError, Result};
use stackrelay_config::{validate_stack_name, Capability};

/// CloudFormation's limit for an inline TemplateBody, in bytes
pub const MAX_TEMPLATE_BODY_BYTES: usize = 51_200;

/// Everything CreateStack needs. Validated on construction and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackRequest {
    name: String,
    template_body: String,
    capabilities: Vec<Capability>,
}

impl StackRequest {
    pub fn new(
        name: impl Into<String>,
        template_body: impl Into<String>,
        capabilities: impl IntoIterator<Item = Capability>,
    ) -> Result<Self> {
        let name = name.into();
        let template_body = template_body.into();

        validate_stack_name(&name).map_err(DeploymentError::invalid_request)?;

        if template_body.trim().is_empty() {
            return Err(DeploymentError::invalid_request(
                "Template body cannot be empty",
            ));
        }
        if template_body.len() > MAX_TEMPLATE_BODY_BYTES {
            return Err(DeploymentError::invalid_request(format!(
                "Template body is {} bytes; inline templates are limited to {} bytes",
                template_body.len(),
                MAX_TEMPLATE_BODY_BYTES
            )));
        }

        // Keep first-seen order, drop repeats
        let mut unique = Vec::new();
        for capability in capabilities {
            if !unique.contains(&capability) {
                unique.push(capability);
            }
        }

        Ok(Self {
            name,
            template_body,
            capabilities: unique,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template_body(&self) -> &str {
        &self.template_body
    }

    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }
}
