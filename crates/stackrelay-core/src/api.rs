//! The two CloudFormation operations the deployer consumes

use crate::error::ApiError;
use crate::request::StackRequest;
use crate::status::StackSnapshot;
use async_trait::async_trait;

#[async_trait]
pub trait StackApi: Send + Sync {
    /// Submit CreateStack. Returns the new stack's id when the provider reports one.
    ///
    /// Provisioning continues asynchronously after this returns.
    async fn create_stack(&self, request: &StackRequest) -> Result<Option<String>, ApiError>;

    /// DescribeStacks for a single stack name
    async fn describe_stack(&self, stack_name: &str) -> Result<StackSnapshot, ApiError>;
}
