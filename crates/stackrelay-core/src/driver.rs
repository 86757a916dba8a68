//! Create a stack and poll it until CloudFormation reports a terminal status
//!
//! ```text
//! Submitted -> Polling -> Succeeded | Failed | TimedOut
//!                 ^   |
//!                 +---+  (non-terminal status, after WaitStrategy delay)
//! ```

use crate::api::StackApi;
use crate::error::{DeploymentError, Result};
use crate::progress::{ProgressSink, TracingProgress};
use crate::request::StackRequest;
use crate::status::{StackPhase, StackSnapshot};
use crate::wait::{FixedInterval, WaitStrategy};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of a successful deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentOutcome {
    pub stack_name: String,
    /// Id returned by CreateStack
    pub stack_id: Option<String>,
    /// Number of DescribeStacks calls made
    pub polls: u32,
    pub snapshot: StackSnapshot,
}

pub struct Deployer {
    api: Arc<dyn StackApi>,
    wait: Box<dyn WaitStrategy>,
    progress: Arc<dyn ProgressSink>,
}

impl Deployer {
    /// Deployer with a fixed 10 second poll interval and tracing progress
    pub fn new(api: Arc<dyn StackApi>) -> Self {
        Self {
            api,
            wait: Box::new(FixedInterval::default()),
            progress: Arc::new(TracingProgress),
        }
    }

    pub fn with_wait_strategy(mut self, wait: Box<dyn WaitStrategy>) -> Self {
        self.wait = wait;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// Submit the stack and wait for `CREATE_COMPLETE`.
    ///
    /// A rejected submission returns immediately without polling.
    pub async fn deploy(&self, request: &StackRequest) -> Result<DeploymentOutcome> {
        let stack_name = request.name();
        info!(
            stack_name,
            capabilities = ?request.capabilities(),
            template_bytes = request.template_body().len(),
            "Submitting create-stack request"
        );

        let stack_id = self
            .api
            .create_stack(request)
            .await
            .map_err(|e| DeploymentError::submission_rejected(stack_name, e))?;

        info!(stack_name, stack_id = ?stack_id, "Create-stack request accepted");

        let (snapshot, polls) = self.poll_until_settled(stack_name).await?;

        Ok(DeploymentOutcome {
            stack_name: stack_name.to_string(),
            stack_id,
            polls,
            snapshot,
        })
    }

    /// Poll an already-submitted stack until it settles
    pub async fn wait_for_create(&self, stack_name: &str) -> Result<StackSnapshot> {
        self.poll_until_settled(stack_name)
            .await
            .map(|(snapshot, _)| snapshot)
    }

    /// Single status query, no progress reporting
    pub async fn describe(&self, stack_name: &str) -> Result<StackSnapshot> {
        self.api
            .describe_stack(stack_name)
            .await
            .map_err(|e| DeploymentError::status_query_failed(stack_name, e))
    }

    async fn poll_until_settled(&self, stack_name: &str) -> Result<(StackSnapshot, u32)> {
        let mut attempt: u32 = 1;

        loop {
            let snapshot = self.describe(stack_name).await?;
            self.progress.on_status(stack_name, attempt, &snapshot);

            match snapshot.status.phase() {
                StackPhase::Succeeded => {
                    info!(stack_name, polls = attempt, "Stack creation complete");
                    return Ok((snapshot, attempt));
                }
                StackPhase::Failed => {
                    warn!(
                        stack_name,
                        status = %snapshot.status,
                        reason = snapshot.status_reason.as_deref().unwrap_or(""),
                        "Stack creation failed"
                    );
                    return Err(DeploymentError::creation_failed(
                        stack_name,
                        snapshot.status,
                        snapshot.status_reason,
                    ));
                }
                StackPhase::InProgress => {}
            }

            let Some(delay) = self.wait.next_delay(attempt) else {
                warn!(stack_name, attempts = attempt, status = %snapshot.status, "Wait strategy exhausted");
                return Err(DeploymentError::timed_out(stack_name, attempt, snapshot.status));
            };

            debug!(stack_name, attempt, ?delay, "Waiting before next poll");
            tokio::time::sleep(delay).await;
            attempt = attempt.saturating_add(1);
        }
    }
}
