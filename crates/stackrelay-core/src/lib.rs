//! stackrelay-core - Deploy the S3 copy stack and watch it settle
//!
//! The crate is provider-agnostic: CloudFormation is reached through the
//! [`StackApi`] trait, delays come from a [`WaitStrategy`], and each poll is
//! reported to a [`ProgressSink`].

pub mod api;
pub mod driver;
pub mod error;
pub mod progress;
pub mod request;
pub mod status;
pub mod template;
pub mod wait;

pub use api::StackApi;
pub use driver::{Deployer, DeploymentOutcome};
pub use error::{ApiError, DeploymentError, ErrorCode, Result};
pub use progress::{ConsoleProgress, ProgressSink, TracingProgress};
pub use request::StackRequest;
pub use stackrelay_config::Capability;
pub use status::{StackPhase, StackSnapshot, StackStatus};
pub use template::TemplateParams;
pub use wait::{Bounded, ExponentialBackoff, FixedInterval, WaitStrategy};
