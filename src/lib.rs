//! stackrelay - create the S3 copy stack and wait for CloudFormation to finish

pub mod cli;
pub mod commands;
mod init;

pub use init::init_tracing;
