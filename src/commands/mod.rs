pub mod deploy;
pub mod status;
pub mod template;
