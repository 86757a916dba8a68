//! CloudFormation template for the S3 copy stack
//!
//! The template and the copy function it embeds are static payload. Only the
//! function runtime and timeout are parameters; bucket names derive from the
//! stack name inside the template itself (`${AWS::StackName}-source`). The
//! function learns its destination from the `DESTINATION_BUCKET` variable.

use stackrelay_config::FunctionConfig;

const TEMPLATE: &str = include_str!("../templates/s3-copy-stack.yaml");
const COPY_FUNCTION: &str = include_str!("../templates/copy_object.py");

/// Column the inline function code starts at under `ZipFile: |`
const CODE_INDENT: usize = 10;

/// Logical resource IDs declared by the template
pub const RESOURCES: &[&str] = &[
    "SourceBucket",
    "DestinationBucket",
    "LambdaExecutionRole",
    "S3CopyLambda",
    "S3CopyLambdaPermission",
];

/// Output keys declared by the template
pub const OUTPUTS: &[&str] = &["SourceBucketName", "DestinationBucketName", "CopyFunctionArn"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateParams {
    pub function_runtime: String,
    pub function_timeout_secs: u32,
}

impl From<&FunctionConfig> for TemplateParams {
    fn from(config: &FunctionConfig) -> Self {
        Self {
            function_runtime: config.runtime.clone(),
            function_timeout_secs: config.timeout_secs,
        }
    }
}

impl Default for TemplateParams {
    fn default() -> Self {
        Self::from(&FunctionConfig::default())
    }
}

/// Source of the copy function, as deployed
pub fn copy_function_source() -> &'static str {
    COPY_FUNCTION
}

/// Render the template body sent with CreateStack
pub fn render(params: &TemplateParams) -> String {
    TEMPLATE
        .replace("{{FUNCTION_RUNTIME}}", &params.function_runtime)
        .replace("{{FUNCTION_TIMEOUT}}", &params.function_timeout_secs.to_string())
        .replace("{{FUNCTION_CODE}}", &indent(COPY_FUNCTION.trim_end(), CODE_INDENT))
}

fn indent(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
