//! Generator configuration.
//!
//! The defaults describe the `ballerinax/awslambda` dispatcher package and the
//! AWS deployment settings printed after packaging. The command line driver
//! overrides the deployment knobs.

/// Identifiers the pipeline looks up in the dispatcher package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    pub org: String,
    pub package: String,
    /// Annotation that marks a handler function.
    pub annotation: String,
    /// Type required for the first handler parameter.
    pub context_type: String,
    pub register_function: String,
    pub process_function: String,
    pub entry_point: String,
    pub proxy_prefix: String,
}

impl DispatcherConfig {
    /// Name of the proxy generated for `handler`.
    pub fn proxy_name(&self, handler: &str) -> String {
        format!("{}{}", self.proxy_prefix, handler)
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            org: "ballerinax".to_string(),
            package: "awslambda".to_string(),
            annotation: "Function".to_string(),
            context_type: "Context".to_string(),
            register_function: "__register".to_string(),
            process_function: "__process".to_string(),
            entry_point: "main".to_string(),
            proxy_prefix: "__func_proxy__".to_string(),
        }
    }
}

/// Archive naming and the settings echoed in the deployment commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagingConfig {
    pub archive_name: String,
    pub runtime: String,
    pub layer_arn: String,
    pub memory_size: u32,
    pub timeout: u32,
}

impl Default for PackagingConfig {
    fn default() -> Self {
        Self {
            archive_name: "aws-ballerina-lambda-functions.zip".to_string(),
            runtime: "provided".to_string(),
            layer_arn: "arn:aws:lambda:$REGION_ID:134633749276:layer:ballerina-jre11:6".to_string(),
            memory_size: 512,
            timeout: 10,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub dispatcher: DispatcherConfig,
    pub packaging: PackagingConfig,
}
