use serde_yaml::Value;

use crate::domain::AppError;

/// Render gathered context as one LLM-ready document.
///
/// Keys keep their insertion order; the output depends only on the inputs.
pub fn format_context(project: &str, context: &Value) -> Result<String, AppError> {
    let body = serde_yaml::to_string(context)?;
    Ok(format!("\n# {} Context\n\n## Repository Information\n{}", project, body))
}
