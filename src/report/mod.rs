pub mod json;
pub mod md;

use crate::error::PlanscopeError;
use crate::types::report::Report;

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Json,
    Md,
}

pub fn render(report: &Report, format: OutputFormat) -> Result<String, PlanscopeError> {
    match format {
        OutputFormat::Json => json::to_json(report).map_err(PlanscopeError::Json),
        OutputFormat::Md => Ok(md::to_markdown(report)),
    }
}
