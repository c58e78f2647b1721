pub mod config;
pub mod connect;
pub mod drive;
pub mod status;
pub mod upload;

use crate::error::AppError;
use crate::models::pipeline_types::PipelineSnapshot;
use crate::services::summary::{format_summary, render_summary};
use std::process::ExitCode;

/// Print a pipeline snapshot the way every command reports its outcome and
/// turn a failed run into a failing exit code.
pub(crate) fn report_snapshot(snapshot: &PipelineSnapshot, json: bool) -> Result<ExitCode, AppError> {
    if json {
        println!("{}", serde_json::to_string_pretty(snapshot)?);
    } else {
        println!("{}", snapshot.message);
        if let Some(path) = &snapshot.saved_to {
            println!("Saved to {}", path.display());
        }
        let rows = render_summary(&snapshot.results);
        if !rows.is_empty() {
            println!();
            println!("{}", format_summary(&rows));
        }
    }

    Ok(if snapshot.failed() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
