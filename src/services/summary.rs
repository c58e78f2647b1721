use crate::models::drive_types::{ConnectionStatus, RemoteDestination};
use crate::models::result_types::{OperationResult, SummaryRow};

pub const UNCATEGORIZED: &str = "Uncategorized";
pub const NO_CONFIDENCE: &str = "0.00";

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.as_str()).filter(|s| !s.trim().is_empty())
}

/// One row per file: its name, the primary category and that category's
/// confidence. Files without predictions still get a row.
pub fn render_summary(results: &OperationResult) -> Vec<SummaryRow> {
    results
        .iter()
        .map(|(file_name, predictions)| {
            let primary = predictions.first();
            SummaryRow {
                file_name: file_name.clone(),
                category: non_empty(primary.and_then(|p| p.name.as_ref()))
                    .unwrap_or(UNCATEGORIZED)
                    .to_string(),
                confidence: non_empty(primary.and_then(|p| p.conf.as_ref()))
                    .unwrap_or(NO_CONFIDENCE)
                    .to_string(),
            }
        })
        .collect()
}

/// Plain-text table of the summary rows, columns padded to the widest cell.
pub fn format_summary(rows: &[SummaryRow]) -> String {
    let name_width = rows.iter().map(|r| r.file_name.chars().count()).max().unwrap_or(0);
    let category_width = rows.iter().map(|r| r.category.chars().count()).max().unwrap_or(0);

    rows.iter()
        .map(|r| {
            format!(
                "{:<name_width$}  {:<category_width$}  {}",
                r.file_name,
                r.category,
                r.confidence,
                name_width = name_width,
                category_width = category_width
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// (source line, destination line) of the connection panel.
pub fn describe_connection(status: ConnectionStatus, destination: RemoteDestination) -> (String, String) {
    let label = |connected: bool| if connected { "Connected" } else { "Not connected" };
    let source = label(status.source_connected).to_string();
    let dest = match destination {
        RemoteDestination::DifferentDrive => label(status.destination_connected).to_string(),
        _ => "Using selected option".to_string(),
    };
    (source, dest)
}
