use serde::Serialize;

use super::domain::Report;

#[derive(Debug)]
pub enum ExportError {
    Csv(csv::Error),
    Encoding(std::string::FromUtf8Error),
    Flush(String),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Csv(err) => write!(f, "failed to write report export: {}", err),
            ExportError::Encoding(err) => write!(f, "report export is not valid UTF-8: {}", err),
            ExportError::Flush(message) => write!(f, "failed to flush report export: {}", message),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Csv(err) => Some(err),
            ExportError::Encoding(err) => Some(err),
            ExportError::Flush(_) => None,
        }
    }
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    #[serde(rename = "Report")]
    id: &'a str,
    #[serde(rename = "Listing")]
    property_id: &'a str,
    #[serde(rename = "Reporter")]
    reporter_id: &'a str,
    #[serde(rename = "Reason")]
    reason: &'static str,
    #[serde(rename = "Status")]
    status: &'static str,
    #[serde(rename = "Decision")]
    decision: &'static str,
    #[serde(rename = "Handled By")]
    handled_by: &'a str,
    #[serde(rename = "Created At")]
    created_at: String,
    #[serde(rename = "Comments")]
    comments: &'a str,
    #[serde(rename = "Admin Notes")]
    admin_notes: &'a str,
}

impl<'a> From<&'a Report> for ReportRow<'a> {
    fn from(report: &'a Report) -> Self {
        Self {
            id: &report.id.0,
            property_id: &report.property_id.0,
            reporter_id: &report.reporter_id.0,
            reason: report.reason.code(),
            status: report.status.label(),
            decision: report.decision.map_or("", |decision| decision.label()),
            handled_by: report
                .handled_by
                .as_ref()
                .map_or("", |admin| admin.0.as_str()),
            created_at: report.created_at.to_rfc3339(),
            comments: &report.comments,
            admin_notes: report.admin_notes.as_deref().unwrap_or_default(),
        }
    }
}

/// Renders the report queue as CSV with a header row, in the order given.
pub fn reports_to_csv(reports: &[Report]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for report in reports {
        writer.serialize(ReportRow::from(report))?;
    }
    if reports.is_empty() {
        writer.write_record([
            "Report",
            "Listing",
            "Reporter",
            "Reason",
            "Status",
            "Decision",
            "Handled By",
            "Created At",
            "Comments",
            "Admin Notes",
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Flush(err.to_string()))?;
    String::from_utf8(bytes).map_err(ExportError::Encoding)
}
