//! JSON report adapter implementing ReportPort.

use crate::domain::error::SavecastError;
use crate::ports::report_port::{Report, ReportPort};

#[derive(Default)]
pub struct JsonReportAdapter {
    pretty: bool,
}

impl JsonReportAdapter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl ReportPort for JsonReportAdapter {
    fn render(&self, report: &Report) -> Result<String, SavecastError> {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(report)
        } else {
            serde_json::to_string(report)
        };
        rendered.map_err(|e| SavecastError::Io(std::io::Error::other(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::deposit::DepositInput;
    use crate::domain::goal::GoalInput;
    use crate::domain::session::Session;

    #[test]
    fn renders_session_dashboard() {
        let mut session = Session::default();
        session
            .import(
                &[
                    DepositInput::new(100.0, "2025-01-01"),
                    DepositInput::new(100.0, "2025-01-02"),
                ],
                &[GoalInput::new(None, 50.0, "2025-01-01")],
            )
            .unwrap();

        let report = Report::from(session.view());
        let out = JsonReportAdapter::new(false).render(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["revision"], 1);
        assert_eq!(value["headline"], "Savings Forecast");
        assert_eq!(value["forecast"].as_array().unwrap().len(), 362);
        assert_eq!(value["forecast"][0]["date"], "2025-01-01");
        assert_eq!(value["goals"][0]["name"], "Unnamed Goal");
        assert_eq!(value["goals"][0]["status"], "OnTrack");
        assert_eq!(value["series"][1]["total_amount"], 100.0);
    }

    #[test]
    fn empty_session_reports_no_data() {
        let session = Session::default();
        let report = Report::from(session.view());
        let out = JsonReportAdapter::new(true).render(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["headline"], "No Data to Forecast");
        assert!(value["forecast"].as_array().unwrap().is_empty());
        assert!(out.contains('\n'));
    }
}
