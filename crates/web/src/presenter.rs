//! Whole-page rendering of a session.
//!
//! Every interaction ends with the page being rendered again from the session state, so this
//! is the only place that decides what the user sees. Both detail strategies share the same
//! finding markup; only the surrounding layout differs.

use minijinja::Environment;
use serde::Serialize;
use urinalysis_core::{DetailDisplay, DetailView, Finding, Notice, Record, SessionState};

const PAGE_TEMPLATE: &str = "page.html";

#[derive(Debug, Serialize)]
struct FindingView {
    title: String,
    interpretation: String,
    clinical_significance: String,
    follow_up: String,
}

impl From<&Finding> for FindingView {
    fn from(finding: &Finding) -> Self {
        Self {
            title: finding.title(),
            interpretation: finding.interpretation.clone(),
            clinical_significance: finding.clinical_significance.clone(),
            follow_up: finding.follow_up.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct RecordView {
    id: u32,
    timestamp: String,
    summary: String,
    findings: Vec<FindingView>,
}

#[derive(Debug, Serialize)]
struct PageView<'a> {
    display: DetailDisplay,
    notice: Option<&'a Notice>,
    records: Vec<RecordView>,
    open: Option<RecordView>,
}

/// Renders result pages for one detail strategy.
pub struct Presenter {
    env: Environment<'static>,
    display: DetailDisplay,
}

impl Presenter {
    /// Loads the page template.
    pub fn new(display: DetailDisplay) -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template(PAGE_TEMPLATE, include_str!("../templates/page.html"))?;
        Ok(Self { env, display })
    }

    pub fn display(&self) -> DetailDisplay {
        self.display
    }

    /// Renders the full page for `state`, showing `notice` once if given.
    pub fn render(
        &self,
        state: &SessionState,
        notice: Option<&Notice>,
    ) -> Result<String, minijinja::Error> {
        let store = state.store();
        let records = store
            .records()
            .iter()
            .map(|record| record_view(record, store.findings(record.id()).unwrap_or_default()))
            .collect();

        let open = match (self.display, state.detail()) {
            (DetailDisplay::Modal, DetailView::Open(id)) => store
                .record(id)
                .map(|record| record_view(record, store.findings(id).unwrap_or_default())),
            _ => None,
        };

        let page = PageView {
            display: self.display,
            notice,
            records,
            open,
        };
        self.env.get_template(PAGE_TEMPLATE)?.render(&page)
    }
}

fn record_view(record: &Record, findings: &[Finding]) -> RecordView {
    RecordView {
        id: record.id(),
        timestamp: record.timestamp_text(),
        summary: record.summary().to_string(),
        findings: findings.iter().map(FindingView::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use serde_json::json;
    use urinalysis_core::Summary;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn urobilinogen() -> Finding {
        serde_json::from_value(json!({
            "urobilinogen": "Normal",
            "interpretation": "Within range",
            "clinical_significance": "None",
            "follow_up": "None"
        }))
        .unwrap()
    }

    fn state_with(findings: Vec<Vec<Finding>>) -> SessionState {
        let mut state = SessionState::new();
        for f in findings {
            state.store_mut().append(timestamp(), Summary::Success, f);
        }
        state
    }

    fn finding_blocks(html: &str) -> Vec<String> {
        html.split("<section class=\"finding\">")
            .skip(1)
            .map(|rest| rest.split("</section>").next().unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn empty_store_has_no_results_section() {
        let html = Presenter::new(DetailDisplay::Inline)
            .unwrap()
            .render(&SessionState::new(), None)
            .unwrap();
        assert!(html.contains("Upload an Image"));
        assert!(!html.contains("Analysis Results"));
    }

    #[test]
    fn inline_shows_summary_table_and_expanders() {
        let state = state_with(vec![vec![urobilinogen()]]);
        let html = Presenter::new(DetailDisplay::Inline)
            .unwrap()
            .render(&state, None)
            .unwrap();

        assert!(html.contains("<th>Summary</th>"));
        assert!(html.contains("<td>Success</td>"));
        assert!(html.contains("<td>2024-05-01 09:30:00</td>"));
        assert!(html.contains("<summary>Results for ID 1</summary>"));
        assert!(html.contains("<h3>urobilinogen: Normal</h3>"));
        assert!(html.contains("<strong>Interpretation:</strong> Within range"));
        assert!(!html.contains("View Result"));
    }

    #[test]
    fn record_without_findings_renders_no_expander() {
        let state = state_with(vec![vec![], vec![urobilinogen()]]);
        let html = Presenter::new(DetailDisplay::Inline)
            .unwrap()
            .render(&state, None)
            .unwrap();

        assert!(!html.contains("Results for ID 1"));
        assert!(html.contains("Results for ID 2"));
    }

    #[test]
    fn modal_shows_actions_and_dialog_only_when_open() {
        let mut state = state_with(vec![vec![urobilinogen()]]);
        let presenter = Presenter::new(DetailDisplay::Modal).unwrap();

        let closed = presenter.render(&state, None).unwrap();
        assert!(closed.contains("<th>Action</th>"));
        assert!(!closed.contains("<th>Summary</th>"));
        assert!(closed.contains("View Result"));
        assert!(!closed.contains("role=\"dialog\""));

        state.open_detail(1);
        let open = presenter.render(&state, None).unwrap();
        assert!(open.contains("role=\"dialog\""));
        assert!(open.contains("<h3>urobilinogen: Normal</h3>"));
        assert!(open.contains("action=\"/detail/close\""));
    }

    #[test]
    fn both_strategies_render_identical_findings() {
        let other: Finding = serde_json::from_value(json!({
            "nitrite": "Positive",
            "interpretation": "Bacteria present",
            "clinical_significance": "Possible UTI",
            "follow_up": "Urine culture"
        }))
        .unwrap();
        let mut state = state_with(vec![vec![urobilinogen(), other]]);

        let inline = Presenter::new(DetailDisplay::Inline)
            .unwrap()
            .render(&state, None)
            .unwrap();
        state.open_detail(1);
        let modal = Presenter::new(DetailDisplay::Modal)
            .unwrap()
            .render(&state, None)
            .unwrap();

        let inline_blocks = finding_blocks(&inline);
        assert_eq!(inline_blocks.len(), 2);
        assert_eq!(inline_blocks, finding_blocks(&modal));
        assert!(inline_blocks[0].contains("urobilinogen: Normal"));
        assert!(inline_blocks[1].contains("nitrite: Positive"));
    }

    #[test]
    fn notice_is_rendered_with_its_kind() {
        let html = Presenter::new(DetailDisplay::Inline)
            .unwrap()
            .render(
                &SessionState::new(),
                Some(&Notice::error("Error 400: corrupt image")),
            )
            .unwrap();
        assert!(html.contains("notice-error"));
        assert!(html.contains("Error 400: corrupt image"));
    }

    #[test]
    fn api_text_is_escaped() {
        let finding: Finding = serde_json::from_value(json!({
            "blood": "<b>Trace</b>",
            "interpretation": "<script>alert(1)</script>",
            "clinical_significance": "",
            "follow_up": ""
        }))
        .unwrap();
        let state = state_with(vec![vec![finding]]);
        let html = Presenter::new(DetailDisplay::Inline)
            .unwrap()
            .render(&state, None)
            .unwrap();

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<b>Trace"));
    }
}
