use std::time::Duration;

use super::*;
use crate::nav::{CustomTargetAction, FocusTarget};

#[derive(Default)]
struct ScriptedOperator {
    notices: Vec<Notice>,
    prompts: Vec<String>,
    answer: bool,
}

impl Operator for ScriptedOperator {
    fn notify(&mut self, notice: &Notice) {
        self.notices.push(notice.clone());
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        self.prompts.push(prompt.to_string());
        self.answer
    }
}

struct SilentHost;

impl NavigationHost for SilentHost {
    fn scroll_into_view(&mut self, _target: &FocusTarget) {}
    fn highlight(&mut self, _target: &FocusTarget, _hold: Duration) {}
    fn open_external(&mut self, _url: &str) {}
    fn choose_action(&mut self, _target: &str, _label: &str) -> CustomTargetAction {
        CustomTargetAction::Cancel
    }
    fn report_not_found(&mut self, _query: &str) {}
}

fn session(html: &str) -> EditingSession<BufferSurface, ScriptedOperator> {
    let mut session = EditingSession::new(ScriptedOperator::default(), PipelineConfig::default());
    session.attach_editor(BufferSurface::new(html));
    session
}

fn editor_html(session: &EditingSession<BufferSurface, ScriptedOperator>) -> String {
    session.editor().map(|e| e.content()).unwrap_or_default()
}

#[test]
fn missing_editor_is_reported_and_nothing_changes() {
    let mut session: EditingSession<BufferSurface, ScriptedOperator> =
        EditingSession::new(ScriptedOperator::default(), PipelineConfig::default());
    assert!(matches!(
        session.infer_headings(),
        Err(ContentError::EditorNotReady)
    ));
    assert!(matches!(
        session.generate_sidebar(),
        Err(ContentError::EditorNotReady)
    ));
    assert_eq!(session.content(), "");
    assert!(session.sidebar_items().is_empty());
    assert_eq!(
        session.operator().notices[0],
        Notice::Error("Editor not ready".into())
    );
}

#[test]
fn pipeline_actions_write_back_to_the_editor() {
    let mut session = session(r#"<p style="font-size:24px">Title</p><p>Body text.</p>"#);
    session.infer_headings().unwrap();
    assert_eq!(editor_html(&session), "<h1>Title</h1><p>Body text.</p>");
    session.format_cards().unwrap();
    assert!(editor_html(&session).contains("content-card"));
    assert_eq!(session.content(), editor_html(&session));
    session.strip_formatting().unwrap();
    assert_eq!(editor_html(&session), "<h1>Title</h1><p>Body text.</p>");
}

#[test]
fn generate_sidebar_fills_items_and_notifies() {
    let mut session = session("<h1>Overview</h1><h2>Helplines</h2>");
    assert_eq!(session.generate_sidebar().unwrap(), 2);
    assert_eq!(session.sidebar_items().len(), 2);
    assert!(editor_html(&session).starts_with(r#"<div class="sidebar-nav""#));
    assert!(matches!(
        session.operator().notices.last(),
        Some(Notice::Info(msg)) if msg.contains('2')
    ));
}

#[test]
fn zero_headings_warns_without_touching_content() {
    let html = "<p>Nothing to see.</p>";
    let mut session = session(html);
    assert!(matches!(
        session.generate_sidebar(),
        Err(ContentError::NoHeadings)
    ));
    assert_eq!(editor_html(&session), html);
    assert!(matches!(
        session.operator().notices.as_slice(),
        [Notice::Warning(_)]
    ));
}

#[test]
fn strip_clears_sidebar_items() {
    let mut session = session("<h2>Branches</h2><p>Open daily.</p>");
    session.generate_sidebar().unwrap();
    session.strip_formatting().unwrap();
    assert!(session.sidebar_items().is_empty());
    assert!(!editor_html(&session).contains("sidebar-nav"));
}

#[test]
fn manual_entries_get_increasing_ids() {
    let mut session = session("<p>x</p>");
    let first = session.add_sidebar_item("Call us", 1, "#call").unwrap();
    let second = session.add_sidebar_item("Email", 2, "#email").unwrap();
    assert_eq!((first, second), (1, 2));
    session.remove_sidebar_item(first).unwrap();
    assert_eq!(session.add_sidebar_item("Visit", 3, "#visit").unwrap(), 3);
}

#[test]
fn out_of_range_level_is_rejected() {
    let mut session = session("<p>x</p>");
    assert!(matches!(
        session.add_sidebar_item("Deep", 4, "#deep"),
        Err(ContentError::InvalidLevel(4))
    ));
    assert!(session.sidebar_items().is_empty());
    assert_eq!(session.operator().notices.len(), 1);
}

#[test]
fn update_changes_only_given_fields() {
    let mut session = session("<p>x</p>");
    let id = session.add_sidebar_item("Call us", 1, "#call").unwrap();
    session
        .update_sidebar_item(
            id,
            SidebarEdit {
                text: Some("Call us now".into()),
                icon: Some(SidebarIcon::Phone),
                ..SidebarEdit::default()
            },
        )
        .unwrap();
    let item = &session.sidebar_items()[0];
    assert_eq!(item.text, "Call us now");
    assert_eq!(item.icon, SidebarIcon::Phone);
    assert_eq!(item.target, "#call");
    assert_eq!(item.level, 1);

    assert!(matches!(
        session.update_sidebar_item(99, SidebarEdit::default()),
        Err(ContentError::SidebarItemNotFound(99))
    ));
}

#[test]
fn save_sidebar_renders_current_entries() {
    let mut session = session("<h2>Rates</h2><p>Low.</p>");
    session.add_sidebar_item("Rates", 2, "#rates").unwrap();
    session.save_sidebar().unwrap();
    let html = editor_html(&session);
    assert!(html.starts_with(r#"<div class="sidebar-nav""#));
    assert!(html.contains("🔹 Rates"));
    assert!(html.ends_with("<h2>Rates</h2><p>Low.</p>"));
}

#[test]
fn declined_clear_is_a_no_op() {
    let html = "<h1>Keep</h1>";
    let mut session = session(html);
    session.generate_sidebar().unwrap();
    let before = editor_html(&session);

    assert!(!session.clear_content().unwrap());
    assert!(!session.clear_sidebar().unwrap());
    assert_eq!(editor_html(&session), before);
    assert_eq!(session.sidebar_items().len(), 1);
    assert_eq!(session.operator().prompts.len(), 2);
}

#[test]
fn confirmed_clears_apply() {
    let mut session = session("<h1>Gone</h1><p>Soon.</p>");
    session.operator_mut().answer = true;
    session.generate_sidebar().unwrap();

    assert!(session.clear_sidebar().unwrap());
    assert!(session.sidebar_items().is_empty());
    assert!(!editor_html(&session).contains("sidebar-nav"));

    assert!(session.clear_content().unwrap());
    assert_eq!(editor_html(&session), "");
}

#[test]
fn clear_without_editor_does_not_prompt() {
    let mut session: EditingSession<BufferSurface, ScriptedOperator> =
        EditingSession::new(ScriptedOperator::default(), PipelineConfig::default());
    assert!(session.clear_content().is_err());
    assert!(session.operator().prompts.is_empty());
}

#[test]
fn navigation_that_creates_a_section_is_saved() {
    let mut session = session("<h2>Rates</h2>");
    let mut host = SilentHost;
    let found = session.navigate(&mut host, "#nope", "rates").unwrap();
    assert!(matches!(found, Resolution::FoundByText(_)));
    assert_eq!(editor_html(&session), "<h2>Rates</h2>");

    let created = session
        .navigate(&mut host, "#fees", "Fees and Charges")
        .unwrap();
    assert!(created.mutated_document());
    assert!(editor_html(&session).ends_with(
        r#"<h2 id="fees">Fees and Charges</h2><p>Add content for this section here.</p>"#
    ));
}

#[test]
fn load_content_replaces_document_and_entries() {
    let mut session = session("<h1>Old</h1>");
    session.generate_sidebar().unwrap();
    session.load_content("<p>Fresh</p>").unwrap();
    assert_eq!(editor_html(&session), "<p>Fresh</p>");
    assert!(session.sidebar_items().is_empty());
}
