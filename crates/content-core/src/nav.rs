//! Resolution of sidebar targets against the live document.
//!
//! Targets are free text typed by an operator, so resolution degrades step by
//! step: id lookup, then heading text search, then creating the missing
//! section. Everything visible (scrolling, highlighting, opening links,
//! asking the operator) goes through an injected [`NavigationHost`].

use std::time::Duration;

use kuchiki::NodeRef;
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::dom::{self, Fragment};
use crate::sidebar::in_sidebar;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusTarget {
    pub id: Option<String>,
    pub tag: String,
    pub text: String,
}

impl FocusTarget {
    fn from_node(node: &NodeRef) -> Self {
        Self {
            id: dom::attr(node, "id"),
            tag: dom::tag_name(node).unwrap_or_default(),
            text: dom::node_text(node),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomTargetAction {
    CreateSection,
    SearchContent,
    OpenExternal,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    FoundById(FocusTarget),
    FoundByText(FocusTarget),
    Created(FocusTarget),
    OpenedExternal(String),
    NotFound,
    Cancelled,
}

impl Resolution {
    pub fn mutated_document(&self) -> bool {
        matches!(self, Resolution::Created(_))
    }
}

pub trait NavigationHost {
    fn scroll_into_view(&mut self, target: &FocusTarget);
    /// Highlight `target`; the host clears it once `hold` has elapsed.
    fn highlight(&mut self, target: &FocusTarget, hold: Duration);
    fn open_external(&mut self, url: &str);
    fn choose_action(&mut self, target: &str, label: &str) -> CustomTargetAction;
    fn report_not_found(&mut self, query: &str);
}

/// The document as currently shown in the editor.
pub struct LiveDocument {
    fragment: Fragment,
}

impl LiveDocument {
    pub fn parse(html: &str) -> Self {
        Self {
            fragment: Fragment::parse(html),
        }
    }

    pub fn html(&self) -> String {
        self.fragment.to_html()
    }

    pub fn find_by_id(&self, id: &str) -> Option<NodeRef> {
        if id.is_empty() {
            return None;
        }
        self.fragment
            .elements()
            .into_iter()
            .find(|node| dom::attr(node, "id").as_deref() == Some(id))
    }

    /// First heading (outside the sidebar) whose text contains `label`,
    /// ignoring case.
    pub fn find_heading_by_text(&self, label: &str) -> Option<NodeRef> {
        let needle = label.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.fragment.elements().into_iter().find(|node| {
            dom::node_heading_level(node).is_some()
                && !in_sidebar(node)
                && dom::node_text(node).to_lowercase().contains(&needle)
        })
    }

    /// `base` if no element carries it yet, otherwise the first free
    /// `base-2`, `base-3`, ….
    pub fn unused_id(&self, base: &str) -> String {
        if self.find_by_id(base).is_none() {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{}-{}", base, n))
            .find(|candidate| self.find_by_id(candidate).is_none())
            .unwrap_or_else(|| base.to_string())
    }

    /// Appends `<h2 id=…>title</h2><p>placeholder</p>` and returns the heading.
    pub fn append_section(&self, id: &str, title: &str, placeholder: &str) -> NodeRef {
        let heading = dom::new_element("h2", &[("id", id)]);
        heading.append(NodeRef::new_text(title));
        let paragraph = dom::new_element("p", &[]);
        paragraph.append(NodeRef::new_text(placeholder));
        let body = self.fragment.body();
        body.append(heading.clone());
        body.append(paragraph);
        heading
    }
}

pub fn resolve_navigation(
    doc: &LiveDocument,
    host: &mut dyn NavigationHost,
    target: &str,
    label: &str,
) -> Resolution {
    resolve_navigation_with(doc, host, target, label, &PipelineConfig::default())
}

pub fn resolve_navigation_with(
    doc: &LiveDocument,
    host: &mut dyn NavigationHost,
    target: &str,
    label: &str,
    config: &PipelineConfig,
) -> Resolution {
    let target = target.trim();
    let hold = config.highlight_duration();
    let resolution = if let Some(id) = target.strip_prefix('#') {
        resolve_anchor(doc, host, id, label, config)
    } else if target.to_ascii_lowercase().starts_with("http") {
        host.open_external(target);
        Resolution::OpenedExternal(target.to_string())
    } else {
        match host.choose_action(target, label) {
            CustomTargetAction::CreateSection => {
                let id = doc.unused_id(&anchor_id(target, label));
                let heading =
                    doc.append_section(&id, section_title(label, &id), &config.placeholder_text);
                Resolution::Created(focus(host, &heading, hold))
            }
            CustomTargetAction::SearchContent => {
                let query = if label.trim().is_empty() { target } else { label };
                match doc.find_heading_by_text(query) {
                    Some(node) => Resolution::FoundByText(focus(host, &node, hold)),
                    None => {
                        host.report_not_found(query);
                        Resolution::NotFound
                    }
                }
            }
            CustomTargetAction::OpenExternal => {
                host.open_external(target);
                Resolution::OpenedExternal(target.to_string())
            }
            CustomTargetAction::Cancel => Resolution::Cancelled,
        }
    };
    info!(nav_target = target, ?resolution, "navigation resolved");
    resolution
}

fn resolve_anchor(
    doc: &LiveDocument,
    host: &mut dyn NavigationHost,
    id: &str,
    label: &str,
    config: &PipelineConfig,
) -> Resolution {
    let hold = config.highlight_duration();
    if let Some(node) = doc.find_by_id(id) {
        return Resolution::FoundById(focus(host, &node, hold));
    }
    debug!(id, "no element with id, searching heading text");
    if let Some(node) = doc.find_heading_by_text(label) {
        return Resolution::FoundByText(focus(host, &node, hold));
    }
    let id = doc.unused_id(&anchor_id(id, label));
    let heading = doc.append_section(&id, section_title(label, &id), &config.placeholder_text);
    Resolution::Created(focus(host, &heading, hold))
}

fn focus(host: &mut dyn NavigationHost, node: &NodeRef, hold: Duration) -> FocusTarget {
    let target = FocusTarget::from_node(node);
    host.scroll_into_view(&target);
    host.highlight(&target, hold);
    target
}

fn section_title<'a>(label: &'a str, id: &'a str) -> &'a str {
    let label = label.trim();
    if label.is_empty() {
        id
    } else {
        label
    }
}

/// Turns free text into an id: whitespace runs become `-`. Falls back to a
/// slug of the label, then to `section`.
fn anchor_id(raw: &str, label: &str) -> String {
    let slug = |s: &str| s.split_whitespace().collect::<Vec<_>>().join("-");
    let id = slug(raw.trim_start_matches('#'));
    if !id.is_empty() {
        return id;
    }
    let from_label = slug(&label.to_lowercase());
    if from_label.is_empty() {
        "section".to_string()
    } else {
        from_label
    }
}
