use kuchiki::NodeRef;
use tracing::debug;

use crate::config::PipelineConfig;
use crate::dom::{self, Fragment};
use crate::error::{ContentError, Result};
use crate::types::{clamp_level, SidebarEntry};

pub const SIDEBAR_CLASS: &str = "sidebar-nav";
pub const NAV_TARGET_ATTR: &str = "data-nav-target";

const SIDEBAR_STYLE: &str =
    "background:#f8fafc;border:1px solid #e2e8f0;border-radius:8px;padding:16px;margin:0 0 16px 0;";
const INDENT_PX: u32 = 16;

#[derive(Debug, Clone)]
pub struct SidebarOutcome {
    pub html: String,
    pub items: Vec<SidebarEntry>,
}

pub(crate) fn is_sidebar(node: &NodeRef) -> bool {
    dom::has_class(node, SIDEBAR_CLASS)
}

pub(crate) fn in_sidebar(node: &NodeRef) -> bool {
    dom::inside(node, is_sidebar)
}

fn sidebar_headings(fragment: &Fragment) -> Vec<(NodeRef, u8, String)> {
    fragment
        .elements()
        .into_iter()
        .filter(|node| !in_sidebar(node))
        .filter_map(|node| {
            let level = dom::node_heading_level(&node).filter(|lvl| *lvl <= 3)?;
            let text = dom::node_text(&node);
            (!text.is_empty()).then_some((node, level, text))
        })
        .collect()
}

fn anchor_for(heading: &NodeRef, index: usize) -> String {
    dom::attr(heading, "id")
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| format!("heading-{}", index))
}

/// Lists the h1-h3 headings of `html` as sidebar entries without touching the
/// document. Headings lacking an id get the `heading-<index>` they would be
/// assigned by [`generate_sidebar`].
pub fn collect_headings(html: &str) -> Vec<SidebarEntry> {
    let fragment = Fragment::parse(html);
    sidebar_headings(&fragment)
        .into_iter()
        .enumerate()
        .map(|(index, (heading, level, text))| {
            let anchor = anchor_for(&heading, index);
            SidebarEntry::new(index as u32 + 1, text, level, format!("#{}", anchor))
        })
        .collect()
}

pub fn generate_sidebar(html: &str) -> Result<SidebarOutcome> {
    generate_sidebar_with(html, &PipelineConfig::default())
}

/// Builds a navigation block from the document's h1-h3 headings and prepends
/// it. Headings without an id receive `heading-<index>`. Any previous sidebar
/// block is replaced.
pub fn generate_sidebar_with(html: &str, config: &PipelineConfig) -> Result<SidebarOutcome> {
    let fragment = Fragment::parse(html);
    let headings = sidebar_headings(&fragment);
    if headings.is_empty() {
        return Err(ContentError::NoHeadings);
    }
    let mut items = Vec::with_capacity(headings.len());
    for (index, (heading, level, text)) in headings.into_iter().enumerate() {
        let anchor = anchor_for(&heading, index);
        if dom::attr(&heading, "id").as_deref() != Some(anchor.as_str()) {
            dom::set_attr(&heading, "id", &anchor);
        }
        items.push(SidebarEntry::new(
            index as u32 + 1,
            text,
            level,
            format!("#{}", anchor),
        ));
    }
    let removed = remove_sidebars(&fragment);
    fragment
        .body()
        .prepend(sidebar_block(&items, &config.sidebar_title));
    debug!(entries = items.len(), removed, "sidebar generated");
    Ok(SidebarOutcome {
        html: fragment.to_html(),
        items,
    })
}

/// Replaces any sidebar block in `html` with one rendered from `items`.
/// An empty `items` only removes the old block.
pub fn insert_sidebar(html: &str, items: &[SidebarEntry], title: &str) -> String {
    let fragment = Fragment::parse(html);
    let removed = remove_sidebars(&fragment);
    if items.is_empty() && removed == 0 {
        return html.to_string();
    }
    if !items.is_empty() {
        fragment.body().prepend(sidebar_block(items, title));
    }
    fragment.to_html()
}

pub fn render_sidebar(items: &[SidebarEntry], title: &str) -> String {
    let mut out = Vec::new();
    sidebar_block(items, title).serialize(&mut out).ok();
    String::from_utf8_lossy(&out).into_owned()
}

pub(crate) fn remove_sidebars(fragment: &Fragment) -> usize {
    let mut removed = 0;
    for node in fragment.elements() {
        if dom::is_attached(&node) && is_sidebar(&node) {
            node.detach();
            removed += 1;
        }
    }
    removed
}

fn sidebar_block(items: &[SidebarEntry], title: &str) -> NodeRef {
    let block = dom::new_element("div", &[("class", SIDEBAR_CLASS), ("style", SIDEBAR_STYLE)]);
    let heading = dom::new_element(
        "div",
        &[
            ("class", "sidebar-title"),
            ("style", "font-weight:bold;margin-bottom:8px;"),
        ],
    );
    heading.append(NodeRef::new_text(title));
    block.append(heading);

    let list = dom::new_element(
        "ol",
        &[
            ("class", "sidebar-list"),
            ("style", "list-style:none;padding:0;margin:0;"),
        ],
    );
    for item in items {
        list.append(sidebar_row(item));
    }
    block.append(list);
    block
}

fn sidebar_row(item: &SidebarEntry) -> NodeRef {
    let level = clamp_level(item.level);
    let class = format!("sidebar-level-{}", level);
    let style = format!(
        "padding-left:{}px;margin:4px 0;",
        (u32::from(level) - 1) * INDENT_PX
    );
    let row = dom::new_element("li", &[("class", class.as_str()), ("style", style.as_str())]);
    let link = dom::new_element(
        "a",
        &[
            ("href", item.target.as_str()),
            (NAV_TARGET_ATTR, item.target.as_str()),
        ],
    );
    link.append(NodeRef::new_text(format!(
        "{} {}",
        item.icon.glyph(),
        item.text
    )));
    row.append(link);
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SidebarIcon;

    const DOC: &str = "<h1>Overview</h1><p>Intro.</p><h2>Phone Banking</h2><p>Call.</p><h3>Toll free</h3><h4>Fine print</h4>";

    #[test]
    fn one_entry_per_heading_in_document_order() {
        let outcome = generate_sidebar(DOC).unwrap();
        let items = &outcome.items;
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].text, "Overview");
        assert_eq!(items[0].level, 1);
        assert_eq!(items[0].target, "#heading-0");
        assert_eq!(items[0].icon, SidebarIcon::Pin);
        assert_eq!(items[1].text, "Phone Banking");
        assert_eq!(items[1].level, 2);
        assert_eq!(items[1].icon, SidebarIcon::Diamond);
        assert_eq!(items[2].level, 3);
        assert_eq!(items[2].target, "#heading-2");
        assert_eq!(
            items.iter().map(|i| i.id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn block_is_prepended_and_headings_get_anchors() {
        let outcome = generate_sidebar(DOC).unwrap();
        assert!(outcome.html.starts_with(r#"<div class="sidebar-nav""#));
        assert!(outcome.html.contains(r#"<h1 id="heading-0">Overview</h1>"#));
        assert!(outcome.html.contains(r#"<h2 id="heading-1">Phone Banking</h2>"#));
        assert!(outcome.html.contains("<h4>Fine print</h4>"));
        assert!(outcome.html.contains(r##"href="#heading-1""##));
        assert!(outcome.html.contains("🔹 Phone Banking"));
    }

    #[test]
    fn existing_ids_are_kept() {
        let outcome = generate_sidebar(r#"<h2 id="branches">Branches</h2>"#).unwrap();
        assert_eq!(outcome.items[0].target, "#branches");
    }

    #[test]
    fn no_headings_means_nothing_to_generate() {
        assert!(matches!(
            generate_sidebar("<p>No headings at all.</p>"),
            Err(ContentError::NoHeadings)
        ));
    }

    #[test]
    fn regenerating_replaces_the_old_block() {
        let first = generate_sidebar(DOC).unwrap();
        let second = generate_sidebar(&first.html).unwrap();
        assert_eq!(second.html.matches(SIDEBAR_CLASS).count(), 1);
        assert_eq!(second.items, first.items);
    }

    #[test]
    fn collect_headings_leaves_document_alone() {
        let items = collect_headings(DOC);
        assert_eq!(items.len(), 3);
        assert_eq!(items[1].target, "#heading-1");
    }

    #[test]
    fn rows_are_indented_by_level() {
        let items = vec![
            SidebarEntry::new(1, "Top", 1, "#top"),
            SidebarEntry::new(2, "Deep", 3, "#deep"),
        ];
        let html = render_sidebar(&items, "Contents");
        assert!(html.contains(r#"<div class="sidebar-title" style="font-weight:bold;margin-bottom:8px;">Contents</div>"#));
        assert!(html.contains(r#"class="sidebar-level-1" style="padding-left:0px;margin:4px 0;""#));
        assert!(html.contains(r#"class="sidebar-level-3" style="padding-left:32px;margin:4px 0;""#));
        assert!(html.contains(r##"data-nav-target="#deep""##));
    }

    #[test]
    fn insert_with_no_items_removes_block() {
        let generated = generate_sidebar(DOC).unwrap();
        let cleared = insert_sidebar(&generated.html, &[], "Contents");
        assert!(!cleared.contains(SIDEBAR_CLASS));
        let untouched = "<p>plain</p>";
        assert_eq!(insert_sidebar(untouched, &[], "Contents"), untouched);
    }
}
