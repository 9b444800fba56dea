use kuchiki::NodeRef;
use tracing::debug;

use crate::dom::{self, Fragment};
use crate::sidebar::in_sidebar;
use crate::types::CardKind;

pub const LABEL_CLASS: &str = "info-card-label";

const BLOCK_TAGS: [&str; 7] = ["h1", "h2", "h3", "h4", "h5", "h6", "p"];

/// Wraps heading/paragraph pairs, lists, lead-in paragraphs and formula lines
/// in styled card containers. Only adds wrappers; text is never removed.
pub fn format_cards(html: &str) -> String {
    dom::rewrite(html, |fragment| {
        let pairs = wrap_heading_pairs(fragment);
        let collapsed = collapse_nested_content_cards(fragment);
        let lists = wrap_lists(fragment);
        let lead_ins = wrap_lead_ins(fragment);
        let formulas = wrap_formulas(fragment);
        let changed = pairs + collapsed + lists + lead_ins + formulas;
        if changed > 0 {
            space_blocks(fragment);
        }
        debug!(pairs, collapsed, lists, lead_ins, formulas, "card formatting pass");
        changed
    })
}

fn card(kind: CardKind) -> NodeRef {
    dom::new_element(
        "div",
        &[("class", kind.class_name()), ("style", kind.style())],
    )
}

pub(crate) fn is_card(node: &NodeRef, kind: CardKind) -> bool {
    dom::is_tag(node, &["div"]) && dom::has_class(node, kind.class_name())
}

fn in_card(node: &NodeRef, kind: CardKind) -> bool {
    dom::inside(node, |ancestor| is_card(ancestor, kind))
}

fn in_any_card(node: &NodeRef) -> bool {
    dom::inside(node, |ancestor| {
        CardKind::ALL.into_iter().any(|kind| is_card(ancestor, kind))
    })
}

fn candidates(fragment: &Fragment, tags: &[&str]) -> Vec<NodeRef> {
    fragment
        .elements()
        .into_iter()
        .filter(|node| dom::is_tag(node, tags) && !in_sidebar(node))
        .collect()
}

fn wrap_heading_pairs(fragment: &Fragment) -> usize {
    let mut wrapped = 0;
    for heading in candidates(fragment, &["h1", "h2", "h3"]) {
        if !dom::is_attached(&heading) || in_card(&heading, CardKind::Content) {
            continue;
        }
        let Some(paragraph) =
            dom::next_meaningful_sibling(&heading).filter(|n| dom::is_tag(n, &["p"]))
        else {
            continue;
        };
        dom::wrap(&[heading, paragraph], &card(CardKind::Content));
        wrapped += 1;
    }
    wrapped
}

// Fixed depth: a content card directly holding another loses the inner one.
fn collapse_nested_content_cards(fragment: &Fragment) -> usize {
    let mut collapsed = 0;
    for outer in candidates(fragment, &["div"]) {
        if !dom::is_attached(&outer) || !is_card(&outer, CardKind::Content) {
            continue;
        }
        if let Some(inner) =
            dom::only_element_child(&outer).filter(|n| is_card(n, CardKind::Content))
        {
            dom::unwrap(&inner);
            collapsed += 1;
        }
    }
    collapsed
}

fn wrap_lists(fragment: &Fragment) -> usize {
    let mut wrapped = 0;
    for list in candidates(fragment, &["ul"]) {
        if dom::inside(&list, |a| dom::is_tag(a, &["ul", "ol"])) || in_card(&list, CardKind::List)
        {
            continue;
        }
        dom::wrap(&[list], &card(CardKind::List));
        wrapped += 1;
    }
    wrapped
}

fn wrap_lead_ins(fragment: &Fragment) -> usize {
    let mut wrapped = 0;
    for p in candidates(fragment, &["p"]) {
        if in_any_card(&p) {
            continue;
        }
        let children = dom::meaningful_children(&p);
        let Some((label, rest)) = children.split_first() else {
            continue;
        };
        if !dom::is_tag(label, &["strong", "b"]) || dom::node_text(label).is_empty() {
            continue;
        }
        let has_rest = rest
            .iter()
            .any(|node| !node.text_contents().trim().is_empty());
        if !has_rest {
            continue;
        }
        dom::add_class(label, LABEL_CLASS);
        dom::wrap(&[p], &card(CardKind::Info));
        wrapped += 1;
    }
    wrapped
}

// Any `=` counts; prose containing one is wrapped too.
fn wrap_formulas(fragment: &Fragment) -> usize {
    let mut wrapped = 0;
    for p in candidates(fragment, &["p"]) {
        if in_any_card(&p) || !p.text_contents().contains('=') {
            continue;
        }
        dom::wrap(&[p], &card(CardKind::Formula));
        wrapped += 1;
    }
    wrapped
}

fn space_blocks(fragment: &Fragment) {
    for block in candidates(fragment, &BLOCK_TAGS) {
        let followed_by_newline = block
            .next_sibling()
            .and_then(|next| next.as_text().map(|t| t.borrow().starts_with('\n')))
            .unwrap_or(false);
        if !followed_by_newline {
            block.insert_after(NodeRef::new_text("\n"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(kind: CardKind) -> String {
        format!(
            r#"<div class="{}" style="{}">"#,
            kind.class_name(),
            kind.style()
        )
    }

    #[test]
    fn heading_and_paragraph_share_a_content_card() {
        let out = format_cards("<h1>Title</h1><p>Body text.</p>");
        assert_eq!(
            out,
            format!(
                "{}<h1>Title</h1>\n<p>Body text.</p>\n</div>",
                open(CardKind::Content)
            )
        );
    }

    #[test]
    fn lists_get_a_list_card() {
        let out = format_cards("<ul><li>A</li><li>B</li></ul>");
        assert_eq!(
            out,
            format!("{}<ul><li>A</li><li>B</li></ul></div>", open(CardKind::List))
        );
    }

    #[test]
    fn nested_lists_are_wrapped_once() {
        let out = format_cards("<ul><li>A<ul><li>A1</li></ul></li></ul>");
        assert_eq!(out.matches("list-card").count(), 1);
        assert!(out.contains("<ul><li>A1</li></ul>"));
    }

    #[test]
    fn bold_lead_in_gets_info_card_and_label() {
        let out = format_cards("<p><strong>Phone:</strong> 1800 123 456</p>");
        assert_eq!(
            out,
            format!(
                r#"{}<p><strong class="info-card-label">Phone:</strong> 1800 123 456</p>
</div>"#,
                open(CardKind::Info)
            )
        );
    }

    #[test]
    fn equals_sign_gets_formula_card() {
        let out = format_cards("<p>EMI = P x R x (1+R)^N</p>");
        assert!(out.starts_with(&open(CardKind::Formula)));
        assert!(out.contains("<p>EMI = P x R x (1+R)^N</p>"));
    }

    #[test]
    fn paragraph_in_content_card_is_not_wrapped_again() {
        let out = format_cards("<h2>Contact</h2><p><strong>Phone:</strong> 1800 = toll free</p>");
        assert_eq!(out.matches("content-card").count(), 1);
        assert!(!out.contains("info-card"));
        assert!(!out.contains("formula-card"));
    }

    #[test]
    fn second_run_is_a_no_op() {
        let once = format_cards("<h2>A</h2><p>B</p><ul><li>C</li></ul><p>x = y</p>");
        assert_eq!(format_cards(&once), once);
    }

    #[test]
    fn nested_content_cards_collapse_one_level() {
        let html = r#"<div class="content-card"><div class="content-card"><h2>A</h2><p>B</p></div></div>"#;
        assert_eq!(
            format_cards(html),
            "<div class=\"content-card\"><h2>A</h2>\n<p>B</p>\n</div>"
        );
    }

    #[test]
    fn leading_comment_and_style_are_kept() {
        let out = format_cards("<!-- keep --><style>.x{color:red}</style><h1>A</h1><p>b</p>");
        assert!(out.starts_with("<!-- keep --><style>.x{color:red}</style>"));
        assert!(out.contains(&format!("{}<h1>A</h1>", open(CardKind::Content))));
    }

    #[test]
    fn plain_paragraphs_are_returned_verbatim() {
        let html = "<p>Just a sentence.</p>";
        assert_eq!(format_cards(html), html);
    }

    #[test]
    fn sidebar_block_is_never_formatted() {
        let html = r##"<div class="sidebar-nav"><ul><li><a href="#a">A</a></li></ul></div><p>x = 1</p>"##;
        let out = format_cards(html);
        assert!(out.starts_with(r##"<div class="sidebar-nav"><ul><li><a href="#a">A</a></li></ul></div>"##));
        assert!(out.contains("formula-card"));
    }
}
