use tracing::debug;

use crate::cards::{is_card, LABEL_CLASS};
use crate::dom::{self, Fragment};
use crate::sidebar::remove_sidebars;
use crate::types::CardKind;

const BLOCK_TAGS: [&str; 7] = ["h1", "h2", "h3", "h4", "h5", "h6", "p"];

/// Undoes the card formatter and sidebar generator: card wrappers are
/// unwrapped, sidebar blocks are deleted outright, and the newlines the
/// formatter added are dropped. Documents without any of these come back
/// unchanged.
pub fn strip_formatting(html: &str) -> String {
    dom::rewrite(html, |fragment| {
        let unwrapped = unwrap_cards(fragment);
        let labels = drop_label_classes(fragment);
        let sidebars = remove_sidebars(fragment);
        let changed = unwrapped + labels + sidebars;
        if changed > 0 {
            tidy_whitespace(fragment);
        }
        debug!(unwrapped, labels, sidebars, "format strip pass");
        changed
    })
}

fn unwrap_cards(fragment: &Fragment) -> usize {
    let mut unwrapped = 0;
    for node in fragment.elements() {
        if !dom::is_attached(&node) {
            continue;
        }
        if CardKind::ALL.into_iter().any(|kind| is_card(&node, kind)) {
            dom::unwrap(&node);
            unwrapped += 1;
        }
    }
    unwrapped
}

fn drop_label_classes(fragment: &Fragment) -> usize {
    fragment
        .elements()
        .iter()
        .filter(|node| dom::remove_class(node, LABEL_CLASS))
        .count()
}

// Drops every newline-only text node after a heading or paragraph, including
// ones the author typed; only the element structure is restored exactly.
fn tidy_whitespace(fragment: &Fragment) {
    let texts: Vec<_> = fragment
        .body()
        .descendants()
        .filter(|node| node.as_text().is_some())
        .collect();
    for node in texts {
        let Some(text) = node.as_text().map(|t| t.borrow().clone()) else {
            continue;
        };
        if text.is_empty() || !text.trim().is_empty() {
            continue;
        }
        let after_block = node
            .previous_sibling()
            .is_some_and(|prev| dom::is_tag(&prev, &BLOCK_TAGS));
        if after_block && text.chars().all(|c| c == '\n') {
            node.detach();
        } else if text.matches('\n').count() > 1 {
            if let Some(cell) = node.as_text() {
                *cell.borrow_mut() = "\n".to_string();
            }
        }
    }
}
