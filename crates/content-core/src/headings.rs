use kuchiki::NodeRef;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

use crate::config::{HeadingThresholds, PipelineConfig};
use crate::dom::{self, Fragment};

static FONT_SIZE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)font-size\s*:\s*(\d+(?:\.\d+)?)\s*(px|pt)\b")
        .expect("FONT_SIZE_RE: hardcoded regex is valid")
});

const INLINE_WRAPPERS: [&str; 7] = ["b", "strong", "u", "em", "i", "span", "font"];

pub fn infer_headings(html: &str) -> String {
    infer_headings_with(html, &PipelineConfig::default())
}

/// Reclassifies paragraphs as `<h1>`-`<h3>` from their visual cues. Each rule
/// is its own pass and sees the output of the previous one.
pub fn infer_headings_with(html: &str, config: &PipelineConfig) -> String {
    dom::rewrite(html, |fragment| {
        let by_size = promote_sized_paragraphs(fragment, &config.headings);
        let by_emphasis = promote_emphasised_paragraphs(fragment);
        let by_caps = promote_caps_paragraphs(fragment, config.caps_min_chars);
        let collapsed = collapse_nested_headings(fragment);
        debug!(by_size, by_emphasis, by_caps, collapsed, "heading inference pass");
        by_size + by_emphasis + by_caps + collapsed
    })
}

fn paragraphs(fragment: &Fragment) -> Vec<NodeRef> {
    fragment
        .elements()
        .into_iter()
        .filter(|node| dom::is_tag(node, &["p"]))
        .collect()
}

fn font_size(style: &str) -> Option<f32> {
    FONT_SIZE_RE
        .captures(style)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f32>().ok())
}

fn promote_sized_paragraphs(fragment: &Fragment, thresholds: &HeadingThresholds) -> usize {
    let mut promoted = 0;
    for p in paragraphs(fragment) {
        let Some(size) = dom::attr(&p, "style").and_then(|style| font_size(&style)) else {
            continue;
        };
        if let Some(level) = thresholds.level_for(size) {
            dom::replace_with(&p, &format!("h{}", level), &p);
            promoted += 1;
        }
    }
    promoted
}

// Bold+underline is tested before plain bold so the h1 case is not taken as h2.
fn promote_emphasised_paragraphs(fragment: &Fragment) -> usize {
    let mut promoted = 0;
    for p in paragraphs(fragment) {
        let Some(bold) = dom::only_element_child(&p).filter(|n| dom::is_tag(n, &["b", "strong"]))
        else {
            continue;
        };
        if dom::node_text(&bold).is_empty() {
            continue;
        }
        match dom::only_element_child(&bold).filter(|n| dom::is_tag(n, &["u"])) {
            Some(underline) => dom::replace_with(&p, "h1", &underline),
            None => dom::replace_with(&p, "h2", &bold),
        };
        promoted += 1;
    }
    promoted
}

fn promote_caps_paragraphs(fragment: &Fragment, min_chars: usize) -> usize {
    let mut promoted = 0;
    for p in paragraphs(fragment) {
        if dom::has_element_children(&p) {
            continue;
        }
        let text = dom::node_text(&p);
        if is_shouting(&text, min_chars) {
            dom::replace_with(&p, "h2", &p);
            promoted += 1;
        }
    }
    promoted
}

fn is_shouting(text: &str, min_chars: usize) -> bool {
    if text.graphemes(true).count() < min_chars {
        return false;
    }
    let mut has_upper = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if !ch.is_uppercase() {
                return false;
            }
            has_upper = true;
        }
    }
    has_upper
}

/// Collapses a heading that wraps (possibly through inline elements) a heading
/// of the same level. One level only.
fn collapse_nested_headings(fragment: &Fragment) -> usize {
    let mut collapsed = 0;
    for heading in fragment.elements() {
        let Some(level) = dom::node_heading_level(&heading) else {
            continue;
        };
        if !dom::is_attached(&heading) {
            continue;
        }
        let mut inner = dom::only_element_child(&heading);
        while let Some(node) = inner.clone() {
            if dom::is_tag(&node, &INLINE_WRAPPERS) {
                inner = dom::only_element_child(&node);
            } else {
                break;
            }
        }
        if let Some(nested) = inner.filter(|n| dom::node_heading_level(n) == Some(level)) {
            dom::unwrap(&nested);
            collapsed += 1;
        }
    }
    collapsed
}
