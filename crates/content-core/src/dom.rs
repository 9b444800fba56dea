//! Thin helpers over the kuchiki tree used by every pipeline stage.
//!
//! Stages parse the editor's HTML as a fragment in a `<body>` context, rewrite
//! nodes in place and serialize the fragment root's children back out.
//! Comments, `<style>`, `<title>` and other head-only markup stay where they
//! were written. A stage that touches nothing hands back the caller's string.

use html5ever::{LocalName, Namespace, QualName};
use kuchiki::{traits::*, Attribute, ExpandedName, NodeRef};

const HTML_NS: &str = "http://www.w3.org/1999/xhtml";

pub struct Fragment {
    // Holds the tree root alive for as long as `body` is used.
    _document: NodeRef,
    body: NodeRef,
}

impl Fragment {
    pub fn parse(html: &str) -> Self {
        let context = QualName::new(None, Namespace::from(HTML_NS), LocalName::from("body"));
        let document = kuchiki::parse_fragment(context, Vec::new()).one(html.to_string());
        // Fragment parsing puts every node under a single `<html>` root.
        let body = document
            .children()
            .find(|child| child.as_element().is_some())
            .unwrap_or_else(|| document.clone());
        Self {
            _document: document,
            body,
        }
    }

    /// Container of the fragment's top-level nodes.
    pub fn body(&self) -> &NodeRef {
        &self.body
    }

    pub fn to_html(&self) -> String {
        let mut out = Vec::new();
        for child in self.body.children() {
            child.serialize(&mut out).ok();
        }
        String::from_utf8_lossy(&out).into_owned()
    }

    /// Snapshot of every element under the body, in document order.
    pub fn elements(&self) -> Vec<NodeRef> {
        elements_under(&self.body)
    }
}

/// Runs `pass` over a freshly parsed fragment. `pass` returns how many nodes
/// it rewrote; zero means the input string is returned as-is.
pub(crate) fn rewrite<F>(html: &str, pass: F) -> String
where
    F: FnOnce(&Fragment) -> usize,
{
    let fragment = Fragment::parse(html);
    if pass(&fragment) == 0 {
        html.to_string()
    } else {
        fragment.to_html()
    }
}

pub fn elements_under(root: &NodeRef) -> Vec<NodeRef> {
    root.descendants()
        .filter(|n| n.as_element().is_some())
        .collect()
}

pub fn tag_name(node: &NodeRef) -> Option<String> {
    node.as_element().map(|el| el.name.local.to_lowercase())
}

pub fn is_tag(node: &NodeRef, tags: &[&str]) -> bool {
    tag_name(node).is_some_and(|tag| tags.contains(&tag.as_str()))
}

pub fn heading_level(tag: &str) -> Option<u8> {
    (tag.len() == 2 && tag.starts_with('h'))
        .then(|| tag[1..].parse::<u8>().ok())
        .flatten()
        .filter(|lvl| (1..=6).contains(lvl))
}

pub fn node_heading_level(node: &NodeRef) -> Option<u8> {
    tag_name(node).and_then(|tag| heading_level(&tag))
}

pub fn new_element(tag: &str, attrs: &[(&str, &str)]) -> NodeRef {
    NodeRef::new_element(
        QualName::new(None, Namespace::from(HTML_NS), LocalName::from(tag)),
        attrs.iter().map(|(name, value)| {
            (
                ExpandedName::new("", *name),
                Attribute {
                    prefix: None,
                    value: value.to_string(),
                },
            )
        }),
    )
}

pub fn attr(node: &NodeRef, name: &str) -> Option<String> {
    let el = node.as_element()?;
    let attrs = el.attributes.borrow();
    attrs.get(name).map(|s| s.to_string())
}

pub fn set_attr(node: &NodeRef, name: &str, value: &str) {
    if let Some(el) = node.as_element() {
        el.attributes.borrow_mut().insert(name, value.to_string());
    }
}

pub fn has_class(node: &NodeRef, class: &str) -> bool {
    attr(node, "class").is_some_and(|value| attr_has_token(&value, class))
}

pub fn attr_has_token(value: &str, needle: &str) -> bool {
    value
        .split_whitespace()
        .any(|token| token.eq_ignore_ascii_case(needle))
}

pub fn add_class(node: &NodeRef, class: &str) {
    let current = attr(node, "class").unwrap_or_default();
    if attr_has_token(&current, class) {
        return;
    }
    let value = if current.trim().is_empty() {
        class.to_string()
    } else {
        format!("{} {}", current.trim(), class)
    };
    set_attr(node, "class", &value);
}

/// Removes one class token; drops the attribute entirely once it is empty.
pub fn remove_class(node: &NodeRef, class: &str) -> bool {
    let Some(el) = node.as_element() else {
        return false;
    };
    let mut attrs = el.attributes.borrow_mut();
    let Some(current) = attrs.get("class").map(|s| s.to_string()) else {
        return false;
    };
    if !attr_has_token(&current, class) {
        return false;
    }
    let remaining: Vec<&str> = current
        .split_whitespace()
        .filter(|token| !token.eq_ignore_ascii_case(class))
        .collect();
    if remaining.is_empty() {
        attrs.remove("class");
    } else {
        attrs.insert("class", remaining.join(" "));
    }
    true
}

pub fn is_blank_text(node: &NodeRef) -> bool {
    node.as_text()
        .is_some_and(|text| text.borrow().trim().is_empty())
}

/// Children that carry content: elements and non-blank text.
pub fn meaningful_children(node: &NodeRef) -> Vec<NodeRef> {
    node.children()
        .filter(|child| {
            if child.as_element().is_some() {
                return true;
            }
            child
                .as_text()
                .is_some_and(|text| !text.borrow().trim().is_empty())
        })
        .collect()
}

/// The sole meaningful child of `node`, if it is an element.
pub fn only_element_child(node: &NodeRef) -> Option<NodeRef> {
    let children = meaningful_children(node);
    match children.as_slice() {
        [single] if single.as_element().is_some() => Some(single.clone()),
        _ => None,
    }
}

/// Next sibling that is not whitespace or a comment.
pub fn next_meaningful_sibling(node: &NodeRef) -> Option<NodeRef> {
    node.following_siblings()
        .find(|sib| sib.as_comment().is_none() && !is_blank_text(sib))
}

pub fn has_element_children(node: &NodeRef) -> bool {
    node.children().any(|child| child.as_element().is_some())
}

pub fn move_children(from: &NodeRef, to: &NodeRef) {
    let children: Vec<NodeRef> = from.children().collect();
    for child in children {
        to.append(child);
    }
}

/// Swaps `node` for a new attribute-less `tag` element holding the children
/// of `content_source`.
pub fn replace_with(node: &NodeRef, tag: &str, content_source: &NodeRef) -> NodeRef {
    let replacement = new_element(tag, &[]);
    move_children(content_source, &replacement);
    node.insert_before(replacement.clone());
    node.detach();
    replacement
}

/// Moves the children of `node` into its place and drops the node.
pub fn unwrap(node: &NodeRef) {
    let children: Vec<NodeRef> = node.children().collect();
    for child in children {
        node.insert_before(child);
    }
    node.detach();
}

/// Wraps `nodes` (siblings, in order) in `wrapper`, placed where the first was.
pub fn wrap(nodes: &[NodeRef], wrapper: &NodeRef) {
    let Some(first) = nodes.first() else {
        return;
    };
    first.insert_before(wrapper.clone());
    for node in nodes {
        wrapper.append(node.clone());
    }
}

pub fn is_attached(node: &NodeRef) -> bool {
    node.parent().is_some()
}

pub fn inside(node: &NodeRef, pred: impl Fn(&NodeRef) -> bool) -> bool {
    node.ancestors().any(|ancestor| pred(&ancestor))
}

pub fn normalize_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_space = false;
    for ch in raw.chars() {
        if ch.is_whitespace() {
            if !last_space {
                out.push(' ');
            }
            last_space = true;
        } else {
            out.push(ch);
            last_space = false;
        }
    }
    out.trim().to_string()
}

pub fn node_text(node: &NodeRef) -> String {
    normalize_text(&node.text_contents())
}
