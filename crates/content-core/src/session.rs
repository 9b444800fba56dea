//! The editing session: one operator, one editor surface, and the sidebar
//! entries being authored for the document on that surface.

use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::error::{ContentError, Result};
use crate::nav::{resolve_navigation_with, LiveDocument, NavigationHost, Resolution};
use crate::types::{SidebarEntry, SidebarIcon};
use crate::{cards, headings, sidebar, strip};

/// The rich-text surface the session edits. Anything that can hand out and
/// accept an HTML string qualifies.
pub trait EditorSurface {
    fn content(&self) -> String;
    fn set_content(&mut self, html: String);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Warning(String),
    Error(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Info(msg) | Notice::Warning(msg) | Notice::Error(msg) => msg,
        }
    }
}

/// The person driving the session. Notifications are blocking from the
/// session's point of view.
pub trait Operator {
    fn notify(&mut self, notice: &Notice);
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// In-memory editor surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferSurface {
    html: String,
}

impl BufferSurface {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn into_html(self) -> String {
        self.html
    }
}

impl EditorSurface for BufferSurface {
    fn content(&self) -> String {
        self.html.clone()
    }

    fn set_content(&mut self, html: String) {
        self.html = html;
    }
}

/// Field changes for [`EditingSession::update_sidebar_item`]; `None` keeps
/// the current value.
#[derive(Debug, Clone, Default)]
pub struct SidebarEdit {
    pub text: Option<String>,
    pub level: Option<u8>,
    pub target: Option<String>,
    pub icon: Option<SidebarIcon>,
}

pub struct EditingSession<E, O> {
    editor: Option<E>,
    operator: O,
    config: PipelineConfig,
    content: String,
    sidebar_items: Vec<SidebarEntry>,
}

impl<E: EditorSurface, O: Operator> EditingSession<E, O> {
    pub fn new(operator: O, config: PipelineConfig) -> Self {
        Self {
            editor: None,
            operator,
            config,
            content: String::new(),
            sidebar_items: Vec::new(),
        }
    }

    pub fn attach_editor(&mut self, editor: E) {
        self.content = editor.content();
        self.editor = Some(editor);
    }

    pub fn detach_editor(&mut self) -> Option<E> {
        self.editor.take()
    }

    pub fn editor(&self) -> Option<&E> {
        self.editor.as_ref()
    }

    pub fn operator(&self) -> &O {
        &self.operator
    }

    pub fn operator_mut(&mut self) -> &mut O {
        &mut self.operator
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Content as of the last completed action.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn sidebar_items(&self) -> &[SidebarEntry] {
        &self.sidebar_items
    }

    /// Puts stored content on the editor, e.g. a company record's field.
    /// Sidebar entries from a previous document are discarded.
    pub fn load_content(&mut self, html: impl Into<String>) -> Result<()> {
        let html = html.into();
        self.apply("load_content", move |_, _| Ok(html))?;
        self.sidebar_items.clear();
        Ok(())
    }

    pub fn infer_headings(&mut self) -> Result<()> {
        self.apply("infer_headings", |html, config| {
            Ok(headings::infer_headings_with(html, config))
        })
        .map(drop)
    }

    pub fn format_cards(&mut self) -> Result<()> {
        self.apply("format_cards", |html, _| Ok(cards::format_cards(html)))
            .map(drop)
    }

    /// Regenerates the sidebar from the document headings and returns the
    /// number of entries.
    pub fn generate_sidebar(&mut self) -> Result<usize> {
        let mut items = Vec::new();
        self.apply("generate_sidebar", |html, config| {
            let outcome = sidebar::generate_sidebar_with(html, config)?;
            items = outcome.items;
            Ok(outcome.html)
        })?;
        let count = items.len();
        self.sidebar_items = items;
        self.operator.notify(&Notice::Info(format!(
            "Sidebar generated with {} entries",
            count
        )));
        Ok(count)
    }

    pub fn strip_formatting(&mut self) -> Result<()> {
        self.apply("strip_formatting", |html, _| {
            Ok(strip::strip_formatting(html))
        })?;
        self.sidebar_items.clear();
        Ok(())
    }

    /// Appends a manual entry and returns its id.
    pub fn add_sidebar_item(
        &mut self,
        text: impl Into<String>,
        level: u8,
        target: impl Into<String>,
    ) -> Result<u32> {
        self.check_level(level)?;
        let id = self
            .sidebar_items
            .iter()
            .map(|item| item.id)
            .max()
            .unwrap_or(0)
            + 1;
        self.sidebar_items
            .push(SidebarEntry::new(id, text, level, target));
        info!(id, level, "sidebar entry added");
        Ok(id)
    }

    pub fn update_sidebar_item(&mut self, id: u32, edit: SidebarEdit) -> Result<()> {
        if let Some(level) = edit.level {
            self.check_level(level)?;
        }
        let Some(item) = self.sidebar_items.iter_mut().find(|item| item.id == id) else {
            return Err(self.fail(ContentError::SidebarItemNotFound(id)));
        };
        if let Some(text) = edit.text {
            item.text = text;
        }
        if let Some(level) = edit.level {
            item.level = level;
        }
        if let Some(target) = edit.target {
            item.target = target;
        }
        if let Some(icon) = edit.icon {
            item.icon = icon;
        }
        info!(id, "sidebar entry updated");
        Ok(())
    }

    pub fn remove_sidebar_item(&mut self, id: u32) -> Result<SidebarEntry> {
        match self.sidebar_items.iter().position(|item| item.id == id) {
            Some(index) => {
                info!(id, "sidebar entry removed");
                Ok(self.sidebar_items.remove(index))
            }
            None => Err(self.fail(ContentError::SidebarItemNotFound(id))),
        }
    }

    /// Writes the current entries into the document as its sidebar block.
    pub fn save_sidebar(&mut self) -> Result<()> {
        let items = self.sidebar_items.clone();
        self.apply("save_sidebar", |html, config| {
            Ok(sidebar::insert_sidebar(html, &items, &config.sidebar_title))
        })?;
        self.operator.notify(&Notice::Info("Sidebar saved".to_string()));
        Ok(())
    }

    /// Drops every sidebar entry and the rendered block. Returns `false` when
    /// the operator declines.
    pub fn clear_sidebar(&mut self) -> Result<bool> {
        self.ensure_editor()?;
        if !self.operator.confirm("Remove all sidebar entries?") {
            return Ok(false);
        }
        self.apply("clear_sidebar", |html, config| {
            Ok(sidebar::insert_sidebar(html, &[], &config.sidebar_title))
        })?;
        self.sidebar_items.clear();
        Ok(true)
    }

    /// Empties the document. Returns `false` when the operator declines.
    pub fn clear_content(&mut self) -> Result<bool> {
        self.ensure_editor()?;
        if !self
            .operator
            .confirm("Clear all content? This cannot be undone.")
        {
            return Ok(false);
        }
        self.apply("clear_content", |_, _| Ok(String::new()))?;
        self.sidebar_items.clear();
        Ok(true)
    }

    /// Follows a sidebar target in the editor's document. A created section is
    /// written back to the editor.
    pub fn navigate(
        &mut self,
        host: &mut dyn NavigationHost,
        target: &str,
        label: &str,
    ) -> Result<Resolution> {
        let mut resolution = Resolution::Cancelled;
        self.apply("navigate", |html, config| {
            let doc = LiveDocument::parse(html);
            resolution = resolve_navigation_with(&doc, host, target, label, config);
            Ok(if resolution.mutated_document() {
                doc.html()
            } else {
                html.to_string()
            })
        })?;
        Ok(resolution)
    }

    fn ensure_editor(&mut self) -> Result<()> {
        if self.editor.is_none() {
            return Err(self.fail(ContentError::EditorNotReady));
        }
        Ok(())
    }

    fn check_level(&mut self, level: u8) -> Result<()> {
        if (1..=3).contains(&level) {
            Ok(())
        } else {
            Err(self.fail(ContentError::InvalidLevel(level)))
        }
    }

    /// Runs `transform` over the editor content and writes the result back.
    /// Nothing is touched when the editor is missing or the transform fails.
    fn apply<F>(&mut self, action: &'static str, transform: F) -> Result<String>
    where
        F: FnOnce(&str, &PipelineConfig) -> Result<String>,
    {
        let Some(editor) = self.editor.as_mut() else {
            return Err(self.fail(ContentError::EditorNotReady));
        };
        let current = editor.content();
        match transform(&current, &self.config) {
            Ok(html) => {
                let changed = html != current;
                if changed {
                    editor.set_content(html.clone());
                }
                self.content = html.clone();
                info!(action, changed, "editor action applied");
                Ok(html)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    fn fail(&mut self, err: ContentError) -> ContentError {
        warn!(error = %err, "editor action failed");
        let notice = match err {
            ContentError::NoHeadings => Notice::Warning(err.to_string()),
            _ => Notice::Error(err.to_string()),
        };
        self.operator.notify(&notice);
        err
    }
}

#[cfg(test)]
mod tests;
