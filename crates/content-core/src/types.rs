use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SidebarIcon {
    Pin,
    Diamond,
    Dot,
    Star,
    Phone,
    Info,
    Link,
}

impl SidebarIcon {
    pub fn for_level(level: u8) -> Self {
        match level {
            1 => SidebarIcon::Pin,
            2 => SidebarIcon::Diamond,
            _ => SidebarIcon::Dot,
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            SidebarIcon::Pin => "📌",
            SidebarIcon::Diamond => "🔹",
            SidebarIcon::Dot => "▪",
            SidebarIcon::Star => "⭐",
            SidebarIcon::Phone => "📞",
            SidebarIcon::Info => "ℹ️",
            SidebarIcon::Link => "🔗",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SidebarEntry {
    pub id: u32,
    pub text: String,
    pub level: u8,
    pub target: String,
    pub icon: SidebarIcon,
}

impl SidebarEntry {
    pub fn new(id: u32, text: impl Into<String>, level: u8, target: impl Into<String>) -> Self {
        let level = clamp_level(level);
        Self {
            id,
            text: text.into(),
            level,
            target: target.into(),
            icon: SidebarIcon::for_level(level),
        }
    }
}

pub(crate) fn clamp_level(level: u8) -> u8 {
    level.clamp(1, 3)
}

/// Styled wrapper containers injected by the card formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardKind {
    Content,
    List,
    Info,
    Formula,
}

impl CardKind {
    pub const ALL: [CardKind; 4] = [
        CardKind::Content,
        CardKind::List,
        CardKind::Info,
        CardKind::Formula,
    ];

    pub fn class_name(self) -> &'static str {
        match self {
            CardKind::Content => "content-card",
            CardKind::List => "list-card",
            CardKind::Info => "info-card",
            CardKind::Formula => "formula-card",
        }
    }

    pub fn style(self) -> &'static str {
        match self {
            CardKind::Content => {
                "background:#ffffff;border:1px solid #e2e8f0;border-radius:8px;padding:16px;margin:12px 0;box-shadow:0 1px 3px rgba(0,0,0,0.08);"
            }
            CardKind::List => {
                "background:#f8fafc;border-left:4px solid #3b82f6;border-radius:4px;padding:12px 16px;margin:12px 0;"
            }
            CardKind::Info => {
                "background:#fffbeb;border:1px solid #fcd34d;border-radius:6px;padding:12px 16px;margin:12px 0;"
            }
            CardKind::Formula => {
                "background:#f1f5f9;font-family:monospace;text-align:center;border-radius:6px;padding:12px;margin:12px 0;"
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompanyContent {
    pub id: String,
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}
