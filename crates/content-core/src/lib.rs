pub mod cards;
pub mod config;
pub mod dom;
pub mod error;
pub mod headings;
pub mod nav;
pub mod session;
pub mod sidebar;
pub mod store;
pub mod strip;
pub mod types;

pub use cards::format_cards;
pub use config::{load_config, load_config_from, PipelineConfig};
pub use error::{ContentError, Result};
pub use headings::{infer_headings, infer_headings_with};
pub use nav::{resolve_navigation, resolve_navigation_with, LiveDocument, NavigationHost, Resolution};
pub use session::{BufferSurface, EditingSession, EditorSurface, Notice, Operator, SidebarEdit};
pub use sidebar::{generate_sidebar, generate_sidebar_with, SidebarOutcome};
pub use store::ContentStore;
pub use strip::strip_formatting;
pub use types::{CompanyContent, SidebarEntry, SidebarIcon};
