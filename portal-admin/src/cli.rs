use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "portal-admin",
    version,
    about = "Normalize and navigate company contact-page content"
)]
pub struct Cli {
    /// Pipeline config file (defaults to the user config directory).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Company content store (defaults to companies.json in the config directory).
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Promote visually styled paragraphs to headings.
    Headings(DocumentArgs),
    /// Wrap content in styled cards.
    Cards(DocumentArgs),
    /// Generate the table-of-contents sidebar.
    Sidebar(SidebarArgs),
    /// Remove cards and sidebar blocks.
    Strip(DocumentArgs),
    /// Headings, then cards, then sidebar.
    Pipeline(DocumentArgs),
    /// Resolve a sidebar target against the document.
    Navigate(NavigateArgs),
    /// Empty the document, or only its sidebar.
    Clear(ClearArgs),
    #[command(subcommand)]
    Company(CompanyCommands),
    /// Print the effective pipeline config.
    Config,
}

#[derive(Args, Debug, Clone)]
pub struct DocumentArgs {
    /// HTML file to read.
    #[arg(conflicts_with = "company", required_unless_present = "company")]
    pub input: Option<PathBuf>,

    /// Read the content field of a stored company instead of a file.
    #[arg(long)]
    pub company: Option<String>,

    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Write the result back to the company record.
    #[arg(long, default_value_t = false, requires = "company")]
    pub save: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SidebarArgs {
    #[command(flatten)]
    pub document: DocumentArgs,

    /// Print the generated entries as JSON on stderr.
    #[arg(long, default_value_t = false)]
    pub entries: bool,
}

#[derive(Args, Debug, Clone)]
pub struct NavigateArgs {
    #[command(flatten)]
    pub document: DocumentArgs,

    /// `#id`, an http(s) URL, or free text.
    #[arg(long)]
    pub target: String,

    #[arg(long, default_value = "")]
    pub label: String,
}

#[derive(Args, Debug, Clone)]
pub struct ClearArgs {
    #[command(flatten)]
    pub document: DocumentArgs,

    /// Only remove the sidebar block.
    #[arg(long, default_value_t = false)]
    pub sidebar: bool,

    /// Skip the confirmation prompt.
    #[arg(long, short = 'y', default_value_t = false)]
    pub yes: bool,
}

#[derive(Subcommand, Debug)]
pub enum CompanyCommands {
    Get {
        id: String,
    },
    List,
    /// Store an HTML file as a company's content.
    Save {
        id: String,
        file: PathBuf,
        #[arg(long)]
        name: Option<String>,
    },
    Remove {
        id: String,
    },
}
