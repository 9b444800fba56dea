use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use content_core::{
    BufferSurface, CompanyContent, ContentError, ContentStore, EditingSession, PipelineConfig,
};
use tracing::info;

use crate::cli::{ClearArgs, Cli, CompanyCommands, DocumentArgs, NavigateArgs, SidebarArgs};
use crate::terminal::{TerminalHost, TerminalOperator};

type Session = EditingSession<BufferSurface, TerminalOperator>;

/// Settings shared by every subcommand. The pipeline config is only read by
/// commands that transform a document.
pub struct Env {
    config: Option<PathBuf>,
    store: Option<PathBuf>,
}

impl Env {
    pub fn new(cli: &Cli) -> Self {
        Self {
            config: cli.config.clone(),
            store: cli.store.clone(),
        }
    }

    fn config(&self) -> Result<PipelineConfig> {
        match &self.config {
            Some(path) => content_core::load_config_from(path)
                .with_context(|| format!("loading config {}", path.display())),
            None => Ok(content_core::load_config()?),
        }
    }

    fn store(&self) -> Result<ContentStore> {
        match &self.store {
            Some(path) => Ok(ContentStore::at(path.clone())),
            None => ContentStore::open_default().context("locating the content store"),
        }
    }
}

fn read_document(env: &Env, args: &DocumentArgs) -> Result<String> {
    match (&args.company, &args.input) {
        (Some(id), _) => Ok(env.store()?.get(id)?.content),
        (None, Some(path)) => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
        }
        (None, None) => bail!("no input given; pass a file or --company"),
    }
}

fn open_session(env: &Env, args: &DocumentArgs, assume_yes: bool) -> Result<Session> {
    let html = read_document(env, args)?;
    let mut session = EditingSession::new(TerminalOperator { assume_yes }, env.config()?);
    session.attach_editor(BufferSurface::new(html));
    Ok(session)
}

/// Writes the session's document to `--output` (or stdout) and, when
/// `write_back` is set, to the company record named by `--save`.
fn finish(env: &Env, args: &DocumentArgs, mut session: Session, write_back: bool) -> Result<()> {
    let html = session
        .detach_editor()
        .map(BufferSurface::into_html)
        .unwrap_or_default();
    if args.save && write_back {
        if let Some(id) = &args.company {
            let store = env.store()?;
            let mut record = store.get(id)?;
            record.content = html.clone();
            store.save(&record)?;
        }
    }
    match &args.output {
        Some(path) => {
            fs::write(path, &html).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "document written");
        }
        None if !args.save => println!("{}", html),
        None => {}
    }
    Ok(())
}

pub fn transform<F>(env: &Env, args: DocumentArgs, action: F) -> Result<()>
where
    F: FnOnce(&mut Session) -> content_core::Result<()>,
{
    let mut session = open_session(env, &args, false)?;
    action(&mut session)?;
    finish(env, &args, session, true)
}

pub fn pipeline(env: &Env, args: DocumentArgs) -> Result<()> {
    transform(env, args, |session| {
        session.infer_headings()?;
        session.format_cards()?;
        match session.generate_sidebar() {
            Ok(_) | Err(ContentError::NoHeadings) => Ok(()),
            Err(err) => Err(err),
        }
    })
}

pub fn sidebar(env: &Env, args: SidebarArgs) -> Result<()> {
    let mut session = open_session(env, &args.document, false)?;
    session.generate_sidebar()?;
    if args.entries {
        eprintln!("{}", serde_json::to_string_pretty(session.sidebar_items())?);
    }
    finish(env, &args.document, session, true)
}

pub fn navigate(env: &Env, args: NavigateArgs) -> Result<()> {
    let mut session = open_session(env, &args.document, false)?;
    let resolution = session.navigate(&mut TerminalHost, &args.target, &args.label)?;
    let changed = resolution.mutated_document();
    if !changed && args.document.output.is_none() {
        return Ok(());
    }
    finish(env, &args.document, session, changed)
}

pub fn clear(env: &Env, args: ClearArgs) -> Result<()> {
    let mut session = open_session(env, &args.document, args.yes)?;
    let cleared = if args.sidebar {
        session.clear_sidebar()?
    } else {
        session.clear_content()?
    };
    if !cleared {
        info!("clear declined, nothing written");
        return Ok(());
    }
    finish(env, &args.document, session, true)
}

pub fn company(env: &Env, command: CompanyCommands) -> Result<()> {
    let store = env.store()?;
    match command {
        CompanyCommands::Get { id } => {
            println!("{}", store.get(&id)?.content);
        }
        CompanyCommands::List => {
            for record in store.load_all()? {
                println!(
                    "{}\t{}\t{}",
                    record.id,
                    record.name,
                    record.updated_at.as_deref().unwrap_or("-")
                );
            }
        }
        CompanyCommands::Save { id, file, name } => {
            let content = fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let name = match name {
                Some(name) => name,
                None => match store.get(&id) {
                    Ok(existing) => existing.name,
                    Err(ContentError::CompanyNotFound(_)) => id.clone(),
                    Err(err) => return Err(err.into()),
                },
            };
            store.save(&CompanyContent {
                id,
                name,
                content,
                updated_at: None,
            })?;
        }
        CompanyCommands::Remove { id } => {
            if !store.remove(&id)? {
                bail!("company '{}' not found", id);
            }
        }
    }
    Ok(())
}

pub fn show_config(env: &Env) -> Result<()> {
    print!("{}", toml::to_string_pretty(&env.config()?)?);
    Ok(())
}
