//! Interactive block editor
//!
//! A line-oriented REPL over [`SyncController`]. Field commands (`text`,
//! `src`, `alt`, `role`, `style`, `align`) act on the active block, chosen
//! with `select N` or set by `add`. Arguments are split shell-style, so
//! quotes keep runs of spaces intact.

use std::io::Write;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use folio_core::styles::{picker_entries, resolve_style, CUSTOM_STYLE_ID};
use folio_core::{BlockField, BlockKind, DocumentStore, ImageAlignment, SyncController};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::docs::describe_blocks;
use super::Globals;

#[derive(Parser, Debug)]
pub struct EditArgs {
    /// Project ID (defaults to the first project)
    #[arg(long, short)]
    pub project: Option<String>,

    /// Document ID to open immediately
    pub document: Option<String>,
}

const HELP: &str = "\
Documents:
  docs                      list documents of the project
  open <id>                 open a document
  new <title>               create an empty document
  refresh                   reload the document list
  close[!]                  close the open document
Document:
  show                      show title, description and blocks
  title <text>              set the title
  desc [text]               set the description
  save                      save to the server
  preview                   print the HTML preview URL
Blocks:
  add text|image            append a block and select it
  select <n>|none           choose the active block
  remove <n>                remove a block
Active block:
  text [text]               text content (text blocks)
  src <url>                 image source (image blocks)
  alt [text]                alt text (image blocks)
  align block|left|right|inline
  styles                    list preset styles for the block
  style <id>                apply a preset (`custom` keeps the role)
  role <name>               set a free-form role
  help                      this text
  quit[!]                   leave the editor
";

/// Whether the REPL keeps reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Editor<S> {
    sync: SyncController<S>,
}

impl<S: DocumentStore> Editor<S> {
    pub fn new(sync: SyncController<S>) -> Self {
        Self { sync }
    }

    pub fn sync(&self) -> &SyncController<S> {
        &self.sync
    }

    pub fn prompt(&self) -> String {
        match self.sync.session().open_document() {
            Some(open) => {
                let dirty = if open.is_dirty() { "*" } else { "" };
                format!("folio:{}{}> ", open.title(), dirty)
            }
            None => "folio> ".to_owned(),
        }
    }

    /// Run one input line. Command failures are printed and do not end the
    /// session; only write errors on `out` propagate.
    pub async fn execute(&mut self, line: &str, out: &mut impl Write) -> Result<Flow> {
        match self.dispatch(line, out).await {
            Ok(flow) => Ok(flow),
            Err(err) => {
                writeln!(out, "error: {:#}", err)?;
                Ok(Flow::Continue)
            }
        }
    }

    async fn dispatch(&mut self, line: &str, out: &mut impl Write) -> Result<Flow> {
        let words = shlex::split(line).ok_or_else(|| anyhow!("unbalanced quotes"))?;
        let Some((command, args)) = words.split_first() else {
            return Ok(Flow::Continue);
        };
        let rest = args.join(" ");

        match command.as_str() {
            "help" | "?" => write!(out, "{}", HELP)?,
            "docs" => self.list_documents(out)?,
            "open" => {
                let id = args.first().context("usage: open <id>")?;
                self.sync.open_document(id).await?;
                self.show(out)?;
            }
            "new" => {
                let document = self.sync.create_document(&rest, None).await?;
                writeln!(out, "created {} ({})", document.title, document.id)?;
            }
            "refresh" => {
                let was_open = self.sync.session().open_document().is_some();
                self.sync.refresh_documents().await?;
                if was_open && self.sync.session().open_document().is_none() {
                    writeln!(out, "document was deleted on the server and has been closed")?;
                }
                self.list_documents(out)?;
            }
            "close" | "close!" => {
                self.ensure_clean(command == "close!")?;
                if self.sync.session_mut().close_document()? {
                    writeln!(out, "closed")?;
                }
            }
            "show" => self.show(out)?,
            "title" => self.sync.session_mut().set_title(&rest)?,
            "desc" => self.sync.session_mut().set_description(&rest)?,
            "save" => {
                let saved = self.sync.save().await?;
                writeln!(out, "saved {} ({} blocks)", saved.title, saved.blocks.len())?;
                if self.sync.session().is_dirty() {
                    writeln!(out, "edits made during the save are still unsaved")?;
                }
            }
            "preview" => match self.sync.preview_url() {
                Some(url) => writeln!(out, "{}", url)?,
                None => bail!("no document open"),
            },
            "add" => {
                let kind: BlockKind = args
                    .first()
                    .context("usage: add text|image")?
                    .parse()
                    .map_err(|e: String| anyhow!(e))?;
                let index = self.sync.session_mut().add_block(kind)?;
                writeln!(out, "added {} block [{}]", kind, index)?;
            }
            "select" => {
                let target = match args.first().map(String::as_str) {
                    Some("none") => None,
                    Some(n) => Some(parse_index(n)?),
                    None => bail!("usage: select <n>|none"),
                };
                match self.sync.session_mut().set_active(target)? {
                    Some(index) => writeln!(out, "block [{}] selected", index)?,
                    None if target.is_some() => bail!("no block at that index"),
                    None => {}
                }
            }
            "remove" => {
                let index = parse_index(args.first().context("usage: remove <n>")?)?;
                if !self.sync.session_mut().remove_block(index)? {
                    bail!("no block at index {}", index);
                }
            }
            "text" => self.edit_field(BlockField::Text(rest), out)?,
            "src" => self.edit_field(BlockField::Src(rest), out)?,
            "alt" => self.edit_field(BlockField::AltText(rest), out)?,
            "role" => self.edit_field(BlockField::Role(rest), out)?,
            "align" => {
                let alignment: ImageAlignment = rest.parse().map_err(|e: String| anyhow!(e))?;
                self.edit_field(BlockField::Alignment(alignment), out)?;
            }
            "styles" => self.list_styles(out)?,
            "style" => self.apply_style(args.first().context("usage: style <id>")?, out)?,
            "quit" | "exit" | "quit!" => {
                self.ensure_clean(command == "quit!")?;
                return Ok(Flow::Quit);
            }
            other => bail!("unknown command '{}' (try `help`)", other),
        }
        Ok(Flow::Continue)
    }

    fn active_index(&self) -> Result<usize> {
        let open = self
            .sync
            .session()
            .open_document()
            .context("no document open")?;
        open.active()
            .context("no active block; choose one with `select <n>`")
    }

    fn active_kind(&self) -> Result<(usize, BlockKind, String)> {
        let index = self.active_index()?;
        let block = self
            .sync
            .session()
            .open_document()
            .and_then(|open| open.blocks().get(index))
            .context("no active block")?;
        Ok((index, block.kind(), block.role().to_owned()))
    }

    fn edit_field(&mut self, field: BlockField, out: &mut impl Write) -> Result<()> {
        let (index, kind, _) = self.active_kind()?;
        if !field.applies_to(kind) {
            writeln!(out, "ignored: field does not apply to {} blocks", kind)?;
            return Ok(());
        }
        self.sync.session_mut().set_field(index, &field)?;
        Ok(())
    }

    fn apply_style(&mut self, choice: &str, out: &mut impl Write) -> Result<()> {
        let (index, kind, _) = self.active_kind()?;
        if choice == CUSTOM_STYLE_ID {
            writeln!(out, "keeping the current role; set one with `role <name>`")?;
            return Ok(());
        }
        if !picker_entries(kind).any(|entry| entry.id == choice) {
            bail!("unknown {} style '{}' (see `styles`)", kind, choice);
        }
        self.sync.session_mut().set_role(index, choice)?;
        Ok(())
    }

    fn list_styles(&self, out: &mut impl Write) -> Result<()> {
        let (_, kind, role) = self.active_kind()?;
        let current = resolve_style(kind, &role).id();
        for entry in picker_entries(kind) {
            let marker = if entry.id == current { '*' } else { ' ' };
            writeln!(out, "{} {:<28} {}", marker, entry.id, entry.label)?;
        }
        if current == CUSTOM_STYLE_ID {
            writeln!(out, "  role: {:?}", role)?;
        }
        Ok(())
    }

    fn ensure_clean(&self, force: bool) -> Result<()> {
        if !force && self.sync.session().is_dirty() {
            bail!("unsaved changes; `save` first or add `!` to discard them");
        }
        Ok(())
    }

    fn list_documents(&self, out: &mut impl Write) -> Result<()> {
        let session = self.sync.session();
        if session.project_id().is_none() {
            bail!("no project selected");
        }
        let documents = session.documents();
        if documents.is_empty() {
            writeln!(out, "(no documents)")?;
        }
        let open_id = session.open_document().map(|o| o.id());
        for document in documents {
            let marker = if Some(document.id.as_str()) == open_id { '*' } else { ' ' };
            writeln!(out, "{} {}  {}", marker, document.id, document.title)?;
        }
        Ok(())
    }

    fn show(&self, out: &mut impl Write) -> Result<()> {
        let session = self.sync.session();
        let open = session.open_document().context("no document open")?;
        writeln!(out, "# {}", open.title())?;
        if !open.description().is_empty() {
            writeln!(out, "{}", open.description())?;
        }
        writeln!(
            out,
            "[{}{}]",
            session.phase(),
            if open.is_dirty() { ", unsaved changes" } else { "" }
        )?;
        write!(out, "{}", describe_blocks(open.blocks(), open.active()))?;
        Ok(())
    }
}

fn parse_index(raw: &str) -> Result<usize> {
    raw.parse()
        .with_context(|| format!("'{}' is not a block index", raw))
}

pub async fn run_edit(args: EditArgs, globals: &Globals) -> Result<()> {
    let mut sync = SyncController::new(globals.store()?);
    sync.load_projects().await.context("Failed to load projects")?;

    if let Some(project) = args.project.as_deref() {
        if sync.session().project_id() != Some(project) {
            sync.select_project(project)
                .await
                .context("Failed to load documents")?;
        }
    }
    if sync.session().project_id().is_none() {
        bail!("No projects yet. Create one with `folio projects create <name>`.");
    }
    if let Some(document) = args.document.as_deref() {
        sync.open_document(document)
            .await
            .context("Failed to open document")?;
    }

    let mut editor = Editor::new(sync);
    let mut stdout = std::io::stdout();
    writeln!(stdout, "Type `help` for commands.")?;
    if editor.sync().session().open_document().is_some() {
        editor.execute("show", &mut stdout).await?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        write!(stdout, "{}", editor.prompt())?;
        stdout.flush()?;
        let Some(line) = lines.next_line().await? else {
            if editor.sync().session().is_dirty() {
                eprintln!("warning: exiting with unsaved changes");
            }
            break;
        };
        if editor.execute(&line, &mut stdout).await? == Flow::Quit {
            break;
        }
    }
    Ok(())
}
