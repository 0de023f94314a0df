//! Document commands: list, create, show, preview

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use folio_core::styles::label_for;
use folio_core::{Block, Document, DocumentStore, NewDocument};

use super::{or_dash, print_json, Globals, OutputFormat};

#[derive(Parser, Debug)]
pub struct DocsArgs {
    #[command(subcommand)]
    pub command: DocsCommands,
}

#[derive(Subcommand, Debug)]
pub enum DocsCommands {
    /// List the documents of a project
    List {
        /// Project ID
        project: String,
    },
    /// Create an empty document in a project
    Create(CreateDocumentArgs),
    /// Show a document and its blocks
    Show {
        /// Project ID
        project: String,
        /// Document ID
        document: String,
    },
    /// Print the HTML preview URL (or the rendered HTML with --html)
    Preview {
        /// Project ID
        project: String,
        /// Document ID
        document: String,
        /// Fetch and print the rendered HTML instead of the URL
        #[arg(long)]
        html: bool,
    },
}

#[derive(Parser, Debug)]
pub struct CreateDocumentArgs {
    /// Project ID
    pub project: String,

    /// Document title (trimmed, 1-200 characters)
    pub title: String,

    /// Optional description
    #[arg(long, short)]
    pub description: Option<String>,
}

pub async fn run_docs(args: DocsArgs, globals: &Globals) -> Result<()> {
    let store = globals.store()?;
    match args.command {
        DocsCommands::List { project } => {
            let documents = store
                .list_documents(&project)
                .await
                .context("Failed to list documents")?;
            match globals.output {
                OutputFormat::Json => print_json(&documents)?,
                OutputFormat::Human => print_documents(&documents),
            }
        }
        DocsCommands::Create(args) => {
            let draft = NewDocument::new(&args.title, args.description.as_deref())?;
            let document = store
                .create_document(&args.project, &draft)
                .await
                .context("Failed to create document")?;
            match globals.output {
                OutputFormat::Json => print_json(&document)?,
                OutputFormat::Human => {
                    println!("Created document {} ({})", document.title, document.id)
                }
            }
        }
        DocsCommands::Show { project, document } => {
            let document = store
                .get_document(&project, &document)
                .await
                .context("Failed to load document")?;
            match globals.output {
                OutputFormat::Json => print_json(&document)?,
                OutputFormat::Human => print!("{}", describe_document(&document)),
            }
        }
        DocsCommands::Preview {
            project,
            document,
            html,
        } => {
            if html {
                let page = store
                    .fetch_html(&project, &document)
                    .await
                    .context("Failed to fetch preview")?;
                print!("{}", page);
            } else if let Some(url) = store.html_url(&project, &document) {
                println!("{}", url);
            }
        }
    }
    Ok(())
}

fn print_documents(documents: &[Document]) {
    if documents.is_empty() {
        println!("No documents in this project.");
        return;
    }
    for document in documents {
        println!(
            "{}  {}  {} block(s)  {}",
            document.id,
            document.title,
            document.blocks.len(),
            or_dash(document.description.as_deref())
        );
    }
}

/// Multi-line listing of a document's header and blocks
pub(crate) fn describe_document(document: &Document) -> String {
    let mut out = format!("# {}\n", document.title);
    if let Some(description) = document.description.as_deref().filter(|d| !d.is_empty()) {
        out.push_str(description);
        out.push('\n');
    }
    out.push_str(&describe_blocks(&document.blocks, None));
    out
}

pub(crate) fn describe_blocks(blocks: &[Block], active: Option<usize>) -> String {
    if blocks.is_empty() {
        return "(no blocks)\n".to_owned();
    }
    blocks
        .iter()
        .enumerate()
        .map(|(i, block)| {
            let marker = if active == Some(i) { '*' } else { ' ' };
            format!(
                "{marker}[{i}] {kind} <{style}> {summary}\n",
                kind = block.kind(),
                style = label_for(block.kind(), block.role()),
                summary = block.summary()
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_blocks_with_labels_and_active_marker() {
        let document = Document {
            id: "d1".into(),
            project_id: "p1".into(),
            title: "Maggid".into(),
            description: None,
            blocks: vec![Block::new_text(), Block::new_image()],
        };
        let out = describe_document(&document);
        assert!(out.starts_with("# Maggid\n"));
        assert!(out.contains("[0] text <Haggadah – Main Hebrew (HE)>"));
        assert!(out.contains("[1] image <Archaeology Figure> (no source)"));

        let marked = describe_blocks(&document.blocks, Some(1));
        assert!(marked.contains("*[1] image"));
        assert!(marked.contains(" [0] text"));
    }

    #[test]
    fn empty_document_says_so() {
        assert_eq!(describe_blocks(&[], None), "(no blocks)\n");
    }
}
