//! Directory management CLI commands.

use std::sync::Arc;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use docwiki_core::error::{AppError, ErrorKind};
use docwiki_core::types::PageRequest;
use docwiki_database::repositories::PostgresDirectoryStore;
use docwiki_entity::directory::{
    Directory, DirectoryFilter, DirectoryNode, DirectorySort, ParentFilter, UpdateDirectory,
};
use docwiki_service::{CreateDirectoryRequest, DirectoryService, TreeService};

/// Arguments for directory commands
#[derive(Debug, Args)]
pub struct DirectoryArgs {
    /// Directory subcommand
    #[command(subcommand)]
    pub command: DirectoryCommand,
}

/// Directory subcommands
#[derive(Debug, Subcommand)]
pub enum DirectoryCommand {
    /// List directories
    List {
        /// Only direct children of this directory
        #[arg(short, long, conflicts_with = "roots")]
        parent: Option<i64>,
        /// Only root-level directories
        #[arg(long)]
        roots: bool,
        /// Filter by name substring
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Show the whole directory tree
    Tree,
    /// Create a new directory
    Create {
        /// Directory name
        #[arg(short, long)]
        name: String,
        /// Parent directory ID (omit for root level)
        #[arg(short, long)]
        parent: Option<i64>,
        /// Description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Rename a directory (descendant paths follow)
    Rename {
        /// Directory ID
        id: i64,
        /// New name
        name: String,
    },
    /// Move a directory under a new parent
    Move {
        /// Directory ID
        id: i64,
        /// Target parent ID (omit to move to root level)
        #[arg(short, long)]
        parent: Option<i64>,
    },
    /// Delete an empty directory
    Delete {
        /// Directory ID
        id: i64,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Reorder siblings: IDs receive their list position as sort order
    Reorder {
        /// Parent directory ID (omit for root level)
        #[arg(short, long)]
        parent: Option<i64>,
        /// Directory IDs in the desired order
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    /// Show tree statistics
    Stats,
}

/// Directory display row
#[derive(Debug, Serialize, Tabled)]
struct DirectoryRow {
    /// Directory ID
    id: i64,
    /// Name
    name: String,
    /// Path
    path: String,
    /// Sort order
    sort_order: i32,
    /// Created at
    created_at: String,
}

impl From<&Directory> for DirectoryRow {
    fn from(dir: &Directory) -> Self {
        Self {
            id: dir.id,
            name: dir.name.clone(),
            path: dir.path.clone(),
            sort_order: dir.sort_order,
            created_at: dir.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Execute directory commands
pub async fn execute(
    args: &DirectoryArgs,
    env: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let pool = super::create_db_pool(&config).await?;
    let store = Arc::new(PostgresDirectoryStore::new(pool));
    let service = DirectoryService::new(store.clone());
    let tree_service = TreeService::new(store);

    match &args.command {
        DirectoryCommand::List {
            parent,
            roots,
            name,
        } => {
            let filter = DirectoryFilter {
                parent: match (parent, roots) {
                    (Some(id), _) => ParentFilter::Directory(*id),
                    (None, true) => ParentFilter::Root,
                    (None, false) => ParentFilter::Any,
                },
                name: name.clone(),
                path_prefix: None,
            };
            let page = service
                .list(&filter, &DirectorySort::default(), &PageRequest::default())
                .await?;

            let rows: Vec<DirectoryRow> = page.items.iter().map(DirectoryRow::from).collect();
            output::print_list(&rows, format);
            if page.total_pages > 1 {
                println!("(page 1 of {}, {} total)", page.total_pages, page.total_items);
            }
        }
        DirectoryCommand::Tree => {
            let forest = tree_service.tree().await?;
            println!("/");
            for node in &forest {
                print_node(node, 1);
            }
        }
        DirectoryCommand::Create {
            name,
            parent,
            description,
        } => {
            let directory = service
                .create(CreateDirectoryRequest {
                    parent_id: *parent,
                    name: name.clone(),
                    description: description.clone(),
                    sort_order: None,
                })
                .await?;
            output::print_success(&format!(
                "Directory '{}' created at {} (id: {})",
                directory.name, directory.path, directory.id
            ));
        }
        DirectoryCommand::Rename { id, name } => {
            let directory = service
                .update(
                    *id,
                    UpdateDirectory {
                        name: Some(name.clone()),
                        ..Default::default()
                    },
                )
                .await?;
            output::print_success(&format!("Directory {} renamed to {}", id, directory.path));
        }
        DirectoryCommand::Move { id, parent } => {
            let outcome = service.move_directory(*id, *parent, None).await?;
            output::print_success(&format!(
                "Directory {} moved to {}",
                id, outcome.directory.path
            ));
            for change in &outcome.changes {
                println!("  {} -> {}", change.old_path, change.new_path);
            }
        }
        DirectoryCommand::Delete { id, yes } => {
            if !yes {
                let status = service.delete_status(*id).await?;
                for warning in &status.warnings {
                    output::print_warning(warning);
                }
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!("Delete directory {id}?"))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;
                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            match service.delete(*id).await {
                Ok(()) => output::print_success(&format!("Directory {id} deleted")),
                Err(e) if e.kind == ErrorKind::NotEmpty => {
                    if let Some(warnings) = e
                        .details
                        .as_ref()
                        .and_then(|d| d.get("warnings"))
                        .and_then(|w| w.as_array())
                    {
                        for warning in warnings {
                            if let Some(text) = warning.as_str() {
                                output::print_warning(text);
                            }
                        }
                    }
                    return Err(e);
                }
                Err(e) => return Err(e),
            }
        }
        DirectoryCommand::Reorder { parent, ids } => {
            service.reorder(*parent, ids).await?;
            output::print_success(&format!("Reordered {} sibling(s)", ids.len()));
        }
        DirectoryCommand::Stats => {
            let stats = service.stats().await?;
            match format {
                OutputFormat::Table => {
                    println!("Directory tree statistics");
                    output::print_kv("Total directories", &stats.total_directories.to_string());
                    output::print_kv("Root directories", &stats.root_directories.to_string());
                    output::print_kv("Max depth", &stats.max_depth.to_string());
                    output::print_kv("Total documents", &stats.total_documents.to_string());
                }
                OutputFormat::Json => output::print_item(&stats, format),
            }
        }
    }

    Ok(())
}

/// Print a tree node with two-space indentation per level.
fn print_node(node: &DirectoryNode, depth: usize) {
    let indent = "  ".repeat(depth);
    println!(
        "{}├── {}/ ({} docs)",
        indent, node.name, node.total_document_count
    );
    for child in &node.children {
        print_node(child, depth + 1);
    }
}
