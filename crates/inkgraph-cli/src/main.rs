//! inkgraph command-line tool.
//!
//! Provides the `inkgraph` binary for maintaining a data root offline:
//! attaching and removing node images, replacing the document, listing
//! backups and cleaning duplicates. It drives the same
//! `inkgraph_storage::AssetLibrary` as the HTTP server, so both entry
//! points produce identical files.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use serde_json::json;

use inkgraph_core::NodeId;
use inkgraph_storage::layout::DEFAULT_IMAGE_EXTENSION;
use inkgraph_storage::{
    AssetLibrary, FileDocumentStore, StorageError, StorageLayout, UploadOutcome,
};

/// Graph document and node image maintenance.
#[derive(Parser)]
#[command(name = "inkgraph", about = "Graph document and node image maintenance")]
struct Cli {
    /// Data root holding data.json, images/ and backups/.
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Extension given to newly stored images.
    #[arg(long, default_value = DEFAULT_IMAGE_EXTENSION)]
    ext: String,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Attach an image file to a node.
    Upload {
        /// Node to attach the image to.
        #[arg(short, long)]
        node: i64,

        /// Image file to store.
        file: PathBuf,
    },

    /// Detach an image from a node and delete its file.
    Delete {
        /// Node listing the image.
        #[arg(short, long)]
        node: i64,

        /// Image reference, e.g. images/1_0.png.
        reference: String,
    },

    /// Replace the document with the contents of a JSON file.
    Replace {
        /// New document.
        file: PathBuf,
    },

    /// List document backups, oldest first.
    Backups,

    /// Report duplicate links and nodes.
    Audit,

    /// Remove duplicate links.
    DedupeLinks,

    /// Merge nodes sharing a name.
    MergeNodes,
}

fn main() {
    let cli = Cli::parse();

    let layout = match StorageLayout::new(&cli.root).with_image_extension(&cli.ext) {
        Ok(layout) => layout,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    let documents = FileDocumentStore::new(layout.document_path());
    let mut library = AssetLibrary::new(documents, layout);

    let result = match cli.command {
        Commands::Upload { node, file } => run_upload(&mut library, NodeId(node), file),
        Commands::Delete { node, reference } => {
            run_delete(&mut library, NodeId(node), &reference)
        }
        Commands::Replace { file } => run_replace(&mut library, file),
        Commands::Backups => library
            .backups()
            .list()
            .map(|backups| (json!({ "backups": backups }), 0)),
        Commands::Audit => library.audit_duplicates().map(|report| {
            let code = if report.is_clean() { 0 } else { 1 };
            (json!({ "clean": report.is_clean(), "report": report }), code)
        }),
        Commands::DedupeLinks => library
            .remove_duplicate_links()
            .map(|removed| (json!({ "removed": removed }), 0)),
        Commands::MergeNodes => library
            .merge_duplicate_nodes()
            .map(|removed| (json!({ "removed": removed }), 0)),
    };

    let exit_code = match result {
        Ok((output, code)) => {
            print_json(&output);
            code
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_code_for(&e)
        }
    };
    process::exit(exit_code);
}

type CommandResult = Result<(serde_json::Value, i32), StorageError>;

/// Execute the upload subcommand.
///
/// A duplicate of an existing image of the node exits with 1.
fn run_upload(
    library: &mut AssetLibrary<FileDocumentStore>,
    node: NodeId,
    file: PathBuf,
) -> CommandResult {
    let bytes = std::fs::read(&file).map_err(|e| StorageError::io(&file, e))?;
    if bytes.is_empty() {
        return Err(StorageError::MalformedRequest(format!(
            "{} is empty",
            file.display()
        )));
    }
    match library.upload_image(node, &bytes)? {
        UploadOutcome::Stored { reference } => {
            Ok((json!({ "status": "stored", "reference": reference.as_str() }), 0))
        }
        UploadOutcome::Duplicate { existing } => {
            Ok((json!({ "status": "duplicate", "existing": existing.as_str() }), 1))
        }
    }
}

fn run_delete(
    library: &mut AssetLibrary<FileDocumentStore>,
    node: NodeId,
    reference: &str,
) -> CommandResult {
    let outcome = library.delete_image(node, reference)?;
    Ok((
        json!({
            "node_found": outcome.node_found,
            "removed_from_node": outcome.removed_from_node,
            "file_removed": outcome.file_removed,
        }),
        0,
    ))
}

fn run_replace(library: &mut AssetLibrary<FileDocumentStore>, file: PathBuf) -> CommandResult {
    let payload = std::fs::read(&file).map_err(|e| StorageError::io(&file, e))?;
    let outcome = library.replace_document(&payload)?;
    let backup = outcome.backup.map(|path| path.display().to_string());
    Ok((json!({ "backup": backup }), 0))
}

/// Exit codes: 1 = rejected input or missing target, 3 = I/O error or
/// corrupt document.
fn exit_code_for(err: &StorageError) -> i32 {
    match err {
        StorageError::Io { .. }
        | StorageError::CorruptDocument { .. }
        | StorageError::Serialization(_) => 3,
        StorageError::DocumentNotFound { .. }
        | StorageError::NodeNotFound { .. }
        | StorageError::MalformedPayload(_)
        | StorageError::MalformedRequest(_) => 1,
    }
}

fn print_json(value: &serde_json::Value) {
    let json = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize result: {}\"}}", e));
    println!("{}", json);
}
