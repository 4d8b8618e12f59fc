//! docweave CLI - command-line interface library
//!
//! Builds and edits `.docx` and `.html` documents from the shell:
//! - `new`: create a document, optionally with a title
//! - `append`: add text or JSON-described content nodes
//! - `info` / `props` / `get` / `set`: inspect and edit custom properties
//!
//! # Binary Usage
//!
//! ```bash
//! docweave new report.docx --title "Weekly status"
//! docweave append report.docx --text "All services up" --json tables.json
//! docweave set report.docx Revision 7
//! docweave props report.docx
//! ```

pub mod app;

pub use app::{run, run_cli, AnyDocument, Cli, Format};
