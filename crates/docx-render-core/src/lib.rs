//! Core conversion logic for the docx-render service.
//!
//! Two independently produced HTML renderings of the same DOCX feed one
//! reconciliation step:
//! - `extract`: token-faithful text extraction straight from the package XML
//! - `stylemap`: style capture from the high-fidelity rendering and
//!   positional transplant onto the extracted tree
//! - `repair`: textual merging of merge fields split across inline markup
//! - `reconcile`: the state machine that picks the first output carrying
//!   both intact merge fields and the richest available styling
//! - `assemble`: wrapping the reconciled fragment into a self-contained
//!   HTML document

mod assemble;
mod error;
mod extract;
mod reconcile;
mod repair;
mod stylemap;
mod tokens;

pub use assemble::assemble_document;
pub use error::ExtractError;
pub use extract::extract_fragment;
pub use reconcile::{reconcile, ReconcileOutcome, ReconcileTrace, Strategy, FALLBACK_STYLE_SHEET};
pub use repair::{repair_markup, RepairPass, REPAIR_PASSES};
pub use stylemap::{StyleMap, StyleRecord, COPIED_ATTRIBUTES};
pub use tokens::{scan_html, scan_text};
