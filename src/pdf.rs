// src/pdf.rs
//! Text extraction for uploaded PDF documents (via `pdf-extract`).

use std::panic;

use anyhow::{anyhow, Result};

/// Extract all page text from an in-memory PDF.
///
/// Blocking and CPU bound; call from `spawn_blocking` inside async handlers.
/// Parser panics on malformed files are returned as errors.
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    match panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(res) => res.map_err(|e| anyhow!("extracting text from pdf: {e}")),
        Err(_) => Err(anyhow!("pdf parser panicked on malformed document")),
    }
}
