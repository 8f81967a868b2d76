//! Word document extraction using docx-rs.
//!
//! Pulls raw text out of paragraphs and tables. Legacy `.doc`, `.odt` and
//! `.rtf` files are not OOXML and fail here; the pipeline substitutes a
//! placeholder for them.

use crate::error::{ExtractError, ExtractResult};
use crate::types::{DocumentStructure, ExtractedContent, FileKind, Modality};
use crate::Extractor;
use async_trait::async_trait;
use docx_rs::{DocumentChild, Paragraph, ParagraphChild, RunChild, Table, TableCellContent};
use docx_rs::{TableChild, TableRowChild};

/// Raw-text converter for DOCX files.
#[derive(Debug, Clone, Default)]
pub struct DocxExtractor {
    /// Collect heading-styled paragraphs as sections.
    extract_headings: bool,
}

impl DocxExtractor {
    pub fn new() -> Self {
        Self {
            extract_headings: true,
        }
    }

    /// Configure whether to extract headings as sections.
    pub fn with_headings(mut self, extract: bool) -> Self {
        self.extract_headings = extract;
        self
    }

    fn extract_sync(content: Vec<u8>, extract_headings: bool) -> ExtractResult<(String, Vec<String>)> {
        let docx = docx_rs::read_docx(&content)
            .map_err(|e| ExtractError::Docx(format!("Failed to parse DOCX: {}", e)))?;

        let mut lines: Vec<String> = Vec::new();
        let mut headings: Vec<String> = Vec::new();

        for child in docx.document.children {
            match child {
                DocumentChild::Paragraph(p) => {
                    let text = paragraph_text(&p);
                    if text.trim().is_empty() {
                        continue;
                    }
                    if extract_headings && is_heading(&p) {
                        headings.push(text.trim().to_string());
                    }
                    lines.push(text);
                }
                DocumentChild::Table(t) => {
                    let text = table_text(&t);
                    if !text.trim().is_empty() {
                        lines.push(text);
                    }
                }
                _ => {}
            }
        }

        Ok((lines.join("\n"), headings))
    }
}

fn is_heading(p: &Paragraph) -> bool {
    p.property
        .style
        .as_ref()
        .map(|style| {
            let id = style.val.to_lowercase();
            id.starts_with("heading") || id.contains("title")
        })
        .unwrap_or(false)
}

fn paragraph_text(p: &Paragraph) -> String {
    let mut text = String::new();

    for child in &p.children {
        match child {
            ParagraphChild::Run(r) => {
                for run_child in &r.children {
                    match run_child {
                        RunChild::Text(t) => text.push_str(&t.text),
                        RunChild::Tab(_) => text.push('\t'),
                        RunChild::Break(_) => text.push('\n'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(h) => {
                for child in &h.children {
                    if let ParagraphChild::Run(r) = child {
                        for run_child in &r.children {
                            if let RunChild::Text(t) = run_child {
                                text.push_str(&t.text);
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    text
}

/// Render a table as `cell | cell` rows.
fn table_text(t: &Table) -> String {
    t.rows
        .iter()
        .map(|row| {
            let TableChild::TableRow(r) = row;
            r.cells
                .iter()
                .map(|cell| {
                    let TableRowChild::TableCell(c) = cell;
                    c.children
                        .iter()
                        .filter_map(|child| match child {
                            TableCellContent::Paragraph(p) => Some(paragraph_text(p)),
                            _ => None,
                        })
                        .collect::<Vec<_>>()
                        .join(" ")
                        .trim()
                        .to_string()
                })
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl Extractor for DocxExtractor {
    async fn extract(&self, content: &[u8]) -> ExtractResult<ExtractedContent> {
        let bytes = content.to_vec();
        let content_len = bytes.len();
        let extract_headings = self.extract_headings;

        let (text, headings) =
            tokio::task::spawn_blocking(move || Self::extract_sync(bytes, extract_headings))
                .await??;

        if text.trim().is_empty() {
            return Err(ExtractError::EmptyContent);
        }

        let structure = DocumentStructure {
            page_count: None,
            sections: headings,
        };

        Ok(ExtractedContent::new(text, Modality::Docx)
            .with_structure(structure)
            .with_metadata("original_size", content_len))
    }

    fn supported_kinds(&self) -> &[FileKind] {
        &[FileKind::Word]
    }

    fn name(&self) -> &str {
        "docx-rs"
    }
}
