use std::path::Path;
use std::time::Instant;

use docx_rs::{
    read_docx, DocumentChild, InsertChild, Paragraph, ParagraphChild, Run, RunChild,
    StructuredDataTag, StructuredDataTagChild, Table, TableCellContent, TableChild,
    TableRowChild,
};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::models::ScriptFormat;

pub const NO_TEXT_FOUND: &str = "No text content found";
pub const PDF_EXTRACTION_FAILED: &str = "Could not extract text from PDF";
pub const DOCX_EXTRACTION_FAILED: &str = "Could not extract text from DOCX";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionOutcome {
    Extracted,
    /// Extraction ran but produced only whitespace.
    Empty,
    /// Extraction failed and the placeholder text was substituted.
    Degraded,
}

#[derive(Debug, Clone)]
pub struct Extraction {
    pub text: String,
    pub outcome: ExtractionOutcome,
}

impl Extraction {
    fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Self {
                text: NO_TEXT_FOUND.to_string(),
                outcome: ExtractionOutcome::Empty,
            }
        } else {
            Self {
                text: trimmed.to_string(),
                outcome: ExtractionOutcome::Extracted,
            }
        }
    }

    fn degraded(placeholder: &str) -> Self {
        Self {
            text: placeholder.to_string(),
            outcome: ExtractionOutcome::Degraded,
        }
    }

    /// Length in characters, as recorded in metadata.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Turns a stored upload into plain text. PDF and DOCX failures degrade to a
/// placeholder instead of failing the upload.
#[derive(Debug, Clone)]
pub struct TextExtractor {
    pdftotext_path: String,
}

impl TextExtractor {
    pub fn new(pdftotext_path: impl Into<String>) -> Self {
        Self {
            pdftotext_path: pdftotext_path.into(),
        }
    }

    pub async fn extract(&self, path: &Path, format: ScriptFormat) -> AppResult<Extraction> {
        let start = Instant::now();

        let extraction = match format {
            ScriptFormat::Pdf => self.extract_pdf(path).await,
            ScriptFormat::Docx => Self::extract_docx(path).await,
            // FDX is Final Draft XML; it is stored as raw text like the others.
            ScriptFormat::Txt | ScriptFormat::Fountain | ScriptFormat::Fdx => {
                Self::extract_plain(path).await?
            }
        };

        info!(
            file_type = %format,
            outcome = ?extraction.outcome,
            chars = extraction.char_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Text extraction finished"
        );
        Ok(extraction)
    }

    async fn extract_pdf(&self, path: &Path) -> Extraction {
        let output = Command::new(&self.pdftotext_path)
            .arg(path)
            .arg("-")
            .output()
            .await;

        match output {
            Ok(output) if output.status.success() => {
                debug!(bytes = output.stdout.len(), "pdftotext succeeded");
                Extraction::from_raw(&String::from_utf8_lossy(&output.stdout))
            }
            Ok(output) => {
                warn!(
                    status = %output.status,
                    stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                    "pdftotext exited with an error"
                );
                Extraction::degraded(PDF_EXTRACTION_FAILED)
            }
            Err(e) => {
                warn!(tool = %self.pdftotext_path, error = %e, "Failed to run pdftotext");
                Extraction::degraded(PDF_EXTRACTION_FAILED)
            }
        }
    }

    async fn extract_docx(path: &Path) -> Extraction {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "Failed to read DOCX");
                return Extraction::degraded(DOCX_EXTRACTION_FAILED);
            }
        };

        // Parsing is CPU-bound and docx-rs may panic on hostile archives.
        match tokio::task::spawn_blocking(move || docx_text(&bytes)).await {
            Ok(Ok(text)) => Extraction::from_raw(&text),
            Ok(Err(e)) => {
                warn!(error = %e, "DOCX extraction error");
                Extraction::degraded(DOCX_EXTRACTION_FAILED)
            }
            Err(e) => {
                warn!(error = %e, "DOCX extraction task aborted");
                Extraction::degraded(DOCX_EXTRACTION_FAILED)
            }
        }
    }

    async fn extract_plain(path: &Path) -> AppResult<Extraction> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            AppError::internal(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Ok(Extraction::from_raw(&String::from_utf8_lossy(&bytes)))
    }

    /// Whether the configured `pdftotext` binary can be launched.
    pub async fn pdftotext_available(&self) -> bool {
        Command::new(&self.pdftotext_path)
            .arg("-v")
            .output()
            .await
            .is_ok()
    }
}

/// Text of a DOCX archive, one paragraph per line. Table cells, hyperlinks,
/// tracked insertions and content controls are walked as well.
fn docx_text(data: &[u8]) -> Result<String, String> {
    let docx = read_docx(data).map_err(|e| e.to_string())?;

    let mut lines: Vec<String> = Vec::new();
    for child in docx.document.children.iter() {
        match child {
            DocumentChild::Paragraph(para) => lines.push(paragraph_text(para)),
            DocumentChild::Table(table) => push_table(table, &mut lines),
            DocumentChild::StructuredDataTag(tag) => push_tag(tag, &mut lines),
            _ => {}
        }
    }

    Ok(lines.join("\n"))
}

fn paragraph_text(para: &Paragraph) -> String {
    let mut text = String::new();
    push_paragraph_children(&para.children, &mut text);
    text
}

fn push_paragraph_children(children: &[ParagraphChild], out: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => push_run(run, out),
            ParagraphChild::Insert(insert) => {
                for ic in insert.children.iter() {
                    if let InsertChild::Run(run) = ic {
                        push_run(run, out);
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => push_paragraph_children(&link.children, out),
            ParagraphChild::StructuredDataTag(tag) => {
                for tc in tag.children.iter() {
                    if let StructuredDataTagChild::Run(run) = tc {
                        push_run(run, out);
                    }
                }
            }
            _ => {}
        }
    }
}

fn push_run(run: &Run, out: &mut String) {
    for rc in run.children.iter() {
        match rc {
            RunChild::Text(t) => out.push_str(&t.text),
            RunChild::Tab(_) => out.push('\t'),
            RunChild::Break(_) => out.push('\n'),
            _ => {}
        }
    }
}

fn push_table(table: &Table, lines: &mut Vec<String>) {
    for TableChild::TableRow(row) in table.rows.iter() {
        for TableRowChild::TableCell(cell) in row.cells.iter() {
            for content in cell.children.iter() {
                match content {
                    TableCellContent::Paragraph(para) => lines.push(paragraph_text(para)),
                    TableCellContent::Table(nested) => push_table(nested, lines),
                    TableCellContent::StructuredDataTag(tag) => push_tag(tag, lines),
                    _ => {}
                }
            }
        }
    }
}

fn push_tag(tag: &StructuredDataTag, lines: &mut Vec<String>) {
    for child in tag.children.iter() {
        match child {
            StructuredDataTagChild::Paragraph(para) => lines.push(paragraph_text(para)),
            StructuredDataTagChild::Table(table) => push_table(table, lines),
            StructuredDataTagChild::StructuredDataTag(nested) => push_tag(nested, lines),
            StructuredDataTagChild::Run(run) => {
                let mut text = String::new();
                push_run(run, &mut text);
                lines.push(text);
            }
            _ => {}
        }
    }
}
