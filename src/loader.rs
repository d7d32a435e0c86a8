//! Document loaders, one strategy per [`ContentKind`].
//!
//! Dispatch is a closed match over the kind enum: adding a format is a
//! reviewable change here rather than a registry mutation somewhere else.
//! Loaders are stateless and touch the filesystem only to read. Failures
//! propagate as [`PipelineError::LoadFailure`] carrying the source and the
//! underlying cause; nothing here retries.

use std::io::Read;

use crate::enrich;
use crate::error::PipelineError;
use crate::models::{ContentKind, RawDocument};

/// Zip-bomb guard: maximum decompressed bytes read from one archive entry.
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// Load a source of the given kind into zero or more provenance-stamped
/// documents.
pub async fn load_source(
    source: &str,
    kind: ContentKind,
    http: &reqwest::Client,
) -> Result<Vec<RawDocument>, PipelineError> {
    let texts = match kind {
        ContentKind::Pdf => vec![load_pdf(source).await?],
        ContentKind::Docx => vec![load_docx(source).await?],
        ContentKind::Csv => load_csv(source).await?,
        ContentKind::Text => vec![load_text(source).await?],
        ContentKind::Web => vec![load_web(source, http).await?],
        // Text extraction from images needs an OCR backend, which is an
        // out-of-scope provider. The kind is detectable but not loadable.
        ContentKind::Image => {
            return Err(PipelineError::UnsupportedSourceKind(ContentKind::Image))
        }
    };

    Ok(enrich::stamp_documents(texts, source, kind))
}

async fn load_text(source: &str) -> Result<String, PipelineError> {
    tokio::fs::read_to_string(source)
        .await
        .map_err(|e| PipelineError::load(source, e))
}

async fn load_pdf(source: &str) -> Result<String, PipelineError> {
    let bytes = tokio::fs::read(source)
        .await
        .map_err(|e| PipelineError::load(source, e))?;
    pdf_extract::extract_text_from_mem(&bytes).map_err(|e| PipelineError::load(source, e))
}

/// Pull the visible text out of `word/document.xml`, with a paragraph
/// break per `<w:p>` so the chunker can split on paragraph boundaries.
async fn load_docx(source: &str) -> Result<String, PipelineError> {
    let bytes = tokio::fs::read(source)
        .await
        .map_err(|e| PipelineError::load(source, e))?;

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes.as_slice()))
        .map_err(|e| PipelineError::load(source, e))?;
    let entry = archive
        .by_name("word/document.xml")
        .map_err(|_| PipelineError::load(source, "word/document.xml not found"))?;

    let mut xml = Vec::new();
    entry
        .take(MAX_XML_ENTRY_BYTES)
        .read_to_end(&mut xml)
        .map_err(|e| PipelineError::load(source, e))?;
    if xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
        return Err(PipelineError::load(
            source,
            "word/document.xml exceeds size limit",
        ));
    }

    docx_body_text(&xml).map_err(|e| PipelineError::load(source, e))
}

fn docx_body_text(xml: &[u8]) -> Result<String, quick_xml::Error> {
    let mut reader = quick_xml::Reader::from_reader(xml);
    // Runs may carry significant leading/trailing spaces (<w:t> world</w:t>).
    reader.config_mut().trim_text(false);

    let mut out = String::new();
    let mut in_run_text = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            quick_xml::events::Event::Start(e) if e.local_name().as_ref() == b"t" => {
                in_run_text = true;
            }
            quick_xml::events::Event::Text(t) if in_run_text => {
                out.push_str(t.unescape().unwrap_or_default().as_ref());
            }
            quick_xml::events::Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_run_text = false,
                b"p" => {
                    if !out.is_empty() && !out.ends_with("\n\n") {
                        out.push_str("\n\n");
                    }
                }
                _ => {}
            },
            quick_xml::events::Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(out.trim_end().to_string())
}

/// One document per CSV record, rendered as `header: value` lines so each
/// row stands alone as retrievable text.
async fn load_csv(source: &str) -> Result<Vec<String>, PipelineError> {
    let bytes = tokio::fs::read(source)
        .await
        .map_err(|e| PipelineError::load(source, e))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes.as_slice());
    let headers = reader
        .headers()
        .map_err(|e| PipelineError::load(source, e))?
        .clone();

    let mut docs = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| PipelineError::load(source, e))?;
        let text = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| format!("{}: {}", h, v))
            .collect::<Vec<_>>()
            .join("\n");
        docs.push(text);
    }

    Ok(docs)
}

async fn load_web(source: &str, http: &reqwest::Client) -> Result<String, PipelineError> {
    let response = http
        .get(source)
        .send()
        .await
        .map_err(|e| PipelineError::load(source, e))?
        .error_for_status()
        .map_err(|e| PipelineError::load(source, e))?;
    let html = response
        .text()
        .await
        .map_err(|e| PipelineError::load(source, e))?;

    Ok(html_to_text(&html))
}

/// Visible text of an HTML page: text nodes joined by newlines, with
/// script/style/noscript content dropped.
fn html_to_text(html: &str) -> String {
    let document = scraper::Html::parse_document(html);
    let mut lines = Vec::new();

    for node in document.tree.nodes() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let skip = node
            .parent()
            .and_then(|p| p.value().as_element().map(|e| e.name()))
            .map(|name| matches!(name, "script" | "style" | "noscript"))
            .unwrap_or(false);
        if skip {
            continue;
        }
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed.to_string());
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> reqwest::Client {
        reqwest::Client::new()
    }

    #[tokio::test]
    async fn text_loader_reads_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "The sky is blue.").unwrap();

        let docs = load_source(path.to_str().unwrap(), ContentKind::Text, &client())
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].text, "The sky is blue.");
        assert_eq!(docs[0].meta.source_type, ContentKind::Text);
    }

    #[tokio::test]
    async fn csv_loader_yields_one_document_per_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("people.csv");
        std::fs::write(&path, "name,role\nada,engineer\ngrace,admiral\n").unwrap();

        let docs = load_source(path.to_str().unwrap(), ContentKind::Csv, &client())
            .await
            .unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].text, "name: ada\nrole: engineer");
        assert_eq!(docs[1].text, "name: grace\nrole: admiral");
    }

    #[tokio::test]
    async fn csv_loader_with_only_headers_yields_zero_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, "name,role\n").unwrap();

        let docs = load_source(path.to_str().unwrap(), ContentKind::Csv, &client())
            .await
            .unwrap();
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_a_load_failure() {
        let err = load_source("/no/such/file.txt", ContentKind::Text, &client())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::LoadFailure { .. }));
    }

    #[tokio::test]
    async fn invalid_zip_is_a_load_failure_for_docx() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.docx");
        std::fs::write(&path, "not a zip archive").unwrap();

        let err = load_source(path.to_str().unwrap(), ContentKind::Docx, &client())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::LoadFailure { .. }));
    }

    #[tokio::test]
    async fn image_kind_is_unsupported() {
        let err = load_source("photo.png", ContentKind::Image, &client())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::UnsupportedSourceKind(ContentKind::Image)
        ));
    }

    #[test]
    fn docx_body_text_extracts_paragraph_runs() {
        let xml = br#"<?xml version="1.0"?>
            <w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
              <w:body>
                <w:p><w:r><w:t>Hello</w:t></w:r><w:r><w:t> world</w:t></w:r></w:p>
                <w:p><w:r><w:t>Second paragraph</w:t></w:r></w:p>
              </w:body>
            </w:document>"#;
        let text = docx_body_text(xml).unwrap();
        assert_eq!(text, "Hello world\n\nSecond paragraph");
    }

    #[test]
    fn html_to_text_drops_scripts_and_markup() {
        let html = r#"<html><head><style>body { color: red; }</style></head>
            <body><h1>Title</h1><script>var x = 1;</script><p>Body text.</p></body></html>"#;
        let text = html_to_text(html);
        assert!(text.contains("Title"));
        assert!(text.contains("Body text."));
        assert!(!text.contains("var x"));
        assert!(!text.contains("color: red"));
    }
}
