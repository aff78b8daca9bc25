//! Page filtering over decompressed block fragments
//!
//! A block inflates to zero or more `<page>` elements with no enclosing
//! document, so a synthetic root is added before parsing. Pages are
//! accumulated from XML events and gated on the requested-title set, the
//! main namespace, and the absence of a redirect marker.

use super::record::{ArticleRecord, ExtractError};
use super::wikitext::WikiTextCleaner;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::collections::HashSet;

/// Parses one block's XML fragment and keeps the requested pages.
#[derive(Debug, Default)]
pub struct PageFilter {
    cleaner: WikiTextCleaner,
}

/// Page being accumulated from XML events
#[derive(Debug, Default)]
struct PartialPage {
    title: Option<String>,
    id: Option<String>,
    ns: Option<String>,
    text: Option<String>,
    redirect: bool,
}

impl PageFilter {
    pub fn new() -> Self {
        Self {
            cleaner: WikiTextCleaner::new(),
        }
    }

    /// Parse `raw` and return cleaned records for the pages in `targets`.
    ///
    /// Malformed XML fails the whole block soft: the caller records zero
    /// articles for this offset and every other block is unaffected.
    pub fn filter_block(
        &self,
        raw: &[u8],
        targets: &HashSet<String>,
        offset: u64,
    ) -> Result<Vec<ArticleRecord>, ExtractError> {
        let mut doc = Vec::with_capacity(raw.len() + 16);
        doc.extend_from_slice(b"<pages>");
        doc.extend_from_slice(raw);
        doc.extend_from_slice(b"</pages>");

        let mut reader = Reader::from_reader(&doc[..]);
        let mut records = Vec::new();
        let mut page: Option<PartialPage> = None;
        let mut current_element: Option<Vec<u8>> = None;
        let mut text_buf = String::new();
        let mut buf = Vec::with_capacity(8192);

        loop {
            buf.clear();
            let event = reader.read_event_into(&mut buf).map_err(|e| {
                ExtractError::BlockParse {
                    offset,
                    reason: format!("XML parse error: {}", e),
                }
            })?;

            match event {
                Event::Start(ref e) => match e.name().as_ref() {
                    b"page" => page = Some(PartialPage::default()),
                    b"redirect" => {
                        if let Some(p) = page.as_mut() {
                            p.redirect = true;
                        }
                    }
                    name @ (b"title" | b"id" | b"ns" | b"text") => {
                        current_element = Some(name.to_vec());
                        text_buf.clear();
                    }
                    _ => {}
                },
                // The dump writes the redirect marker as an empty element
                Event::Empty(ref e) => {
                    if e.name().as_ref() == b"redirect" {
                        if let Some(p) = page.as_mut() {
                            p.redirect = true;
                        }
                    }
                }
                Event::Text(ref e) => {
                    if current_element.is_some() {
                        if let Ok(text) = e.unescape() {
                            text_buf.push_str(&text);
                        }
                    }
                }
                Event::CData(ref e) => {
                    if current_element.is_some() {
                        text_buf.push_str(&String::from_utf8_lossy(e));
                    }
                }
                Event::End(ref e) => {
                    let name = e.name();
                    if name.as_ref() == b"page" {
                        if let Some(done) = page.take() {
                            if let Some(record) = self.accept(done, targets) {
                                records.push(record);
                            }
                        }
                        continue;
                    }
                    if current_element.as_deref() != Some(name.as_ref()) {
                        continue;
                    }
                    if let Some(p) = page.as_mut() {
                        match name.as_ref() {
                            b"title" => p.title = Some(text_buf.clone()),
                            // First id wins: that is the page id, later ones
                            // belong to revisions and contributors
                            b"id" => {
                                if p.id.is_none() {
                                    p.id = Some(text_buf.clone());
                                }
                            }
                            b"ns" => p.ns = Some(text_buf.trim().to_string()),
                            // Last revision wins
                            b"text" => p.text = Some(text_buf.clone()),
                            _ => {}
                        }
                    }
                    current_element = None;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(records)
    }

    /// Apply the inclusion gates and clean the survivor.
    ///
    /// A title match alone is never authoritative: the page must also live
    /// in the main namespace and carry no redirect marker, so a talk page or
    /// redirect sharing a requested title cannot leak through.
    fn accept(&self, page: PartialPage, targets: &HashSet<String>) -> Option<ArticleRecord> {
        let title = page.title?;
        if !targets.contains(&title) {
            return None;
        }
        if page.ns.as_deref() != Some("0") || page.redirect {
            return None;
        }

        let wikitext = page.text?;
        if wikitext.is_empty() {
            return None;
        }

        let text = self.cleaner.clean(&wikitext);
        if text.is_empty() {
            return None;
        }

        Some(ArticleRecord {
            id: page.id,
            title,
            text,
        })
    }
}
