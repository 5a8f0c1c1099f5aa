//! # Consolidation Module
//!
//! ## Purpose
//! Merges the per-date XML payloads collected by a fetch run into one
//! well-formed output document, grouping fixture elements under date-labeled
//! sections in ascending date order.
//!
//! ## Input/Output Specification
//! - **Input**: Mapping of dates to `FetchResult`s
//! - **Output**: `ConsolidatedDocument` serializable to a single XML file
//! - **Invariant**: A malformed payload empties its own section and never
//!   corrupts the rest of the document
//!
//! ## Key Features
//! - Deterministic ascending-date section order regardless of fetch order
//! - Per-date isolation of parse failures
//! - Fixture counting fed into the run statistics

use crate::errors::{FetchError, Result};
use crate::stats::{StatsCollector, StatsEvent};
use crate::FetchResult;
use chrono::NaiveDate;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fixture elements extracted for one date
#[derive(Debug, Clone)]
pub struct DateSection {
    /// The date this section covers
    pub date: NaiveDate,
    /// Serialized fixture elements copied from the source payload
    pub fixtures: Vec<String>,
}

/// The merged output document
#[derive(Debug, Clone)]
pub struct ConsolidatedDocument {
    /// Sections in ascending date order
    pub sections: Vec<DateSection>,
    /// Total fixture elements across all sections
    pub total_fixtures: usize,
}

impl ConsolidatedDocument {
    /// Serialize the document to an XML string with a declaration
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        writer.write_event(Event::Start(BytesStart::new("ConsolidatedFixtures")))?;

        for section in &self.sections {
            let mut start = BytesStart::new("DateSection");
            let date_attr = section.date.format("%Y-%m-%d").to_string();
            start.push_attribute(("date", date_attr.as_str()));
            writer.write_event(Event::Start(start))?;

            for fragment in &section.fixtures {
                // fragments are re-serialized subtrees, already well-formed
                writer
                    .get_mut()
                    .get_mut()
                    .extend_from_slice(fragment.as_bytes());
            }

            writer.write_event(Event::End(BytesEnd::new("DateSection")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("ConsolidatedFixtures")))?;

        String::from_utf8(writer.into_inner().into_inner()).map_err(|e| FetchError::XmlParse {
            details: e.to_string(),
        })
    }

    /// Write the serialized document to `path`, creating parent directories
    pub async fn write_to(&self, path: &Path) -> Result<()> {
        let xml = self.to_xml()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(path, xml).await?;
        debug!("wrote consolidated document to {:?}", path);
        Ok(())
    }
}

/// Merges per-date payloads into the output document
pub struct Consolidator {
    stats: Arc<StatsCollector>,
}

impl Consolidator {
    /// Create a consolidator reporting fixture counts to `stats`
    pub fn new(stats: Arc<StatsCollector>) -> Self {
        Self { stats }
    }

    /// Merge all results into one document.
    ///
    /// Dates are walked in ascending order. Failed dates and unparsable
    /// payloads produce empty sections; nothing aborts the merge.
    pub fn consolidate(&self, results: &BTreeMap<NaiveDate, FetchResult>) -> ConsolidatedDocument {
        let mut sections = Vec::with_capacity(results.len());
        let mut total_fixtures = 0;

        for (date, result) in results {
            let fixtures = match result.payload.as_deref() {
                Some(payload) => match extract_fixtures(payload) {
                    Ok(fixtures) => fixtures,
                    Err(e) => {
                        warn!("failed to process XML for {}: {}", date, e);
                        Vec::new()
                    }
                },
                None => Vec::new(),
            };

            self.stats.record(StatsEvent::FixturesFound(fixtures.len()));
            total_fixtures += fixtures.len();
            sections.push(DateSection {
                date: *date,
                fixtures,
            });
        }

        info!(
            "consolidated {} sections with {} fixtures",
            sections.len(),
            total_fixtures
        );

        ConsolidatedDocument {
            sections,
            total_fixtures,
        }
    }
}

/// Extract the top-level child elements of a payload's root.
///
/// Each child subtree is re-serialized on its own so the caller can nest the
/// fixtures under a new parent. Any well-formedness error rejects the whole
/// payload.
fn extract_fixtures(payload: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(payload);
    let mut fixtures = Vec::new();
    let mut current: Option<Writer<Cursor<Vec<u8>>>> = None;
    let mut depth = 0usize;
    let mut saw_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                depth += 1;
                saw_root = true;
                if depth == 2 {
                    current = Some(Writer::new(Cursor::new(Vec::new())));
                }
                if let Some(w) = current.as_mut() {
                    w.write_event(Event::Start(e))?;
                }
            }
            Ok(Event::End(e)) => {
                if let Some(w) = current.as_mut() {
                    w.write_event(Event::End(e))?;
                }
                if depth == 2 {
                    if let Some(w) = current.take() {
                        fixtures.push(finish_fragment(w)?);
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Empty(e)) => {
                saw_root = true;
                if depth == 1 {
                    let mut w = Writer::new(Cursor::new(Vec::new()));
                    w.write_event(Event::Empty(e))?;
                    fixtures.push(finish_fragment(w)?);
                } else if let Some(w) = current.as_mut() {
                    w.write_event(Event::Empty(e))?;
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(w) = current.as_mut() {
                    w.write_event(Event::Text(e))?;
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(w) = current.as_mut() {
                    w.write_event(Event::CData(e))?;
                }
            }
            Ok(Event::Comment(e)) => {
                if let Some(w) = current.as_mut() {
                    w.write_event(Event::Comment(e))?;
                }
            }
            Ok(Event::Eof) => break,
            // declarations and processing instructions carry no fixture data
            Ok(_) => {}
            Err(e) => return Err(e.into()),
        }
    }

    if depth != 0 || current.is_some() {
        return Err(FetchError::XmlParse {
            details: "unclosed element at end of payload".to_string(),
        });
    }
    if !saw_root {
        return Err(FetchError::XmlParse {
            details: "payload has no root element".to_string(),
        });
    }

    Ok(fixtures)
}

fn finish_fragment(writer: Writer<Cursor<Vec<u8>>>) -> Result<String> {
    String::from_utf8(writer.into_inner().into_inner()).map_err(|e| FetchError::XmlParse {
        details: e.to_string(),
    })
}
