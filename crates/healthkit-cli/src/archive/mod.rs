//! Loader for the Health app `export.xml`
//!
//! The export is one `<HealthData>` element holding tens of thousands of
//! sibling entries. Only three kinds are kept:
//!
//! ```text
//! <HealthData locale="en_AU">
//!   <ExportDate value="..."/>                 skipped
//!   <Me .../>                                 skipped
//!   <Record type="..." value="..." .../>      -> records
//!   <Workout workoutActivityType="..." ...>   -> workouts
//!     <MetadataEntry .../>                    -> child key on the workout
//!   </Workout>
//!   <ActivitySummary dateComponents="..."/>   -> activity_summaries
//! </HealthData>
//! ```
//!
//! The file is streamed, so memory holds the attribute mappings but never
//! a DOM of the whole document.

mod entry;

pub use entry::{RawEntry, ATTRIBUTE_MARKER};

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::error::{HealthError, Result};

const ROOT_ELEMENT: &str = "HealthData";

/// The three collections the cleaning pipeline consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Records,
    Workouts,
    ActivitySummaries,
}

impl Collection {
    /// Element name inside `<HealthData>`
    pub fn element_name(&self) -> &'static str {
        match self {
            Collection::Records => "Record",
            Collection::Workouts => "Workout",
            Collection::ActivitySummaries => "ActivitySummary",
        }
    }

    fn from_element(name: &str) -> Option<Self> {
        match name {
            "Record" => Some(Collection::Records),
            "Workout" => Some(Collection::Workouts),
            "ActivitySummary" => Some(Collection::ActivitySummaries),
            _ => None,
        }
    }
}

/// Raw collections extracted from an export
#[derive(Debug, Clone, Default)]
pub struct Archive {
    pub records: Vec<RawEntry>,
    pub workouts: Vec<RawEntry>,
    pub activity_summaries: Vec<RawEntry>,
}

impl Archive {
    /// Load an export file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let archive = Self::from_reader(BufReader::new(file))?;
        debug!(
            path = %path.display(),
            records = archive.records.len(),
            workouts = archive.workouts.len(),
            activity_summaries = archive.activity_summaries.len(),
            "loaded archive"
        );
        Ok(archive)
    }

    /// Parse an in-memory document
    pub fn parse_str(xml: &str) -> Result<Self> {
        Self::from_reader(xml.as_bytes())
    }

    /// Stream-parse a document from any buffered reader
    pub fn from_reader<R: BufRead>(source: R) -> Result<Self> {
        let mut reader = Reader::from_reader(source);
        reader.trim_text(true);

        let mut archive = Archive::default();
        let mut buf = Vec::new();
        let mut depth = 0usize;
        let mut saw_root = false;
        let mut current: Option<(Collection, RawEntry)> = None;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    archive.open_element(&e, depth, &mut saw_root, &mut current)?;
                    depth += 1;
                }
                Event::Empty(e) => {
                    archive.open_element(&e, depth, &mut saw_root, &mut current)?;
                    if depth == 1 {
                        archive.finish_entry(&mut current);
                    }
                }
                Event::End(_) => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or_else(|| HealthError::parse("unbalanced closing tag"))?;
                    if depth == 1 {
                        archive.finish_entry(&mut current);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if !saw_root {
            return Err(HealthError::parse(format!(
                "no <{}> element found",
                ROOT_ELEMENT
            )));
        }
        if depth != 0 {
            return Err(HealthError::parse("unexpected end of document"));
        }

        archive.require_collections()?;
        Ok(archive)
    }

    fn open_element(
        &mut self,
        element: &BytesStart<'_>,
        depth: usize,
        saw_root: &mut bool,
        current: &mut Option<(Collection, RawEntry)>,
    ) -> Result<()> {
        let name = element_name(element)?;
        match depth {
            0 => {
                if name != ROOT_ELEMENT {
                    return Err(HealthError::parse(format!(
                        "expected <{}> root element, found <{}>",
                        ROOT_ELEMENT, name
                    )));
                }
                *saw_root = true;
            }
            1 => {
                if let Some(collection) = Collection::from_element(&name) {
                    let mut entry = RawEntry::new();
                    for attr in element.attributes() {
                        let attr = attr.map_err(quick_xml::Error::from)?;
                        let key = std::str::from_utf8(attr.key.as_ref())
                            .map_err(|e| HealthError::parse(format!("attribute name: {}", e)))?;
                        entry.push_attribute(key, attr.unescape_value()?.into_owned());
                    }
                    *current = Some((collection, entry));
                }
            }
            2 => {
                if let Some((_, entry)) = current.as_mut() {
                    entry.push_child(&name);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn finish_entry(&mut self, current: &mut Option<(Collection, RawEntry)>) {
        if let Some((collection, entry)) = current.take() {
            match collection {
                Collection::Records => self.records.push(entry),
                Collection::Workouts => self.workouts.push(entry),
                Collection::ActivitySummaries => self.activity_summaries.push(entry),
            }
        }
    }

    fn require_collections(&self) -> Result<()> {
        for (collection, entries) in [
            (Collection::Records, &self.records),
            (Collection::Workouts, &self.workouts),
            (Collection::ActivitySummaries, &self.activity_summaries),
        ] {
            if entries.is_empty() {
                return Err(HealthError::MissingCollection(collection.element_name()));
            }
        }
        Ok(())
    }
}

fn element_name(element: &BytesStart<'_>) -> Result<String> {
    std::str::from_utf8(element.name().as_ref())
        .map(str::to_string)
        .map_err(|e| HealthError::parse(format!("element name: {}", e)))
}
