//! # folio-types
//!
//! Shared data model for document structure inference.
//!
//! Everything here is a derived, read-only artifact: sections, index
//! entries and cross references are computed once per document version by
//! `folio-structure` and handed to chunking, attribution and scheduling
//! consumers as plain values.

pub mod heading;
pub mod index;
pub mod input;
pub mod reference;
pub mod result;
pub mod section;

pub use heading::{FontWeight, HeadingCandidate, LeveledHeading};
pub use index::IndexEntry;
pub use input::{ExtractedDocument, FontObservation, OutlineNode, PageMap, PageRecord};
pub use reference::{CrossReference, ReferenceKind, ReferenceSource, ReferenceTarget};
pub use result::{DetectionMethod, StructureResult};
pub use section::{count_sections, walk_forest, PageRange, Provenance, Section, SectionWalk};
