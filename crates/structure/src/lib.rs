//! # folio-structure
//!
//! Recovers the latent organisation of a long document (chapters,
//! sections, a back-of-book index and in-text cross references) from its
//! extracted text plus optional outline and font hints.
//!
//! ## Detectors
//!
//! - [`toc`]: explicit table of contents in the opening region
//! - [`outline`]: embedded bookmarks supplied by the document reader
//! - [`headings`]: font-size based heading detection
//! - [`index`]: alphabetical index in the closing region
//! - [`xref`]: "see Chapter 3" style references and their graph
//!
//! [`merge`] reconciles the candidate hierarchies and [`pipeline`] drives
//! the detectors, sequentially or concurrently.
//!
//! ## Example
//!
//! ```
//! use folio_structure::{Analyzer, DocumentInput};
//!
//! let mut text = String::from("Table of Contents\n");
//! for (idx, page) in [1, 5, 12, 20, 31, 40].iter().enumerate() {
//!     text.push_str(&format!("Chapter {}: Topic .... {}\n", idx + 1, page));
//! }
//!
//! let result = Analyzer::default()
//!     .analyze(&DocumentInput::from_text(text))
//!     .unwrap();
//! assert!(result.detected);
//! assert_eq!(result.sections.len(), 6);
//! ```

pub mod cascade;
pub mod config;
pub mod error;
pub mod headings;
pub mod hierarchy;
pub mod index;
pub mod merge;
pub mod outline;
pub mod pipeline;
pub mod text;
pub mod toc;
pub mod xref;

pub use config::AnalyzerConfig;
pub use error::{Result, StructureError};
pub use headings::{detect_headings, normalize_levels};
pub use hierarchy::{HierarchyBuilder, RangeStrategy};
pub use index::{extract_index, IndexResult};
pub use merge::{merge, merge_with_headings, select_primary, Primary};
pub use outline::sections_from_outline;
pub use pipeline::{Analyzer, Detector, DocumentInput};
pub use toc::detect_toc;
pub use xref::{build_graph, extract_cross_references, find_references};
