//! Output generation for the collector.
//!
//! # Submodules
//!
//! - [`json`]: Writes the article records to the `data.json` artifact
//!
//! # Output Structure
//!
//! ```text
//! data.json   # pretty-printed array of ArticleRecord, replaced on every run
//! ```

pub mod json;
