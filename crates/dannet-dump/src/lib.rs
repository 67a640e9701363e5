//! Load the DanNet 2.2 dump into a lexical index keyed by word id.
//!
//! The dump is a zip archive of RDF files. Two of them matter here:
//! `words.rdf` (word id and lexical form) and `part_of_speech.rdf` (word id
//! and part of speech). Both are ISO-8859-1 encoded and not well-formed enough
//! for a strict XML parser, so records are pulled out with tolerant patterns
//! behind the [`DumpParser`] trait.
//!
//! # Pipeline
//! 1. [`ensure_archive`] downloads the archive unless a cached copy exists.
//! 2. [`DumpPayloads::from_archive`] reads the two RDF entries.
//! 3. [`DumpPayloads::build_index`] decodes, extracts and joins them into a
//!    [`LexicalIndex`], rejecting duplicate ids.
//!
//! # Example
//! ```no_run
//! use dannet_dump::{DumpPayloads, RegexDumpParser};
//!
//! # fn main() -> Result<(), dannet_dump::DumpError> {
//! let payloads = DumpPayloads::from_archive("dannet.zip")?;
//! let index = payloads.build_index(&RegexDumpParser::new())?;
//! for record in index.lookup_form("dyr") {
//!     println!("{} {} {:?}", record.id, record.pos, record.pos_category_id);
//! }
//! index.write_csv("words.csv")?;
//! # Ok(()) }
//! ```

pub mod archive;
pub mod index;
pub mod parse;

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

pub use archive::{DumpPayloads, FORMS_ENTRY_SUFFIX, POS_ENTRY_SUFFIX, ensure_archive};
pub use index::LexicalIndex;
pub use parse::{DumpParser, RegexDumpParser, decode_latin1};

/// Which of the two dump payloads an error refers to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Payload {
    Forms,
    PartOfSpeech,
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Payload::Forms => "form",
            Payload::PartOfSpeech => "part-of-speech",
        })
    }
}

#[derive(Debug, Error)]
pub enum DumpError {
    #[error("no {0} records extracted; the dump format may have changed")]
    EmptyExtraction(Payload),
    #[error("{0} duplicate ids in the lexical index")]
    DuplicateIdentifiers(usize),
    #[error("archive {} has no entry ending in {suffix}", archive.display())]
    MissingPayload {
        archive: PathBuf,
        suffix: &'static str,
    },
    #[error("failed to download {url}: {message}")]
    Download { url: String, message: String },
    #[error("failed to read archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
