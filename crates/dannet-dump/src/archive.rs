use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

use tracing::info;
use zip::ZipArchive;

use crate::DumpError;
use crate::index::LexicalIndex;
use crate::parse::DumpParser;

/// Archive entry suffix of the words payload.
pub const FORMS_ENTRY_SUFFIX: &str = "words.rdf";
/// Archive entry suffix of the part-of-speech payload.
pub const POS_ENTRY_SUFFIX: &str = "part_of_speech.rdf";

/// Raw bytes of the two RDF files the index is built from.
#[derive(Clone, Debug)]
pub struct DumpPayloads {
    pub forms: Vec<u8>,
    pub pos: Vec<u8>,
}

impl DumpPayloads {
    /// Read the first `*words.rdf` and `*part_of_speech.rdf` entries of a
    /// DanNet zip archive.
    pub fn from_archive(path: impl AsRef<Path>) -> Result<Self, DumpError> {
        let path = path.as_ref();
        info!("unzipping {}", path.display());
        let mut archive = ZipArchive::new(File::open(path)?)?;
        let forms = read_entry(&mut archive, path, FORMS_ENTRY_SUFFIX)?;
        let pos = read_entry(&mut archive, path, POS_ENTRY_SUFFIX)?;
        Ok(Self { forms, pos })
    }

    pub fn build_index(&self, parser: &impl DumpParser) -> Result<LexicalIndex, DumpError> {
        LexicalIndex::from_payloads(parser, &self.forms, &self.pos)
    }
}

fn read_entry(
    archive: &mut ZipArchive<File>,
    path: &Path,
    suffix: &'static str,
) -> Result<Vec<u8>, DumpError> {
    let name = archive
        .file_names()
        .find(|name| name.ends_with(suffix))
        .map(str::to_string)
        .ok_or_else(|| DumpError::MissingPayload {
            archive: path.to_path_buf(),
            suffix,
        })?;
    let mut entry = archive.by_name(&name)?;
    let mut buf = Vec::with_capacity(entry.size() as usize);
    entry.read_to_end(&mut buf)?;
    info!("read {} ({} bytes)", name, buf.len());
    Ok(buf)
}

/// Download the archive at `url` to `path` unless `path` already exists.
///
/// Returns `true` when a download happened. The body is streamed into a
/// sibling `.part` file that is renamed once complete.
pub fn ensure_archive(
    agent: &ureq::Agent,
    url: &str,
    path: impl AsRef<Path>,
) -> Result<bool, DumpError> {
    let path = path.as_ref();
    if path.exists() {
        info!("archive already present at {}", path.display());
        return Ok(false);
    }

    info!("downloading {} to {}", url, path.display());
    let response = agent.get(url).call().map_err(|err| DumpError::Download {
        url: url.to_string(),
        message: err.to_string(),
    })?;
    if response.status() != 200 {
        return Err(DumpError::Download {
            url: url.to_string(),
            message: format!("unexpected status {}", response.status()),
        });
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let partial = path.with_extension("part");
    let mut file = File::create(&partial)?;
    let bytes = io::copy(&mut response.into_reader(), &mut file)?;
    drop(file);
    fs::rename(&partial, path)?;
    info!("downloaded {} bytes", bytes);
    Ok(true)
}
