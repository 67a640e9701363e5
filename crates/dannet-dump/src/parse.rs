use std::sync::LazyLock;

use dannet_types::{FormEntry, PosEntry};
use regex::Regex;

use crate::{DumpError, Payload};

const FORMS_PATTERN: &str =
    r#"(?s)<wn20schema:Word rdf:about="&dn;word-(.*?)" wn20schema:lexicalForm="(.*?)""#;
const POS_PATTERN: &str = r#"(?s)<rdf:Description rdf:about="&dn;word-(.*?)"><dn_schema:partOfSpeech>(.*?)</dn_schema:partOfSpeech></rdf:Description>"#;

static FORMS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(FORMS_PATTERN).expect("forms pattern is valid"));
static POS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(POS_PATTERN).expect("pos pattern is valid"));

/// Extracts typed records from the decoded dump payloads.
///
/// Implementations return records in order of appearance and fail with
/// [`DumpError::EmptyExtraction`] when a payload yields nothing.
pub trait DumpParser {
    fn parse_forms(&self, text: &str) -> Result<Vec<FormEntry>, DumpError>;
    fn parse_pos(&self, text: &str) -> Result<Vec<PosEntry>, DumpError>;
}

/// Pattern-based extraction that tolerates records spread over several lines.
#[derive(Clone, Copy, Debug, Default)]
pub struct RegexDumpParser;

impl RegexDumpParser {
    pub fn new() -> Self {
        Self
    }
}

impl DumpParser for RegexDumpParser {
    fn parse_forms(&self, text: &str) -> Result<Vec<FormEntry>, DumpError> {
        let forms: Vec<FormEntry> = FORMS_RE
            .captures_iter(text)
            .map(|caps| FormEntry {
                id: caps[1].to_string(),
                form: caps[2].to_string(),
            })
            .collect();
        if forms.is_empty() {
            return Err(DumpError::EmptyExtraction(Payload::Forms));
        }
        Ok(forms)
    }

    fn parse_pos(&self, text: &str) -> Result<Vec<PosEntry>, DumpError> {
        let pos: Vec<PosEntry> = POS_RE
            .captures_iter(text)
            .map(|caps| PosEntry {
                id: caps[1].to_string(),
                pos: caps[2].trim().to_string(),
            })
            .collect();
        if pos.is_empty() {
            return Err(DumpError::EmptyExtraction(Payload::PartOfSpeech));
        }
        Ok(pos)
    }
}

/// Decode ISO-8859-1 bytes: every byte is the code point of the same value.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().copied().map(char::from).collect()
}
