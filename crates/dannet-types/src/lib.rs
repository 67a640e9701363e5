//! Shared types that mirror the records found in the DanNet 2.2 dump.
//!
//! The dump ships words and their parts of speech in two separate RDF files.
//! [`FormEntry`] and [`PosEntry`] hold one extracted record from each file;
//! [`IndexRecord`] is the joined row the matcher works with. The
//! [`LexicalCategory`] table translates DanNet part-of-speech labels into the
//! Wikidata items used as lexical categories on lexemes.
//!
//! ```rust
//! use dannet_types::{LexicalCategory, category_id_for_pos};
//!
//! assert_eq!(LexicalCategory::from_label("Noun"), Some(LexicalCategory::Noun));
//! assert_eq!(category_id_for_pos("VERB"), Some("Q24905"));
//! assert_eq!(category_id_for_pos("Pronoun"), None);
//! ```

use serde::Serialize;

/// Base URL of the public DanNet word pages.
pub const DANNET_WORD_URL: &str = "https://wordnet.dk/dannet/data/word-";

/// Word record from `words.rdf`: identifier plus lexical form.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FormEntry {
    pub id: String,
    pub form: String,
}

/// Part-of-speech record from `part_of_speech.rdf`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PosEntry {
    pub id: String,
    pub pos: String,
}

/// Joined dump row. `pos_category_id` is `None` for labels outside the
/// category table, so such rows never pass a category comparison.
///
/// Serializes with the column names of the exported `words.csv`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct IndexRecord {
    pub id: String,
    pub pos: String,
    pub form: String,
    #[serde(rename = "pos_id")]
    pub pos_category_id: Option<String>,
}

impl IndexRecord {
    /// Join one form and one part-of-speech record that share an id.
    pub fn joined(pos: &PosEntry, form: &FormEntry) -> Self {
        Self {
            id: pos.id.clone(),
            pos: pos.pos.clone(),
            form: form.form.clone(),
            pos_category_id: category_id_for_pos(&pos.pos).map(str::to_string),
        }
    }

    /// Whether this row's category id equals the given Wikidata item id.
    pub fn has_category(&self, category_id: &str) -> bool {
        self.pos_category_id.as_deref() == Some(category_id)
    }

    /// Public DanNet page for this word.
    pub fn dannet_url(&self) -> String {
        format!("{DANNET_WORD_URL}{}", self.id)
    }
}

/// Lexical categories that DanNet and Wikidata both model.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum LexicalCategory {
    Noun,
    Adjective,
    Verb,
}

impl LexicalCategory {
    /// Parse a DanNet part-of-speech label, ignoring case.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_lowercase().as_str() {
            "noun" => Some(LexicalCategory::Noun),
            "adjective" => Some(LexicalCategory::Adjective),
            "verb" => Some(LexicalCategory::Verb),
            _ => None,
        }
    }

    /// Wikidata item used as lexical category on lexemes.
    pub fn item_id(self) -> &'static str {
        match self {
            LexicalCategory::Noun => "Q1084",
            LexicalCategory::Adjective => "Q34698",
            LexicalCategory::Verb => "Q24905",
        }
    }
}

/// Map a DanNet part-of-speech label to its Wikidata category item id.
pub fn category_id_for_pos(label: &str) -> Option<&'static str> {
    LexicalCategory::from_label(label).map(LexicalCategory::item_id)
}
