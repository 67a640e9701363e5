use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Write;
use std::path::Path;

use dannet_types::{FormEntry, IndexRecord, PosEntry};
use tracing::info;

use crate::DumpError;
use crate::parse::{DumpParser, decode_latin1};

/// Read-only join of DanNet forms and parts of speech.
///
/// Row order follows the part-of-speech stream; lemma lookups return rows in
/// that order.
#[derive(Debug, Clone)]
pub struct LexicalIndex {
    records: Vec<IndexRecord>,
    by_id: HashMap<String, usize>,
    by_form: HashMap<String, Vec<usize>>,
}

impl LexicalIndex {
    /// Inner-join forms and parts of speech on id.
    ///
    /// Ids present on one side only are dropped. Fails with
    /// [`DumpError::DuplicateIdentifiers`] if any id occurs in more than one
    /// joined row.
    pub fn build(forms: &[FormEntry], pos: &[PosEntry]) -> Result<Self, DumpError> {
        let mut forms_by_id: HashMap<&str, Vec<&FormEntry>> = HashMap::new();
        for form in forms {
            forms_by_id.entry(form.id.as_str()).or_default().push(form);
        }

        let mut records = Vec::with_capacity(pos.len());
        for entry in pos {
            if let Some(matching) = forms_by_id.get(entry.id.as_str()) {
                records.extend(matching.iter().map(|form| IndexRecord::joined(entry, form)));
            }
        }

        let duplicates = count_duplicate_ids(&records);
        if duplicates > 0 {
            return Err(DumpError::DuplicateIdentifiers(duplicates));
        }

        let mut by_id = HashMap::with_capacity(records.len());
        let mut by_form: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, record) in records.iter().enumerate() {
            by_id.insert(record.id.clone(), idx);
            by_form.entry(record.form.clone()).or_default().push(idx);
        }

        info!(
            "joined {} rows from {} forms and {} part-of-speech entries",
            records.len(),
            forms.len(),
            pos.len()
        );
        Ok(Self {
            records,
            by_id,
            by_form,
        })
    }

    /// Decode both ISO-8859-1 payloads, extract them with `parser` and join.
    pub fn from_payloads(
        parser: &impl DumpParser,
        forms_payload: &[u8],
        pos_payload: &[u8],
    ) -> Result<Self, DumpError> {
        let forms = parser.parse_forms(&decode_latin1(forms_payload))?;
        info!("{} forms extracted", forms.len());
        let pos = parser.parse_pos(&decode_latin1(pos_payload))?;
        info!("{} part-of-speech entries extracted", pos.len());
        Self::build(&forms, &pos)
    }

    /// Rows whose form equals `lemma` exactly (case-sensitive).
    pub fn lookup_form(&self, lemma: &str) -> Vec<&IndexRecord> {
        self.by_form
            .get(lemma)
            .map(|rows| rows.iter().map(|idx| &self.records[*idx]).collect())
            .unwrap_or_default()
    }

    /// Fetch a row by DanNet word id.
    pub fn get(&self, id: &str) -> Option<&IndexRecord> {
        self.by_id.get(id).map(|idx| &self.records[*idx])
    }

    /// All rows in build order.
    pub fn records(&self) -> &[IndexRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of rows per raw part-of-speech label.
    pub fn pos_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.pos.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Check that a known word is present with the expected form and label.
    pub fn spot_check(&self, id: &str, form: &str, pos: &str) -> bool {
        self.get(id)
            .is_some_and(|record| record.form == form && record.pos == pos)
    }

    /// Write the index as `id,pos,form,pos_id` CSV to `path`.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<(), DumpError> {
        let file = std::fs::File::create(path.as_ref())?;
        self.write_csv_to(file)?;
        info!("wrote {} rows to {}", self.len(), path.as_ref().display());
        Ok(())
    }

    /// Write the index as CSV to any writer.
    pub fn write_csv_to<W: Write>(&self, writer: W) -> Result<(), DumpError> {
        let mut csv = csv::Writer::from_writer(writer);
        for record in &self.records {
            csv.serialize(record)?;
        }
        csv.flush()?;
        Ok(())
    }
}

/// Rows whose id already appeared in an earlier row.
fn count_duplicate_ids(records: &[IndexRecord]) -> usize {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .iter()
        .filter(|record| !seen.insert(record.id.as_str()))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(id: &str, form: &str) -> FormEntry {
        FormEntry {
            id: id.into(),
            form: form.into(),
        }
    }

    fn pos(id: &str, pos: &str) -> PosEntry {
        PosEntry {
            id: id.into(),
            pos: pos.into(),
        }
    }

    fn sample() -> LexicalIndex {
        LexicalIndex::build(
            &[
                form("1", "dyr"),
                form("2", "smuk"),
                form("3", "løbe"),
                form("4", "kun-form"),
                form("5", "dyr"),
            ],
            &[
                pos("5", "Adjective"),
                pos("3", "Verb"),
                pos("1", "Noun"),
                pos("2", "adjective"),
                pos("9", "Noun"),
            ],
        )
        .expect("build index")
    }

    #[test]
    fn inner_join_drops_one_sided_ids() {
        let index = sample();
        let ids: Vec<&str> = index.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["5", "3", "1", "2"]);
        assert!(index.get("4").is_none());
        assert!(index.get("9").is_none());
    }

    #[test]
    fn maps_categories_while_joining() {
        let index = sample();
        assert_eq!(
            index.get("2").unwrap().pos_category_id.as_deref(),
            Some("Q34698")
        );
        assert_eq!(
            index.get("3").unwrap().pos_category_id.as_deref(),
            Some("Q24905")
        );
    }

    #[test]
    fn lookup_is_exact_and_keeps_build_order() {
        let index = sample();
        let rows = index.lookup_form("dyr");
        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["5", "1"]);
        assert!(index.lookup_form("Dyr").is_empty());
        assert!(index.lookup_form("dyr ").is_empty());
        assert!(index.lookup_form("ukendt").is_empty());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = LexicalIndex::build(
            &[form("1", "dyr"), form("1", "dyret"), form("2", "kat")],
            &[pos("1", "Noun"), pos("2", "Noun"), pos("2", "Noun")],
        )
        .unwrap_err();
        // id 1 joins two forms, id 2 has two pos rows.
        assert!(matches!(err, DumpError::DuplicateIdentifiers(2)));
    }

    #[test]
    fn construction_is_deterministic() {
        assert_eq!(sample().records(), sample().records());
    }

    #[test]
    fn counts_labels_and_spot_checks() {
        let index = sample();
        let counts = index.pos_counts();
        assert_eq!(counts.get("Noun"), Some(&1));
        assert_eq!(counts.get("Adjective"), Some(&1));
        assert!(index.spot_check("1", "dyr", "Noun"));
        assert!(!index.spot_check("1", "dyr", "Verb"));
        assert!(!index.spot_check("42", "dyr", "Noun"));
    }

    #[test]
    fn writes_csv_with_expected_columns() {
        let index = LexicalIndex::build(
            &[form("1", "dyr"), form("2", "han")],
            &[pos("1", "Noun"), pos("2", "Pronoun")],
        )
        .unwrap();
        let mut out = Vec::new();
        index.write_csv_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "id,pos,form,pos_id\n1,Noun,dyr,Q1084\n2,Pronoun,han,\n");
    }
}
