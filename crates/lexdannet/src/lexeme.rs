use crate::wikidata::LEXEME_URL;

/// One sense of a lexeme with its Danish gloss, if any.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Sense {
    pub id: String,
    pub gloss: Option<String>,
}

/// A Danish lexeme as read from Wikidata.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LexemeCandidate {
    pub id: String,
    pub lemma: String,
    pub category_id: String,
    pub category_label: String,
    pub senses: Vec<Sense>,
}

impl LexemeCandidate {
    /// Glosses present on the senses, in sense order.
    pub fn glosses(&self) -> impl Iterator<Item = &str> + '_ {
        self.senses.iter().filter_map(|sense| sense.gloss.as_deref())
    }

    /// Senses that still lack a Danish gloss.
    pub fn missing_gloss_count(&self) -> usize {
        self.senses.len() - self.glosses().count()
    }

    pub fn entity_url(&self) -> String {
        format!("{LEXEME_URL}{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_missing_glosses() {
        let candidate = LexemeCandidate {
            id: "L1".into(),
            senses: vec![
                Sense {
                    id: "L1-S1".into(),
                    gloss: Some("levende væsen".into()),
                },
                Sense {
                    id: "L1-S2".into(),
                    gloss: None,
                },
            ],
            ..Default::default()
        };
        assert_eq!(candidate.missing_gloss_count(), 1);
        assert_eq!(candidate.glosses().collect::<Vec<_>>(), ["levende væsen"]);
        assert_eq!(
            candidate.entity_url(),
            "https://www.wikidata.org/wiki/Lexeme:L1"
        );
    }
}
