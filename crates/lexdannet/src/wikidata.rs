//! Wikidata items, properties and edit summaries used by LexDanNet.

use serde_json::json;

/// Danish (language item).
pub const DANISH_LANGUAGE: &str = "Q9035";
/// DanNet 2.2 word ID (external identifier).
pub const DANNET_ID_PROPERTY: &str = "P6140";
/// "missing in" (item).
pub const MISSING_IN_PROPERTY: &str = "P9660";
/// DanNet 2.2 (item).
pub const DANNET_22: &str = "Q123739672";

pub const LINK_SUMMARY: &str = "Added [[Property:P6140]] using [[Wikidata:Tools/LexDanNet]]";
pub const MISSING_IN_SUMMARY: &str =
    "Added [[Property:P9660]]->[[Q123739672]] using [[Wikidata:Tools/LexDanNet]]";

/// Language code of lemmas and glosses.
pub const LEMMA_LANGUAGE: &str = "da";
/// Language code of lexical category labels shown to the operator.
pub const LABEL_LANGUAGE: &str = "en";

pub const ENTITY_URI_MARKER: &str = "/entity/";
pub const LEXEME_URL: &str = "https://www.wikidata.org/wiki/Lexeme:";

pub const DEFAULT_API_URL: &str = "https://www.wikidata.org/w/api.php";
pub const DEFAULT_SPARQL_URL: &str = "https://query.wikidata.org/sparql";

/// Strip a concept URI such as `http://www.wikidata.org/entity/L42` to `L42`.
/// Bare ids pass through unchanged.
pub fn strip_entity_uri(raw: &str) -> &str {
    raw.rsplit_once(ENTITY_URI_MARKER)
        .map(|(_, id)| id)
        .unwrap_or(raw)
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ClaimValue {
    ExternalId(String),
    Item(String),
}

/// A property/value statement to add to an entity.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Claim {
    pub property: String,
    pub value: ClaimValue,
}

impl Claim {
    /// Cross-reference to a DanNet 2.2 word.
    pub fn dannet_id(dannet_id: &str) -> Self {
        Self {
            property: DANNET_ID_PROPERTY.to_string(),
            value: ClaimValue::ExternalId(dannet_id.to_string()),
        }
    }

    /// "missing in DanNet 2.2" marker.
    pub fn missing_in_dannet() -> Self {
        Self {
            property: MISSING_IN_PROPERTY.to_string(),
            value: ClaimValue::Item(DANNET_22.to_string()),
        }
    }

    /// Snak value as JSON text, in the form `wbcreateclaim` expects.
    pub fn value_json(&self) -> String {
        match &self.value {
            ClaimValue::ExternalId(id) => json!(id).to_string(),
            ClaimValue::Item(item) => json!({ "entity-type": "item", "id": item }).to_string(),
        }
    }
}

/// Danish lexemes without a DanNet 2.2 ID and without a "missing in DanNet
/// 2.2" marker.
pub fn missing_link_query() -> String {
    format!(
        "SELECT ?lexeme WHERE {{\n  \
         ?lexeme dct:language wd:{DANISH_LANGUAGE}.\n  \
         FILTER NOT EXISTS {{ ?lexeme wdt:{DANNET_ID_PROPERTY} []. }}\n  \
         FILTER NOT EXISTS {{ ?lexeme wdt:{MISSING_IN_PROPERTY} wd:{DANNET_22}. }}\n\
         }}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_concept_uris() {
        assert_eq!(strip_entity_uri("http://www.wikidata.org/entity/L42"), "L42");
        assert_eq!(strip_entity_uri("https://example.org/a/entity/L7"), "L7");
        assert_eq!(strip_entity_uri("L42"), "L42");
    }

    #[test]
    fn encodes_claim_values() {
        assert_eq!(Claim::dannet_id("11010114").value_json(), "\"11010114\"");
        let marker: serde_json::Value =
            serde_json::from_str(&Claim::missing_in_dannet().value_json()).unwrap();
        assert_eq!(marker["entity-type"], "item");
        assert_eq!(marker["id"], "Q123739672");
        assert_eq!(Claim::missing_in_dannet().property, "P9660");
    }

    #[test]
    fn query_filters_linked_and_marked_lexemes() {
        let query = missing_link_query();
        assert!(query.contains("dct:language wd:Q9035"));
        assert!(query.contains("wdt:P6140 []"));
        assert!(query.contains("wdt:P9660 wd:Q123739672"));
    }
}
