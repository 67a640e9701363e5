use std::collections::HashMap;
use std::io::Read;

use serde::Deserialize;
use tracing::debug;

use crate::wikibase::WikibaseError;
use crate::wikidata::missing_link_query;

/// Supplies the lexemes that still need a DanNet decision.
pub trait CandidateSource {
    /// Concept URIs (or bare ids) of Danish lexemes without a DanNet 2.2 ID
    /// and without a "missing in" marker, in query order.
    fn fetch_missing_link_candidates(&self) -> Result<Vec<String>, WikibaseError>;
}

#[derive(Deserialize)]
struct BindingValue {
    value: String,
}

#[derive(Deserialize)]
struct SparqlResults {
    bindings: Vec<HashMap<String, BindingValue>>,
}

#[derive(Deserialize)]
struct SparqlResponse {
    results: SparqlResults,
}

/// Candidate source backed by a SPARQL endpoint such as the Wikidata Query
/// Service.
pub struct SparqlCandidateSource {
    agent: ureq::Agent,
    endpoint: String,
}

impl SparqlCandidateSource {
    pub fn new(agent: ureq::Agent, endpoint: impl Into<String>) -> Self {
        Self {
            agent,
            endpoint: endpoint.into(),
        }
    }
}

impl CandidateSource for SparqlCandidateSource {
    fn fetch_missing_link_candidates(&self) -> Result<Vec<String>, WikibaseError> {
        let query = missing_link_query();
        debug!("running query against {}:\n{}", self.endpoint, query);
        let response = self
            .agent
            .get(&self.endpoint)
            .set("Accept", "application/sparql-results+json")
            .query("query", &query)
            .query("format", "json")
            .call()
            .map_err(|err| WikibaseError::Http {
                url: self.endpoint.clone(),
                message: err.to_string(),
            })?;
        parse_bindings(response.into_reader(), "lexeme")
    }
}

/// Values bound to `variable`, skipping rows where it is unbound.
fn parse_bindings(body: impl Read, variable: &str) -> Result<Vec<String>, WikibaseError> {
    let response: SparqlResponse = serde_json::from_reader(body)?;
    Ok(response
        .results
        .bindings
        .into_iter()
        .filter_map(|mut row| row.remove(variable).map(|binding| binding.value))
        .collect())
}
