//! Per-lexeme matching against the DanNet index.
//!
//! Each candidate goes through the same steps:
//! 1. Load the lexeme and look up its lemma in the index.
//! 2. No rows: record a "missing in DanNet 2.2" marker and stop.
//! 3. No senses: skip; matching needs at least one sense.
//! 4. Wait until every sense has a Danish gloss, re-reading the lexeme after
//!    each operator confirmation. A re-read without senses is skipped as in 3.
//! 5. Walk the rows in index order. A row is offered to the operator only
//!    when its category equals the lexeme's; the first approved row is
//!    uploaded and ends the search for this lexeme.

use std::fmt;
use std::io;

use dannet_dump::LexicalIndex;
use dannet_types::IndexRecord;
use thiserror::Error;
use tracing::info;

use crate::lexeme::LexemeCandidate;
use crate::operator::Operator;
use crate::wikibase::{LexemeStore, WikibaseError};
use crate::wikidata::{Claim, LINK_SUMMARY, MISSING_IN_SUMMARY, strip_entity_uri};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SkipReason {
    /// The lexeme has no senses to compare glosses against.
    NoSenses,
    /// Every row with the lemma had a different lexical category.
    CategoryMismatch,
}

/// Terminal outcome for one candidate.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MatchDecision {
    LinkUploaded(String),
    NoMatchMarkerUploaded,
    Skipped(SkipReason),
    Rejected,
}

#[derive(Debug, Error)]
pub enum MatchError {
    #[error(transparent)]
    Wikibase(#[from] WikibaseError),
    #[error("operator input failed: {0}")]
    Operator(#[from] io::Error),
}

pub struct Matcher<'a, S: ?Sized, O: ?Sized> {
    index: &'a LexicalIndex,
    store: &'a S,
    operator: &'a mut O,
}

impl<'a, S, O> Matcher<'a, S, O>
where
    S: LexemeStore + ?Sized,
    O: Operator + ?Sized,
{
    pub fn new(index: &'a LexicalIndex, store: &'a S, operator: &'a mut O) -> Self {
        Self {
            index,
            store,
            operator,
        }
    }

    /// Process candidates in order, stopping at the first error.
    pub fn run<I>(&mut self, ids: I) -> Result<RunSummary, MatchError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let ids: Vec<I::Item> = ids.into_iter().collect();
        let mut summary = RunSummary::default();
        for (n, id) in ids.iter().enumerate() {
            info!("processing lexeme {}/{}", n + 1, ids.len());
            let decision = self.process(id.as_ref())?;
            summary.record(&decision);
        }
        Ok(summary)
    }

    /// Take one candidate from loading to a terminal decision.
    pub fn process(&mut self, raw_id: &str) -> Result<MatchDecision, MatchError> {
        let id = strip_entity_uri(raw_id);
        info!("working on {}", id);
        let mut candidate = self.store.fetch_lexeme(id)?;

        let rows = self.index.lookup_form(&candidate.lemma);
        if rows.is_empty() {
            self.upload_missing_in(&candidate)?;
            return Ok(MatchDecision::NoMatchMarkerUploaded);
        }

        if !self.wait_for_glosses(&mut candidate)? {
            println!(
                "No senses on {}, which is not supported. Please add at least one sense. Skipping",
                candidate.entity_url()
            );
            return Ok(MatchDecision::Skipped(SkipReason::NoSenses));
        }
        print_details(&candidate);
        let decision = self.match_rows(&candidate, &rows)?;
        println!("---");
        Ok(decision)
    }

    fn upload_missing_in(&self, candidate: &LexemeCandidate) -> Result<(), MatchError> {
        info!(
            "found no match for lemma '{}' with lexical category {} in DanNet",
            candidate.lemma, candidate.category_label
        );
        println!("Lemma missing in DanNet. Uploading missing in -> DanNet 2.2 statement");
        self.store
            .add_claim(&candidate.id, &Claim::missing_in_dannet(), MISSING_IN_SUMMARY)?;
        println!("Upload successful");
        Ok(())
    }

    /// Block until every sense carries a Danish gloss.
    ///
    /// Returns `false` as soon as the lexeme has no senses, including after
    /// a re-read.
    fn wait_for_glosses(&mut self, candidate: &mut LexemeCandidate) -> Result<bool, MatchError> {
        let missing = candidate.missing_gloss_count();
        if missing > 0 {
            println!("We are missing a Danish gloss on {missing} sense(s)");
        }
        loop {
            if candidate.senses.is_empty() {
                return Ok(false);
            }
            if candidate.missing_gloss_count() == 0 {
                break;
            }
            self.operator.await_glosses(candidate)?;
            *candidate = self.store.fetch_lexeme(&candidate.id)?;
        }
        println!(
            "Hooray, we have Danish glosses for all {} senses!",
            candidate.senses.len()
        );
        Ok(true)
    }

    fn match_rows(
        &mut self,
        candidate: &LexemeCandidate,
        rows: &[&IndexRecord],
    ) -> Result<MatchDecision, MatchError> {
        let mut uploaded: Option<&str> = None;
        let mut rejected = false;

        for (n, row) in rows.iter().enumerate() {
            if uploaded.is_some() {
                println!(
                    "Skipping checking more matches with this lexeme because we already uploaded a DanNet id"
                );
                continue;
            }
            info!(
                "checking row {}/{}: id: {}, pos: {}, pos_qid: {:?}",
                n + 1,
                rows.len(),
                row.id,
                row.pos,
                row.pos_category_id
            );
            if !row.has_category(&candidate.category_id) {
                info!(
                    "found matching lemma but the lexical categories do not add up: \
                     lemma: {}, DanNet: {}, Wikidata: {}",
                    candidate.lemma, row.pos, candidate.category_label
                );
                continue;
            }

            println!("Found category match");
            println!("Match found! See {}", row.dannet_url());
            if self.operator.approve_match(candidate, row)? {
                println!("Match was approved, uploading...");
                self.store
                    .add_claim(&candidate.id, &Claim::dannet_id(&row.id), LINK_SUMMARY)?;
                println!("Upload successful");
                uploaded = Some(row.id.as_str());
            } else {
                println!("Match rejected");
                rejected = true;
            }
        }

        Ok(match uploaded {
            Some(id) => MatchDecision::LinkUploaded(id.to_string()),
            None if rejected => MatchDecision::Rejected,
            None => MatchDecision::Skipped(SkipReason::CategoryMismatch),
        })
    }
}

fn print_details(candidate: &LexemeCandidate) {
    println!(
        "Matching on lemma '{}' with category {} for {}",
        candidate.lemma,
        candidate.category_label,
        candidate.entity_url()
    );
    for sense in &candidate.senses {
        if let Some(gloss) = &sense.gloss {
            println!("Gloss ({}): {gloss}", sense.id);
        }
    }
}

/// Decision counts for a run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RunSummary {
    pub linked: usize,
    pub marked_missing: usize,
    pub skipped_no_senses: usize,
    pub skipped_category: usize,
    pub rejected: usize,
}

impl RunSummary {
    pub fn record(&mut self, decision: &MatchDecision) {
        match decision {
            MatchDecision::LinkUploaded(_) => self.linked += 1,
            MatchDecision::NoMatchMarkerUploaded => self.marked_missing += 1,
            MatchDecision::Skipped(SkipReason::NoSenses) => self.skipped_no_senses += 1,
            MatchDecision::Skipped(SkipReason::CategoryMismatch) => self.skipped_category += 1,
            MatchDecision::Rejected => self.rejected += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.linked
            + self.marked_missing
            + self.skipped_no_senses
            + self.skipped_category
            + self.rejected
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} lexemes: {} linked, {} marked missing, {} without senses, {} category mismatch, {} rejected",
            self.total(),
            self.linked,
            self.marked_missing,
            self.skipped_no_senses,
            self.skipped_category,
            self.rejected
        )
    }
}
