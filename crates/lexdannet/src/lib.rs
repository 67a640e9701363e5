pub mod config;
pub mod lexeme;
pub mod matcher;
pub mod operator;
pub mod sparql;
pub mod wikibase;
pub mod wikidata;

pub use config::{Cli, Command};
pub use lexeme::{LexemeCandidate, Sense};
pub use matcher::{MatchDecision, MatchError, Matcher, RunSummary, SkipReason};
pub use operator::{ConsoleOperator, Operator};
pub use sparql::{CandidateSource, SparqlCandidateSource};
pub use wikibase::{LexemeStore, WikibaseClient, WikibaseError};
pub use wikidata::{Claim, ClaimValue, strip_entity_uri};
