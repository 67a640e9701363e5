//! Minimal Wikibase action API client: bot-password login, lexeme reads and
//! claim writes.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Read;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::lexeme::{LexemeCandidate, Sense};
use crate::wikidata::{Claim, LABEL_LANGUAGE, LEMMA_LANGUAGE};

#[derive(Debug, Error)]
pub enum WikibaseError {
    #[error("request to {url} failed: {message}")]
    Http { url: String, message: String },
    #[error("api error {code}: {info}")]
    Api { code: String, info: String },
    #[error("login failed: {0}")]
    Login(String),
    #[error("entity {0} does not exist")]
    MissingEntity(String),
    #[error("lexeme {id} has no lemma in language {language}")]
    MissingLemma { id: String, language: &'static str },
    #[error("lexeme {0} has no lexical category")]
    MissingCategory(String),
    #[error("item {id} has no label in language {language}")]
    MissingLabel { id: String, language: &'static str },
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Read and write access to lexemes in the knowledge base.
pub trait LexemeStore {
    /// Load a lexeme with its Danish lemma, category and senses.
    fn fetch_lexeme(&self, id: &str) -> Result<LexemeCandidate, WikibaseError>;
    /// Add `claim` to entity `id` with an edit summary.
    fn add_claim(&self, id: &str, claim: &Claim, summary: &str) -> Result<(), WikibaseError>;
}

#[derive(Deserialize)]
struct ApiErrorJson {
    code: String,
    #[serde(default)]
    info: String,
}

#[derive(Deserialize)]
struct TermJson {
    value: String,
}

#[derive(Deserialize)]
struct SenseJson {
    id: String,
    #[serde(default)]
    glosses: HashMap<String, TermJson>,
}

#[derive(Deserialize)]
struct EntityJson {
    #[serde(default)]
    missing: Option<String>,
    #[serde(default)]
    lemmas: HashMap<String, TermJson>,
    #[serde(default, rename = "lexicalCategory")]
    lexical_category: Option<String>,
    #[serde(default)]
    senses: Vec<SenseJson>,
    #[serde(default)]
    labels: HashMap<String, TermJson>,
}

#[derive(Deserialize)]
struct EntitiesResponse {
    #[serde(default)]
    entities: HashMap<String, EntityJson>,
    error: Option<ApiErrorJson>,
}

#[derive(Deserialize)]
struct TokensJson {
    logintoken: Option<String>,
    csrftoken: Option<String>,
}

#[derive(Deserialize)]
struct TokenQueryJson {
    tokens: TokensJson,
}

#[derive(Deserialize)]
struct TokenResponse {
    query: Option<TokenQueryJson>,
    error: Option<ApiErrorJson>,
}

#[derive(Deserialize)]
struct LoginJson {
    result: String,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Deserialize)]
struct LoginResponse {
    login: Option<LoginJson>,
    error: Option<ApiErrorJson>,
}

#[derive(Deserialize)]
struct WriteResponse {
    success: Option<u8>,
    error: Option<ApiErrorJson>,
}

fn api_error(error: ApiErrorJson) -> WikibaseError {
    WikibaseError::Api {
        code: error.code,
        info: error.info,
    }
}

/// Logged-in session against one Wikibase API endpoint.
///
/// The agent carries the session cookies; labels of lexical category items
/// are cached for the lifetime of the client.
pub struct WikibaseClient {
    agent: ureq::Agent,
    api_url: String,
    csrf_token: String,
    labels: RefCell<HashMap<String, String>>,
}

impl WikibaseClient {
    /// Log in with a bot password and fetch an edit token.
    pub fn login(
        agent: ureq::Agent,
        api_url: &str,
        user: &str,
        password: &str,
    ) -> Result<Self, WikibaseError> {
        let body = api_get(
            &agent,
            api_url,
            &[("action", "query"), ("meta", "tokens"), ("type", "login")],
        )?;
        let login_token = parse_token(&body, |t| t.logintoken)?;

        let body = api_post(
            &agent,
            api_url,
            &[
                ("action", "login"),
                ("lgname", user),
                ("lgpassword", password),
                ("lgtoken", login_token.as_str()),
            ],
        )?;
        parse_login(&body)?;

        let body = api_get(&agent, api_url, &[("action", "query"), ("meta", "tokens")])?;
        let csrf_token = parse_token(&body, |t| t.csrftoken)?;
        debug!("logged in to {} as {}", api_url, user);

        Ok(Self {
            agent,
            api_url: api_url.to_string(),
            csrf_token,
            labels: RefCell::new(HashMap::new()),
        })
    }

    /// English label of an item, used for lexical categories.
    pub fn item_label(&self, id: &str) -> Result<String, WikibaseError> {
        if let Some(label) = self.labels.borrow().get(id) {
            return Ok(label.clone());
        }
        let body = api_get(
            &self.agent,
            &self.api_url,
            &[
                ("action", "wbgetentities"),
                ("ids", id),
                ("props", "labels"),
                ("languages", LABEL_LANGUAGE),
            ],
        )?;
        let label = parse_label(&body, id)?;
        self.labels
            .borrow_mut()
            .insert(id.to_string(), label.clone());
        Ok(label)
    }
}

impl LexemeStore for WikibaseClient {
    fn fetch_lexeme(&self, id: &str) -> Result<LexemeCandidate, WikibaseError> {
        let body = api_get(
            &self.agent,
            &self.api_url,
            &[("action", "wbgetentities"), ("ids", id)],
        )?;
        let mut candidate = parse_lexeme(&body, id)?;
        candidate.category_label = self.item_label(&candidate.category_id)?;
        Ok(candidate)
    }

    fn add_claim(&self, id: &str, claim: &Claim, summary: &str) -> Result<(), WikibaseError> {
        let value = claim.value_json();
        let body = api_post(
            &self.agent,
            &self.api_url,
            &[
                ("action", "wbcreateclaim"),
                ("entity", id),
                ("property", claim.property.as_str()),
                ("snaktype", "value"),
                ("value", value.as_str()),
                ("summary", summary),
                ("token", self.csrf_token.as_str()),
            ],
        )?;
        parse_write(&body, id)
    }
}

fn api_get(
    agent: &ureq::Agent,
    url: &str,
    params: &[(&str, &str)],
) -> Result<String, WikibaseError> {
    let mut request = agent.get(url).query("format", "json");
    for (key, value) in params {
        request = request.query(key, value);
    }
    let response = request.call().map_err(|err| WikibaseError::Http {
        url: url.to_string(),
        message: err.to_string(),
    })?;
    read_body(response)
}

fn api_post(
    agent: &ureq::Agent,
    url: &str,
    params: &[(&str, &str)],
) -> Result<String, WikibaseError> {
    let mut form = Vec::with_capacity(params.len() + 1);
    form.push(("format", "json"));
    form.extend_from_slice(params);
    let response = agent
        .post(url)
        .send_form(&form)
        .map_err(|err| WikibaseError::Http {
            url: url.to_string(),
            message: err.to_string(),
        })?;
    read_body(response)
}

/// Whole response body; `Response::into_string` stops at 10 MiB.
fn read_body(response: ureq::Response) -> Result<String, WikibaseError> {
    let mut body = String::new();
    response.into_reader().read_to_string(&mut body)?;
    Ok(body)
}

fn parse_token(
    body: &str,
    pick: impl FnOnce(TokensJson) -> Option<String>,
) -> Result<String, WikibaseError> {
    let response: TokenResponse = serde_json::from_str(body)?;
    if let Some(error) = response.error {
        return Err(api_error(error));
    }
    response
        .query
        .and_then(|q| pick(q.tokens))
        .ok_or_else(|| WikibaseError::Login("token missing from response".to_string()))
}

fn parse_login(body: &str) -> Result<(), WikibaseError> {
    let response: LoginResponse = serde_json::from_str(body)?;
    if let Some(error) = response.error {
        return Err(api_error(error));
    }
    match response.login {
        Some(login) if login.result == "Success" => Ok(()),
        Some(login) => Err(WikibaseError::Login(login.reason.unwrap_or(login.result))),
        None => Err(WikibaseError::Login("no login result".to_string())),
    }
}

/// Check a `wbcreateclaim` response for `entity`.
fn parse_write(body: &str, entity: &str) -> Result<(), WikibaseError> {
    let response: WriteResponse = serde_json::from_str(body)?;
    if let Some(error) = response.error {
        return Err(api_error(error));
    }
    if response.success != Some(1) {
        return Err(WikibaseError::Api {
            code: "no-success".to_string(),
            info: format!("wbcreateclaim on {entity} did not report success"),
        });
    }
    Ok(())
}

fn parse_entity(body: &str, id: &str) -> Result<EntityJson, WikibaseError> {
    let mut response: EntitiesResponse = serde_json::from_str(body)?;
    if let Some(error) = response.error {
        return Err(api_error(error));
    }
    match response.entities.remove(id) {
        Some(entity) if entity.missing.is_none() => Ok(entity),
        _ => Err(WikibaseError::MissingEntity(id.to_string())),
    }
}

/// Build a candidate from a `wbgetentities` response. The category label is
/// left empty; [`WikibaseClient`] fills it in with a separate lookup.
pub(crate) fn parse_lexeme(body: &str, id: &str) -> Result<LexemeCandidate, WikibaseError> {
    let mut entity = parse_entity(body, id)?;
    let lemma = entity
        .lemmas
        .remove(LEMMA_LANGUAGE)
        .map(|term| term.value)
        .ok_or_else(|| WikibaseError::MissingLemma {
            id: id.to_string(),
            language: LEMMA_LANGUAGE,
        })?;
    let category_id = entity
        .lexical_category
        .ok_or_else(|| WikibaseError::MissingCategory(id.to_string()))?;
    let senses = entity
        .senses
        .into_iter()
        .map(|mut sense| Sense {
            id: sense.id,
            gloss: sense.glosses.remove(LEMMA_LANGUAGE).map(|term| term.value),
        })
        .collect();

    Ok(LexemeCandidate {
        id: id.to_string(),
        lemma,
        category_id,
        category_label: String::new(),
        senses,
    })
}

fn parse_label(body: &str, id: &str) -> Result<String, WikibaseError> {
    let mut entity = parse_entity(body, id)?;
    entity
        .labels
        .remove(LABEL_LANGUAGE)
        .map(|term| term.value)
        .ok_or_else(|| WikibaseError::MissingLabel {
            id: id.to_string(),
            language: LABEL_LANGUAGE,
        })
}
