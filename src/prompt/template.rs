//! Prompt templates and variable bindings.
//!
//! A `PromptTemplate` is either fully rendered text or a deferred body with a
//! declared set of required variables. The declared set is checked against
//! the `{{name}}` placeholders in the body when the template is built.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{Result, TripPlanError};

/// A bare variable name, the only expression deferred templates may hold
static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex is valid"));

fn mismatch(message: impl Into<String>) -> TripPlanError {
    TripPlanError::TemplateMismatch(message.into())
}

/// Names of every placeholder in `body`, read the way Handlebars reads it.
///
/// - a single `\` before `{{` makes the braces literal text
/// - a run of two or more backslashes before `{{` leaves the expression live
/// - `{{! ... }}` and `{{!-- ... --}}` are comments
///
/// Any other expression must be a bare identifier; paths, helpers, blocks and
/// triple-stash are rejected with `TemplateMismatch`.
pub fn placeholders(body: &str) -> Result<BTreeSet<String>> {
    let mut found = BTreeSet::new();
    let mut rest = body;

    while let Some(pos) = rest.find(['\\', '{']) {
        let tail = &rest[pos..];

        if tail.starts_with('\\') {
            let run = tail.len() - tail.trim_start_matches('\\').len();
            let after = &tail[run..];
            if run == 1 && after.starts_with("{{") {
                // Escaped: `\{{` and an optional second `{{` are literal
                let skip = if after[2..].starts_with("{{") { 4 } else { 2 };
                rest = &after[skip..];
            } else {
                rest = after;
            }
            continue;
        }

        if !tail.starts_with("{{") {
            rest = &tail[1..];
            continue;
        }

        if let Some(comment) = tail.strip_prefix("{{!--")
            && let Some(end) = comment.find("--}}")
        {
            rest = &comment[end + 4..];
            continue;
        }

        let inner = &tail[2..];
        let end = inner
            .find("}}")
            .ok_or_else(|| mismatch(format!("unclosed expression `{}`", truncate(tail))))?;
        let expression = &inner[..end];
        rest = &inner[end + 2..];

        if expression.starts_with('!') {
            continue;
        }
        let name = expression.trim();
        if !IDENTIFIER_RE.is_match(name) {
            return Err(mismatch(format!(
                "unsupported expression `{{{{{}}}}}`; only bare variable names are allowed",
                expression
            )));
        }
        found.insert(name.to_string());
    }

    Ok(found)
}

fn truncate(text: &str) -> &str {
    match text.char_indices().nth(40) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}

/// Variable name to rendered text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PromptVariables(BTreeMap<String, String>);

impl PromptVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PromptVariables {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut variables = Self::new();
        for (k, v) in iter {
            variables.insert(k, v);
        }
        variables
    }
}

/// A prompt that is either ready to send or still waiting for bindings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptTemplate {
    /// Fully bound text
    Rendered(String),
    /// Body with unbound placeholders
    Deferred {
        body: String,
        required_variables: BTreeSet<String>,
    },
}

impl PromptTemplate {
    pub fn rendered(text: impl Into<String>) -> Self {
        PromptTemplate::Rendered(text.into())
    }

    /// Build a deferred template.
    ///
    /// `required` must name exactly the placeholders present in `body`.
    pub fn deferred(body: impl Into<String>, required: impl IntoIterator<Item = impl Into<String>>) -> Result<Self> {
        let body = body.into();
        let required_variables: BTreeSet<String> = required.into_iter().map(Into::into).collect();
        let found = placeholders(&body)?;

        if found != required_variables {
            let undeclared: Vec<&String> = found.difference(&required_variables).collect();
            let absent: Vec<&String> = required_variables.difference(&found).collect();
            return Err(TripPlanError::TemplateMismatch(format!(
                "placeholders not declared: {:?}; declared but not in body: {:?}",
                undeclared, absent
            )));
        }

        Ok(PromptTemplate::Deferred {
            body,
            required_variables,
        })
    }

    /// Variables that must be bound before rendering; empty once rendered
    pub fn required_variables(&self) -> BTreeSet<&str> {
        match self {
            PromptTemplate::Rendered(_) => BTreeSet::new(),
            PromptTemplate::Deferred { required_variables, .. } => {
                required_variables.iter().map(String::as_str).collect()
            }
        }
    }

    pub fn is_rendered(&self) -> bool {
        matches!(self, PromptTemplate::Rendered(_))
    }

    /// Raw text of the template
    pub fn body(&self) -> &str {
        match self {
            PromptTemplate::Rendered(text) => text,
            PromptTemplate::Deferred { body, .. } => body,
        }
    }

    /// First required variable (in name order) that `variables` does not bind
    pub fn first_missing(&self, variables: &PromptVariables) -> Option<&str> {
        match self {
            PromptTemplate::Rendered(_) => None,
            PromptTemplate::Deferred { required_variables, .. } => required_variables
                .iter()
                .map(String::as_str)
                .find(|name| !variables.contains(name)),
        }
    }
}
