//! Audience composition

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use super::state::PushPayloadState;
use crate::domain::platform::{all_platforms, AudienceType};

/// One audience sub-expression: a token list or a selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    /// Identifier key or audience type name
    pub key: &'static str,
    pub values: Vec<String>,
}

/// Generated audience: a single clause, or several joined by OR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudienceExpr {
    Clause(Clause),
    Or(Vec<Clause>),
}

impl Serialize for Clause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.key, &self.values)?;
        map.end()
    }
}

impl Serialize for AudienceExpr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AudienceExpr::Clause(clause) => clause.serialize(serializer),
            AudienceExpr::Or(clauses) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("OR", clauses)?;
                map.end()
            }
        }
    }
}

impl From<Clause> for Value {
    fn from(clause: Clause) -> Self {
        let mut map = serde_json::Map::new();
        map.insert(clause.key.to_string(), clause.values.into());
        Value::Object(map)
    }
}

impl From<AudienceExpr> for Value {
    fn from(expr: AudienceExpr) -> Self {
        match expr {
            AudienceExpr::Clause(clause) => clause.into(),
            AudienceExpr::Or(clauses) => {
                let list: Vec<Value> = clauses.into_iter().map(Value::from).collect();
                let mut map = serde_json::Map::new();
                map.insert("OR".to_string(), Value::Array(list));
                Value::Object(map)
            }
        }
    }
}

/// Compose the audience from token and selector groups.
///
/// Clauses are ordered platforms first (registry order), then selector
/// types alphabetically. Returns `None` when every group is empty.
pub fn compose_audience(state: &PushPayloadState) -> Option<AudienceExpr> {
    let platform_clauses = all_platforms().iter().filter_map(|d| {
        let tokens = state.tokens(d.id);
        (!tokens.is_empty()).then(|| Clause {
            key: d.identifier_key,
            values: tokens.to_vec(),
        })
    });

    let selector_clauses = AudienceType::ALL.into_iter().filter_map(|t| {
        let selectors = state.selectors(t);
        (!selectors.is_empty()).then(|| Clause {
            key: t.as_str(),
            values: selectors.to_vec(),
        })
    });

    let mut clauses: Vec<Clause> = platform_clauses.chain(selector_clauses).collect();

    match clauses.len() {
        0 => None,
        1 => clauses.pop().map(AudienceExpr::Clause),
        _ => Some(AudienceExpr::Or(clauses)),
    }
}
