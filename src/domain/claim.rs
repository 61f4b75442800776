use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use time::Date;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimePrecision {
    Day,
    Month,
    Year,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Value {
    Entity {
        id: EntityId,
    },
    String {
        value: String,
    },
    Quantity {
        amount: i64,
    },
    Time {
        #[serde(with = "iso_date")]
        date: Date,
        precision: TimePrecision,
    },
    Monolingual {
        text: String,
        language: String,
    },
}

impl Value {
    pub fn entity(id: &EntityId) -> Self {
        Value::Entity { id: id.clone() }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Value::String {
            value: value.into(),
        }
    }

    pub fn quantity(amount: i64) -> Self {
        Value::Quantity { amount }
    }

    pub fn day(date: Date) -> Self {
        Value::Time {
            date,
            precision: TimePrecision::Day,
        }
    }

    pub fn monolingual(text: impl Into<String>, language: impl Into<String>) -> Self {
        Value::Monolingual {
            text: text.into(),
            language: language.into(),
        }
    }

    pub fn as_entity(&self) -> Option<&EntityId> {
        match self {
            Value::Entity { id } => Some(id),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::String { value } => Some(value),
            _ => None,
        }
    }

    pub fn as_quantity(&self) -> Option<i64> {
        match self {
            Value::Quantity { amount } => Some(*amount),
            _ => None,
        }
    }
}

/// A property slot that either carries a value or asserts that none exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "snak", rename_all = "snake_case")]
pub enum Snak {
    Value { value: Value },
    NoValue,
}

impl Snak {
    pub fn value(&self) -> Option<&Value> {
        match self {
            Snak::Value { value } => Some(value),
            Snak::NoValue => None,
        }
    }
}

impl From<Value> for Snak {
    fn from(value: Value) -> Self {
        Snak::Value { value }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Qualifier {
    pub property: String,
    #[serde(flatten)]
    pub snak: Snak,
}

impl Qualifier {
    pub fn new(property: impl Into<String>, snak: impl Into<Snak>) -> Self {
        Self {
            property: property.into(),
            snak: snak.into(),
        }
    }

    pub fn no_value(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            snak: Snak::NoValue,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceSnak {
    pub property: String,
    pub value: Value,
    /// Participates in deciding whether an existing reference is the same citation.
    #[serde(default)]
    pub match_key: bool,
}

/// URL prefix that identifies a citation regardless of its other snaks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlMatch {
    pub property: String,
    pub prefix: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub snaks: Vec<ReferenceSnak>,
    /// Only meaningful on submission; never persisted.
    #[serde(skip)]
    pub url_match: Option<UrlMatch>,
}

impl Reference {
    pub fn contains(&self, property: &str, value: &Value) -> bool {
        self.snaks
            .iter()
            .any(|snak| snak.property == property && &snak.value == value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub property: String,
    #[serde(flatten)]
    pub snak: Snak,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub qualifiers: Vec<Qualifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<Reference>,
    /// Only meaningful on submission; never persisted.
    #[serde(skip)]
    pub skip_if_conflicting: bool,
}

impl Claim {
    pub fn new(property: impl Into<String>, value: Value) -> Self {
        Self {
            property: property.into(),
            snak: Snak::Value { value },
            qualifiers: Vec::new(),
            references: Vec::new(),
            skip_if_conflicting: false,
        }
    }

    pub fn no_value(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            snak: Snak::NoValue,
            qualifiers: Vec::new(),
            references: Vec::new(),
            skip_if_conflicting: false,
        }
    }

    pub fn with_qualifier(mut self, qualifier: Qualifier) -> Self {
        self.qualifiers.push(qualifier);
        self
    }

    pub fn skip_if_conflicting(mut self) -> Self {
        self.skip_if_conflicting = true;
        self
    }

    pub fn value(&self) -> Option<&Value> {
        self.snak.value()
    }

    pub fn qualifier(&self, property: &str) -> Option<&Qualifier> {
        self.qualifiers.iter().find(|q| q.property == property)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDraft {
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub descriptions: BTreeMap<String, String>,
    #[serde(default)]
    pub claims: Vec<Claim>,
}

impl EntityDraft {
    pub fn label(&self, language: &str) -> Option<&str> {
        self.labels.get(language).map(String::as_str)
    }

    pub fn push_alias(&mut self, language: &str, alias: String) {
        let list = self.aliases.entry(language.to_string()).or_default();
        if !list.contains(&alias) {
            list.push(alias);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    #[serde(flatten)]
    pub body: EntityDraft,
}

impl Entity {
    pub fn label(&self, language: &str) -> Option<&str> {
        self.body.label(language)
    }

    pub fn claims<'a>(&'a self, property: &'a str) -> impl Iterator<Item = &'a Claim> + 'a {
        self.body
            .claims
            .iter()
            .filter(move |claim| claim.property == property)
    }

    pub fn first_claim(&self, property: &str) -> Option<&Claim> {
        self.body
            .claims
            .iter()
            .find(|claim| claim.property == property)
    }
}

const DATE_FORMAT: &str = "[year]-[month]-[day]";

mod iso_date {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    use super::DATE_FORMAT;

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        let format =
            time::format_description::parse(DATE_FORMAT).map_err(serde::ser::Error::custom)?;
        let text = date.format(&format).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_iso_date(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{raw}'")))
    }
}

pub fn parse_iso_date(raw: &str) -> Option<Date> {
    let format = time::format_description::parse(DATE_FORMAT).ok()?;
    Date::parse(raw, &format).ok()
}
