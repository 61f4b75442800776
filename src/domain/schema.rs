use std::error::Error;
use std::fmt;
use std::path::Path;

use serde::Deserialize;

use super::claim::EntityId;

const SCHEMA_TOML: &str = include_str!("schema.toml");

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Properties {
    pub part_of_series: String,
    pub series_ordinal: String,
    pub instance_of: String,
    pub origin_country: String,
    pub original_language: String,
    pub publication_date: String,
    pub follows: String,
    pub followed_by: String,
    pub title: String,
    pub season: String,
    pub number_of_episodes: String,
    pub has_parts: String,
    pub catalog_id: String,
    pub stated_in: String,
    pub reference_url: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Items {
    pub anime_tv_episode: EntityId,
    pub japan: EntityId,
    pub japanese: EntityId,
    pub catalog: EntityId,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CatalogSite {
    pub site: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Schema {
    pub properties: Properties,
    pub items: Items,
    pub catalog: CatalogSite,
}

#[derive(Debug)]
pub enum SchemaError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    MissingRole(String),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::Io(err) => write!(f, "unable to read schema file: {}", err),
            SchemaError::Toml(err) => write!(f, "invalid schema TOML: {}", err),
            SchemaError::MissingRole(role) => write!(f, "schema role '{}' has no identifier", role),
        }
    }
}

impl Error for SchemaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SchemaError::Io(err) => Some(err),
            SchemaError::Toml(err) => Some(err),
            SchemaError::MissingRole(_) => None,
        }
    }
}

impl From<std::io::Error> for SchemaError {
    fn from(value: std::io::Error) -> Self {
        SchemaError::Io(value)
    }
}

impl From<toml::de::Error> for SchemaError {
    fn from(value: toml::de::Error) -> Self {
        SchemaError::Toml(value)
    }
}

impl Schema {
    pub fn load(override_path: Option<&Path>) -> Result<Self, SchemaError> {
        match override_path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                Self::from_toml_with_overrides(&raw)
            }
            None => Self::from_toml(SCHEMA_TOML),
        }
    }

    pub(crate) fn from_toml(raw: &str) -> Result<Self, SchemaError> {
        let schema: Schema = toml::from_str(raw)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Overlays a partial schema file on top of the built-in identifiers.
    pub(crate) fn from_toml_with_overrides(raw: &str) -> Result<Self, SchemaError> {
        let mut base: toml::Table = toml::from_str(SCHEMA_TOML)?;
        let overrides: toml::Table = toml::from_str(raw)?;
        for (section, value) in overrides {
            match (base.get_mut(&section), value) {
                (Some(toml::Value::Table(existing)), toml::Value::Table(patch)) => {
                    existing.extend(patch);
                }
                (_, value) => {
                    base.insert(section, value);
                }
            }
        }
        let schema: Schema = toml::Value::Table(base).try_into()?;
        schema.validate()?;
        Ok(schema)
    }

    fn validate(&self) -> Result<(), SchemaError> {
        let p = &self.properties;
        let roles = [
            ("part_of_series", p.part_of_series.as_str()),
            ("series_ordinal", p.series_ordinal.as_str()),
            ("instance_of", p.instance_of.as_str()),
            ("origin_country", p.origin_country.as_str()),
            ("original_language", p.original_language.as_str()),
            ("publication_date", p.publication_date.as_str()),
            ("follows", p.follows.as_str()),
            ("followed_by", p.followed_by.as_str()),
            ("title", p.title.as_str()),
            ("season", p.season.as_str()),
            ("number_of_episodes", p.number_of_episodes.as_str()),
            ("has_parts", p.has_parts.as_str()),
            ("catalog_id", p.catalog_id.as_str()),
            ("stated_in", p.stated_in.as_str()),
            ("reference_url", p.reference_url.as_str()),
            ("anime_tv_episode", self.items.anime_tv_episode.as_str()),
            ("japan", self.items.japan.as_str()),
            ("japanese", self.items.japanese.as_str()),
            ("catalog", self.items.catalog.as_str()),
            ("site", self.catalog.site.as_str()),
        ];
        for (role, id) in roles {
            if id.trim().is_empty() {
                return Err(SchemaError::MissingRole(role.to_string()));
            }
        }
        Ok(())
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::from_toml(SCHEMA_TOML).expect("embedded schema.toml should be valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_schema_targets_wikidata() {
        let schema = Schema::load(None).expect("embedded schema should load");
        assert_eq!(schema.properties.follows, "P155");
        assert_eq!(schema.properties.followed_by, "P156");
        assert_eq!(schema.items.catalog.as_str(), "Q4044680");
        assert_eq!(schema.catalog.site, "https://myanimelist.net");
    }

    #[test]
    fn overrides_replace_only_named_roles() {
        let schema = Schema::from_toml_with_overrides(
            "[properties]\nfollows = \"P9155\"\n\n[catalog]\nsite = \"https://example.test\"\n",
        )
        .expect("override should load");
        assert_eq!(schema.properties.follows, "P9155");
        assert_eq!(schema.properties.followed_by, "P156");
        assert_eq!(schema.catalog.site, "https://example.test");
    }

    #[test]
    fn blank_identifiers_are_rejected() {
        let err = Schema::from_toml_with_overrides("[items]\njapan = \" \"\n")
            .expect_err("blank id should fail");
        assert!(matches!(err, SchemaError::MissingRole(ref role) if role == "japan"));
    }
}
