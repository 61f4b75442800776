use serde::Deserialize;
use time::format_description::well_known::Rfc3339;
use time::{Date, OffsetDateTime};

use crate::domain::claim::parse_iso_date;

use super::CatalogError;

/// One catalog episode, normalized. Ordinals are 1-based and dense across pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeRecord {
    pub ordinal: u32,
    pub title_primary: String,
    pub title_native: Option<String>,
    pub title_romanized: Option<String>,
    pub air_date: Option<Date>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawPagination {
    last_visible_page: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct RawEpisode {
    title: String,
    #[serde(default)]
    title_japanese: Option<String>,
    #[serde(default)]
    title_romanji: Option<String>,
    #[serde(default)]
    aired: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawPage {
    #[serde(default)]
    pagination: Option<RawPagination>,
    #[serde(default)]
    data: Option<Vec<RawEpisode>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPage {
    /// Only the first page's value is used.
    pub last_page: Option<u32>,
    pub records: Vec<EpisodeRecord>,
}

/// Decodes one page body. `preceding` is the number of records already
/// collected from earlier pages, so ordinals continue where they left off.
pub fn decode_page(body: &str, preceding: usize) -> Result<DecodedPage, CatalogError> {
    let page: RawPage = serde_json::from_str(body)
        .map_err(|err| CatalogError::Malformed(format!("invalid page JSON: {}", err)))?;
    let rows = page
        .data
        .ok_or_else(|| CatalogError::Malformed("page has no data array".to_string()))?;
    let last_page = page
        .pagination
        .map(|pagination| pagination.last_visible_page.max(1));

    let mut records = Vec::with_capacity(rows.len());
    for (index, row) in rows.into_iter().enumerate() {
        let ordinal = u32::try_from(preceding + index + 1)
            .map_err(|_| CatalogError::Malformed("episode ordinal overflow".to_string()))?;
        records.push(normalize(ordinal, row)?);
    }
    Ok(DecodedPage {
        last_page,
        records,
    })
}

fn normalize(ordinal: u32, row: RawEpisode) -> Result<EpisodeRecord, CatalogError> {
    let air_date = match non_empty(row.aired) {
        Some(raw) => Some(parse_air_date(&raw).ok_or_else(|| {
            CatalogError::Malformed(format!("episode {}: invalid aired date '{}'", ordinal, raw))
        })?),
        None => None,
    };
    Ok(EpisodeRecord {
        ordinal,
        title_primary: row.title,
        title_native: non_empty(row.title_japanese),
        title_romanized: non_empty(row.title_romanji),
        air_date,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

fn parse_air_date(raw: &str) -> Option<Date> {
    let raw = raw.trim();
    OffsetDateTime::parse(raw, &Rfc3339)
        .map(|ts| ts.date())
        .ok()
        .or_else(|| parse_iso_date(raw))
}
