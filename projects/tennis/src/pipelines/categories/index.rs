use std::collections::HashMap;
use std::str::FromStr;

use interfaces_rapidapi_ultimate_tennis::index::{ACES, BREAK_POINTS_CONVERTED, FIRST_SERVE, SERVICE_GAMES_WON};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::sources::{SourceError, StatsFeed};
use crate::utils::json::{lenient_f64, string_field};

pub const DEFAULT_CATEGORY_YEAR: &str = "2023";

/// Season-wide categories with a cut-off a player must beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatCategory {
    BreakPointsConverted,
    ServiceGamesWon,
    Aces,
    FirstServe,
}

impl StatCategory {
    pub const ALL: [StatCategory; 4] = [
        StatCategory::BreakPointsConverted,
        StatCategory::ServiceGamesWon,
        StatCategory::Aces,
        StatCategory::FirstServe,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            StatCategory::BreakPointsConverted => "break-points-converted",
            StatCategory::ServiceGamesWon => "service-games-won",
            StatCategory::Aces => "aces",
            StatCategory::FirstServe => "first-serve",
        }
    }

    /// Path segment of the global player stats endpoint.
    pub fn api_category(self) -> &'static str {
        match self {
            StatCategory::BreakPointsConverted => BREAK_POINTS_CONVERTED,
            StatCategory::ServiceGamesWon => SERVICE_GAMES_WON,
            StatCategory::Aces => ACES,
            StatCategory::FirstServe => FIRST_SERVE,
        }
    }

    pub fn value_column(self) -> &'static str {
        match self {
            StatCategory::BreakPointsConverted | StatCategory::ServiceGamesWon => "Percentage",
            StatCategory::Aces => "Aces",
            StatCategory::FirstServe => "1st Serve percentage",
        }
    }

    pub fn default_threshold(self) -> f64 {
        match self {
            StatCategory::BreakPointsConverted => 40.18,
            StatCategory::ServiceGamesWon => 82.39,
            StatCategory::Aces => 207.0,
            StatCategory::FirstServe => 64.0,
        }
    }
}

impl FromStr for StatCategory {
    type Err = UnknownCategoryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_lowercase();
        StatCategory::ALL
            .into_iter()
            .find(|category| category.slug() == wanted)
            .ok_or(UnknownCategoryError { category: value.to_string() })
    }
}

#[derive(Debug, Error)]
#[error("UnknownCategory: {category}")]
pub struct UnknownCategoryError {
    pub category: String,
}

#[derive(Debug, Error)]
pub enum FetchCategoryError {
    #[error("CategoryRequest: {source}")]
    Request {
        #[from]
        source: SourceError,
    },

    #[error("CategoryDataMissing: {category}")]
    DataMissing {
        category: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRow {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryTable {
    pub category: StatCategory,
    pub rows: Vec<CategoryRow>,
}

/// Players present in every joined table with their value in each, in the
/// order of the first table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinedRow {
    pub name: String,
    pub values: Vec<f64>,
}

/// Parses the `data` list of a category payload. Rows without a `Name` or a
/// parseable value are skipped.
pub fn parse_category_table(category: StatCategory, payload: &Value) -> Result<CategoryTable, FetchCategoryError> {
    let items = payload
        .get("data")
        .and_then(Value::as_array)
        .ok_or(FetchCategoryError::DataMissing { category: category.slug() })?;

    let column = category.value_column();
    let rows = items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|item| {
            let name = string_field(item, "Name");
            let value = item.get(column).and_then(lenient_f64);
            match (name, value) {
                (Some(name), Some(value)) => Some(CategoryRow { name, value }),
                _ => {
                    warn!("Skipping {} row without a usable Name or {column}", category.slug());
                    None
                }
            }
        })
        .collect();

    Ok(CategoryTable { category, rows })
}

pub async fn fetch_category_table(
    feed: &dyn StatsFeed,
    category: StatCategory,
    year: &str,
) -> Result<CategoryTable, FetchCategoryError> {
    info!("Fetching {} statistics for {year}", category.slug());
    let payload = feed.global_player_stats(category.api_category(), year).await?;
    let table = parse_category_table(category, &payload)?;
    info!("{} {} rows parsed", table.rows.len(), category.slug());
    Ok(table)
}

/// Rows strictly above `threshold`.
pub fn filter_above(table: &CategoryTable, threshold: f64) -> CategoryTable {
    CategoryTable {
        category: table.category,
        rows: table.rows.iter().filter(|row| row.value > threshold).cloned().collect(),
    }
}

/// Inner join on `Name`. A name repeated within one table keeps its first
/// value.
pub fn join_by_name(tables: &[CategoryTable]) -> Vec<JoinedRow> {
    let Some((first, rest)) = tables.split_first() else {
        return Vec::new();
    };

    let lookups: Vec<HashMap<&str, f64>> = rest
        .iter()
        .map(|table| {
            let mut lookup = HashMap::new();
            for row in &table.rows {
                lookup.entry(row.name.as_str()).or_insert(row.value);
            }
            lookup
        })
        .collect();

    first
        .rows
        .iter()
        .filter_map(|row| {
            let mut values = vec![row.value];
            for lookup in &lookups {
                values.push(*lookup.get(row.name.as_str())?);
            }
            Some(JoinedRow { name: row.name.clone(), values })
        })
        .collect()
}
