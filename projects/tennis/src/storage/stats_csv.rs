//! `stats.csv`: one row per player, keyed by `IdJogador`.
//!
//! Other pipelines only rely on the `IdJogador` and `NomeJogador` columns, so
//! those are read by header name and the rest of the row is optional.

use std::collections::{HashMap, HashSet};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::serve_stats::PlayerServeStats;

pub const ID_COLUMN: &str = "IdJogador";
pub const NAME_COLUMN: &str = "NomeJogador";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsCsvRow {
    #[serde(rename = "IdJogador")]
    pub player_id: String,
    #[serde(rename = "NomeJogador")]
    pub player_name: String,
    #[serde(rename = "MediaAces", default)]
    pub avg_aces: Option<f64>,
    #[serde(rename = "MediaDuplasFaltas", default)]
    pub avg_double_faults: Option<f64>,
    #[serde(rename = "PctPrimeiroServico", default)]
    pub first_serve_pct: Option<f64>,
    #[serde(rename = "PctPontosPrimeiroServico", default)]
    pub first_serve_points_won_pct: Option<f64>,
    #[serde(rename = "PctPontosSegundoServico", default)]
    pub second_serve_points_won_pct: Option<f64>,
    #[serde(rename = "RatingServico", default)]
    pub serve_rating: Option<f64>,
    #[serde(rename = "PctGamesServicoVencidos", default)]
    pub service_games_won_pct: Option<f64>,
}

impl StatsCsvRow {
    /// `None` when the player has no id or name to key the row by.
    pub fn from_serve_stats(stats: &PlayerServeStats) -> Option<Self> {
        let player_id = stats.player_id.as_deref()?.trim();
        let player_name = stats.name()?.trim();
        if player_id.is_empty() || player_name.is_empty() {
            return None;
        }

        Some(Self {
            player_id: player_id.to_string(),
            player_name: player_name.to_string(),
            avg_aces: stats.avg_aces_match,
            avg_double_faults: stats.avg_dbl_faults_match,
            first_serve_pct: stats.first_serve_pct,
            first_serve_points_won_pct: stats.first_serve_points_won_pct,
            second_serve_points_won_pct: stats.second_serve_points_won_pct,
            serve_rating: stats.serve_rating,
            service_games_won_pct: stats.service_games_won_pct,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub appended: usize,
    pub skipped_duplicates: usize,
    pub skipped_incomplete: usize,
}

#[derive(Debug, Clone)]
pub struct StatsCsv {
    path: PathBuf,
}

impl StatsCsv {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// All rows; a missing file is an empty table.
    pub fn load(&self) -> Result<Vec<StatsCsvRow>, StatsCsvError> {
        if !self.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path).map_err(|source| self.read_error(source))?;
        reader
            .deserialize()
            .collect::<Result<Vec<StatsCsvRow>, _>>()
            .map_err(|source| self.read_error(source))
    }

    /// Appends `row` unless its `IdJogador` is already present.
    pub fn append_unique(&self, row: &StatsCsvRow) -> Result<bool, StatsCsvError> {
        let existing = self.load()?;
        if existing.iter().any(|r| r.player_id == row.player_id) {
            debug!(player_id = %row.player_id, "row already present");
            return Ok(false);
        }

        self.append_rows(std::slice::from_ref(row))?;
        Ok(true)
    }

    /// Appends every complete serve-stats row whose id is not yet in the file.
    pub fn export_serve_stats(&self, players: &[PlayerServeStats]) -> Result<ExportSummary, StatsCsvError> {
        let mut known_ids: Vec<String> = self.load()?.into_iter().map(|r| r.player_id).collect();
        let mut summary = ExportSummary::default();
        let mut pending = Vec::new();

        for stats in players {
            let Some(row) = StatsCsvRow::from_serve_stats(stats) else {
                summary.skipped_incomplete += 1;
                continue;
            };

            if known_ids.iter().any(|id| *id == row.player_id) {
                summary.skipped_duplicates += 1;
                continue;
            }

            known_ids.push(row.player_id.clone());
            pending.push(row);
        }

        self.append_rows(&pending)?;
        summary.appended = pending.len();
        Ok(summary)
    }

    /// Lowercased, trimmed `NomeJogador` values, or `None` when the file or
    /// the column is missing.
    pub fn player_names(&self) -> Result<Option<HashSet<String>>, StatsCsvError> {
        let Some(columns) = self.read_columns(&[NAME_COLUMN])? else {
            return Ok(None);
        };

        Ok(Some(
            columns
                .into_iter()
                .filter_map(|mut values| values.pop())
                .map(|name| name.trim().to_lowercase())
                .filter(|name| !name.is_empty())
                .collect(),
        ))
    }

    /// `IdJogador` to `NomeJogador` for rows where both are filled in.
    pub fn id_to_name(&self) -> Result<HashMap<String, String>, StatsCsvError> {
        let Some(rows) = self.read_columns(&[ID_COLUMN, NAME_COLUMN])? else {
            return Ok(HashMap::new());
        };

        Ok(rows
            .into_iter()
            .filter_map(|values| match values.as_slice() {
                [id, name] if !id.trim().is_empty() && !name.trim().is_empty() => {
                    Some((id.trim().to_string(), name.trim().to_string()))
                }
                _ => None,
            })
            .collect())
    }

    fn read_columns(&self, columns: &[&str]) -> Result<Option<Vec<Vec<String>>>, StatsCsvError> {
        if !self.exists() {
            return Ok(None);
        }

        let mut reader = csv::Reader::from_path(&self.path).map_err(|source| self.read_error(source))?;
        let headers = reader.headers().map_err(|source| self.read_error(source))?.clone();

        let mut positions = Vec::with_capacity(columns.len());
        for column in columns {
            match headers.iter().position(|h| h.trim() == *column) {
                Some(position) => positions.push(position),
                None => return Ok(None),
            }
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|source| self.read_error(source))?;
            rows.push(
                positions
                    .iter()
                    .map(|p| record.get(*p).unwrap_or_default().to_string())
                    .collect(),
            );
        }

        Ok(Some(rows))
    }

    fn append_rows(&self, rows: &[StatsCsvRow]) -> Result<(), StatsCsvError> {
        if rows.is_empty() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StatsCsvError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let needs_header = fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| StatsCsvError::Io {
                path: self.path.clone(),
                source,
            })?;

        let mut writer = csv::WriterBuilder::new().has_headers(needs_header).from_writer(file);
        for row in rows {
            writer.serialize(row).map_err(|source| StatsCsvError::Write {
                path: self.path.clone(),
                source,
            })?;
        }

        writer.flush().map_err(|source| StatsCsvError::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn read_error(&self, source: csv::Error) -> StatsCsvError {
        StatsCsvError::Read {
            path: self.path.clone(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum StatsCsvError {
    #[error("Read({}): {source}", .path.display())]
    Read {
        path: PathBuf,
        source: csv::Error,
    },

    #[error("Write({}): {source}", .path.display())]
    Write {
        path: PathBuf,
        source: csv::Error,
    },

    #[error("Io({}): {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serve_stats(id: &str, name: &str, aces: f64) -> PlayerServeStats {
        PlayerServeStats {
            player_id: Some(id.to_string()),
            player_name_raw: Some(name.to_string()),
            avg_aces_match: Some(aces),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let csv = StatsCsv::new(dir.path().join("stats.csv"));
        assert!(csv.load().unwrap().is_empty());
        assert!(csv.player_names().unwrap().is_none());
        assert!(csv.id_to_name().unwrap().is_empty());
    }

    #[test]
    fn test_append_unique_skips_known_ids() {
        let dir = tempfile::tempdir().unwrap();
        let csv = StatsCsv::new(dir.path().join("clean").join("stats.csv"));
        let row = StatsCsvRow::from_serve_stats(&serve_stats("S0AG", "Jannik Sinner", 8.1)).unwrap();

        assert!(csv.append_unique(&row).unwrap());
        assert!(!csv.append_unique(&row).unwrap());

        let rows = csv.load().unwrap();
        assert_eq!(rows, vec![row]);
        let text = fs::read_to_string(csv.path()).unwrap();
        assert_eq!(text.matches("IdJogador").count(), 1);
    }

    #[test]
    fn test_export_serve_stats_dedupes_within_batch_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let csv = StatsCsv::new(dir.path().join("stats.csv"));
        csv.export_serve_stats(&[serve_stats("A1", "Carlos Alcaraz", 6.0)]).unwrap();

        let summary = csv
            .export_serve_stats(&[
                serve_stats("A1", "Carlos Alcaraz", 6.5),
                serve_stats("D643", "Novak Djokovic", 7.0),
                serve_stats("D643", "Novak Djokovic", 7.0),
                PlayerServeStats { player_name_raw: Some("No Id".into()), ..Default::default() },
            ])
            .unwrap();

        assert_eq!(
            summary,
            ExportSummary { appended: 1, skipped_duplicates: 2, skipped_incomplete: 1 }
        );
        let rows = csv.load().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].avg_aces, Some(6.0));
        assert_eq!(rows[1].player_name, "Novak Djokovic");
    }

    #[test]
    fn test_name_and_id_lookups_read_by_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.csv");
        fs::write(
            &path,
            "Rank,NomeJogador,IdJogador\n1, Jannik Sinner ,S0AG\n2,Carlos Alcaraz,\n3,,X1\n",
        )
        .unwrap();
        let csv = StatsCsv::new(&path);

        let names = csv.player_names().unwrap().unwrap();
        assert!(names.contains("jannik sinner"));
        assert!(names.contains("carlos alcaraz"));
        assert_eq!(names.len(), 2);

        let ids = csv.id_to_name().unwrap();
        assert_eq!(ids.len(), 1);
        assert_eq!(ids["S0AG"], "Jannik Sinner");
    }

    #[test]
    fn test_missing_name_column_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.csv");
        fs::write(&path, "Name,Aces\nJannik Sinner,400\n").unwrap();
        assert!(StatsCsv::new(&path).player_names().unwrap().is_none());
    }
}
