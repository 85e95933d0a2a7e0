//! Stockage CSV : `tour, n1..n6, bonus`, une ligne par tirage.
//!
//! Adaptateur tolérant : c'est le seul endroit où l'on accepte une ligne
//! d'en-tête optionnelle, des séparateurs de milliers dans le tour (`"1,234"`),
//! des colonnes supplémentaires après le bonus et des lignes vides. Toute
//! ligne normalisée passe ensuite par le parseur strict.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::HistoryError;
use crate::models::{Draw, HistoryTable};
use crate::parse::{parse_draw_fields, FIELD_COUNT};
use crate::store::DrawStore;

pub const CSV_HEADER: [&str; FIELD_COUNT] = ["round", "n1", "n2", "n3", "n4", "n5", "n6", "bonus"];

pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DrawStore for CsvStore {
    fn load(&self) -> Result<HistoryTable, HistoryError> {
        HistoryTable::new(read_draws_lenient(&self.path)?)
    }

    fn append(&self, draw: &Draw) -> Result<(), HistoryError> {
        let existing = if self.path.exists() {
            self.load()?
        } else {
            HistoryTable::default()
        };
        if existing.contains_round(draw.round) {
            return Err(HistoryError::DuplicateRound(draw.round));
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let current = std::fs::read(&self.path).unwrap_or_default();
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        if !current.is_empty() && !current.ends_with(b"\n") {
            file.write_all(b"\n")?;
        }

        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        if current.iter().all(|b| b.is_ascii_whitespace()) {
            writer.write_record(CSV_HEADER)?;
        }
        let mut record: Vec<String> = Vec::with_capacity(FIELD_COUNT);
        record.push(draw.round.to_string());
        record.extend(draw.numbers.iter().map(|n| n.to_string()));
        record.push(draw.bonus.to_string());
        writer.write_record(&record)?;
        writer.flush()?;

        debug!(round = draw.round, path = %self.path.display(), "tirage ajouté au CSV");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("CSV {}", self.path.display())
    }
}

/// Lit un fichier CSV d'historique, avec ou sans en-tête.
pub fn read_draws_lenient(path: &Path) -> Result<Vec<Draw>, HistoryError> {
    if !path.exists() {
        return Err(HistoryError::unavailable(
            path.display().to_string(),
            "fichier introuvable",
        ));
    }
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| HistoryError::unavailable(path.display().to_string(), e))?;
    read_records(reader)
}

fn read_records<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<Draw>, HistoryError> {
    let mut draws: Vec<Draw> = Vec::new();
    let mut seen: HashMap<u32, (Draw, u64)> = HashMap::new();
    let mut first_row = true;

    for record_result in reader.records() {
        // Une ligne illisible (UTF-8 invalide...) reste une ligne invalide.
        let record = record_result.map_err(|e| match e.position().map(|p| p.line()) {
            Some(line) => HistoryError::malformed(line, e.to_string()),
            None => HistoryError::Csv(e),
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if record.iter().all(|f| f.is_empty()) {
            continue;
        }

        let mut fields: Vec<String> = record.iter().map(normalize_field).collect();

        if first_row {
            first_row = false;
            if is_header(&fields) {
                debug!(line, "ligne d'en-tête ignorée");
                continue;
            }
        }

        // Colonnes en trop (dates, gains...) après le bonus : ignorées.
        if fields.len() > FIELD_COUNT {
            fields.truncate(FIELD_COUNT);
        }

        let draw = parse_draw_fields(&fields, line)?;
        match seen.get(&draw.round) {
            Some((previous, _)) if *previous == draw => {
                warn!(round = draw.round, line, "tirage en double identique, ignoré");
            }
            Some((_, previous_line)) => {
                return Err(HistoryError::malformed(
                    line,
                    format!(
                        "le tirage {} contredit la ligne {}",
                        draw.round, previous_line
                    ),
                ));
            }
            None => {
                seen.insert(draw.round, (draw, line));
                draws.push(draw);
            }
        }
    }

    Ok(draws)
}

fn normalize_field(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.chars().all(|c| c.is_ascii_digit() || c == ',') && trimmed.contains(',') {
        trimmed.replace(',', "")
    } else {
        trimmed.to_string()
    }
}

/// En-tête : tour et bonus non numériques (`round,..,bonus`, `회차,1,..,6,보너스`).
/// Une première ligne au tour mal saisi reste une donnée, donc une erreur.
fn is_header(fields: &[String]) -> bool {
    let non_numeric = |f: &String| f.parse::<u64>().is_err();
    fields.len() >= FIELD_COUNT && non_numeric(&fields[0]) && non_numeric(&fields[FIELD_COUNT - 1])
}
