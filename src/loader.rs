use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::LoadError;
use crate::models::{normalize_status, Dataset, GoalRecord, Status, TicketRecord};

const TICKET_COLUMNS: [&str; 6] = ["NOTA", "ABERTURA", "STATUS", "SAW", "CONTRATO", "EC"];
const GOAL_COLUMNS: [&str; 2] = ["CONTRATO", "META OTD (%)"];

const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// The two tables a dashboard is computed from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataSource {
    pub tickets: PathBuf,
    pub goals: PathBuf,
}

/// Datasets loaded so far, keyed by source. Filled on first access to a
/// source and kept until the process exits.
static DATASETS: Lazy<Mutex<HashMap<DataSource, Arc<Dataset>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Returns the dataset for `source`, reading it only on the first call.
/// Failed reads are not cached.
pub fn load(source: &DataSource) -> Result<Arc<Dataset>, LoadError> {
    let mut cache = DATASETS.lock().unwrap_or_else(PoisonError::into_inner);

    if let Some(dataset) = cache.get(source) {
        debug!(tickets = %source.tickets.display(), "dataset served from cache");
        return Ok(Arc::clone(dataset));
    }

    let dataset = Arc::new(read_dataset(source)?);
    cache.insert(source.clone(), Arc::clone(&dataset));
    Ok(dataset)
}

pub fn read_dataset(source: &DataSource) -> Result<Dataset, LoadError> {
    let tickets = read_tickets(&source.tickets)?;
    let goals = read_goals(&source.goals)?;

    info!(
        tickets = tickets.len(),
        goals = goals.len(),
        "loaded OTD dataset from {}",
        source.tickets.display()
    );

    Ok(Dataset { tickets, goals })
}

pub fn read_tickets(path: &Path) -> Result<Vec<TicketRecord>, LoadError> {
    #[derive(Deserialize)]
    struct CsvRow {
        #[serde(rename = "NOTA")]
        note: Option<String>,
        #[serde(rename = "ABERTURA")]
        opened_at: Option<String>,
        #[serde(rename = "STATUS")]
        status: Option<String>,
        #[serde(rename = "SAW")]
        dealer: Option<String>,
        #[serde(rename = "CONTRATO")]
        contract: Option<String>,
        #[serde(rename = "EC")]
        specialist: Option<String>,
    }

    let mut reader = open(path, &TICKET_COLUMNS)?;
    let mut tickets = Vec::new();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.map_err(|source| LoadError::SourceRead {
            path: path.to_path_buf(),
            source,
        })?;

        let raw_date = row.opened_at.unwrap_or_default();
        let opened_at = parse_opened_at(&raw_date).ok_or_else(|| LoadError::MalformedDate {
            row: index + 1,
            value: raw_date.clone(),
        })?;

        let status_text = normalize_status(row.status.as_deref().unwrap_or_default());

        tickets.push(TicketRecord {
            note: clean(row.note),
            opened_at,
            year: opened_at.year(),
            period: format!("{:04}-{:02}", opened_at.year(), opened_at.month()),
            status: Status::from(status_text.as_str()),
            status_text,
            dealer: clean(row.dealer),
            contract: clean(row.contract),
            specialist: clean(row.specialist),
        });
    }

    Ok(tickets)
}

pub fn read_goals(path: &Path) -> Result<Vec<GoalRecord>, LoadError> {
    #[derive(Deserialize)]
    struct CsvRow {
        #[serde(rename = "CONTRATO")]
        contract: Option<String>,
        #[serde(rename = "META OTD (%)")]
        target: Option<String>,
    }

    let mut reader = open(path, &GOAL_COLUMNS)?;
    let mut seen = HashSet::new();
    let mut goals = Vec::new();

    for result in reader.deserialize::<CsvRow>() {
        let row = result.map_err(|source| LoadError::SourceRead {
            path: path.to_path_buf(),
            source,
        })?;

        let Some(contract) = clean(row.contract) else {
            warn!("skipping goal row without a contract");
            continue;
        };
        let Some(raw_target) = clean(row.target) else {
            warn!(%contract, "skipping goal row without a target");
            continue;
        };
        let target_percent = parse_goal(&raw_target).ok_or_else(|| LoadError::InvalidGoal {
            contract: contract.clone(),
            value: raw_target.clone(),
        })?;

        if !seen.insert(contract.clone()) {
            warn!(%contract, "duplicate goal ignored, keeping the first one");
            continue;
        }

        goals.push(GoalRecord {
            contract,
            target_percent,
        });
    }

    Ok(goals)
}

fn open(path: &Path, required: &[&str]) -> Result<csv::Reader<File>, LoadError> {
    let read_error = |source: csv::Error| LoadError::SourceRead {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(read_error)?;

    let headers = reader.headers().map_err(read_error)?;
    for column in required {
        if !headers.iter().any(|header| header == *column) {
            return Err(LoadError::MissingColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
            });
        }
    }

    Ok(reader)
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Accepts ISO dates (space or `T` separated, optional RFC 3339 offset) and
/// day-first `DD/MM/YYYY` dates, each with or without a time of day.
pub fn parse_opened_at(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(value) {
        return Some(with_offset.naive_local());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn parse_goal(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().trim_end_matches('%').trim().replace(',', ".");
    let value: f64 = cleaned.parse().ok()?;
    (value.is_finite() && (0.0..=100.0).contains(&value)).then_some(value)
}
