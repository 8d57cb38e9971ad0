use chrono::NaiveDateTime;
use serde::Serialize;

/// Ticket status, classified from the normalized STATUS text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    OnTime,
    Late,
    Other,
}

impl From<&str> for Status {
    fn from(s: &str) -> Self {
        match normalize_status(s).as_str() {
            "NO PRAZO" | "NO_PRAZO" | "ON TIME" | "ON_TIME" => Status::OnTime,
            "ATRASO" | "EM ATRASO" | "LATE" => Status::Late,
            _ => Status::Other,
        }
    }
}

/// Trims, collapses inner whitespace and uppercases raw status text.
pub fn normalize_status(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

#[derive(Debug, Clone, Serialize)]
pub struct TicketRecord {
    pub note: Option<String>,
    pub opened_at: NaiveDateTime,
    pub year: i32,
    pub period: String,
    pub status: Status,
    pub status_text: String,
    pub dealer: Option<String>,
    pub contract: Option<String>,
    pub specialist: Option<String>,
}

impl TicketRecord {
    pub fn is_on_time(&self) -> bool {
        self.status == Status::OnTime
    }

    pub fn is_late(&self) -> bool {
        self.status == Status::Late
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalRecord {
    pub contract: String,
    pub target_percent: f64,
}

/// Everything read from the input source. Immutable once loaded.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub tickets: Vec<TicketRecord>,
    pub goals: Vec<GoalRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationRow {
    pub period: String,
    /// `None` collects the period's tickets that carry no contract.
    pub contract: Option<String>,
    pub total_count: usize,
    pub on_time_count: usize,
    pub otd_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingRow {
    pub key: String,
    pub total_count: usize,
    pub on_time_count: usize,
    pub otd_percent: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KpiSet {
    pub total: usize,
    pub on_time: usize,
    pub late: usize,
    pub otd_percent: f64,
}

/// Mean of the per-contract OTD percentages observed in one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodTrend {
    pub period: String,
    pub mean_otd_percent: Option<f64>,
    pub group_count: usize,
}
