use std::cmp::Ordering;

use crate::aggregate::group_counts;
use crate::models::{RankingRow, TicketRecord};

/// Rows kept in a worst-performer ranking.
pub const TOP_N: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankBy {
    Dealer,
    Contract,
}

impl RankBy {
    fn key(self, ticket: &TicketRecord) -> Option<&str> {
        match self {
            RankBy::Dealer => ticket.dealer.as_deref(),
            RankBy::Contract => ticket.contract.as_deref(),
        }
    }
}

/// Worst performers first. Expected to receive the whole dataset, not the
/// filtered selection. Tickets without the grouping value are left out.
pub fn rank(tickets: &[TicketRecord], by: RankBy) -> Vec<RankingRow> {
    let mut rows = summarize_groups(tickets, |ticket| by.key(ticket));
    rows.sort_by(|a, b| worst_first(a.otd_percent, b.otd_percent));
    rows.truncate(TOP_N);
    rows
}

/// Field specialists, best first, without a cap. Tickets without a
/// specialist are left out.
pub fn specialist_performance<'a>(
    tickets: impl IntoIterator<Item = &'a TicketRecord>,
) -> Vec<RankingRow> {
    let mut rows = summarize_groups(tickets, |ticket| ticket.specialist.as_deref());
    rows.sort_by(|a, b| best_first(a.otd_percent, b.otd_percent));
    rows
}

fn summarize_groups<'a, F>(
    tickets: impl IntoIterator<Item = &'a TicketRecord>,
    key: F,
) -> Vec<RankingRow>
where
    F: Fn(&'a TicketRecord) -> Option<&'a str>,
{
    group_counts(tickets, key)
        .into_iter()
        .filter_map(|(key, counts)| {
            key.map(|key| RankingRow {
                key: key.to_string(),
                total_count: counts.total,
                on_time_count: counts.on_time,
                otd_percent: counts.otd_percent(),
            })
        })
        .collect()
}

// Undefined percentages sort last in both directions.
fn worst_first(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn best_first(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        _ => worst_first(a, b),
    }
}
