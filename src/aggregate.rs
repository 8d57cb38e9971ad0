use std::collections::BTreeMap;

use crate::filter::Filters;
use crate::models::{AggregationRow, PeriodTrend, TicketRecord};

/// Ticket and on-time counts for one group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OtdCounts {
    pub total: usize,
    pub on_time: usize,
}

impl OtdCounts {
    pub fn add(&mut self, ticket: &TicketRecord) {
        self.total += 1;
        if ticket.is_on_time() {
            self.on_time += 1;
        }
    }

    /// `None` for an empty group, never a division by zero.
    pub fn otd_percent(&self) -> Option<f64> {
        (self.total > 0).then(|| self.on_time as f64 / self.total as f64 * 100.0)
    }
}

/// Tallies tickets per key. Groups come out in ascending key order and only
/// for keys that were observed.
pub fn group_counts<'a, K, F>(
    tickets: impl IntoIterator<Item = &'a TicketRecord>,
    key: F,
) -> BTreeMap<K, OtdCounts>
where
    K: Ord,
    F: Fn(&'a TicketRecord) -> K,
{
    let mut groups: BTreeMap<K, OtdCounts> = BTreeMap::new();
    for ticket in tickets {
        groups.entry(key(ticket)).or_default().add(ticket);
    }
    groups
}

#[derive(Debug)]
pub struct Aggregation<'a> {
    pub rows: Vec<AggregationRow>,
    pub filtered: Vec<&'a TicketRecord>,
}

/// Applies `filters` and groups what remains by (period, contract). Tickets
/// without a contract get their own row per period so totals still add up.
pub fn aggregate<'a>(tickets: &'a [TicketRecord], filters: &Filters) -> Aggregation<'a> {
    let filtered: Vec<&TicketRecord> = tickets
        .iter()
        .filter(|ticket| filters.matches(ticket))
        .collect();

    let rows = group_counts(filtered.iter().copied(), |ticket| {
        (ticket.period.as_str(), ticket.contract.as_deref())
    })
    .into_iter()
    .map(|((period, contract), counts)| AggregationRow {
        period: period.to_string(),
        contract: contract.map(str::to_string),
        total_count: counts.total,
        on_time_count: counts.on_time,
        otd_percent: counts.otd_percent(),
    })
    .collect();

    Aggregation { rows, filtered }
}

/// Averages the per-contract OTD of each period, the series plotted over time.
/// Groups with an undefined percentage do not take part in the mean.
pub fn evolution(rows: &[AggregationRow]) -> Vec<PeriodTrend> {
    let mut periods: BTreeMap<&str, (f64, usize, usize)> = BTreeMap::new();

    for row in rows {
        let entry = periods.entry(row.period.as_str()).or_insert((0.0, 0, 0));
        entry.2 += 1;
        if let Some(percent) = row.otd_percent {
            entry.0 += percent;
            entry.1 += 1;
        }
    }

    periods
        .into_iter()
        .map(|(period, (sum, defined, group_count))| PeriodTrend {
            period: period.to_string(),
            mean_otd_percent: (defined > 0).then(|| sum / defined as f64),
            group_count,
        })
        .collect()
}
