use crate::filter::Selection;
use crate::models::{GoalRecord, KpiSet, TicketRecord};

/// Headline counts for the filtered tickets. OTD is reported as 0 when there
/// are no tickets.
pub fn summarize<'a>(tickets: impl IntoIterator<Item = &'a TicketRecord>) -> KpiSet {
    let mut total: usize = 0;
    let mut on_time: usize = 0;
    let mut late: usize = 0;

    for ticket in tickets {
        total += 1;
        if ticket.is_on_time() {
            on_time += 1;
        } else if ticket.is_late() {
            late += 1;
        }
    }

    let otd_percent = if total > 0 {
        on_time as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    KpiSet {
        total,
        on_time,
        late,
        otd_percent,
    }
}

/// Target for the selected contract, if one is configured.
pub fn lookup_goal(goals: &[GoalRecord], contract: &Selection) -> Option<f64> {
    let contract = contract.as_value()?;
    goals
        .iter()
        .find(|goal| goal.contract == contract)
        .map(|goal| goal.target_percent)
}

pub fn below_target(kpis: &KpiSet, goal: Option<f64>) -> bool {
    goal.is_some_and(|target| kpis.otd_percent < target)
}
