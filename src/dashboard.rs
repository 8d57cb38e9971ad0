use serde::Serialize;
use tracing::{debug, info};

use crate::aggregate::{aggregate, evolution};
use crate::filter::{Filters, Selection};
use crate::kpi;
use crate::models::{AggregationRow, Dataset, KpiSet, PeriodTrend, RankingRow};
use crate::ranking::{self, RankBy};

/// Non-fatal conditions the report should surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    EmptyResult,
    NoGoalConfigured { contract: String },
}

/// Everything computed for one filter selection.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub filters: Filters,
    pub scope: String,
    pub kpis: KpiSet,
    pub goal: Option<f64>,
    pub below_target: bool,
    pub rows: Vec<AggregationRow>,
    pub evolution: Vec<PeriodTrend>,
    pub specialists: Vec<RankingRow>,
    pub worst_dealers: Vec<RankingRow>,
    pub worst_contracts: Vec<RankingRow>,
    pub warnings: Vec<Warning>,
}

pub fn build(dataset: &Dataset, filters: &Filters) -> Dashboard {
    let aggregation = aggregate(&dataset.tickets, filters);
    let kpis = kpi::summarize(aggregation.filtered.iter().copied());
    let goal = kpi::lookup_goal(&dataset.goals, &filters.contract);
    let below_target = kpi::below_target(&kpis, goal);

    let mut warnings = Vec::new();
    if aggregation.rows.is_empty() {
        warnings.push(Warning::EmptyResult);
    }
    if let (Selection::Only(contract), None) = (&filters.contract, goal) {
        debug!(%contract, "no OTD goal configured");
        warnings.push(Warning::NoGoalConfigured {
            contract: contract.clone(),
        });
    }

    let evolution = evolution(&aggregation.rows);
    let specialists = ranking::specialist_performance(aggregation.filtered.iter().copied());
    let worst_dealers = ranking::rank(&dataset.tickets, RankBy::Dealer);
    let worst_contracts = ranking::rank(&dataset.tickets, RankBy::Contract);

    info!(
        year = filters.year,
        dealer = %filters.dealer,
        contract = %filters.contract,
        tickets = kpis.total,
        otd = kpis.otd_percent,
        "dashboard computed"
    );

    Dashboard {
        filters: filters.clone(),
        scope: scope_label(filters),
        kpis,
        goal,
        below_target,
        rows: aggregation.rows,
        evolution,
        specialists,
        worst_dealers,
        worst_contracts,
        warnings,
    }
}

pub fn scope_label(filters: &Filters) -> String {
    let dealer = match &filters.dealer {
        Selection::All => "all dealers".to_string(),
        Selection::Only(dealer) => format!("dealer {dealer}"),
    };
    let contract = match &filters.contract {
        Selection::All => "all contracts".to_string(),
        Selection::Only(contract) => format!("contract {contract}"),
    };
    format!("{dealer} | {contract} | {}", filters.year)
}
