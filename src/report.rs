use std::fmt::Write;

use crate::dashboard::{Dashboard, Warning};
use crate::models::RankingRow;

pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(percent) => format!("{percent:.2}%"),
        None => "n/a".to_string(),
    }
}

pub fn warning_message(warning: &Warning) -> String {
    match warning {
        Warning::EmptyResult => "No data for the selected filters.".to_string(),
        Warning::NoGoalConfigured { contract } => {
            format!("No OTD goal configured for contract {contract}.")
        }
    }
}

pub fn below_target_message(dashboard: &Dashboard) -> Option<String> {
    let goal = dashboard.goal?;
    dashboard.below_target.then(|| {
        format!(
            "Current OTD ({:.2}%) is below the goal of {goal}%",
            dashboard.kpis.otd_percent
        )
    })
}

pub fn render_markdown(dashboard: &Dashboard) -> String {
    let mut output = String::new();
    let kpis = &dashboard.kpis;

    let _ = writeln!(output, "# OTD Dashboard");
    let _ = writeln!(output, "Analysis of {}", dashboard.scope);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Headline");
    let _ = writeln!(output, "- OTD in period: {:.2}%", kpis.otd_percent);
    let _ = writeln!(output, "- Total tickets: {}", kpis.total);
    let _ = writeln!(output, "- On time: {}", kpis.on_time);
    let _ = writeln!(output, "- Late: {}", kpis.late);

    if let Some(goal) = dashboard.goal {
        let _ = writeln!(output, "- Goal: {goal}%");
    }
    if let Some(alert) = below_target_message(dashboard) {
        let _ = writeln!(output);
        let _ = writeln!(output, "> **Warning:** {alert}");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Monthly Evolution");

    if dashboard.warnings.contains(&Warning::EmptyResult) {
        let _ = writeln!(output, "{}", warning_message(&Warning::EmptyResult));
    } else {
        let _ = writeln!(output, "| Period | Mean OTD | Contracts |");
        let _ = writeln!(output, "|---|---:|---:|");
        for trend in &dashboard.evolution {
            let _ = writeln!(
                output,
                "| {} | {} | {} |",
                trend.period,
                format_percent(trend.mean_otd_percent),
                trend.group_count
            );
        }
        if let Some(goal) = dashboard.goal {
            let _ = writeln!(output);
            let _ = writeln!(output, "Goal line: {goal}%");
        }

        let _ = writeln!(output);
        let _ = writeln!(output, "| Period | Contract | Tickets | On time | OTD |");
        let _ = writeln!(output, "|---|---|---:|---:|---:|");
        for row in &dashboard.rows {
            let _ = writeln!(
                output,
                "| {} | {} | {} | {} | {} |",
                row.period,
                row.contract.as_deref().unwrap_or("(no contract)"),
                row.total_count,
                row.on_time_count,
                format_percent(row.otd_percent)
            );
        }
    }

    for warning in &dashboard.warnings {
        if let Warning::NoGoalConfigured { .. } = warning {
            let _ = writeln!(output);
            let _ = writeln!(output, "_{}_", warning_message(warning));
        }
    }

    write_ranking(
        &mut output,
        "Performance by Field Specialist",
        "Specialist",
        &dashboard.specialists,
    );
    write_ranking(
        &mut output,
        "Dealers with the Worst OTD",
        "Dealer",
        &dashboard.worst_dealers,
    );
    write_ranking(
        &mut output,
        "Contracts with the Worst OTD",
        "Contract",
        &dashboard.worst_contracts,
    );

    output
}

fn write_ranking(output: &mut String, title: &str, label: &str, rows: &[RankingRow]) {
    let _ = writeln!(output);
    let _ = writeln!(output, "## {title}");

    if rows.is_empty() {
        let _ = writeln!(output, "No tickets to rank.");
        return;
    }

    let _ = writeln!(output, "| {label} | Tickets | On time | OTD |");
    let _ = writeln!(output, "|---|---:|---:|---:|");
    for row in rows {
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} |",
            row.key,
            row.total_count,
            row.on_time_count,
            format_percent(row.otd_percent)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::build;
    use crate::filter::{Filters, Selection};
    use crate::models::{Dataset, GoalRecord};
    use crate::testing::ticket;

    fn dataset() -> Dataset {
        Dataset {
            tickets: vec![
                ticket((2025, 4, 1), "NO PRAZO", Some("NORTH-01"), Some("C1"), Some("EC1")),
                ticket((2025, 4, 2), "ATRASO", Some("NORTH-01"), Some("C1"), Some("EC1")),
                ticket((2025, 5, 2), "NO PRAZO", Some("SOUTH-02"), Some("C2"), Some("EC2")),
            ],
            goals: vec![GoalRecord {
                contract: "C1".to_string(),
                target_percent: 90.0,
            }],
        }
    }

    #[test]
    fn report_lists_headline_and_rankings() {
        let dashboard = build(&dataset(), &Filters::for_year(2025));
        let report = render_markdown(&dashboard);

        assert!(report.contains("Analysis of all dealers | all contracts | 2025"));
        assert!(report.contains("- OTD in period: 66.67%"));
        assert!(report.contains("| 2025-04 | C1 | 2 | 1 | 50.00% |"));
        assert!(report.contains("| EC2 | 1 | 1 | 100.00% |"));
        assert!(report.contains("## Dealers with the Worst OTD"));
        assert!(!report.contains("below the goal"));
    }

    #[test]
    fn report_flags_missed_goal() {
        let filters = Filters {
            contract: Selection::Only("C1".to_string()),
            ..Filters::for_year(2025)
        };
        let report = render_markdown(&build(&dataset(), &filters));

        assert!(report.contains("Current OTD (50.00%) is below the goal of 90%"));
        assert!(report.contains("Goal line: 90%"));
    }

    #[test]
    fn report_notes_empty_selection() {
        let filters = Filters::for_year(2019);
        let report = render_markdown(&build(&dataset(), &filters));

        assert!(report.contains("No data for the selected filters."));
        assert!(report.contains("- OTD in period: 0.00%"));
    }

    #[test]
    fn tickets_without_contract_get_their_own_row() {
        let mut data = dataset();
        data.tickets
            .push(ticket((2025, 5, 3), "ATRASO", Some("UNASSIGNED"), None, None));
        let report = render_markdown(&build(&data, &Filters::for_year(2025)));

        assert!(report.contains("| 2025-05 | (no contract) | 1 | 0 | 0.00% |"));
        assert!(report.contains("| 2025-05 | C2 | 1 | 1 | 100.00% |"));
        assert!(report.contains("| UNASSIGNED | 1 | 0 | 0.00% |"));
    }

    #[test]
    fn undefined_percent_renders_as_not_available() {
        assert_eq!(format_percent(None), "n/a");
        assert_eq!(format_percent(Some(12.345)), "12.35%");
    }
}
