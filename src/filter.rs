use std::collections::BTreeSet;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::models::{Dataset, TicketRecord};

/// A dealer or contract selection. `ALL` (or `TODOS`) skips the filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    All,
    Only(String),
}

impl Selection {
    pub fn as_value(&self) -> Option<&str> {
        match self {
            Selection::All => None,
            Selection::Only(value) => Some(value.as_str()),
        }
    }
}

impl FromStr for Selection {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("ALL")
            || trimmed.eq_ignore_ascii_case("TODOS")
        {
            Ok(Selection::All)
        } else {
            Ok(Selection::Only(trimmed.to_string()))
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => write!(f, "ALL"),
            Selection::Only(value) => write!(f, "{value}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Filters {
    pub year: i32,
    pub dealer: Selection,
    pub contract: Selection,
}

impl Filters {
    pub fn for_year(year: i32) -> Self {
        Filters {
            year,
            dealer: Selection::All,
            contract: Selection::All,
        }
    }

    pub fn matches(&self, ticket: &TicketRecord) -> bool {
        ticket.year == self.year
            && dealer_matches(&self.dealer, ticket.dealer.as_deref())
            && contract_matches(&self.contract, ticket.contract.as_deref())
    }
}

/// Case-insensitive substring match on the dealer code. Tickets without a
/// dealer never match a concrete selection.
fn dealer_matches(selection: &Selection, dealer: Option<&str>) -> bool {
    match (selection, dealer) {
        (Selection::All, _) => true,
        (Selection::Only(_), None) => false,
        (Selection::Only(needle), Some(dealer)) => dealer
            .to_uppercase()
            .contains(&needle.to_uppercase()),
    }
}

fn contract_matches(selection: &Selection, contract: Option<&str>) -> bool {
    match selection {
        Selection::All => true,
        Selection::Only(wanted) => contract == Some(wanted.as_str()),
    }
}

/// Values offered for the dealer and contract selections.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub dealers: Vec<String>,
    pub contracts: Vec<String>,
}

pub fn filter_options(dataset: &Dataset) -> FilterOptions {
    let mut dealers = BTreeSet::new();
    let mut contracts = BTreeSet::new();

    for ticket in &dataset.tickets {
        if let Some(dealer) = &ticket.dealer {
            dealers.insert(dealer.clone());
        }
        if let Some(contract) = &ticket.contract {
            contracts.insert(contract.clone());
        }
    }

    FilterOptions {
        dealers: dealers.into_iter().collect(),
        contracts: contracts.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ticket;

    #[test]
    fn selection_parses_all_sentinels() {
        assert_eq!("ALL".parse::<Selection>().unwrap(), Selection::All);
        assert_eq!("todos".parse::<Selection>().unwrap(), Selection::All);
        assert_eq!(" ".parse::<Selection>().unwrap(), Selection::All);
        assert_eq!(
            " C1 ".parse::<Selection>().unwrap(),
            Selection::Only("C1".to_string())
        );
    }

    #[test]
    fn dealer_filter_is_case_insensitive_substring() {
        let filters = Filters {
            dealer: Selection::Only("north".to_string()),
            ..Filters::for_year(2025)
        };

        let north = ticket((2025, 1, 3), "NO PRAZO", Some("NORTH-01"), Some("C1"), None);
        let absent = ticket((2025, 1, 3), "NO PRAZO", None, Some("C1"), None);
        let south = ticket((2025, 1, 3), "NO PRAZO", Some("SOUTH-02"), Some("C1"), None);

        assert!(filters.matches(&north));
        assert!(!filters.matches(&absent));
        assert!(!filters.matches(&south));
    }

    #[test]
    fn contract_filter_is_exact_and_year_must_match() {
        let filters = Filters {
            contract: Selection::Only("C1".to_string()),
            ..Filters::for_year(2025)
        };

        assert!(filters.matches(&ticket((2025, 2, 1), "ATRASO", None, Some("C1"), None)));
        assert!(!filters.matches(&ticket((2025, 2, 1), "ATRASO", None, Some("C10"), None)));
        assert!(!filters.matches(&ticket((2025, 2, 1), "ATRASO", None, Some("c1"), None)));
        assert!(!filters.matches(&ticket((2025, 2, 1), "ATRASO", None, None, None)));
        assert!(!filters.matches(&ticket((2024, 2, 1), "ATRASO", None, Some("C1"), None)));
    }

    #[test]
    fn options_are_sorted_unique_and_skip_missing() {
        let dataset = Dataset {
            tickets: vec![
                ticket((2025, 1, 1), "NO PRAZO", Some("B"), Some("C2"), None),
                ticket((2025, 1, 1), "NO PRAZO", Some("A"), None, None),
                ticket((2025, 1, 1), "NO PRAZO", None, Some("C1"), None),
                ticket((2025, 1, 1), "NO PRAZO", Some("B"), Some("C1"), None),
            ],
            goals: Vec::new(),
        };

        let options = filter_options(&dataset);
        assert_eq!(options.dealers, vec!["A", "B"]);
        assert_eq!(options.contracts, vec!["C1", "C2"]);
    }
}
