use chrono::NaiveDate;

use crate::models::{normalize_status, Status, TicketRecord};

/// Builds a ticket opened at 09:00 on `date`.
pub fn ticket(
    date: (i32, u32, u32),
    status: &str,
    dealer: Option<&str>,
    contract: Option<&str>,
    specialist: Option<&str>,
) -> TicketRecord {
    let opened_at = NaiveDate::from_ymd_opt(date.0, date.1, date.2)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    TicketRecord {
        note: Some(format!("{}{:02}{:02}", date.0, date.1, date.2)),
        opened_at,
        year: date.0,
        period: format!("{:04}-{:02}", date.0, date.1),
        status: Status::from(status),
        status_text: normalize_status(status),
        dealer: dealer.map(str::to_string),
        contract: contract.map(str::to_string),
        specialist: specialist.map(str::to_string),
    }
}
