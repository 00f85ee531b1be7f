use chrono::{Local, NaiveDate};

/// "Today is Friday, October 16, 2026" for the local date.
#[must_use]
pub fn current_date_message() -> String {
    format_date_message(Local::now().date_naive())
}

#[must_use]
pub fn format_date_message(date: NaiveDate) -> String {
    format!("Today is {}", date.format("%A, %B %d, %Y"))
}
