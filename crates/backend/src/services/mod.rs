pub mod category_tree;
pub mod ordering;
pub mod weekly;

use chrono::NaiveDate;
use shared_types::week_start_of;

/// The server's local calendar date.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Monday of the current local week.
pub fn current_week() -> NaiveDate {
    week_start_of(&chrono::Local::now())
}
