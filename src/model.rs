use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Fixed textual format of `release_date`.
pub const RELEASE_DATE_FORMAT: &str = "%Y-%m-%d";

/// One catalog entry. Only ever built from a fully valid `results` element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: String,
    pub title: String,
    /// Poster fragment such as `/abc.jpg`, not a full URL.
    pub poster_path: String,
    pub summary: String,
    pub user_rating: f64,
    pub release_date: NaiveDate,
}

impl MovieRecord {
    pub fn release_year(&self) -> i32 { self.release_date.year() }

    pub fn rating_label(&self) -> String { format!("{:.1}/10", self.user_rating) }

    /// Release date in the upstream format.
    pub fn release_date_text(&self) -> String {
        self.release_date.format(RELEASE_DATE_FORMAT).to_string()
    }
}
