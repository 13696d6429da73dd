use chrono::NaiveDate;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{ElementError, FetchError};
use crate::model::{MovieRecord, RELEASE_DATE_FORMAT};

pub const RESULTS_KEY: &str = "results";
pub const ID_KEY: &str = "id";
pub const TITLE_KEY: &str = "original_title";
pub const POSTER_PATH_KEY: &str = "poster_path";
pub const SUMMARY_KEY: &str = "overview";
pub const USER_RATING_KEY: &str = "vote_average";
pub const RELEASE_DATE_KEY: &str = "release_date";

/// Parse a ranking payload into records, in upstream order.
///
/// A body that is not a JSON object with a `results` array fails as a whole.
/// Individual elements that do not map cleanly are skipped and logged.
pub fn parse_movie_list(body: &str) -> Result<Vec<MovieRecord>, FetchError> {
    let root: Value = serde_json::from_str(body)?;
    let results = root
        .get(RESULTS_KEY)
        .and_then(Value::as_array)
        .ok_or(FetchError::MissingResults(RESULTS_KEY))?;

    let mut out = Vec::with_capacity(results.len());
    for (index, element) in results.iter().enumerate() {
        match record_from_value(element) {
            Ok(record) => out.push(record),
            Err(e) => warn!(index, error = %e, "skipping malformed catalog entry"),
        }
    }
    debug!(received = results.len(), kept = out.len(), "parsed ranking payload");
    Ok(out)
}

/// Map one `results` element. All six fields must be present and valid.
pub fn record_from_value(value: &Value) -> Result<MovieRecord, ElementError> {
    let obj = value.as_object().ok_or(ElementError::NotAnObject)?;

    let title = string_field(obj, TITLE_KEY)?;
    if title.trim().is_empty() {
        return Err(ElementError::EmptyTitle);
    }
    let poster_path = string_field(obj, POSTER_PATH_KEY)?;
    let id = id_field(obj)?;
    let summary = string_field(obj, SUMMARY_KEY)?;
    let user_rating = number_field(obj, USER_RATING_KEY)?;
    let release_date = parse_release_date(&string_field(obj, RELEASE_DATE_KEY)?)?;

    Ok(MovieRecord { id, title, poster_path, summary, user_rating, release_date })
}

pub fn parse_release_date(text: &str) -> Result<NaiveDate, ElementError> {
    NaiveDate::parse_from_str(text, RELEASE_DATE_FORMAT)
        .map_err(|_| ElementError::InvalidDate { value: text.to_string() })
}

fn field<'a>(obj: &'a Map<String, Value>, key: &'static str) -> Result<&'a Value, ElementError> {
    match obj.get(key) {
        None | Some(Value::Null) => Err(ElementError::MissingField(key)),
        Some(v) => Ok(v),
    }
}

fn string_field(obj: &Map<String, Value>, key: &'static str) -> Result<String, ElementError> {
    field(obj, key)?
        .as_str()
        .map(str::to_string)
        .ok_or(ElementError::WrongType { field: key, expected: "string" })
}

// Upstream sends integer ids; string ids are accepted as-is.
fn id_field(obj: &Map<String, Value>) -> Result<String, ElementError> {
    match field(obj, ID_KEY)? {
        Value::String(s) if !s.is_empty() => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(ElementError::WrongType { field: ID_KEY, expected: "string or number" }),
    }
}

fn number_field(obj: &Map<String, Value>, key: &'static str) -> Result<f64, ElementError> {
    let wrong = ElementError::WrongType { field: key, expected: "number" };
    match field(obj, key)? {
        Value::Number(n) => n.as_f64().ok_or(wrong),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()).ok_or(wrong),
        _ => Err(wrong),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SCENARIO: &str = r#"{"results":[
 {"id":"1","original_title":"A","poster_path":"/a.jpg","overview":"s1","vote_average":7.5,"release_date":"2016-01-01"},
 {"id":"2","original_title":"B","poster_path":"/b.jpg","overview":"s2","vote_average":8.1,"release_date":"bad-date"}
]}"#;

    fn entry(id: i64, title: &str) -> Value {
        json!({
            "id": id,
            "original_title": title,
            "poster_path": format!("/{id}.jpg"),
            "overview": "",
            "vote_average": 6.0,
            "release_date": "2015-06-12",
            "popularity": 12.5,
            "adult": false
        })
    }

    #[test]
    fn bad_date_element_is_dropped() {
        let list = parse_movie_list(SCENARIO).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, "1");
        assert_eq!(list[0].title, "A");
        assert_eq!(list[0].summary, "s1");
        assert_eq!(list[0].user_rating, 7.5);
        assert_eq!(list[0].release_date, NaiveDate::from_ymd_opt(2016, 1, 1).unwrap());
    }

    #[test]
    fn preserves_upstream_order_around_skips() {
        let mut broken = entry(3, "C");
        broken.as_object_mut().unwrap().remove("poster_path");
        let body = json!({ "results": [entry(5, "E"), broken, entry(1, "A"), entry(4, "D")] }).to_string();
        let ids: Vec<_> = parse_movie_list(&body).unwrap().into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["5", "1", "4"]);
    }

    #[test]
    fn every_required_field_is_checked() {
        for key in [ID_KEY, TITLE_KEY, POSTER_PATH_KEY, SUMMARY_KEY, USER_RATING_KEY, RELEASE_DATE_KEY] {
            let mut e = entry(9, "Nine");
            e.as_object_mut().unwrap().remove(key);
            assert_eq!(record_from_value(&e), Err(ElementError::MissingField(key)), "{key}");

            let mut e = entry(9, "Nine");
            e[key] = Value::Null;
            assert_eq!(record_from_value(&e), Err(ElementError::MissingField(key)), "{key}");
        }
    }

    #[test]
    fn wrong_types_are_rejected() {
        let mut e = entry(1, "A");
        e["original_title"] = json!(42);
        assert!(matches!(record_from_value(&e), Err(ElementError::WrongType { field: TITLE_KEY, .. })));

        let mut e = entry(1, "A");
        e["vote_average"] = json!("high");
        assert!(matches!(record_from_value(&e), Err(ElementError::WrongType { field: USER_RATING_KEY, .. })));

        let mut e = entry(1, "A");
        e["id"] = json!(["1"]);
        assert!(matches!(record_from_value(&e), Err(ElementError::WrongType { field: ID_KEY, .. })));

        assert_eq!(record_from_value(&json!("nope")), Err(ElementError::NotAnObject));
    }

    #[test]
    fn empty_title_is_rejected_but_empty_summary_is_fine() {
        let mut e = entry(1, "   ");
        assert_eq!(record_from_value(&e), Err(ElementError::EmptyTitle));
        e["original_title"] = json!("Heat");
        assert_eq!(record_from_value(&e).unwrap().summary, "");
    }

    #[test]
    fn integer_id_and_numeric_string_rating() {
        let mut e = entry(550, "Fight Club");
        e["vote_average"] = json!("8.4");
        let m = record_from_value(&e).unwrap();
        assert_eq!(m.id, "550");
        assert_eq!(m.user_rating, 8.4);
    }

    #[test]
    fn release_date_format_is_fixed() {
        assert_eq!(parse_release_date("2016-03-04").unwrap(), NaiveDate::from_ymd_opt(2016, 3, 4).unwrap());
        assert!(parse_release_date("03/04/2016").is_err());
        assert!(parse_release_date("").is_err());
        assert!(parse_release_date("2016-02-30").is_err());

        let mut e = entry(1, "A");
        e["release_date"] = json!("03/04/2016");
        assert!(matches!(record_from_value(&e), Err(ElementError::InvalidDate { .. })));
    }

    #[test]
    fn top_level_failures_are_errors() {
        assert!(matches!(parse_movie_list("not json"), Err(FetchError::MalformedPayload(_))));
        assert!(matches!(parse_movie_list(""), Err(FetchError::MalformedPayload(_))));
        assert!(matches!(parse_movie_list(r#"{"page":1}"#), Err(FetchError::MissingResults(_))));
        assert!(matches!(parse_movie_list(r#"{"results":{}}"#), Err(FetchError::MissingResults(_))));
        assert!(matches!(parse_movie_list("[]"), Err(FetchError::MissingResults(_))));
    }

    #[test]
    fn empty_results_is_an_empty_list() {
        assert!(parse_movie_list(r#"{"results":[]}"#).unwrap().is_empty());
    }

    #[test]
    fn parsing_is_repeatable() {
        assert_eq!(parse_movie_list(SCENARIO).unwrap(), parse_movie_list(SCENARIO).unwrap());
    }
}
