use crate::models::{ANONYMOUS_NAME, GuestbookEntry, VisitRecord};
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

pub const NAME_MAX_CHARS: usize = 20;
pub const MESSAGE_MAX_CHARS: usize = 200;
pub const MILESTONES: [u64; 3] = [7777, 8888, 9999];

pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y/%m/%d").to_string()
}

pub fn timestamp(at: NaiveDateTime) -> String {
    at.format("%Y/%m/%d %H:%M:%S").to_string()
}

pub fn is_milestone(total: u64) -> bool {
    MILESTONES.contains(&total)
}

impl VisitRecord {
    pub fn fresh(today: NaiveDate) -> Self {
        Self {
            total: 0,
            day: day_key(today),
            today: 0,
            yesterday: 0,
            guestbook: Vec::new(),
        }
    }
}

/// Which branch `decode` took to produce its record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recovery {
    Clean,
    Missing,
    Unreadable,
    Repaired(Vec<&'static str>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub record: VisitRecord,
    pub recovery: Recovery,
}

/// Decodes a stored payload field by field. Anything that cannot be used is
/// replaced with its default; this never fails.
pub fn decode(raw: Option<&str>, today: NaiveDate) -> Decoded {
    let Some(raw) = raw else {
        return Decoded {
            record: VisitRecord::fresh(today),
            recovery: Recovery::Missing,
        };
    };

    let object = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(object)) => object,
        _ => {
            return Decoded {
                record: VisitRecord::fresh(today),
                recovery: Recovery::Unreadable,
            };
        }
    };

    let mut repaired = Vec::new();
    let mut count = |field: &'static str| match coerce_count(object.get(field)) {
        Some(Count::Exact(value)) => value,
        Some(Count::Coerced(value)) => {
            repaired.push(field);
            value
        }
        None => {
            repaired.push(field);
            0
        }
    };
    let total = count("total");
    let today_count = count("today");
    let yesterday = count("yesterday");

    let day = match object.get("day") {
        Some(Value::String(day)) => day.clone(),
        _ => {
            repaired.push("day");
            day_key(today)
        }
    };

    let guestbook = match object.get("guestbook") {
        Some(Value::Array(items)) => {
            let entries: Vec<GuestbookEntry> = items.iter().filter_map(decode_entry).collect();
            if entries.len() != items.len() || !items.iter().all(entry_is_clean) {
                repaired.push("guestbook");
            }
            entries
        }
        _ => {
            repaired.push("guestbook");
            Vec::new()
        }
    };

    let recovery = if repaired.is_empty() {
        Recovery::Clean
    } else {
        Recovery::Repaired(repaired)
    };

    Decoded {
        record: VisitRecord {
            total,
            day,
            today: today_count,
            yesterday,
            guestbook,
        },
        recovery,
    }
}

/// A stored count that is not a plain non-negative integer still counts as a
/// repair even when a value can be recovered from it.
enum Count {
    Exact(u64),
    Coerced(u64),
}

fn coerce_count(value: Option<&Value>) -> Option<Count> {
    match value? {
        Value::Number(number) => match number.as_u64() {
            Some(value) => Some(Count::Exact(value)),
            None => number.as_f64().and_then(truncate_float).map(Count::Coerced),
        },
        Value::String(text) => {
            let text = text.trim();
            text.parse::<u64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(truncate_float))
                .map(Count::Coerced)
        }
        _ => None,
    }
}

fn truncate_float(value: f64) -> Option<u64> {
    (value.is_finite() && value >= 0.0).then(|| value.trunc() as u64)
}

fn decode_entry(item: &Value) -> Option<GuestbookEntry> {
    let item = item.as_object()?;
    let message = item.get("message")?.as_str()?.to_string();
    Some(GuestbookEntry {
        name: string_field(item, "name").unwrap_or_else(|| ANONYMOUS_NAME.to_string()),
        message,
        date: string_field(item, "date").unwrap_or_default(),
    })
}

fn entry_is_clean(item: &Value) -> bool {
    ["name", "message", "date"]
        .iter()
        .all(|field| item.get(field).is_some_and(Value::is_string))
}

fn string_field(item: &Map<String, Value>, field: &str) -> Option<String> {
    item.get(field).and_then(Value::as_str).map(str::to_string)
}

/// Moves `today` into `yesterday` when the record was last reset on another
/// day. Returns whether a rollover happened.
///
/// Days without any load are not back-filled: `yesterday` always holds the
/// count of the last day that had a load.
pub fn apply_daily_rollover(record: &mut VisitRecord, today: NaiveDate) -> bool {
    let key = day_key(today);
    if record.day == key {
        return false;
    }
    record.yesterday = record.today;
    record.today = 0;
    record.day = key;
    true
}

pub fn record_visit(record: &mut VisitRecord) {
    record.total = record.total.saturating_add(1);
    record.today = record.today.saturating_add(1);
}

/// Appends a normalized entry. Returns `None` and leaves the record untouched
/// when the trimmed message is empty.
pub fn append_guestbook_entry<'a>(
    record: &'a mut VisitRecord,
    name: &str,
    message: &str,
    now: NaiveDateTime,
) -> Option<&'a GuestbookEntry> {
    let message = clip(message, MESSAGE_MAX_CHARS);
    if message.is_empty() {
        return None;
    }

    let mut name = clip(name, NAME_MAX_CHARS);
    if name.is_empty() {
        name = ANONYMOUS_NAME.to_string();
    }

    record.guestbook.push(GuestbookEntry {
        name,
        message,
        date: timestamp(now),
    });
    record.guestbook.last()
}

pub fn clear_guestbook(record: &mut VisitRecord) -> usize {
    let removed = record.guestbook.len();
    record.guestbook.clear();
    removed
}

/// Newest first.
pub fn guestbook_newest_first(record: &VisitRecord) -> Vec<GuestbookEntry> {
    record.guestbook.iter().rev().cloned().collect()
}

fn clip(input: &str, max_chars: usize) -> String {
    input.trim().chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, hh: u32, mm: u32, ss: u32) -> NaiveDateTime {
        date(y, m, d).and_time(NaiveTime::from_hms_opt(hh, mm, ss).unwrap())
    }

    fn record(day: &str, total: u64, today: u64, yesterday: u64) -> VisitRecord {
        VisitRecord {
            total,
            day: day.to_string(),
            today,
            yesterday,
            guestbook: Vec::new(),
        }
    }

    #[test]
    fn formats_keys_with_zero_padding() {
        assert_eq!(day_key(date(2024, 1, 2)), "2024/01/02");
        assert_eq!(timestamp(at(2024, 3, 4, 5, 6, 7)), "2024/03/04 05:06:07");
    }

    #[test]
    fn decode_missing_returns_fresh_record() {
        let decoded = decode(None, date(2024, 5, 1));
        assert_eq!(decoded.recovery, Recovery::Missing);
        assert_eq!(decoded.record, VisitRecord::fresh(date(2024, 5, 1)));
        assert_eq!(decoded.record.day, "2024/05/01");
    }

    #[test]
    fn decode_malformed_payloads_never_fail() {
        let today = date(2024, 5, 1);
        for raw in ["", "not json", "{", "null", "42", "\"text\"", "[1,2,3]", "true"] {
            let decoded = decode(Some(raw), today);
            assert_eq!(decoded.recovery, Recovery::Unreadable, "payload {raw:?}");
            assert_eq!(decoded.record, VisitRecord::fresh(today));
        }
    }

    #[test]
    fn decode_repairs_fields_individually() {
        let raw = r#"{"total":"12","day":7,"today":-3,"yesterday":null,"guestbook":{"a":1}}"#;
        let decoded = decode(Some(raw), date(2024, 5, 1));

        assert_eq!(decoded.record.total, 12);
        assert_eq!(decoded.record.day, "2024/05/01");
        assert_eq!(decoded.record.today, 0);
        assert_eq!(decoded.record.yesterday, 0);
        assert!(decoded.record.guestbook.is_empty());
        assert_eq!(
            decoded.recovery,
            Recovery::Repaired(vec!["total", "today", "yesterday", "day", "guestbook"])
        );
    }

    #[test]
    fn decode_reports_coerced_counts_as_repaired() {
        let raw = r#"{"total":"12","day":"2024/05/01","today":3.5,"yesterday":2,"guestbook":[]}"#;
        let decoded = decode(Some(raw), date(2024, 5, 1));

        assert_eq!(decoded.record.total, 12);
        assert_eq!(decoded.record.today, 3);
        assert_eq!(decoded.record.yesterday, 2);
        assert_eq!(decoded.recovery, Recovery::Repaired(vec!["total", "today"]));
    }

    #[test]
    fn decode_handles_missing_fields_and_floats() {
        let decoded = decode(Some(r#"{"total":10.9}"#), date(2024, 5, 1));
        assert_eq!(decoded.record.total, 10);
        assert_eq!(decoded.record.today, 0);
        assert_eq!(decoded.record.day, "2024/05/01");
        assert!(matches!(decoded.recovery, Recovery::Repaired(_)));
    }

    #[test]
    fn decode_keeps_usable_guestbook_items() {
        let raw = r#"{"total":1,"day":"2024/05/01","today":1,"yesterday":0,
            "guestbook":[{"name":"a","message":"hi","date":"2024/05/01 10:00:00"},
                         {"message":"no name"},
                         {"name":"b"},
                         "junk"]}"#;
        let decoded = decode(Some(raw), date(2024, 5, 1));

        assert_eq!(decoded.record.guestbook.len(), 2);
        assert_eq!(decoded.record.guestbook[1].name, ANONYMOUS_NAME);
        assert_eq!(decoded.record.guestbook[1].date, "");
        assert_eq!(decoded.recovery, Recovery::Repaired(vec!["guestbook"]));
    }

    #[test]
    fn decode_inverts_serialization() {
        let mut original = record("2024/01/01", 42, 3, 9);
        append_guestbook_entry(&mut original, "taro", "踏みました！", at(2024, 1, 1, 12, 0, 0));
        append_guestbook_entry(&mut original, "", "second", at(2024, 1, 1, 12, 5, 0));

        let raw = serde_json::to_string(&original).unwrap();
        let decoded = decode(Some(&raw), date(2030, 1, 1));
        assert_eq!(decoded.recovery, Recovery::Clean);
        assert_eq!(decoded.record, original);
    }

    #[test]
    fn rollover_moves_today_into_yesterday() {
        let mut state = record("2024/01/01", 20, 5, 2);
        assert!(apply_daily_rollover(&mut state, date(2024, 1, 2)));
        assert_eq!(state.day, "2024/01/02");
        assert_eq!(state.today, 0);
        assert_eq!(state.yesterday, 5);
        assert_eq!(state.total, 20);
    }

    #[test]
    fn rollover_is_idempotent_for_the_same_date() {
        let mut state = record("2024/01/01", 20, 5, 2);
        assert!(apply_daily_rollover(&mut state, date(2024, 1, 2)));
        let after_first = state.clone();
        assert!(!apply_daily_rollover(&mut state, date(2024, 1, 2)));
        assert_eq!(state, after_first);

        let mut same_day = record("2024/01/02", 20, 5, 2);
        assert!(!apply_daily_rollover(&mut same_day, date(2024, 1, 2)));
        assert_eq!(same_day, record("2024/01/02", 20, 5, 2));
    }

    #[test]
    fn rollover_after_idle_days_keeps_last_loaded_day() {
        let mut state = record("2024/01/01", 20, 5, 2);
        apply_daily_rollover(&mut state, date(2024, 1, 9));
        assert_eq!(state.yesterday, 5);
        assert_eq!(state.day, "2024/01/09");
    }

    #[test]
    fn record_visit_increments_both_counters() {
        let mut state = record("2024/01/01", 10, 3, 0);
        record_visit(&mut state);
        assert_eq!(state.total, 11);
        assert_eq!(state.today, 4);
    }

    #[test]
    fn append_substitutes_placeholder_name() {
        let mut state = record("2024/01/01", 0, 0, 0);
        let entry = append_guestbook_entry(&mut state, "   ", "hello", at(2024, 1, 1, 9, 8, 7))
            .cloned()
            .unwrap();
        assert_eq!(entry.name, ANONYMOUS_NAME);
        assert_eq!(entry.message, "hello");
        assert_eq!(entry.date, "2024/01/01 09:08:07");
        assert_eq!(state.guestbook, vec![entry]);
    }

    #[test]
    fn append_ignores_blank_message() {
        let mut state = record("2024/01/01", 0, 0, 0);
        assert!(append_guestbook_entry(&mut state, "A", "   ", at(2024, 1, 1, 0, 0, 0)).is_none());
        assert!(state.guestbook.is_empty());
    }

    #[test]
    fn append_truncates_name_and_message() {
        let mut state = record("2024/01/01", 0, 0, 0);
        let name = "n".repeat(30);
        let message = "あ".repeat(300);
        append_guestbook_entry(&mut state, &name, &format!("  {message}  "), at(2024, 1, 1, 0, 0, 0));

        let entry = &state.guestbook[0];
        assert_eq!(entry.name.chars().count(), 20);
        assert_eq!(entry.message.chars().count(), 200);
    }

    #[test]
    fn clear_empties_guestbook() {
        let mut state = record("2024/01/01", 0, 0, 0);
        for i in 0..5 {
            append_guestbook_entry(&mut state, "", &format!("post {i}"), at(2024, 1, 1, 0, 0, i));
        }
        assert_eq!(clear_guestbook(&mut state), 5);
        assert!(state.guestbook.is_empty());
        assert_eq!(clear_guestbook(&mut state), 0);
    }

    #[test]
    fn guestbook_is_listed_newest_first() {
        let mut state = record("2024/01/01", 0, 0, 0);
        append_guestbook_entry(&mut state, "", "first", at(2024, 1, 1, 0, 0, 1));
        append_guestbook_entry(&mut state, "", "second", at(2024, 1, 1, 0, 0, 2));
        let listed = guestbook_newest_first(&state);
        assert_eq!(listed[0].message, "second");
        assert_eq!(listed[1].message, "first");
    }

    #[test]
    fn milestones_match_exactly() {
        assert!(is_milestone(7777));
        assert!(is_milestone(8888));
        assert!(is_milestone(9999));
        assert!(!is_milestone(7778));
        assert!(!is_milestone(0));
    }
}
