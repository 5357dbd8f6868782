//! Session-scoped result store.
//!
//! Holds the ordered summary rows for every successful submission and the findings that belong
//! to each of them. The store only grows: there is no edit or delete, so record ids assigned as
//! `len + 1` stay unique and strictly increasing for the lifetime of the session.

use crate::constants::TIMESTAMP_FORMAT;
use crate::finding::Finding;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Identifier of a record within one session, starting at 1.
pub type RecordId = u32;

/// Whether the analysis response carried a `results` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Summary {
    Success,
    Error,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("Success"),
            Self::Error => f.write_str("Error"),
        }
    }
}

/// Summary row for one analysed image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    id: RecordId,
    #[serde(serialize_with = "serialize_timestamp")]
    timestamp: NaiveDateTime,
    summary: Summary,
}

impl Record {
    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// Submission time as shown on the page, e.g. `2024-05-01 09:30:00`.
    pub fn timestamp_text(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn summary(&self) -> Summary {
        self.summary
    }
}

fn serialize_timestamp<S>(timestamp: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(&timestamp.format(TIMESTAMP_FORMAT))
}

/// Records plus their findings for a single browser session.
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    records: Vec<Record>,
    details: HashMap<RecordId, Vec<Finding>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record and its findings, returning the new record.
    ///
    /// The id is the number of records already stored plus one.
    pub fn append(
        &mut self,
        timestamp: NaiveDateTime,
        summary: Summary,
        findings: Vec<Finding>,
    ) -> &Record {
        let id = self.next_id();
        self.details.insert(id, findings);
        self.records.push(Record {
            id,
            timestamp,
            summary,
        });
        &self.records[self.records.len() - 1]
    }

    /// Id the next appended record will receive.
    pub fn next_id(&self) -> RecordId {
        // No deletes, so len + 1 is never reused.
        self.records.len() as RecordId + 1
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn record(&self, id: RecordId) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Findings stored for `id`, in the order the API returned them.
    pub fn findings(&self, id: RecordId) -> Option<&[Finding]> {
        self.details.get(&id).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn finding(parameter: &str, value: &str) -> Finding {
        Finding {
            parameter: parameter.into(),
            value: json!(value),
            interpretation: "i".into(),
            clinical_significance: "c".into(),
            follow_up: "f".into(),
        }
    }

    #[test]
    fn ids_are_count_plus_one() {
        let mut store = ResultStore::new();
        assert!(store.is_empty());

        for expected in 1..=5 {
            assert_eq!(store.next_id(), expected);
            let id = store.append(at(9, 0, expected), Summary::Success, vec![]).id();
            assert_eq!(id, expected);
            assert_eq!(store.len(), expected as usize);
        }
    }

    #[test]
    fn every_record_has_a_detail_entry() {
        let mut store = ResultStore::new();
        store.append(at(9, 0, 0), Summary::Success, vec![finding("ph", "6")]);
        store.append(at(9, 1, 0), Summary::Error, vec![]);

        for record in store.records() {
            assert!(store.findings(record.id()).is_some());
        }
        assert_eq!(store.findings(2).unwrap().len(), 0);
        assert!(store.findings(3).is_none());
    }

    #[test]
    fn findings_keep_api_order() {
        let mut store = ResultStore::new();
        store.append(
            at(9, 0, 0),
            Summary::Success,
            vec![finding("ph", "6"), finding("bilirubin", "Neg"), finding("blood", "Trace")],
        );

        let names: Vec<_> = store
            .findings(1)
            .unwrap()
            .iter()
            .map(|f| f.parameter.as_str())
            .collect();
        assert_eq!(names, ["ph", "bilirubin", "blood"]);
    }

    #[test]
    fn record_serialises_with_display_timestamp() {
        let mut store = ResultStore::new();
        let record = store.append(at(9, 30, 5), Summary::Success, vec![]).clone();
        assert_eq!(record.timestamp_text(), "2024-05-01 09:30:05");

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({ "id": 1, "timestamp": "2024-05-01 09:30:05", "summary": "Success" })
        );
    }
}
