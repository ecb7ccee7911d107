//! Disclosed document records and their deduplication key.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Title used when the portal omits `documentTitle`.
pub const UNTITLED: &str = "No title";

/// Identity used for deduplication: `(id, disclosureDate, disclosureType)`.
///
/// The same document id may reappear with a different date or type when the
/// portal reclassifies it; those are treated as distinct entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey {
    pub id: String,
    pub disclosure_date: String,
    pub disclosure_type: String,
}

/// One disclosed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Upstream `publishedDocumentId`
    pub id: String,

    /// Raw `YYYY-MM-DD` date string as sent by the portal
    pub disclosure_date: String,

    /// Disclosure category, e.g. `FULL_ACCESS` or `PARTIAL`
    pub disclosure_type: String,

    /// Human-readable title
    pub title: String,
}

/// Persisted form of a record: `[id, disclosureDate, disclosureType, title]`.
pub type StoredTuple = (String, String, String, String);

impl Record {
    pub fn new(
        id: impl Into<String>,
        disclosure_date: impl Into<String>,
        disclosure_type: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            disclosure_date: disclosure_date.into(),
            disclosure_type: disclosure_type.into(),
            title: title.into(),
        }
    }

    /// Deduplication key of this record.
    pub fn key(&self) -> RecordKey {
        RecordKey {
            id: self.id.clone(),
            disclosure_date: self.disclosure_date.clone(),
            disclosure_type: self.disclosure_type.clone(),
        }
    }

    /// Parse the disclosure date, if it is a valid `YYYY-MM-DD` string.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.disclosure_date.trim(), "%Y-%m-%d").ok()
    }

    /// Convert to the persisted tuple form.
    pub fn to_stored(&self) -> StoredTuple {
        (
            self.id.clone(),
            self.disclosure_date.clone(),
            self.disclosure_type.clone(),
            self.title.clone(),
        )
    }

    /// Rebuild a record from one persisted history entry.
    ///
    /// Accepts the 4-element tuple form, the legacy 3-element form (title
    /// defaults to [`UNTITLED`]), and raw portal document objects.
    pub fn from_stored(entry: Value) -> Result<Self, String> {
        match entry {
            Value::Array(items) => {
                if !(3..=4).contains(&items.len()) {
                    return Err(format!(
                        "tuple entry has {} fields, expected 3 or 4",
                        items.len()
                    ));
                }

                let key_field = |i: usize| {
                    items[i]
                        .as_str()
                        .map(str::to_string)
                        .ok_or_else(|| format!("tuple field {i} is not a string"))
                };
                let id = key_field(0)?;
                let date = key_field(1)?;
                let kind = key_field(2)?;
                // Title is best-effort; only the key fields must survive.
                let title = items
                    .get(3)
                    .and_then(Value::as_str)
                    .unwrap_or(UNTITLED);

                Ok(Self::new(id, date, kind, title))
            }
            Value::Object(_) => {
                let doc: DocumentPayload =
                    serde_json::from_value(entry).map_err(|e| e.to_string())?;
                Record::try_from(doc)
            }
            other => Err(format!("unexpected entry {other}")),
        }
    }
}

impl From<StoredTuple> for Record {
    fn from((id, date, kind, title): StoredTuple) -> Self {
        Self::new(id, date, kind, title)
    }
}

/// A document object as returned in the portal's `content` array.
///
/// Every field is optional here; [`Record::try_from`] decides what is
/// required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentPayload {
    pub published_document_id: Option<Value>,
    pub disclosure_date: Option<String>,
    pub disclosure_type: Option<String>,
    pub document_title: Option<String>,
}

impl TryFrom<DocumentPayload> for Record {
    type Error = String;

    fn try_from(doc: DocumentPayload) -> Result<Self, Self::Error> {
        let id = match doc.published_document_id {
            Some(Value::String(s)) if !s.trim().is_empty() => s,
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err("missing publishedDocumentId".to_string()),
        };
        let disclosure_date = doc
            .disclosure_date
            .ok_or_else(|| format!("document {id} is missing disclosureDate"))?;
        let disclosure_type = doc
            .disclosure_type
            .ok_or_else(|| format!("document {id} is missing disclosureType"))?;
        let title = doc
            .document_title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| UNTITLED.to_string());

        Ok(Self {
            id,
            disclosure_date,
            disclosure_type,
            title,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_ignores_title() {
        let a = Record::new("1", "2025-01-02", "PARTIAL", "First");
        let b = Record::new("1", "2025-01-02", "PARTIAL", "Renamed");
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_key_distinguishes_reclassification() {
        let a = Record::new("1", "2025-01-02", "PARTIAL", "Doc");
        let b = Record::new("1", "2025-01-02", "FULL_ACCESS", "Doc");
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn test_parsed_date() {
        let ok = Record::new("1", "2025-03-14", "PARTIAL", "Doc");
        assert_eq!(ok.parsed_date(), NaiveDate::from_ymd_opt(2025, 3, 14));

        let bad = Record::new("1", "14/03/2025", "PARTIAL", "Doc");
        assert!(bad.parsed_date().is_none());
    }

    #[test]
    fn test_from_stored_tuple_forms() {
        let full = Record::from_stored(json!(["7", "2025-01-01", "PARTIAL", "Minutes"])).unwrap();
        assert_eq!(full.title, "Minutes");

        let legacy = Record::from_stored(json!(["7", "2025-01-01", "PARTIAL"])).unwrap();
        assert_eq!(legacy.title, UNTITLED);
        assert_eq!(legacy.key(), full.key());
        assert_eq!(Record::from(full.to_stored()), full);

        let null_title = Record::from_stored(json!(["7", "2025-01-01", "PARTIAL", null])).unwrap();
        assert_eq!(null_title.title, UNTITLED);
        assert_eq!(null_title.key(), full.key());
    }

    #[test]
    fn test_from_stored_document_object() {
        let entry = json!({
            "publishedDocumentId": 42,
            "disclosureDate": "2024-12-31",
            "disclosureType": "FULL_ACCESS",
            "documentTitle": "Annual report",
            "language": "EN"
        });
        let record = Record::from_stored(entry).unwrap();
        assert_eq!(record, Record::new("42", "2024-12-31", "FULL_ACCESS", "Annual report"));
    }

    #[test]
    fn test_from_stored_rejects_malformed() {
        assert!(Record::from_stored(json!(["7", "2025-01-01"])).is_err());
        assert!(Record::from_stored(json!(["7", 3, "PARTIAL"])).is_err());
        assert!(Record::from_stored(json!("7")).is_err());
    }

    #[test]
    fn test_payload_missing_fields() {
        let doc = DocumentPayload {
            published_document_id: Some(json!("9")),
            disclosure_date: None,
            disclosure_type: Some("PARTIAL".into()),
            document_title: None,
        };
        assert!(Record::try_from(doc).is_err());

        let doc = DocumentPayload {
            published_document_id: None,
            disclosure_date: Some("2025-01-01".into()),
            disclosure_type: Some("PARTIAL".into()),
            document_title: None,
        };
        assert!(Record::try_from(doc).is_err());
    }

    #[test]
    fn test_payload_defaults_title() {
        let doc = DocumentPayload {
            published_document_id: Some(json!("9")),
            disclosure_date: Some("2025-01-01".into()),
            disclosure_type: Some("PARTIAL".into()),
            document_title: Some("   ".into()),
        };
        assert_eq!(Record::try_from(doc).unwrap().title, UNTITLED);
    }
}
