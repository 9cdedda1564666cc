use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// The two document families this service produces.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Notice,
    Bill,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Notice => "notice",
            Self::Bill => "bill",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An official notice as persisted in the notice history.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    #[schema(example = "notice_1767225600000000")]
    pub id: String,
    #[schema(example = "01.01.2026")]
    pub date: String,
    #[schema(example = "NTC00001")]
    pub notice_number: String,
    /// Rich-text markup from the editor, rendered verbatim.
    #[schema(example = "<p>Meeting</p>")]
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A donation receipt as persisted in the bill history.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    #[schema(example = "bill_1767225600000000")]
    pub id: String,
    /// Counter value at generation time, unpadded.
    #[schema(example = "7")]
    pub receipt_number: String,
    #[schema(example = "A. Rahman")]
    pub name: String,
    #[schema(example = 5000.0)]
    pub amount: f64,
    #[schema(example = "Treasurer")]
    pub received_by: String,
    #[schema(example = "01.01.2026")]
    pub date: String,
    pub created_at: DateTime<Utc>,
}

/// Form state submitted for a notice.
#[derive(Debug, Serialize, Deserialize, Clone, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoticeForm {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub notice_number: String,
    #[serde(default)]
    pub content: String,
}

/// Form state submitted for a donation receipt.
#[derive(Debug, Serialize, Deserialize, Clone, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BillForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub received_by: String,
    #[serde(default)]
    pub date: String,
}

/// A stamped record of either kind.
///
/// Serializes as `{ "type": "notice" | "bill", "data": { .. } }`, the shape the
/// notification relay has always received.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum GeneratedRecord {
    Notice(Notice),
    Bill(Bill),
}

impl GeneratedRecord {
    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::Notice(_) => DocumentKind::Notice,
            Self::Bill(_) => DocumentKind::Bill,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Notice(notice) => &notice.id,
            Self::Bill(bill) => &bill.id,
        }
    }
}
