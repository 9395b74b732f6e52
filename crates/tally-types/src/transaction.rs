use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::id::TransactionId;

/// Direction of a ledger entry.
///
/// Parsing is case-insensitive (`"credit"`, `"Credit"` and `"CREDIT"` are the
/// same value); the canonical spelling is upper case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum TransactionType {
    Credit,
    Debit,
}

impl TransactionType {
    /// Canonical upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "CREDIT",
            Self::Debit => "DEBIT",
        }
    }

    /// Case-insensitive comparison against a raw type string.
    pub fn matches(&self, raw: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(raw)
    }
}

impl FromStr for TransactionType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("CREDIT") {
            Ok(Self::Credit)
        } else if s.eq_ignore_ascii_case("DEBIT") {
            Ok(Self::Debit)
        } else {
            Err(TypeError::UnknownType(s.to_string()))
        }
    }
}

impl TryFrom<String> for TransactionType {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Candidate fields submitted by a caller for create or update.
///
/// Every field is optional here: absence is a validation failure decided by
/// the service layer, not a deserialization failure.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDraft {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl TransactionDraft {
    /// Draft with every required field present.
    pub fn new(
        description: impl Into<String>,
        amount: Decimal,
        kind: impl Into<String>,
        category: Option<&str>,
    ) -> Self {
        Self {
            description: Some(description.into()),
            amount: Some(amount),
            kind: Some(kind.into()),
            category: category.map(str::to_string),
        }
    }
}

/// The mutable fields of a record after they passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionFields {
    pub description: String,
    pub amount: Decimal,
    pub kind: TransactionType,
    pub category: Option<String>,
}

/// A stored ledger entry.
///
/// `id` and `timestamp` are assigned once by the record store and survive
/// every later update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub description: String,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub timestamp: DateTime<Utc>,
    pub category: Option<String>,
}

impl Transaction {
    /// Build a record from validated fields and a freshly assigned identity.
    pub fn new(id: TransactionId, timestamp: DateTime<Utc>, fields: TransactionFields) -> Self {
        Self {
            id,
            description: fields.description,
            amount: fields.amount,
            kind: fields.kind,
            timestamp,
            category: fields.category,
        }
    }

    /// Replace the mutable fields, leaving `id` and `timestamp` untouched.
    pub fn apply(&mut self, fields: TransactionFields) {
        self.description = fields.description;
        self.amount = fields.amount;
        self.kind = fields.kind;
        self.category = fields.category;
    }

    /// Case-insensitive category match. A record without a category never
    /// matches.
    pub fn in_category(&self, category: &str) -> bool {
        self.category
            .as_deref()
            .is_some_and(|c| c.to_lowercase() == category.to_lowercase())
    }
}
