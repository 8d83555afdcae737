//! Resources returned by the banking API
//!
//! All amounts are integer minor units (kopiyky, cents).

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Base of the public donation page for a jar
pub const DONATION_BASE_URL: &str = "https://send.monobank.ua";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    /// ISO 4217 numeric code
    pub code: i32,
    pub name: String,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub flag: Option<String>,
}

impl Currency {
    /// Symbol if the backend knows one, otherwise the name
    pub fn display_symbol(&self) -> &str {
        self.symbol.as_deref().unwrap_or(&self.name)
    }
}

/// Card product line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CardType {
    Platinum,
    Black,
    EAid,
    White,
    Other(String),
}

impl CardType {
    /// Value as sent by the backend
    pub fn as_str(&self) -> &str {
        match self {
            Self::Platinum => "platinum",
            Self::Black => "black",
            Self::EAid => "eAid",
            Self::White => "white",
            Self::Other(raw) => raw,
        }
    }

    /// Name shown to the user
    pub fn label(&self) -> &str {
        match self {
            Self::EAid => "e-dopomoga",
            other => other.as_str(),
        }
    }
}

impl From<String> for CardType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "platinum" => Self::Platinum,
            "black" => Self::Black,
            "eAid" => Self::EAid,
            "white" => Self::White,
            _ => Self::Other(raw),
        }
    }
}

impl From<CardType> for String {
    fn from(card_type: CardType) -> Self {
        card_type.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    #[serde(default)]
    pub send_id: Option<String>,
    #[serde(rename = "type")]
    pub card_type: CardType,
    pub balance: i64,
    pub credit_limit: i64,
    pub currency: Currency,
    #[serde(default)]
    pub cashback_type: Option<String>,
    #[serde(default)]
    pub masked_pan: Option<Vec<String>>,
    #[serde(default)]
    pub iban: Option<String>,
}

/// A goal-oriented sub-account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jar {
    pub id: String,
    #[serde(default)]
    pub send_id: Option<String>,
    pub title: String,
    pub balance: i64,
    /// Target amount; `None` or zero means the jar has no target
    #[serde(default)]
    pub goal: Option<i64>,
    pub currency: Currency,
    #[serde(default)]
    pub is_budget: Option<bool>,
}

impl Jar {
    pub fn has_goal(&self) -> bool {
        matches!(self.goal, Some(goal) if goal != 0)
    }

    pub fn donation_url(&self) -> Option<String> {
        self.send_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(|id| format!("{}/{}", DONATION_BASE_URL, id))
    }
}

/// A movement on a jar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    /// Unix time in seconds
    #[serde(default)]
    pub time: Option<i64>,
    pub amount: i64,
    /// Jar balance right after this transaction
    pub balance: i64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub category_symbol: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    pub currency: Currency,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.amount > 0
    }

    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.time
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
    }
}

/// Jar page data. Each half is loaded independently and may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JarDetail {
    pub jar_details: Option<Jar>,
    pub jar_transactions: Option<Vec<Transaction>>,
}
