//! Domain models for JagaDoku
//!
//! Field names on the wire follow the camelCase layout the web client and the
//! persisted blobs use (`targetAmount`, `spreadsheetId`, ...).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Recommended income categories (not enforced)
pub const INCOME_CATEGORIES: &[&str] = &["Gaji", "Bonus", "Investasi", "Lainnya"];

/// Recommended expense categories (not enforced)
pub const EXPENSE_CATEGORIES: &[&str] = &[
    "Makanan",
    "Transportasi",
    "Belanja",
    "Kesehatan",
    "Hiburan",
    "Tagihan",
    "Pendidikan",
    "Lainnya",
];

/// Generate a fresh opaque identifier
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
        }
    }

    /// Recommended categories for this type
    pub fn categories(&self) -> &'static [&'static str] {
        match self {
            Self::Income => INCOME_CATEGORIES,
            Self::Expense => EXPENSE_CATEGORIES,
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" | "pemasukan" => Ok(Self::Income),
            "expense" | "pengeluaran" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recorded income or expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub amount: f64,
    pub category: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub date: NaiveDate,
}

/// User input for a new transaction
#[derive(Debug, Clone, Deserialize)]
pub struct NewTransaction {
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
}

impl Transaction {
    /// Build a transaction with a fresh id.
    ///
    /// Returns `None` when a required field is missing: blank description or
    /// category, or an amount that is negative or not finite.
    pub fn create(input: NewTransaction) -> Option<Self> {
        let description = input.description.trim();
        let category = input.category.trim();
        if description.is_empty() || category.is_empty() {
            return None;
        }
        if !input.amount.is_finite() || input.amount < 0.0 {
            return None;
        }

        Some(Self {
            id: new_id(),
            amount: input.amount,
            category: category.to_string(),
            description: description.to_string(),
            kind: input.kind,
            date: input.date,
        })
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }
}

/// A savings target with accumulated contributions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsGoal {
    pub id: String,
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub deadline: NaiveDate,
}

/// User input for a new savings goal
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSavingsGoal {
    pub name: String,
    pub target_amount: f64,
    pub deadline: NaiveDate,
}

impl SavingsGoal {
    /// Build a goal with a fresh id and nothing saved yet.
    ///
    /// Returns `None` for a blank name or a target that is not a positive
    /// finite number, so progress never divides by zero.
    pub fn create(input: NewSavingsGoal) -> Option<Self> {
        let name = input.name.trim();
        if name.is_empty() {
            return None;
        }
        if !input.target_amount.is_finite() || input.target_amount <= 0.0 {
            return None;
        }

        Some(Self {
            id: new_id(),
            name: name.to_string(),
            target_amount: input.target_amount,
            current_amount: 0.0,
            deadline: input.deadline,
        })
    }
}

/// Google account profile returned by the userinfo endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub picture: String,
}

/// Logged-in user, persisted under the `user` key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    pub name: String,
    pub email: String,
    pub picture: String,
    pub access_token: String,
    pub spreadsheet_id: Option<String>,
    #[serde(default)]
    pub is_guest: bool,
}

impl UserSession {
    /// Session for a user signed in through Google
    pub fn from_profile(
        profile: Profile,
        access_token: &str,
        spreadsheet_id: Option<String>,
    ) -> Self {
        Self {
            name: profile.name,
            email: profile.email,
            picture: profile.picture,
            access_token: access_token.to_string(),
            spreadsheet_id,
            is_guest: false,
        }
    }

    /// Local-only session with no remote identity
    pub fn guest(name: &str) -> Self {
        let name = name.trim();
        Self {
            name: if name.is_empty() { "Tamu" } else { name }.to_string(),
            email: String::new(),
            picture: String::new(),
            access_token: String::new(),
            spreadsheet_id: None,
            is_guest: true,
        }
    }

    /// Whether this session can talk to the remote spreadsheet
    pub fn can_sync(&self) -> bool {
        !self.is_guest && !self.access_token.is_empty() && self.spreadsheet_id.is_some()
    }
}

/// Parse a free-form amount typed by the user.
///
/// Dots are Indonesian thousands separators whenever every group after the
/// first has exactly three digits ("250.000", "1.250.000"). Anything else is
/// read as a plain number, so "12.5" stays 12.5. Empty, non-numeric, NaN and
/// infinite input yield `None`.
pub fn parse_amount(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let value = if is_dotted_thousands(trimmed) {
        trimmed.replace('.', "").parse::<f64>().ok()?
    } else {
        trimmed.parse::<f64>().ok()?
    };

    value.is_finite().then_some(value)
}

fn is_dotted_thousands(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    let mut groups = digits.split('.');
    let lead = groups.next().unwrap_or_default();
    let lead_ok = (1..=3).contains(&lead.len())
        && !lead.starts_with('0')
        && lead.chars().all(|c| c.is_ascii_digit());

    let mut rest = groups.peekable();
    lead_ok
        && rest.peek().is_some()
        && rest.all(|g| g.len() == 3 && g.chars().all(|c| c.is_ascii_digit()))
}

/// Format a rupiah amount: `Rp 1.250.000`, `-Rp 250.000`
pub fn format_idr(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    if negative {
        format!("-Rp {}", grouped)
    } else {
        format!("Rp {}", grouped)
    }
}
