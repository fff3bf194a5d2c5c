//! Defines the core data models for transactions and how user input is
//! validated into them.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, UserID, category::CategoryName, date_format::parse_date};

/// Database identifier for a transaction.
pub type TransactionId = i64;

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money earned, e.g. a salary payment.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionKind {
    /// The lower-case name used on the wire and in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    /// Parse a kind, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            _ => Err(Error::InvalidTransactionKind(s.to_owned())),
        }
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [NewTransaction::new] and
/// [crate::transaction::create_transaction].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that owns the transaction.
    pub user_id: UserID,
    /// Whether the money was earned or spent.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// The category as entered by the user, e.g. "Zomato" or "Rent payment".
    pub category: CategoryName,
    /// The amount of money spent or earned, always positive.
    pub amount: f64,
    /// When the transaction happened.
    #[serde(with = "crate::date_format")]
    pub date: Date,
}

/// A validated transaction that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// Whether the money was earned or spent.
    pub kind: TransactionKind,
    /// The category as entered by the user.
    pub category: CategoryName,
    /// The amount of money, finite and greater than zero.
    pub amount: f64,
    /// When the transaction happened.
    pub date: Date,
}

impl NewTransaction {
    /// Create a new transaction after checking `amount`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidAmount] if `amount` is not a finite number
    /// greater than zero.
    pub fn new(
        kind: TransactionKind,
        category: CategoryName,
        amount: f64,
        date: Date,
    ) -> Result<Self, Error> {
        Ok(Self {
            kind,
            category,
            amount: validate_amount(amount)?,
            date,
        })
    }
}

/// The fields of a transaction to change. Fields set to `None` are left as-is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionUpdate {
    /// The new kind.
    pub kind: Option<TransactionKind>,
    /// The new category.
    pub category: Option<CategoryName>,
    /// The new amount, finite and greater than zero.
    pub amount: Option<f64>,
    /// The new date.
    pub date: Option<Date>,
}

/// Filters for listing transactions. Unset fields do not filter.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransactionFilter {
    /// The earliest date to include.
    pub from: Option<Date>,
    /// The latest date to include.
    pub to: Option<Date>,
    /// Only include transactions of this kind.
    pub kind: Option<TransactionKind>,
}

/// The raw JSON body for creating or updating a transaction.
///
/// Every field is optional so that missing fields are reported with the
/// same error messages as invalid ones.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionData {
    /// "income" or "expense", in any case.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// The category as entered by the user.
    pub category: Option<String>,
    /// The amount of money.
    pub amount: Option<f64>,
    /// A "YYYY-MM-DD" date or an RFC 3339 date-time.
    pub date: Option<String>,
}

impl TransactionData {
    /// Validate the data for a new transaction, using `today` when no date is given.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid field.
    pub fn into_new_transaction(self, today: Date) -> Result<NewTransaction, Error> {
        let kind = self.kind.as_deref().unwrap_or_default().parse()?;
        let category = CategoryName::new(self.category.as_deref().unwrap_or_default())?;
        let amount = self.amount.ok_or(Error::InvalidAmount)?;
        let date = match self.date {
            Some(date) => parse_date(&date)?,
            None => today,
        };

        NewTransaction::new(kind, category, amount, date)
    }

    /// Validate the fields that are present for a partial update.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid field.
    pub fn into_update(self) -> Result<TransactionUpdate, Error> {
        Ok(TransactionUpdate {
            kind: self.kind.as_deref().map(str::parse).transpose()?,
            category: self
                .category
                .as_deref()
                .map(CategoryName::new)
                .transpose()?,
            amount: self.amount.map(validate_amount).transpose()?,
            date: self.date.as_deref().map(parse_date).transpose()?,
        })
    }
}

fn validate_amount(amount: f64) -> Result<f64, Error> {
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(Error::InvalidAmount)
    }
}

// ============================================================================
// TESTS
// ============================================================================
