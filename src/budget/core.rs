//! Defines the budget model and how user input is validated into it.

use serde::{Deserialize, Serialize};

use crate::{Error, UserID, category::CategoryName, period::Period};

/// Database identifier for a budget.
pub type BudgetId = i64;

/// A spending limit for one category in one month.
///
/// A user has at most one budget per category and month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Budget {
    /// The ID of the budget.
    pub id: BudgetId,
    /// The user that owns the budget.
    pub user_id: UserID,
    /// The month number, 1 to 12.
    pub month: u8,
    /// The year.
    pub year: i32,
    /// The category as entered by the user. May be a group name such as "Food".
    pub category: CategoryName,
    /// The most the user wants to spend, never negative.
    pub limit: f64,
}

/// A validated budget that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    /// The month the limit applies to.
    pub period: Period,
    /// The category as entered by the user.
    pub category: CategoryName,
    /// The limit, finite and not negative.
    pub limit: f64,
}

impl NewBudget {
    /// Create a new budget after checking `limit`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidLimit] if `limit` is negative or not finite.
    pub fn new(period: Period, category: CategoryName, limit: f64) -> Result<Self, Error> {
        if !limit.is_finite() || limit < 0.0 {
            return Err(Error::InvalidLimit);
        }

        Ok(Self {
            period,
            category,
            limit,
        })
    }
}

/// The raw JSON body for creating or updating a budget.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BudgetData {
    /// The category as entered by the user.
    pub category: Option<String>,
    /// The limit.
    pub limit: Option<f64>,
    /// The month number, 1 to 12.
    pub month: Option<u8>,
    /// The year.
    pub year: Option<i32>,
}

impl TryFrom<BudgetData> for NewBudget {
    type Error = Error;

    fn try_from(data: BudgetData) -> Result<Self, Self::Error> {
        let category = CategoryName::new(data.category.as_deref().unwrap_or_default())?;
        let limit = data.limit.ok_or(Error::InvalidLimit)?;
        let period = match (data.month, data.year) {
            (Some(month), Some(year)) => Period::new(month, year)?,
            _ => return Err(Error::MissingPeriod),
        };

        NewBudget::new(period, category, limit)
    }
}

#[cfg(test)]
mod budget_data_tests {
    use crate::{Error, category::CategoryName, period::Period};

    use super::{BudgetData, NewBudget};

    fn valid_data() -> BudgetData {
        BudgetData {
            category: Some(" Food ".to_owned()),
            limit: Some(1000.0),
            month: Some(1),
            year: Some(2025),
        }
    }

    #[test]
    fn valid_data_becomes_new_budget() {
        let budget = NewBudget::try_from(valid_data()).unwrap();

        assert_eq!(budget.period, Period::new(1, 2025).unwrap());
        assert_eq!(budget.category, CategoryName::new_unchecked("Food"));
        assert_eq!(budget.limit, 1000.0);
    }

    #[test]
    fn zero_limit_is_allowed() {
        let data = BudgetData {
            limit: Some(0.0),
            ..valid_data()
        };

        assert!(NewBudget::try_from(data).is_ok());
    }

    #[test]
    fn negative_and_nan_limits_are_invalid() {
        for limit in [-1.0, f64::NAN, f64::NEG_INFINITY] {
            let data = BudgetData {
                limit: Some(limit),
                ..valid_data()
            };

            assert_eq!(
                NewBudget::try_from(data),
                Err(Error::InvalidLimit),
                "limit {limit} should be rejected"
            );
        }
    }

    #[test]
    fn missing_month_is_invalid() {
        let data = BudgetData {
            month: None,
            ..valid_data()
        };

        assert_eq!(NewBudget::try_from(data), Err(Error::MissingPeriod));
    }

    #[test]
    fn month_out_of_range_is_invalid() {
        let data = BudgetData {
            month: Some(13),
            ..valid_data()
        };

        assert!(matches!(
            NewBudget::try_from(data),
            Err(Error::InvalidPeriod { .. })
        ));
    }

    #[test]
    fn blank_category_is_invalid() {
        let data = BudgetData {
            category: None,
            ..valid_data()
        };

        assert_eq!(NewBudget::try_from(data), Err(Error::EmptyCategory));
    }
}
