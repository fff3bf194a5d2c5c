//! Canonical spending groups and the rule table that maps free-text
//! categories onto them.

mod endpoints;
mod name;
mod rules;

pub use endpoints::{get_categories, get_category_suggestions};
pub use name::CategoryName;
pub use rules::{CategoryGroup, DEFAULT_RULE_TABLE, RuleTable, normalize};
