//! The shared rule table that maps free-text categories to canonical groups.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The canonical spending groups that raw categories are folded into.
///
/// The declaration order is the order groups are listed to clients and the
/// order used to break ties between groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CategoryGroup {
    /// Eating out, groceries and food delivery.
    Food,
    /// Fuel, ride hailing, public transport and tolls.
    Travel,
    /// Rent and leases.
    Rent,
    /// Power, water, internet and phone bills.
    Utilities,
    /// Online and in-store shopping.
    Shopping,
    /// Streaming, movies and going out.
    Entertainment,
    /// Doctors, medicine and the gym.
    Health,
    /// Courses, books and fees.
    Education,
    /// Savings and investments.
    Savings,
    /// Anything no rule matches.
    Other,
}

impl CategoryGroup {
    /// Every group in display order.
    pub const ALL: [CategoryGroup; 10] = [
        CategoryGroup::Food,
        CategoryGroup::Travel,
        CategoryGroup::Rent,
        CategoryGroup::Utilities,
        CategoryGroup::Shopping,
        CategoryGroup::Entertainment,
        CategoryGroup::Health,
        CategoryGroup::Education,
        CategoryGroup::Savings,
        CategoryGroup::Other,
    ];

    /// The group's display name, e.g. "Food".
    pub fn name(&self) -> &'static str {
        match self {
            CategoryGroup::Food => "Food",
            CategoryGroup::Travel => "Travel",
            CategoryGroup::Rent => "Rent",
            CategoryGroup::Utilities => "Utilities",
            CategoryGroup::Shopping => "Shopping",
            CategoryGroup::Entertainment => "Entertainment",
            CategoryGroup::Health => "Health",
            CategoryGroup::Education => "Education",
            CategoryGroup::Savings => "Savings",
            CategoryGroup::Other => "Other",
        }
    }

    /// The group whose name equals `text`, ignoring case and surrounding whitespace.
    pub fn from_name(text: &str) -> Option<CategoryGroup> {
        let text = text.trim();

        CategoryGroup::ALL
            .into_iter()
            .find(|group| group.name().eq_ignore_ascii_case(text))
    }
}

impl Display for CategoryGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Maps any of a list of lower-case keywords to a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryRule {
    /// The group that matching text is folded into.
    pub group: CategoryGroup,
    /// Lower-case keywords matched as substrings.
    pub keywords: &'static [&'static str],
}

impl CategoryRule {
    /// Whether any keyword is contained in `text`.
    ///
    /// `text` must already be trimmed and lower-case.
    #[inline]
    fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|keyword| text.contains(keyword))
    }
}

/// An ordered, versioned list of category rules.
///
/// Rules are tried in order and the first match wins, so a keyword that is a
/// substring of a later rule's keyword shadows it (e.g. "gas" in Travel
/// matches "gas bill" before Utilities does).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuleTable {
    /// Incremented whenever the rules change in a way that alters results.
    pub version: u32,
    /// The rules, in priority order.
    pub rules: &'static [CategoryRule],
}

/// The rule table shared by every part of the application.
pub const DEFAULT_RULE_TABLE: RuleTable = RuleTable {
    version: 1,
    rules: &[
        CategoryRule {
            group: CategoryGroup::Food,
            keywords: &[
                "food",
                "restaurant",
                "dining",
                "groceries",
                "grocery",
                "coffee",
                "snacks",
                "swiggy",
                "zomato",
            ],
        },
        CategoryRule {
            group: CategoryGroup::Travel,
            keywords: &[
                "gas", "fuel", "petrol", "diesel", "uber", "ola", "lyft", "taxi",
                "train", "bus", "flight", "tickets", "parking", "toll",
            ],
        },
        CategoryRule {
            group: CategoryGroup::Rent,
            keywords: &["rent", "lease", "house rent"],
        },
        CategoryRule {
            group: CategoryGroup::Utilities,
            keywords: &[
                "electric",
                "electricity",
                "water",
                "wifi",
                "internet",
                "phone",
                "gas bill",
            ],
        },
        CategoryRule {
            group: CategoryGroup::Shopping,
            keywords: &[
                "shopping",
                "amazon",
                "flipkart",
                "clothes",
                "electronics",
                "mall",
            ],
        },
        CategoryRule {
            group: CategoryGroup::Entertainment,
            keywords: &[
                "movie",
                "netflix",
                "spotify",
                "games",
                "party",
                "outing",
            ],
        },
        CategoryRule {
            group: CategoryGroup::Health,
            keywords: &[
                "doctor", "medicine", "hospital", "pharmacy", "gym",
            ],
        },
        CategoryRule {
            group: CategoryGroup::Education,
            keywords: &["course", "udemy", "books", "college", "fees"],
        },
        CategoryRule {
            group: CategoryGroup::Savings,
            keywords: &["savings", "investment", "sip", "stocks"],
        },
    ],
};

impl RuleTable {
    /// Map a raw category to its canonical group.
    ///
    /// Total over all strings: empty or unmatched text maps to
    /// [CategoryGroup::Other].
    pub fn normalize(&self, raw: &str) -> CategoryGroup {
        let text = raw.trim().to_lowercase();

        if text.is_empty() {
            return CategoryGroup::Other;
        }

        self.rules
            .iter()
            .find(|rule| rule.matches(&text))
            .map(|rule| rule.group)
            .unwrap_or(CategoryGroup::Other)
    }

    /// The distinct groups of every rule matching `note`, in table order,
    /// truncated to `max` groups.
    pub fn suggest(&self, note: &str, max: usize) -> Vec<CategoryGroup> {
        let text = note.trim().to_lowercase();

        if text.is_empty() {
            return Vec::new();
        }

        let mut groups = Vec::new();

        for rule in self.rules {
            if groups.len() == max {
                break;
            }

            if rule.matches(&text) && !groups.contains(&rule.group) {
                groups.push(rule.group);
            }
        }

        groups
    }
}

/// Map a raw category to its canonical group using [DEFAULT_RULE_TABLE].
pub fn normalize(raw: &str) -> CategoryGroup {
    DEFAULT_RULE_TABLE.normalize(raw)
}

#[cfg(test)]
mod normalize_tests {
    use super::{CategoryGroup, normalize};

    #[test]
    fn empty_string_is_other() {
        assert_eq!(normalize(""), CategoryGroup::Other);
        assert_eq!(normalize("   \t"), CategoryGroup::Other);
    }

    #[test]
    fn matching_ignores_case() {
        assert_eq!(normalize("SWIGGY dinner"), CategoryGroup::Food);
    }

    #[test]
    fn matches_keyword_in_longer_text() {
        assert_eq!(normalize("Uber ride"), CategoryGroup::Travel);
        assert_eq!(normalize("Rent payment"), CategoryGroup::Rent);
    }

    #[test]
    fn matches_keyword_inside_a_word() {
        assert_eq!(normalize("seafood"), CategoryGroup::Food);
    }

    #[test]
    fn earlier_rules_take_priority() {
        assert_eq!(normalize("gas bill"), CategoryGroup::Travel);
    }

    #[test]
    fn group_names_are_not_keywords() {
        assert_eq!(normalize("Health insurance"), CategoryGroup::Other);
        assert_eq!(normalize("Travel insurance"), CategoryGroup::Other);
        assert_eq!(normalize("Education loan"), CategoryGroup::Other);
        assert_eq!(normalize("Entertainment tax"), CategoryGroup::Other);
        assert_eq!(normalize("Utilities"), CategoryGroup::Other);
    }

    #[test]
    fn group_names_in_the_table_still_match() {
        assert_eq!(normalize("Food"), CategoryGroup::Food);
        assert_eq!(normalize("Rent"), CategoryGroup::Rent);
        assert_eq!(normalize("Shopping"), CategoryGroup::Shopping);
        assert_eq!(normalize("Savings"), CategoryGroup::Savings);
    }

    #[test]
    fn unknown_text_is_other() {
        assert_eq!(normalize("birthday gift for mum"), CategoryGroup::Other);
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(normalize("  Netflix  "), CategoryGroup::Entertainment);
    }
}
