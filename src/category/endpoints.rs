//! Read-only endpoints exposing the rule table to clients.

use axum::Json;
use serde::{Deserialize, Serialize};

use crate::{
    category::{CategoryGroup, DEFAULT_RULE_TABLE, RuleTable},
    extract::QueryParams,
};

/// The most suggestions returned for a single note.
const MAX_SUGGESTIONS: usize = 5;

/// The rule table along with every group a category can fold into.
#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    version: u32,
    groups: [CategoryGroup; 10],
    rules: RuleTable,
}

/// Get the shared rule table so clients can show the same groups the server uses.
pub async fn get_categories() -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        version: DEFAULT_RULE_TABLE.version,
        groups: CategoryGroup::ALL,
        rules: DEFAULT_RULE_TABLE,
    })
}

/// The query string for [get_category_suggestions].
#[derive(Debug, Default, Deserialize)]
pub struct SuggestionQuery {
    #[serde(default)]
    note: String,
}

/// The groups suggested for a note, most likely first.
#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    suggestions: Vec<CategoryGroup>,
}

/// Suggest up to five groups for a free-text note, e.g. `?note=uber to the mall`.
pub async fn get_category_suggestions(
    QueryParams(query): QueryParams<SuggestionQuery>,
) -> Json<SuggestionsResponse> {
    let suggestions = DEFAULT_RULE_TABLE.suggest(&query.note, MAX_SUGGESTIONS);

    tracing::debug!("suggested {suggestions:?} for note {:?}", query.note);

    Json(SuggestionsResponse { suggestions })
}
