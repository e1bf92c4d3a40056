//! Read-only JSON endpoints for the category catalogue.
//!
//! The catalogue is shared by every user, so these routes do not need an identity.

use axum::{
    Json,
    extract::{FromRef, Path, State},
};

use crate::{
    AppState, Error,
    category::Category,
    database_id::CategoryId,
    stores::{CategoryStore, sqlite::SQLiteCategoryStore},
};

/// The state needed by the category endpoints.
#[derive(Clone)]
pub struct CategoryState {
    pub categories: SQLiteCategoryStore,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            categories: state.categories.clone(),
        }
    }
}

/// List every category in ID order.
pub async fn get_categories(
    State(state): State<CategoryState>,
) -> Result<Json<Vec<Category>>, Error> {
    state.categories.get_all().map(Json)
}

pub async fn get_category(
    State(state): State<CategoryState>,
    Path(category_id): Path<CategoryId>,
) -> Result<Json<Category>, Error> {
    state.categories.get(category_id).map(Json)
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use crate::{
        category::DEFAULT_CATEGORIES,
        endpoints::{self, format_endpoint},
        test_utils::get_test_server,
    };

    #[tokio::test]
    async fn list_seeded_categories() {
        let (server, _) = get_test_server();

        let response = server.get(endpoints::CATEGORIES).await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|category| category["name"].as_str().unwrap())
            .collect();
        let want: Vec<&str> = DEFAULT_CATEGORIES.iter().map(|(name, _, _)| *name).collect();
        assert_eq!(names, want);
    }

    #[tokio::test]
    async fn get_single_category() {
        let (server, _) = get_test_server();

        let response = server
            .get(&format_endpoint(endpoints::CATEGORY, &[10]))
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({
            "id": 10,
            "name": "Salary",
            "color": "#82E0AA",
            "icon": "💰"
        }));
    }

    #[tokio::test]
    async fn missing_category_is_not_found() {
        let (server, _) = get_test_server();

        let response = server
            .get(&format_endpoint(endpoints::CATEGORY, &[404]))
            .await;

        response.assert_status_not_found();
    }
}
