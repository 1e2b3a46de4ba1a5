use serde::{Deserialize, Serialize};

/// A spending category. Classification into exempt vs. non-exempt for debt
/// generation is a pure function of the name, see [`crate::engine::is_non_debt_category_name`].
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Category {
    pub id: String,
    pub name: String,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}
