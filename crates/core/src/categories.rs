//! Category domain model.
//!
//! Categories are deliberately local-only: they are not persisted to the
//! durable store and never interact with the pending queue. Each session
//! starts from the built-in default set.

use serde::{Deserialize, Serialize};

/// Which transaction kinds a category applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Income,
    Expense,
    Both,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    /// Symbolic icon reference, resolved by the presentation layer.
    pub icon: String,
    /// Display color token.
    pub color: String,
    #[serde(rename = "type")]
    pub kind: CategoryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

fn builtin(id: &str, name: &str, icon: &str, color: &str, kind: CategoryKind) -> Category {
    Category {
        id: id.to_string(),
        name: name.to_string(),
        icon: icon.to_string(),
        color: color.to_string(),
        kind,
        user_id: None,
    }
}

/// The default category set seeded into every session.
pub fn default_categories() -> Vec<Category> {
    vec![
        builtin("1", "Продукты", "shopping-cart", "#FF9F0A", CategoryKind::Expense),
        builtin("2", "Транспорт", "car", "#0A84FF", CategoryKind::Expense),
        builtin("3", "Жилье", "home", "#BF5AF2", CategoryKind::Expense),
        builtin("4", "Развлечения", "coffee", "#FF453A", CategoryKind::Expense),
        builtin("5", "Зарплата", "briefcase", "#30D158", CategoryKind::Income),
        builtin("6", "Фриланс", "laptop", "#64D2FF", CategoryKind::Income),
        builtin("7", "Здоровье", "plus", "#FF375F", CategoryKind::Expense),
    ]
}
