use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::CategoryId;

/// A task needs somewhere to deliver to; a service happens at the pick-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    Task,
    Service,
}

impl std::fmt::Display for CategoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryType::Task => write!(f, "task"),
            CategoryType::Service => write!(f, "service"),
        }
    }
}

impl std::str::FromStr for CategoryType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "task" => Ok(CategoryType::Task),
            "service" => Ok(CategoryType::Service),
            _ => Err(anyhow::anyhow!("Invalid category type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    /// Slug of the name, accepted wherever an id is.
    pub identifier: String,
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: CategoryType,
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: CategoryId,
    identifier: String,
    name: String,
    category_type: String,
}

impl TryFrom<CategoryRow> for Category {
    type Error = anyhow::Error;

    fn try_from(row: CategoryRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            identifier: row.identifier,
            name: row.name,
            category_type: row.category_type.parse()?,
        })
    }
}

impl Category {
    pub fn new(name: impl Into<String>, category_type: CategoryType) -> Self {
        let name = name.into();
        Self {
            id: CategoryId::new(),
            identifier: slugify(&name),
            name,
            category_type,
        }
    }

    pub fn requires_dropoff(&self) -> bool {
        self.category_type == CategoryType::Task
    }

    /// Find by id, or by identifier when the key is not a UUID.
    pub async fn find_by_key(key: &str, pool: &PgPool) -> Result<Option<Self>> {
        let row = match CategoryId::parse(key) {
            Ok(id) => {
                sqlx::query_as::<_, CategoryRow>(
                    "SELECT id, identifier, name, category_type FROM categories WHERE id = $1",
                )
                .bind(id)
                .fetch_optional(pool)
                .await?
            }
            Err(_) => {
                sqlx::query_as::<_, CategoryRow>(
                    "SELECT id, identifier, name, category_type FROM categories WHERE identifier = $1",
                )
                .bind(key)
                .fetch_optional(pool)
                .await?
            }
        };
        row.map(Category::try_from).transpose()
    }

    pub async fn insert(&self, pool: &PgPool) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO categories (id, identifier, name, category_type, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(self.id)
        .bind(&self.identifier)
        .bind(&self.name)
        .bind(self.category_type.to_string())
        .bind(Utc::now())
        .execute(pool)
        .await?;
        Ok(())
    }

    pub fn matches_key(&self, key: &str) -> bool {
        self.identifier == key || self.id.to_string() == key
    }
}

fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_is_slug_of_name() {
        let category = Category::new("Grocery Shopping & Delivery", CategoryType::Task);
        assert_eq!(category.identifier, "grocery-shopping-delivery");
        assert!(category.matches_key("grocery-shopping-delivery"));
        assert!(category.matches_key(&category.id.to_string()));
        assert!(category.requires_dropoff());
    }

    #[test]
    fn serializes_type_field() {
        let category = Category::new("Cleaning", CategoryType::Service);
        let json = serde_json::to_value(&category).unwrap();
        assert_eq!(json["type"], "service");
        assert!(!category.requires_dropoff());
    }
}
