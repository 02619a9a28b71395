use sqlx::FromRow;
use store::CategoryInfo;

#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub user_id: i64,
}

impl Category {
    pub fn to_info(&self) -> CategoryInfo {
        CategoryInfo {
            id: self.id,
            name: self.name.clone(),
        }
    }
}
