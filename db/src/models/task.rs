use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "task_priority_enum")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    #[sea_orm(string_value = "low")]
    Low,
    #[default]
    #[sea_orm(string_value = "medium")]
    Medium,
    #[sea_orm(string_value = "high")]
    High,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub title: String,
    pub completed: bool,
    pub priority: TaskPriority,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DbConn,
        title: &str,
        completed: bool,
        priority: TaskPriority,
    ) -> Result<Model, DbErr> {
        let now = Utc::now();
        let task = ActiveModel {
            title: Set(title.to_owned()),
            completed: Set(completed),
            priority: Set(priority),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        task.insert(db).await
    }

    /// Applies a partial update. Fields left as `None` keep their current
    /// value; `updated_at` is always refreshed. Returns `Ok(None)` when no
    /// task with the given id exists.
    pub async fn edit(
        db: &DbConn,
        id: i64,
        title: Option<&str>,
        completed: Option<bool>,
        priority: Option<TaskPriority>,
    ) -> Result<Option<Model>, DbErr> {
        let Some(existing) = Entity::find_by_id(id).one(db).await? else {
            return Ok(None);
        };

        let mut task: ActiveModel = existing.into();
        if let Some(title) = title {
            task.title = Set(title.to_owned());
        }
        if let Some(completed) = completed {
            task.completed = Set(completed);
        }
        if let Some(priority) = priority {
            task.priority = Set(priority);
        }
        task.updated_at = Set(Utc::now());

        task.update(db).await.map(Some)
    }

    /// Deletes the task with the given id, returning whether a row existed.
    pub async fn delete(db: &DbConn, id: i64) -> Result<bool, DbErr> {
        let result = Entity::delete_by_id(id).exec(db).await?;
        Ok(result.rows_affected > 0)
    }
}
