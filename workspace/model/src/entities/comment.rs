use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, Set};

use super::{account, discussion};

/// A reply attached to exactly one discussion.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "comments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub discussion_id: i32,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub author_id: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "discussion::Entity",
        from = "Column::DiscussionId",
        to = "discussion::Column::Id",
        on_delete = "Cascade"
    )]
    Discussion,
    #[sea_orm(
        belongs_to = "account::Entity",
        from = "Column::AuthorId",
        to = "account::Column::Id",
        on_delete = "Cascade"
    )]
    Author,
}

impl Related<discussion::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Discussion.def()
    }
}

impl Related<account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Entity {
    /// Comments of one discussion in the order they were written.
    ///
    /// `id` breaks ties between comments stored within the same timestamp.
    pub fn find_in_thread(discussion_id: i32) -> Select<Entity> {
        Self::find()
            .filter(Column::DiscussionId.eq(discussion_id))
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = chrono::Utc::now();
        if insert && self.created_at.is_not_set() {
            self.created_at = Set(now);
        }
        self.updated_at = Set(now);
        Ok(self)
    }
}
