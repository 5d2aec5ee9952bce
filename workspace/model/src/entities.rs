//! Root of the SeaORM entity modules.
//!
//! Every order, discussion and comment references an account; every comment
//! references a discussion. Deleting the parent row cascades to its children.

pub mod account;
pub mod comment;
pub mod discussion;
pub mod order;
pub mod portfolio_item;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::account::Entity as Account;
    pub use super::comment::Entity as Comment;
    pub use super::discussion::Entity as Discussion;
    pub use super::order::Entity as Order;
    pub use super::portfolio_item::Entity as PortfolioItem;
}

#[cfg(test)]
mod test {
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{
        ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
        EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, Set,
    };

    use super::*;
    use account::Role;
    use prelude::*;

    async fn setup_db() -> Result<DatabaseConnection, DbErr> {
        let db = Database::connect("sqlite::memory:").await?;

        // Enable foreign keys
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

        Migrator::up(&db, None).await.expect("Migrations failed.");
        Ok(db)
    }

    async fn create_account(
        db: &DatabaseConnection,
        username: &str,
        role: Role,
    ) -> Result<account::Model, DbErr> {
        account::ActiveModel {
            username: Set(username.to_string()),
            email: Set(format!("{}@example.com", username)),
            password_hash: Set("not-a-real-hash".to_string()),
            role: Set(role),
            bio: Set(String::new()),
            profile_picture: Set(None),
            social_links: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    #[tokio::test]
    async fn test_account_defaults_and_timestamps() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let alice = create_account(&db, "alice", Role::Client).await?;
        assert!(alice.is_active);
        assert!(alice.is_client());
        assert!(!alice.is_designer());
        assert!(alice.last_login.is_none());
        assert_eq!(alice.created_at, alice.updated_at);

        let stored = Account::find_by_id(alice.id).one(&db).await?.unwrap();
        assert_eq!(stored.role, Role::Client);

        let mut active: account::ActiveModel = stored.into();
        active.bio = Set("Brand identity enthusiast".to_string());
        let updated = active.update(&db).await?;
        assert_eq!(updated.created_at, alice.created_at);
        assert!(updated.updated_at >= alice.updated_at);

        Ok(())
    }

    #[tokio::test]
    async fn test_username_is_unique() -> Result<(), DbErr> {
        let db = setup_db().await?;

        create_account(&db, "alice", Role::Client).await?;
        let duplicate = create_account(&db, "alice", Role::Designer).await;
        assert!(duplicate.is_err());
        assert_eq!(Account::find().count(&db).await?, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_social_links_are_stored_as_json() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let links = serde_json::json!({ "dribbble": "https://dribbble.com/dana" });
        let dana = account::ActiveModel {
            username: Set("dana".to_string()),
            email: Set("dana@example.com".to_string()),
            password_hash: Set("not-a-real-hash".to_string()),
            role: Set(Role::Designer),
            bio: Set(String::new()),
            profile_picture: Set(Some("profile_pictures/dana.png".to_string())),
            social_links: Set(Some(links.clone())),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let stored = Account::find_by_id(dana.id).one(&db).await?.unwrap();
        assert_eq!(stored.social_links, Some(links));
        assert_eq!(stored.profile_picture.as_deref(), Some("profile_pictures/dana.png"));

        Ok(())
    }

    #[tokio::test]
    async fn test_comments_keep_creation_order() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let alice = create_account(&db, "alice", Role::Client).await?;
        let dana = create_account(&db, "dana", Role::Designer).await?;

        let thread = discussion::ActiveModel {
            topic: Set("Color palette feedback".to_string()),
            description: Set("Warm or cool tones?".to_string()),
            author_id: Set(alice.id),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        for (author, content) in [(&dana, "C1"), (&alice, "C2"), (&dana, "C3")] {
            comment::ActiveModel {
                discussion_id: Set(thread.id),
                content: Set(content.to_string()),
                author_id: Set(author.id),
                ..Default::default()
            }
            .insert(&db)
            .await?;
        }

        let comments = Comment::find_in_thread(thread.id).all(&db).await?;
        let contents: Vec<&str> = comments.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["C1", "C2", "C3"]);
        assert_eq!(comments[0].author_id, dana.id);
        assert_eq!(comments[1].author_id, alice.id);

        let related = thread.find_related(Comment).all(&db).await?;
        assert_eq!(related.len(), 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_deleting_discussion_cascades_to_comments() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let alice = create_account(&db, "alice", Role::Client).await?;
        let thread = discussion::ActiveModel {
            topic: Set("Typography".to_string()),
            description: Set("Serif or sans?".to_string()),
            author_id: Set(alice.id),
            ..Default::default()
        }
        .insert(&db)
        .await?;
        comment::ActiveModel {
            discussion_id: Set(thread.id),
            content: Set("Sans, always".to_string()),
            author_id: Set(alice.id),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        Discussion::delete_by_id(thread.id).exec(&db).await?;

        assert_eq!(Comment::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_deleting_account_cascades_to_orders() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let alice = create_account(&db, "alice", Role::Client).await?;
        let bob = create_account(&db, "bob", Role::Client).await?;

        for (client, title) in [(&alice, "Logo redesign"), (&bob, "Business cards")] {
            order::ActiveModel {
                client_id: Set(client.id),
                title: Set(title.to_string()),
                description: Set(String::new()),
                ..Default::default()
            }
            .insert(&db)
            .await?;
        }

        Account::delete_by_id(alice.id).exec(&db).await?;

        let remaining = Order::find().all(&db).await?;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].client_id, bob.id);

        let bobs = Order::find()
            .filter(order::Column::ClientId.eq(bob.id))
            .count(&db)
            .await?;
        assert_eq!(bobs, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_comment_requires_existing_discussion() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let alice = create_account(&db, "alice", Role::Client).await?;
        let orphan = comment::ActiveModel {
            discussion_id: Set(9999),
            content: Set("Hello?".to_string()),
            author_id: Set(alice.id),
            ..Default::default()
        }
        .insert(&db)
        .await;

        assert!(orphan.is_err());
        Ok(())
    }
}
