//! Schema bootstrap derived from the entity definitions.

use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbErr, EntityName, Schema,
    sea_query::{Index, Table},
};

use super::models::{follows, posts, users};

/// Creates every table and index if missing. Safe to run repeatedly.
pub async fn create_tables(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut statements = vec![
        schema.create_table_from_entity(users::Entity),
        schema.create_table_from_entity(follows::Entity),
        schema.create_table_from_entity(posts::Entity),
    ];
    for stmt in statements.iter_mut() {
        stmt.if_not_exists();
        db.execute(backend.build(&*stmt)).await?;
    }

    let indexes = [
        Index::create()
            .name("idx_users_full_name_search")
            .table(users::Entity)
            .col(users::Column::FullNameSearch)
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_follows_followee")
            .table(follows::Entity)
            .col(follows::Column::FolloweeId)
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_posts_author_created")
            .table(posts::Entity)
            .col(posts::Column::AuthorId)
            .col(posts::Column::CreatedAt)
            .if_not_exists()
            .to_owned(),
    ];
    for index in indexes.iter() {
        db.execute(backend.build(index)).await?;
    }

    log::info!("Schema is up to date");
    Ok(())
}

/// Drops every table owned by the service, dependents first.
pub async fn drop_tables(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    for table in [
        posts::Entity.table_ref(),
        follows::Entity.table_ref(),
        users::Entity.table_ref(),
    ] {
        let stmt = Table::drop().table(table).if_exists().to_owned();
        db.execute(backend.build(&stmt)).await?;
    }
    log::warn!("All tables dropped");
    Ok(())
}
