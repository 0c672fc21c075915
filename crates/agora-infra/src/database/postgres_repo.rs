//! PostgreSQL repository implementations for comments and likes.

use async_trait::async_trait;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use agora_core::domain::{Comment, Like, Page, PageRequest};
use agora_core::error::RepoError;
use agora_core::ports::{CommentRepository, LikeRepository};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::like::{self, Entity as LikeEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err, retry_read};

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// PostgreSQL like repository.
pub type PostgresLikeRepository = PostgresBaseRepository<LikeEntity>;

fn active_comments(post_id: Uuid) -> sea_orm::Select<CommentEntity> {
    CommentEntity::find()
        .filter(comment::Column::PostId.eq(post_id))
        .filter(comment::Column::IsDeleted.eq(false))
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn find_by_post(
        &self,
        post_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Comment>, RepoError> {
        tracing::debug!(post_id = %post_id, page = page.page(), "Listing comments");

        let total = retry_read(|| active_comments(post_id).count(&self.db)).await?;
        let rows = retry_read(|| {
            active_comments(post_id)
                .order_by_asc(comment::Column::CreatedAt)
                .order_by_asc(comment::Column::Id)
                .offset(page.offset())
                .limit(page.per_page())
                .all(&self.db)
        })
        .await?;

        Ok(Page::new(
            rows.into_iter().map(Into::into).collect(),
            total,
            page,
        ))
    }

    async fn find_thread(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let rows = retry_read(|| {
            active_comments(post_id)
                .order_by_asc(comment::Column::CreatedAt)
                .order_by_asc(comment::Column::Id)
                .all(&self.db)
        })
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_by_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        retry_read(|| active_comments(post_id).count(&self.db)).await
    }

    async fn save_edit(&self, edited: &Comment) -> Result<Option<Comment>, RepoError> {
        // A delete that lands first wins; the edit then matches no row.
        let mut rows = CommentEntity::update_many()
            .col_expr(comment::Column::Content, Expr::value(edited.content.clone()))
            .col_expr(
                comment::Column::EditedAt,
                Expr::value(edited.edited_at.map(DateTimeWithTimeZone::from)),
            )
            .col_expr(
                comment::Column::UpdatedAt,
                Expr::value(DateTimeWithTimeZone::from(edited.updated_at)),
            )
            .filter(comment::Column::Id.eq(edited.id))
            .filter(comment::Column::IsDeleted.eq(false))
            .exec_with_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows.pop().map(Into::into))
    }
}

#[async_trait]
impl LikeRepository for PostgresLikeRepository {
    async fn insert_if_absent(&self, like: Like) -> Result<(Like, bool), RepoError> {
        let model: like::ActiveModel = like.clone().into();

        // The unique index on (post_id, user_id) settles concurrent duplicates.
        let result = LikeEntity::insert(model)
            .on_conflict(
                OnConflict::columns([like::Column::PostId, like::Column::UserId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec(&self.db)
            .await;

        match result {
            Ok(_) => Ok((like, true)),
            Err(DbErr::RecordNotInserted) => {
                let existing = self
                    .find(like.post_id, like.user_id)
                    .await?
                    .ok_or(RepoError::NotFound)?;
                Ok((existing, false))
            }
            Err(e) => Err(map_db_err(e)),
        }
    }

    async fn find(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<Like>, RepoError> {
        let result = retry_read(|| {
            LikeEntity::find()
                .filter(like::Column::PostId.eq(post_id))
                .filter(like::Column::UserId.eq(user_id))
                .one(&self.db)
        })
        .await?;

        Ok(result.map(Into::into))
    }

    async fn delete(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError> {
        let result = LikeEntity::delete_many()
            .filter(like::Column::PostId.eq(post_id))
            .filter(like::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.rows_affected > 0)
    }

    async fn count_by_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        retry_read(|| {
            LikeEntity::find()
                .filter(like::Column::PostId.eq(post_id))
                .count(&self.db)
        })
        .await
    }
}
