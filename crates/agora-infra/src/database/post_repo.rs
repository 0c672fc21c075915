//! PostgreSQL post repository - posts plus their tag set.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Expr, OnConflict, Query};
use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, Condition, ConnectionTrait, DbConn, DbErr, EntityName,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, TransactionTrait,
};
use uuid::Uuid;

use agora_core::domain::{Page, PageRequest, Post, PostFilter, Tag};
use agora_core::error::RepoError;
use agora_core::ports::{BaseRepository, PostLookup, PostRepository};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_tag::{self, Entity as PostTagEntity};
use super::entity::tag::{self, Entity as TagEntity};
use super::postgres_base::{map_db_err, retry_read};

/// PostgreSQL post repository.
pub struct PostgresPostRepository {
    db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    /// Tags for each of `post_ids`, ordered by name.
    async fn load_tags(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Tag>>, RepoError> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = retry_read(|| {
            PostTagEntity::find()
                .filter(post_tag::Column::PostId.is_in(post_ids.iter().copied()))
                .find_also_related(TagEntity)
                .all(&self.db)
        })
        .await?;

        let mut by_post: HashMap<Uuid, Vec<Tag>> = HashMap::new();
        for (link, tag) in rows {
            if let Some(tag) = tag {
                by_post.entry(link.post_id).or_default().push(tag.into());
            }
        }
        for tags in by_post.values_mut() {
            tags.sort_by(|a, b| a.name.cmp(&b.name));
        }
        Ok(by_post)
    }

    async fn with_tags(&self, model: post::Model) -> Result<Post, RepoError> {
        let mut tags = self.load_tags(&[model.id]).await?;
        let tags = tags.remove(&model.id).unwrap_or_default();
        Ok(model.into_domain(tags))
    }

    fn filtered(filter: &PostFilter, tag_id: Option<Uuid>) -> Select<PostEntity> {
        let mut query = PostEntity::find();

        if let Some(status) = filter.status {
            query = query.filter(post::Column::Status.eq(post::Status::from(status)));
        }
        if let Some(author_id) = filter.author_id {
            query = query.filter(post::Column::AuthorId.eq(author_id));
        }
        if let Some(tag_id) = tag_id {
            query = query.filter(
                post::Column::Id.in_subquery(
                    Query::select()
                        .column(post_tag::Column::PostId)
                        .from(PostTagEntity.table_ref())
                        .and_where(post_tag::Column::TagId.eq(tag_id))
                        .to_owned(),
                ),
            );
        }
        if let Some(term) = filter.search.as_deref().filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", escape_like(term));
            query = query.filter(
                Condition::any()
                    .add(Expr::col((PostEntity, post::Column::Title)).ilike(pattern.clone()))
                    .add(Expr::col((PostEntity, post::Column::Summary)).ilike(pattern.clone()))
                    .add(Expr::col((PostEntity, post::Column::Content)).ilike(pattern)),
            );
        }

        query
    }
}

fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Make sure every tag exists (matched by slug) and return the stored rows
/// in the order given.
async fn upsert_tags<C>(conn: &C, tags: &[Tag]) -> Result<Vec<Tag>, RepoError>
where
    C: ConnectionTrait,
{
    if tags.is_empty() {
        return Ok(Vec::new());
    }

    let models = tags.iter().cloned().map(tag::ActiveModel::from);
    match TagEntity::insert_many(models)
        .on_conflict(OnConflict::column(tag::Column::Slug).do_nothing().to_owned())
        .exec(conn)
        .await
    {
        Ok(_) | Err(DbErr::RecordNotInserted) => {}
        Err(e) => return Err(map_db_err(e)),
    }

    let slugs: Vec<String> = tags.iter().map(|t| t.slug.clone()).collect();
    let stored: HashMap<String, Tag> = TagEntity::find()
        .filter(tag::Column::Slug.is_in(slugs.clone()))
        .all(conn)
        .await
        .map_err(map_db_err)?
        .into_iter()
        .map(|m| (m.slug.clone(), m.into()))
        .collect();

    slugs
        .iter()
        .map(|slug| stored.get(slug).cloned().ok_or(RepoError::NotFound))
        .collect()
}

async fn link_tags<C>(conn: &C, post_id: Uuid, tags: &[Tag]) -> Result<(), RepoError>
where
    C: ConnectionTrait,
{
    if tags.is_empty() {
        return Ok(());
    }
    let links = tags.iter().map(|t| post_tag::ActiveModel {
        post_id: sea_orm::Set(post_id),
        tag_id: sea_orm::Set(t.id),
    });
    PostTagEntity::insert_many(links)
        .exec_without_returning(conn)
        .await
        .map_err(map_db_err)?;
    Ok(())
}

#[async_trait]
impl BaseRepository<Post, Uuid> for PostgresPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        match retry_read(|| PostEntity::find_by_id(id).one(&self.db)).await? {
            Some(model) => Ok(Some(self.with_tags(model).await?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let model = sea_orm::ActiveModelTrait::insert(post::ActiveModel::from(&post), &txn)
            .await
            .map_err(map_db_err)?;
        let tags = upsert_tags(&txn, &post.tags).await?;
        link_tags(&txn, model.id, &tags).await?;

        txn.commit().await.map_err(map_db_err)?;
        tracing::debug!(post_id = %model.id, tags = tags.len(), "Post inserted");

        let mut tags = tags;
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(model.into_domain(tags))
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut active = post::ActiveModel::from(&post);
        // Counter and creation time are owned by the database row.
        active.view_count = NotSet;
        active.created_at = NotSet;

        let txn = self.db.begin().await.map_err(map_db_err)?;

        let model = sea_orm::ActiveModelTrait::update(active, &txn)
            .await
            .map_err(map_db_err)?;
        PostTagEntity::delete_many()
            .filter(post_tag::Column::PostId.eq(post.id))
            .exec(&txn)
            .await
            .map_err(map_db_err)?;
        let tags = upsert_tags(&txn, &post.tags).await?;
        link_tags(&txn, model.id, &tags).await?;

        txn.commit().await.map_err(map_db_err)?;

        let mut tags = tags;
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(model.into_domain(tags))
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let model = retry_read(|| {
            PostEntity::find()
                .filter(post::Column::Slug.eq(slug))
                .one(&self.db)
        })
        .await?;

        match model {
            Some(model) => Ok(Some(self.with_tags(model).await?)),
            None => Ok(None),
        }
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, RepoError> {
        let count = retry_read(|| {
            PostEntity::find()
                .filter(post::Column::Slug.eq(slug))
                .count(&self.db)
        })
        .await?;
        Ok(count > 0)
    }

    async fn increment_view_count(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        // Single UPDATE ... RETURNING so concurrent readers never lose a view.
        let mut rows = PostEntity::update_many()
            .col_expr(
                post::Column::ViewCount,
                Expr::col(post::Column::ViewCount).add(1),
            )
            .filter(post::Column::Slug.eq(slug))
            .exec_with_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        match rows.pop() {
            Some(model) => Ok(Some(self.with_tags(model).await?)),
            None => Ok(None),
        }
    }

    async fn list(&self, filter: &PostFilter, page: PageRequest) -> Result<Page<Post>, RepoError> {
        tracing::debug!(?filter, page = page.page(), "Listing posts");

        let tag_id = match &filter.tag {
            Some(slug) => {
                let tag = retry_read(|| {
                    TagEntity::find()
                        .filter(tag::Column::Slug.eq(slug.as_str()))
                        .one(&self.db)
                })
                .await?;
                match tag {
                    Some(tag) => Some(tag.id),
                    None => return Ok(Page::new(Vec::new(), 0, page)),
                }
            }
            None => None,
        };

        let total = retry_read(|| Self::filtered(filter, tag_id).count(&self.db)).await?;
        let models = retry_read(|| {
            Self::filtered(filter, tag_id)
                .order_by_desc(post::Column::CreatedAt)
                .order_by_desc(post::Column::Id)
                .offset(page.offset())
                .limit(page.per_page())
                .all(&self.db)
        })
        .await?;

        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let mut tags = self.load_tags(&ids).await?;
        let items = models
            .into_iter()
            .map(|m| {
                let post_tags = tags.remove(&m.id).unwrap_or_default();
                m.into_domain(post_tags)
            })
            .collect();

        Ok(Page::new(items, total, page))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        // post_tags rows go with the post through ON DELETE CASCADE.
        let result = PostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, RepoError> {
        let tags = retry_read(|| {
            TagEntity::find()
                .order_by_asc(tag::Column::Name)
                .all(&self.db)
        })
        .await?;
        Ok(tags.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl PostLookup for PostgresPostRepository {
    async fn post_id_by_slug(&self, slug: &str) -> Result<Option<Uuid>, RepoError> {
        retry_read(|| {
            PostEntity::find()
                .select_only()
                .column(post::Column::Id)
                .filter(post::Column::Slug.eq(slug))
                .into_tuple::<Uuid>()
                .one(&self.db)
        })
        .await
    }
}
