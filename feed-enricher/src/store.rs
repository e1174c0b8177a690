use crate::traits::ArticleStore;
use crate::types::{FeedSource, IngestError, Result, ValidatedArticle};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::{debug, info};

/// Postgres-backed article store.
///
/// Expects `articles(url UNIQUE, image_url, title, summary, rating, category,
/// date_feed)` and the feed registry `url(id, url)` to exist already.
pub struct PgArticleStore {
    db: PgPool,
}

impl PgArticleStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { db })
    }

    pub fn pool(&self) -> &PgPool {
        &self.db
    }
}

#[async_trait]
impl ArticleStore for PgArticleStore {
    async fn exists(&self, url: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM articles WHERE url = $1 LIMIT 1")
            .bind(url)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.is_some())
    }

    async fn insert(&self, article: &ValidatedArticle) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO articles (url, image_url, title, summary, rating, category, date_feed)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&article.url)
        .bind(&article.image_url)
        .bind(&article.title)
        .bind(&article.summary)
        .bind(article.rating)
        .bind(&article.category)
        .bind(article.feed_date)
        .execute(&self.db)
        .await;

        match result {
            Ok(_) => {
                debug!("Stored article {}", article.url);
                Ok(())
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(IngestError::DuplicateArticle {
                    url: article.url.clone(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list_sources(&self, ids: Option<&[i64]>) -> Result<Vec<FeedSource>> {
        let rows = match ids {
            Some(ids) => {
                sqlx::query("SELECT id::BIGINT AS id, url FROM url WHERE id = ANY($1) ORDER BY id")
                    .bind(ids)
                    .fetch_all(&self.db)
                    .await?
            }
            None => {
                sqlx::query("SELECT id::BIGINT AS id, url FROM url ORDER BY id")
                    .fetch_all(&self.db)
                    .await?
            }
        };

        let mut sources = Vec::with_capacity(rows.len());
        for row in rows {
            sources.push(FeedSource {
                id: row.try_get("id")?,
                url: row.try_get("url")?,
            });
        }

        info!("Loaded {} feed sources", sources.len());
        Ok(sources)
    }
}
