//! Confirmation token repository.
//!
//! Keys come from an injected [`TokenGenerator`]. A key is generated only when
//! a token is first saved without one, and it is never rewritten afterwards.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use marketplace_core::{ConfirmEmailTokenId, TokenGenerator, UserId};

use super::{RepositoryError, is_unique_violation_of, map_write_error};
use crate::models::ConfirmEmailToken;

/// How many fresh keys to try before reporting a collision.
pub const MAX_KEY_ATTEMPTS: usize = 5;

const KEY_CONSTRAINT: &str = "confirm_email_token_key_key";

/// Internal row type for database queries.
#[derive(Debug, sqlx::FromRow)]
struct TokenRow {
    id: ConfirmEmailTokenId,
    user_id: UserId,
    key: String,
    created_at: DateTime<Utc>,
}

impl From<TokenRow> for ConfirmEmailToken {
    fn from(row: TokenRow) -> Self {
        Self {
            id: Some(row.id),
            user_id: row.user_id,
            key: row.key,
            created_at: Some(row.created_at),
        }
    }
}

/// Repository for confirmation tokens.
pub struct TokenRepository<'a> {
    pool: &'a PgPool,
    generator: &'a dyn TokenGenerator,
}

impl<'a> TokenRepository<'a> {
    /// Create a new token repository drawing keys from `generator`.
    #[must_use]
    pub fn new(pool: &'a PgPool, generator: &'a dyn TokenGenerator) -> Self {
        Self { pool, generator }
    }

    /// Issue a fresh token for `user_id`.
    ///
    /// # Errors
    ///
    /// See [`TokenRepository::save`].
    pub async fn issue(&self, user_id: UserId) -> Result<ConfirmEmailToken, RepositoryError> {
        let mut token = ConfirmEmailToken::new(user_id);
        self.save(&mut token).await?;
        Ok(token)
    }

    /// Persist `token`.
    ///
    /// An unsaved token is inserted, generating its key first if it has none.
    /// When a generated key collides with an existing one a new key is drawn,
    /// up to [`MAX_KEY_ATTEMPTS`] times. A caller-supplied key is never
    /// replaced.
    ///
    /// A saved token only has its owner rewritten; the key stays as it is.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for an empty or oversized key or
    /// an unknown user.
    /// Returns `RepositoryError::Conflict` if the key is already taken.
    /// Returns `RepositoryError::NotFound` if a saved token no longer exists.
    pub async fn save(&self, token: &mut ConfirmEmailToken) -> Result<(), RepositoryError> {
        if let Some(id) = token.id {
            return self.update_owner(id, token).await;
        }

        for attempt in 1..=MAX_KEY_ATTEMPTS {
            let generated = token.ensure_key(self.generator)?;

            let result = sqlx::query_as::<_, TokenRow>(
                r"
                INSERT INTO market.confirm_email_token (user_id, key)
                VALUES ($1, $2)
                RETURNING id, user_id, key, created_at
                ",
            )
            .bind(token.user_id)
            .bind(&token.key)
            .fetch_one(self.pool)
            .await;

            match result {
                Ok(row) => {
                    *token = row.into();
                    tracing::info!(user_id = %token.user_id, "Confirmation token issued");
                    return Ok(());
                }
                Err(e) if generated && is_unique_violation_of(&e, KEY_CONSTRAINT) => {
                    tracing::debug!(attempt, "Token key collision, regenerating");
                    token.key.clear();
                }
                Err(e) => return Err(map_write_error(e)),
            }
        }

        tracing::warn!(
            user_id = %token.user_id,
            attempts = MAX_KEY_ATTEMPTS,
            "Could not generate a unique token key"
        );
        Err(RepositoryError::Conflict(format!(
            "no unique token key after {MAX_KEY_ATTEMPTS} attempts"
        )))
    }

    async fn update_owner(
        &self,
        id: ConfirmEmailTokenId,
        token: &mut ConfirmEmailToken,
    ) -> Result<(), RepositoryError> {
        let row = sqlx::query_as::<_, TokenRow>(
            r"
            UPDATE market.confirm_email_token SET user_id = $1
            WHERE id = $2
            RETURNING id, user_id, key, created_at
            ",
        )
        .bind(token.user_id)
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or(RepositoryError::NotFound)?;

        *token = row.into();
        Ok(())
    }

    /// Look a token up by key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_key(&self, key: &str) -> Result<Option<ConfirmEmailToken>, RepositoryError> {
        let row = sqlx::query_as::<_, TokenRow>(
            "SELECT id, user_id, key, created_at FROM market.confirm_email_token WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Tokens of a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ConfirmEmailToken>, RepositoryError> {
        let rows = sqlx::query_as::<_, TokenRow>(
            r"
            SELECT id, user_id, key, created_at FROM market.confirm_email_token
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Lock the token with `key` inside `tx` and return it.
    pub(crate) async fn lock_by_key(
        tx: &mut Transaction<'_, Postgres>,
        key: &str,
    ) -> Result<Option<ConfirmEmailToken>, RepositoryError> {
        let row = sqlx::query_as::<_, TokenRow>(
            r"
            SELECT id, user_id, key, created_at FROM market.confirm_email_token
            WHERE key = $1
            FOR UPDATE
            ",
        )
        .bind(key)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Delete every token of `user_id` inside `tx`.
    pub(crate) async fn delete_for_user_in(
        tx: &mut Transaction<'_, Postgres>,
        user_id: UserId,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM market.confirm_email_token WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected())
    }
}
