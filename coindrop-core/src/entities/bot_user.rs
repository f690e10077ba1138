//! The `bot_user` table: the user directory.
//!
//! Ids come from the chat platform; the embedding bot keeps display fields
//! in sync and moderation commands flip the flags. The core itself only
//! depends on the eligible-id snapshot taken when an event starts; everything
//! else here serves the operator surface.

use crate::framework::DatabaseProcessor;
use compact_str::CompactString;
use kanau::processor::Processor;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, sqlx::FromRow)]
pub struct BotUser {
    pub id: i64,
    pub username: CompactString,
    pub first_name: CompactString,
    pub last_name: CompactString,
    pub enlisted: bool,
    pub banned: bool,
    pub admin: bool,
    pub payout_address: Option<String>,
}

const USER_COLUMNS: &str =
    "id, username, first_name, last_name, enlisted, banned, admin, payout_address";

#[derive(Debug, Clone, Copy)]
pub struct GetUserById {
    pub user_id: i64,
}

impl Processor<GetUserById> for DatabaseProcessor {
    type Output = Option<BotUser>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetUserById")]
    async fn process(&self, query: GetUserById) -> Result<Option<BotUser>, sqlx::Error> {
        sqlx::query_as::<_, BotUser>(&format!(
            "SELECT {USER_COLUMNS} FROM bot_user WHERE id = $1"
        ))
        .bind(query.user_id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Look a user up the way operators refer to them: a numeric id if the
/// identifier parses as one, a username otherwise.
pub struct GetUserByNameOrId {
    pub identifier: String,
}

impl Processor<GetUserByNameOrId> for DatabaseProcessor {
    type Output = Option<BotUser>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetUserByNameOrId")]
    async fn process(&self, query: GetUserByNameOrId) -> Result<Option<BotUser>, sqlx::Error> {
        if let Ok(user_id) = query.identifier.parse::<i64>() {
            return self.process(GetUserById { user_id }).await;
        }
        let username = query.identifier.trim_start_matches('@');
        sqlx::query_as::<_, BotUser>(&format!(
            "SELECT {USER_COLUMNS} FROM bot_user WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ListUsers {
    pub banned: bool,
}

impl Processor<ListUsers> for DatabaseProcessor {
    type Output = Vec<BotUser>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListUsers")]
    async fn process(&self, query: ListUsers) -> Result<Vec<BotUser>, sqlx::Error> {
        sqlx::query_as::<_, BotUser>(&format!(
            "SELECT {USER_COLUMNS} FROM bot_user WHERE banned = $1 ORDER BY username"
        ))
        .bind(query.banned)
        .fetch_all(&self.pool)
        .await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CountUsers {
    pub banned: bool,
}

impl Processor<CountUsers> for DatabaseProcessor {
    type Output = i64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:CountUsers")]
    async fn process(&self, query: CountUsers) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM bot_user WHERE banned = $1")
            .bind(query.banned)
            .fetch_one(&self.pool)
            .await
    }
}

#[derive(Debug, Clone)]
/// Directory sync from the chat layer. Refreshes display fields only;
/// `enlisted`/`banned`/`admin` are owned by the moderation operations.
pub struct UpsertUser {
    pub id: i64,
    pub username: CompactString,
    pub first_name: CompactString,
    pub last_name: CompactString,
}

impl Processor<UpsertUser> for DatabaseProcessor {
    type Output = BotUser;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:UpsertUser")]
    async fn process(&self, upsert: UpsertUser) -> Result<BotUser, sqlx::Error> {
        sqlx::query_as::<_, BotUser>(&format!(
            "INSERT INTO bot_user (id, username, first_name, last_name) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (id) DO UPDATE SET \
                 username = EXCLUDED.username, \
                 first_name = EXCLUDED.first_name, \
                 last_name = EXCLUDED.last_name \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(upsert.id)
        .bind(upsert.username.as_str())
        .bind(upsert.first_name.as_str())
        .bind(upsert.last_name.as_str())
        .fetch_one(&self.pool)
        .await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SetUserBanned {
    pub user_id: i64,
    pub banned: bool,
}

impl Processor<SetUserBanned> for DatabaseProcessor {
    type Output = u64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:SetUserBanned")]
    async fn process(&self, update: SetUserBanned) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE bot_user SET banned = $1 WHERE id = $2")
            .bind(update.banned)
            .bind(update.user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SetUserEnlisted {
    pub user_id: i64,
    pub enlisted: bool,
}

impl Processor<SetUserEnlisted> for DatabaseProcessor {
    type Output = u64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:SetUserEnlisted")]
    async fn process(&self, update: SetUserEnlisted) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE bot_user SET enlisted = $1 WHERE id = $2")
            .bind(update.enlisted)
            .bind(update.user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[derive(Debug, Clone)]
/// Record where a user's winnings should be sent. Address format validation
/// is the embedding bot's concern.
pub struct SetPayoutAddress {
    pub user_id: i64,
    pub address: String,
}

impl Processor<SetPayoutAddress> for DatabaseProcessor {
    type Output = u64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:SetPayoutAddress")]
    async fn process(&self, update: SetPayoutAddress) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE bot_user SET payout_address = $1 WHERE id = $2")
            .bind(update.address)
            .bind(update.user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

impl BotUser {
    /// Snapshot of eligible user ids, taken inside the transaction that
    /// starts an event so later directory changes cannot leak in.
    pub async fn eligible_ids_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<Vec<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT id FROM bot_user WHERE enlisted AND NOT banned")
            .fetch_all(&mut **tx)
            .await
    }
}
