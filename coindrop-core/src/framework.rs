use sqlx::PgPool;

/// Database handle that single-statement query messages are processed against.
///
/// Multi-row transactional writes do not go through this type; they are
/// `*_tx` associated functions on the entities, called inside a
/// `sqlx::Transaction` owned by the lifecycle operation.
pub struct DatabaseProcessor {
    pub pool: PgPool,
}
