use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A row of the `auth` table. `password` holds an Argon2 PHC string, never plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

/// A row of the `domains` table, echoed by the database diagnostic endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DomainRow {
    pub id: i64,
    pub name: String,
}
