//! Member repository.
//!
//! Identity data is owned elsewhere; core only needs rows to reference.

use crate::model::user::{Role, User, UserId};
use crate::repo::{ensure_schema_ready, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

pub trait UserRepository {
    fn create_user(&self, user: &User) -> RepoResult<UserId>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, &[("users", &["id", "name", "email", "role"])])?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &User) -> RepoResult<UserId> {
        self.conn.execute(
            "INSERT INTO users (id, name, email, role) VALUES (?1, ?2, ?3, ?4);",
            params![
                user.id.to_string(),
                user.name.as_str(),
                user.email.as_str(),
                user.role.as_str(),
            ],
        )?;
        Ok(user.id)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, email, role FROM users WHERE id = ?1;",
                [id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((id_text, name, email, role_text)) = row else {
            return Ok(None);
        };
        let role = Role::parse(&role_text).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid role `{role_text}` in users.role"))
        })?;
        Ok(Some(User {
            id: parse_uuid(&id_text, "users.id")?,
            name,
            email,
            role,
        }))
    }
}
