use std::sync::{Arc, Mutex};

use rusqlite::{params, Connection};

use crate::errors::AppError;
use crate::models::{Role, Session};

/// Persistent store for the logged-in identity. A single row survives until
/// an explicit logout clears it.
#[derive(Clone)]
pub struct SessionStore {
    conn: Arc<Mutex<Connection>>,
}

impl SessionStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    pub fn current(&self) -> Result<Option<Session>, AppError> {
        let conn = self.conn.lock().unwrap();
        let result = conn.query_row(
            "SELECT logged_in, role, user_id, operator_id, name, phone, email
             FROM session WHERE id = 1",
            [],
            |row| {
                Ok((
                    row.get::<_, bool>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<i64>>(2)?,
                    row.get::<_, Option<i64>>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                ))
            },
        );

        match result {
            Ok((logged_in, role, user_id, operator_id, name, phone, email)) => {
                if !logged_in {
                    return Ok(None);
                }
                Ok(Some(Session {
                    role: Role::parse(&role),
                    user_id,
                    operator_id,
                    name,
                    phone,
                    email,
                }))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Persists a fresh login. The id that does not match the role is
    /// dropped, keeping exactly one authoritative identity per session.
    pub fn store_login(&self, session: &Session) -> Result<(), AppError> {
        let (user_id, operator_id) = match session.role {
            Role::Operator => (None, session.operator_id),
            Role::User | Role::Admin => (session.user_id, None),
        };

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO session (id, logged_in, role, user_id, operator_id, name, phone, email)
             VALUES (1, 1, ?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
               logged_in = 1,
               role = excluded.role,
               user_id = excluded.user_id,
               operator_id = excluded.operator_id,
               name = excluded.name,
               phone = excluded.phone,
               email = excluded.email",
            params![
                session.role.as_str(),
                user_id,
                operator_id,
                session.name,
                session.phone,
                session.email,
            ],
        )?;
        Ok(())
    }

    pub fn clear(&self) -> Result<(), AppError> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM session WHERE id = 1", [])?;
        Ok(())
    }
}
