//! Code for creating the user table and fetching users from the database.

use std::fmt::Display;

use rusqlite::{Connection, Row, types::Type};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    auth::{PasswordHash, Role},
};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The name used to log in.
    pub username: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// What the user may do.
    pub role: Role,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'lecteur'
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns:
/// - [Error::EmptyUsername] if `username` is blank,
/// - [Error::DuplicateUsername] if the username is taken,
/// - [Error::SqlError] if another SQL error occurred.
pub fn create_user(
    username: &str,
    password_hash: PasswordHash,
    role: Role,
    connection: &Connection,
) -> Result<User, Error> {
    let username = username.trim();
    if username.is_empty() {
        return Err(Error::EmptyUsername);
    }

    connection
        .execute(
            "INSERT INTO user (username, password, role) VALUES (?1, ?2, ?3)",
            (username, password_hash.as_ref(), role.as_str()),
        )
        .map_err(|error| match Error::from(error) {
            Error::DuplicateUsername(_) => Error::DuplicateUsername(username.to_owned()),
            error => error,
        })?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        username: username.to_owned(),
        password_hash,
        role,
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if `user_id` does not belong to a registered user.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, username, password, role FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], map_row)
        .map_err(|error| error.into())
}

/// Get the user whose username is `username`.
///
/// # Errors
///
/// Returns [Error::NotFound] if no user has this username.
pub fn get_user_by_username(username: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, username, password, role FROM user WHERE username = :username")?
        .query_row(&[(":username", &username.trim())], map_row)
        .map_err(|error| error.into())
}

/// Get the number of users in the database.
pub fn count_users(connection: &Connection) -> Result<usize, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM user;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

fn map_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_role: String = row.get(3)?;
    let role = raw_role
        .parse()
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(error)))?;

    Ok(User {
        id: UserID::new(row.get(0)?),
        username: row.get(1)?,
        password_hash: PasswordHash::new_unchecked(&row.get::<_, String>(2)?),
        role,
    })
}

#[cfg(test)]
mod user_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        auth::{PasswordHash, Role},
    };

    use super::{
        UserID, count_users, create_user, create_user_table, get_user_by_id, get_user_by_username,
    };

    fn get_db_connection() -> Connection {
        let conn =
            Connection::open_in_memory().expect("Could not create in-memory SQLite database");
        create_user_table(&conn).expect("Could not create user table");

        conn
    }

    #[test]
    fn insert_user_succeeds() {
        let db_connection = get_db_connection();
        let password_hash = PasswordHash::new_unchecked("hunter2");

        let inserted_user =
            create_user("youssef", password_hash.clone(), Role::Agent, &db_connection).unwrap();

        assert!(inserted_user.id.as_i64() > 0);
        assert_eq!(inserted_user.username, "youssef");
        assert_eq!(inserted_user.password_hash, password_hash);
        assert_eq!(inserted_user.role, Role::Agent);
    }

    #[test]
    fn insert_user_fails_on_blank_username() {
        let db_connection = get_db_connection();

        let result = create_user(
            "  ",
            PasswordHash::new_unchecked("hunter2"),
            Role::Agent,
            &db_connection,
        );

        assert_eq!(result, Err(Error::EmptyUsername));
    }

    #[test]
    fn insert_user_fails_on_duplicate_username() {
        let db_connection = get_db_connection();
        create_user(
            "salma",
            PasswordHash::new_unchecked("hunter2"),
            Role::Admin,
            &db_connection,
        )
        .unwrap();

        let result = create_user(
            "salma",
            PasswordHash::new_unchecked("hunter3"),
            Role::Viewer,
            &db_connection,
        );

        assert_eq!(result, Err(Error::DuplicateUsername("salma".to_owned())));
    }

    #[test]
    fn get_user_fails_with_non_existent_id() {
        let db_connection = get_db_connection();

        assert_eq!(
            get_user_by_id(UserID::new(42), &db_connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn get_user_by_id_and_username() {
        let db_connection = get_db_connection();
        let test_user = create_user(
            "karim",
            PasswordHash::new_unchecked("hunter2"),
            Role::Accountant,
            &db_connection,
        )
        .unwrap();

        assert_eq!(get_user_by_id(test_user.id, &db_connection), Ok(test_user.clone()));
        assert_eq!(get_user_by_username("karim", &db_connection), Ok(test_user));
        assert_eq!(
            get_user_by_username("nobody", &db_connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn returns_correct_count() {
        let db_connection = get_db_connection();

        assert_eq!(count_users(&db_connection), Ok(0));

        create_user(
            "nadia",
            PasswordHash::new_unchecked("hunter2"),
            Role::Viewer,
            &db_connection,
        )
        .unwrap();

        assert_eq!(count_users(&db_connection), Ok(1));
    }
}
