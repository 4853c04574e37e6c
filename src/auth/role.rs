//! User roles and the middleware that restricts routes by role.

use std::{
    fmt::Display,
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::{UserID, get_user_by_id},
};

/// What a user is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Manages banks, users and deletions.
    Admin,
    /// Records and updates cheques and clients.
    Accountant,
    /// Field agent who records cheques as they are received.
    Agent,
    /// Read-only access.
    Viewer,
}

impl Role {
    /// Every role, from most to least privileged.
    pub const ALL: [Role; 4] = [Role::Admin, Role::Accountant, Role::Agent, Role::Viewer];

    /// The identifier stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Accountant => "comptable",
            Role::Agent => "agent",
            Role::Viewer => "lecteur",
        }
    }

    /// The French name shown in the interface.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Administrateur",
            Role::Accountant => "Comptable",
            Role::Agent => "Agent",
            Role::Viewer => "Lecteur",
        }
    }

    /// Whether the role may create and update cheques, clients and branches.
    pub fn can_edit_records(&self) -> bool {
        matches!(self, Role::Admin | Role::Accountant | Role::Agent)
    }

    /// Whether the role may delete records and manage banks.
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s.trim())
            .ok_or_else(|| Error::InvalidRole(s.to_owned()))
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The state needed to look up the role of the logged in user.
#[derive(Debug, Clone)]
pub struct RoleState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RoleState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Only let users that can edit records through.
///
/// Must run after the auth guard, which inserts the [UserID] into the request.
pub async fn require_editor(
    State(state): State<RoleState>,
    request: Request,
    next: Next,
) -> Response {
    require_role(state, request, next, |role| role.can_edit_records()).await
}

/// Only let administrators through.
///
/// Must run after the auth guard, which inserts the [UserID] into the request.
pub async fn require_admin(
    State(state): State<RoleState>,
    request: Request,
    next: Next,
) -> Response {
    require_role(state, request, next, |role| role.is_admin()).await
}

async fn require_role(
    state: RoleState,
    request: Request,
    next: Next,
    is_allowed: impl Fn(Role) -> bool,
) -> Response {
    let is_api_request = request.uri().path().starts_with("/api");
    let reject = |error: Error| {
        if is_api_request {
            error.into_alert_response()
        } else {
            error.into_response()
        }
    };

    let Some(user_id) = request.extensions().get::<UserID>().copied() else {
        tracing::error!("role check ran without a user ID, is the auth guard missing?");
        return reject(Error::Forbidden);
    };

    let role = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return reject(Error::DatabaseLockError);
            }
        };

        match get_user_by_id(user_id, &connection) {
            Ok(user) => user.role,
            Err(error) => {
                tracing::warn!("could not load user {user_id} for role check: {error}");
                return reject(Error::Forbidden);
            }
        }
    };

    if !is_allowed(role) {
        tracing::info!(
            "user {user_id} with role {role} was refused access to {}",
            request.uri().path()
        );
        return reject(Error::Forbidden);
    }

    next.run(request).await
}

#[cfg(test)]
mod role_tests {
    use crate::Error;

    use super::Role;

    #[test]
    fn parses_stored_identifiers() {
        assert_eq!("admin".parse(), Ok(Role::Admin));
        assert_eq!("comptable".parse(), Ok(Role::Accountant));
        assert_eq!("agent".parse(), Ok(Role::Agent));
        assert_eq!("lecteur".parse(), Ok(Role::Viewer));
        assert_eq!(
            "banquier".parse::<Role>(),
            Err(Error::InvalidRole("banquier".to_owned()))
        );
    }

    #[test]
    fn viewers_cannot_edit() {
        assert!(!Role::Viewer.can_edit_records());
        assert!(Role::Agent.can_edit_records());
        assert!(Role::Accountant.can_edit_records());
        assert!(Role::Admin.can_edit_records());
    }

    #[test]
    fn only_admins_are_admins() {
        assert!(Role::Admin.is_admin());
        assert!(!Role::Accountant.is_admin());
        assert!(!Role::Agent.is_admin());
        assert!(!Role::Viewer.is_admin());
    }
}

#[cfg(test)]
mod require_role_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Router, http::StatusCode, middleware, response::Html, routing::get};
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::auth::{PasswordHash, Role, UserID, create_user, create_user_table};

    use super::{RoleState, require_admin, require_editor};

    async fn test_handler() -> Html<&'static str> {
        Html("<p>ok</p>")
    }

    fn get_test_server(role: Role) -> TestServer {
        let connection = Connection::open_in_memory().unwrap();
        create_user_table(&connection).unwrap();
        let user = create_user(
            "fatima",
            PasswordHash::new_unchecked("hash"),
            role,
            &connection,
        )
        .unwrap();
        let state = RoleState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let app = Router::new()
            .route("/api/edit", get(test_handler))
            .route_layer(middleware::from_fn_with_state(state.clone(), require_editor))
            .merge(
                Router::new()
                    .route("/admin", get(test_handler))
                    .route_layer(middleware::from_fn_with_state(state.clone(), require_admin)),
            )
            .layer(Extension(user.id))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn viewer_cannot_edit() {
        let server = get_test_server(Role::Viewer);

        let response = server.get("/api/edit").await;

        response.assert_status(StatusCode::FORBIDDEN);
        assert!(response.text().contains("alert-container"));
    }

    #[tokio::test]
    async fn agent_can_edit_but_not_administer() {
        let server = get_test_server(Role::Agent);

        server.get("/api/edit").await.assert_status_ok();
        server
            .get("/admin")
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_can_administer() {
        let server = get_test_server(Role::Admin);

        server.get("/admin").await.assert_status_ok();
    }

    #[tokio::test]
    async fn unknown_user_is_forbidden() {
        let connection = Connection::open_in_memory().unwrap();
        create_user_table(&connection).unwrap();
        let state = RoleState {
            db_connection: Arc::new(Mutex::new(connection)),
        };
        let app = Router::new()
            .route("/api/edit", get(test_handler))
            .route_layer(middleware::from_fn_with_state(state.clone(), require_editor))
            .layer(Extension(UserID::new(42)))
            .with_state(state);
        let server = TestServer::try_new(app).unwrap();

        server
            .get("/api/edit")
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }
}
