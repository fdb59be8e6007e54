//! Principal and user directory models
//!
//! Authentication lives in an external identity provider; this server only
//! consumes the bearer tokens it issues. A token's claims carry the user's
//! identity and group memberships, and the permission set is derived from
//! the groups on every request.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::book::BookRef;
use crate::permissions::group_permissions;

/// Group name carrying the elevated permission set
pub const ADMIN_GROUP: &str = "Administrator";

/// JWT claims issued by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub groups: Vec<String>,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Sign claims into a token (used by tests and tooling standing in for
    /// the identity provider)
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse and validate a bearer token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }
}

/// An authenticated actor with its permission set
///
/// Permissions are recomputed from the group memberships at construction
/// time, once per request; nothing is cached across requests.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub groups: Vec<String>,
    pub permissions: HashSet<String>,
}

impl Principal {
    pub fn new(id: i32, first_name: String, last_name: String, groups: Vec<String>) -> Self {
        let permissions = groups
            .iter()
            .flat_map(|g| group_permissions(g))
            .map(|p| p.to_string())
            .collect();
        Self {
            id,
            first_name,
            last_name,
            groups,
            permissions,
        }
    }

    pub fn from_claims(claims: UserClaims) -> Self {
        Self::new(
            claims.user_id,
            claims.first_name,
            claims.last_name,
            claims.groups,
        )
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    pub fn is_admin(&self) -> bool {
        self.groups.iter().any(|g| g == ADMIN_GROUP)
    }
}

/// Directory row from database
///
/// The identity provider owns credentials; this table is the read-side
/// replica the server joins against.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub role: Option<String>,
}

/// Directory entry: who a user is and what they currently hold
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DirectoryUser {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    /// Group name as recorded in the directory
    pub role: Option<String>,
    /// Books the user currently has checked out
    pub books: Vec<BookRef>,
}

/// User directory query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct UserQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}
