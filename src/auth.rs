use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use futures::future::LocalBoxFuture;
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::schema::sessions;

pub trait Principal {
    fn is_authenticated(&self) -> bool;
    fn is_active(&self) -> bool;
    fn is_anonymous(&self) -> bool;
    fn get_id(&self) -> Option<String>;
}

// No suspension or verification state exists, so these are constant.
impl Principal for User {
    fn is_authenticated(&self) -> bool {
        true
    }
    fn is_active(&self) -> bool {
        true
    }
    fn is_anonymous(&self) -> bool {
        false
    }
    fn get_id(&self) -> Option<String> {
        Some(self.id.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl Principal for Anonymous {
    fn is_authenticated(&self) -> bool {
        false
    }
    fn is_active(&self) -> bool {
        false
    }
    fn is_anonymous(&self) -> bool {
        true
    }
    fn get_id(&self) -> Option<String> {
        None
    }
}

pub fn load_user(conn: &mut SqliteConnection, user_id: &str) -> AppResult<Option<User>> {
    let Ok(id) = user_id.parse::<i32>() else {
        return Ok(None);
    };
    match User::find(conn, id) {
        Ok(user) => Ok(Some(user)),
        Err(AppError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable, Serialize)]
#[diesel(table_name = sessions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Session {
    pub id: String,
    pub user_id: i32,
    pub created_on: NaiveDateTime,
    pub expires_on: NaiveDateTime,
    pub revoked: bool,
}

impl Session {
    pub fn open(conn: &mut SqliteConnection, user_id: i32, ttl: Duration) -> AppResult<Self> {
        let now = Utc::now().naive_utc();
        let expires_on = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| AppError::Internal(format!("session ttl out of range: {:?}", ttl)))?;
        let session = Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            created_on: now,
            expires_on,
            revoked: false,
        };
        diesel::insert_into(sessions::table)
            .values(&session)
            .execute(conn)?;
        Ok(session)
    }

    pub fn find(conn: &mut SqliteConnection, id: Uuid) -> AppResult<Option<Self>> {
        Ok(sessions::table
            .find(id.to_string())
            .select(Session::as_select())
            .first(conn)
            .optional()?)
    }

    pub fn uuid(&self) -> AppResult<Uuid> {
        Uuid::parse_str(&self.id).map_err(|e| AppError::Internal(format!("bad session id: {}", e)))
    }

    pub fn is_live(&self, now: NaiveDateTime) -> bool {
        !self.revoked && now < self.expires_on
    }

    pub fn revoke(conn: &mut SqliteConnection, id: Uuid) -> AppResult<()> {
        diesel::update(sessions::table.find(id.to_string()))
            .set(sessions::revoked.eq(true))
            .execute(conn)?;
        Ok(())
    }

    // Drops sessions that can no longer authenticate.
    pub fn purge(conn: &mut SqliteConnection, now: NaiveDateTime) -> AppResult<usize> {
        Ok(diesel::delete(
            sessions::table.filter(sessions::revoked.eq(true).or(sessions::expires_on.le(now))),
        )
        .execute(conn)?)
    }
}

fn bearer(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim().to_owned())
}

#[derive(Debug, Clone)]
pub struct Authenticated {
    pub user: User,
    pub session: Uuid,
}

impl FromRequest for Authenticated {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let ctx = req.app_data::<web::Data<AppContext>>().cloned();
        let token = bearer(req);
        Box::pin(async move {
            let ctx = ctx.ok_or_else(|| AppError::Internal("application context missing".into()))?;
            let token = token.ok_or_else(|| AppError::Unauthorized("Please log in to access this page.".into()))?;
            let claims = ctx.tokens.decode(&token)?;
            let session_id = claims.session_id()?;
            let user_id = claims.sub.clone();
            let user = ctx
                .run(move |conn| {
                    let now = Utc::now().naive_utc();
                    let session = Session::find(conn, session_id)?
                        .filter(|s| s.is_live(now) && s.user_id.to_string() == user_id)
                        .ok_or_else(|| AppError::Unauthorized("session expired or revoked".into()))?;
                    load_user(conn, &session.user_id.to_string())?
                        .ok_or_else(|| AppError::Unauthorized("unknown user".into()))
                })
                .await?;
            if !user.is_active() {
                return Err(AppError::Unauthorized("account is inactive".into()));
            }
            Ok(Authenticated {
                user,
                session: session_id,
            })
        })
    }
}

#[derive(Debug, Clone)]
pub struct AdminUser(pub Authenticated);

impl FromRequest for AdminUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let auth = Authenticated::from_request(req, payload);
        Box::pin(async move {
            let auth = auth.await?;
            if !auth.user.admin {
                log::warn!("user {} denied admin access", auth.user.id);
                return Err(AppError::Forbidden);
            }
            Ok(AdminUser(auth))
        })
    }
}
