use actix_web::{web, HttpResponse};
use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::auth::{Anonymous, Authenticated, Principal, Session};
use crate::context::AppContext;
use crate::crypto::Claims;
use crate::error::{AppError, AppResult, ErrorBody};
use crate::models::{Appointment, NewUser, Symptom, User, UserSymptom};
use crate::schema::{appointment, symptom, user_symptom};

#[derive(Debug, Clone, Serialize)]
pub struct Flash {
    pub category: &'static str,
    pub message: &'static str,
}

impl Flash {
    pub const fn success(message: &'static str) -> Self {
        Self {
            category: "success",
            message,
        }
    }

    pub const fn danger(message: &'static str) -> Self {
        Self {
            category: "danger",
            message,
        }
    }
}

#[derive(Debug, Serialize)]
struct FlashBody {
    flash: Flash,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub flash: Flash,
    pub token: String,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub confirm: String,
}

impl RegisterForm {
    fn validate(&self) -> AppResult<()> {
        let email_len = self.email.chars().count();
        if !self.email.contains('@') || !(6..=40).contains(&email_len) {
            return Err(AppError::BadRequest(
                "Enter a valid email address of 6 to 40 characters.".into(),
            ));
        }
        if !(6..=25).contains(&self.password.chars().count()) {
            return Err(AppError::BadRequest(
                "Password must be between 6 and 25 characters.".into(),
            ));
        }
        if self.password != self.confirm {
            return Err(AppError::BadRequest("Passwords must match.".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

fn greeting(principal: &dyn Principal) -> serde_json::Value {
    serde_json::json!({
        "service": "medilog",
        "authenticated": principal.is_authenticated(),
        "user_id": principal.get_id(),
    })
}

pub async fn index(auth: Option<Authenticated>) -> HttpResponse {
    let body = match &auth {
        Some(auth) => greeting(&auth.user),
        None => greeting(&Anonymous),
    };
    HttpResponse::Ok().json(body)
}

pub async fn about() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "service": "medilog",
        "version": env!("CARGO_PKG_VERSION"),
        "about": "Track appointments, symptoms and the treatments that go with them.",
    }))
}

fn signed(ctx: &AppContext, user: User, session: &Session, flash: Flash) -> AppResult<AuthResponse> {
    let claims = Claims::new(user.id, session.uuid()?, ctx.settings.session_ttl)?;
    Ok(AuthResponse {
        flash,
        token: ctx.tokens.encode(&claims)?,
        user,
    })
}

pub async fn register(
    ctx: web::Data<AppContext>,
    form: web::Json<RegisterForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    form.validate()?;
    let passwords = ctx.passwords.clone();
    let ttl = ctx.settings.session_ttl;
    let (user, session) = ctx
        .run(move |conn| {
            conn.transaction(|conn| {
                let user = NewUser::new(form.email, &form.password, false, &passwords)?.insert(conn)?;
                let session = Session::open(conn, user.id, ttl)?;
                Ok((user, session))
            })
        })
        .await?;
    log::info!("registered user {}", user.id);
    let body = signed(&ctx, user, &session, Flash::success("Thank you for registering."))?;
    Ok(HttpResponse::Created().json(body))
}

pub async fn login(
    ctx: web::Data<AppContext>,
    form: web::Json<LoginForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let passwords = ctx.passwords.clone();
    let ttl = ctx.settings.session_ttl;
    let outcome = ctx
        .run(move |conn| {
            let Some(user) = User::find_by_email(conn, &form.email)? else {
                return Ok(None);
            };
            if !passwords.verify(&form.password, &user.password) {
                return Ok(None);
            }
            let session = Session::open(conn, user.id, ttl)?;
            Ok(Some((user, session)))
        })
        .await?;
    match outcome {
        Some((user, session)) => {
            log::info!("user {} logged in", user.id);
            let body = signed(&ctx, user, &session, Flash::success("You are logged in. Welcome!"))?;
            Ok(HttpResponse::Ok().json(body))
        }
        None => Ok(HttpResponse::Unauthorized().json(FlashBody {
            flash: Flash::danger("Invalid email and/or password."),
        })),
    }
}

pub async fn logout(ctx: web::Data<AppContext>, auth: Authenticated) -> AppResult<HttpResponse> {
    let session = auth.session;
    let purged = ctx
        .run(move |conn| {
            Session::revoke(conn, session)?;
            Session::purge(conn, Utc::now().naive_utc())
        })
        .await?;
    log::debug!("purged {} dead sessions", purged);
    log::info!("user {} logged out", auth.user.get_id().unwrap_or_default());
    Ok(HttpResponse::Ok().json(FlashBody {
        flash: Flash::success("You were logged out. Bye!"),
    }))
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub user: User,
    pub appointments: Vec<Appointment>,
    pub symptoms: Vec<Symptom>,
    pub user_symptoms: Vec<UserSymptom>,
}

pub async fn members(ctx: web::Data<AppContext>, auth: Authenticated) -> AppResult<HttpResponse> {
    let user = auth.user;
    let dashboard = ctx
        .run(move |conn| {
            let appointments = user
                .appointments()
                .order((appointment::date, appointment::id))
                .load::<Appointment>(conn)?;
            let symptoms = user
                .symptoms()
                .order(symptom::name)
                .load::<Symptom>(conn)?;
            let user_symptoms = user
                .user_symptoms()
                .order(user_symptom::start_date)
                .load::<UserSymptom>(conn)?;
            Ok(Dashboard {
                user,
                appointments,
                symptoms,
                user_symptoms,
            })
        })
        .await?;
    Ok(HttpResponse::Ok().json(dashboard))
}

pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorBody::new(
        actix_web::http::StatusCode::NOT_FOUND,
        "The requested URL was not found on the server.",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(email: &str, password: &str, confirm: &str) -> RegisterForm {
        RegisterForm {
            email: email.into(),
            password: password.into(),
            confirm: confirm.into(),
        }
    }

    #[test]
    fn registration_rules() {
        assert!(form("a@example.com", "secret123", "secret123").validate().is_ok());
        assert!(form("a.example.com", "secret123", "secret123").validate().is_err());
        assert!(form("a@b.c", "secret123", "secret123").validate().is_err());
        assert!(form("a@example.com", "short", "short").validate().is_err());
        assert!(form("a@example.com", &"x".repeat(26), &"x".repeat(26)).validate().is_err());
        assert!(matches!(
            form("a@example.com", "secret123", "secret124").validate(),
            Err(AppError::BadRequest(_))
        ));
    }
}
