use actix_web::{web, HttpResponse};
use diesel::Connection;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::descriptor::Schema;
use super::resources;
use super::{Descriptor, Resource};
use crate::auth::AdminUser;
use crate::context::AppContext;
use crate::error::{AppError, AppResult};

const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Page {
    #[serde(default = "Page::first")]
    pub page: u32,
    #[serde(default = "Page::default_size")]
    pub per_page: u32,
}

impl Page {
    fn first() -> u32 {
        1
    }

    fn default_size() -> u32 {
        20
    }

    fn limit(&self) -> i64 {
        i64::from(self.per_page.clamp(1, MAX_PER_PAGE))
    }

    fn offset(&self) -> i64 {
        i64::from(self.page.max(1) - 1) * self.limit()
    }
}

#[derive(Debug, Serialize)]
pub struct Listing<R> {
    pub entity: &'static str,
    pub total: i64,
    pub page: u32,
    pub per_page: i64,
    pub rows: Vec<R>,
}

#[derive(Debug, Serialize)]
struct Entry {
    name: &'static str,
    table: &'static str,
    href: String,
}

pub async fn index(_admin: AdminUser) -> HttpResponse {
    let entries: Vec<Entry> = resources::ALL
        .iter()
        .map(|d| Entry {
            name: d.name,
            table: d.table,
            href: format!("/admin/{}", d.table),
        })
        .collect();
    HttpResponse::Ok().json(entries)
}

pub async fn schema<R: Resource>(_admin: AdminUser) -> web::Json<Schema> {
    web::Json(Schema::from(R::DESCRIPTOR))
}

fn parse_form<R: Resource>(body: Value) -> AppResult<R::Form> {
    parse_against::<R::Form>(R::DESCRIPTOR, body)
}

fn parse_against<F: serde::de::DeserializeOwned>(
    descriptor: &Descriptor,
    body: Value,
) -> AppResult<F> {
    let Value::Object(map) = &body else {
        return Err(AppError::BadRequest("form must be a JSON object".to_string()));
    };
    descriptor
        .check_form(map.keys().map(String::as_str))
        .map_err(AppError::BadRequest)?;
    serde_json::from_value(body).map_err(|e| AppError::BadRequest(e.to_string()))
}

pub async fn list<R: Resource>(
    _admin: AdminUser,
    ctx: web::Data<AppContext>,
    query: web::Query<Page>,
) -> AppResult<HttpResponse> {
    let page = query.into_inner();
    let (limit, offset) = (page.limit(), page.offset());
    let (total, rows) = ctx
        .run(move |conn| Ok((R::count(conn)?, R::list(conn, limit, offset)?)))
        .await?;
    Ok(HttpResponse::Ok().json(Listing {
        entity: R::DESCRIPTOR.name,
        total,
        page: page.page.max(1),
        per_page: limit,
        rows,
    }))
}

pub async fn show<R: Resource>(
    _admin: AdminUser,
    ctx: web::Data<AppContext>,
    id: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let id = id.into_inner();
    let row = ctx.run(move |conn| R::find(conn, id)).await?;
    Ok(HttpResponse::Ok().json(row))
}

pub async fn create<R: Resource>(
    AdminUser(admin): AdminUser,
    ctx: web::Data<AppContext>,
    form: web::Json<Value>,
) -> AppResult<HttpResponse> {
    let form = parse_form::<R>(form.into_inner())?;
    let passwords = ctx.passwords.clone();
    let row = ctx
        .run(move |conn| conn.transaction(|conn| R::create(conn, &form, &passwords)))
        .await?;
    log::info!(
        "admin {} created {} {}",
        admin.user.id,
        R::DESCRIPTOR.table,
        row.id()
    );
    Ok(HttpResponse::Created().json(row))
}

pub async fn edit<R: Resource>(
    AdminUser(admin): AdminUser,
    ctx: web::Data<AppContext>,
    id: web::Path<i32>,
    form: web::Json<Value>,
) -> AppResult<HttpResponse> {
    let id = id.into_inner();
    let form = parse_form::<R>(form.into_inner())?;
    let passwords = ctx.passwords.clone();
    let row = ctx
        .run(move |conn| conn.transaction(|conn| R::update(conn, id, &form, &passwords)))
        .await?;
    log::info!("admin {} updated {} {}", admin.user.id, R::DESCRIPTOR.table, id);
    Ok(HttpResponse::Ok().json(row))
}

pub async fn delete<R: Resource>(
    AdminUser(admin): AdminUser,
    ctx: web::Data<AppContext>,
    id: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let id = id.into_inner();
    ctx.run(move |conn| conn.transaction::<_, AppError, _>(|conn| R::delete(conn, id)))
        .await?;
    log::info!("admin {} deleted {} {}", admin.user.id, R::DESCRIPTOR.table, id);
    Ok(HttpResponse::NoContent().finish())
}
