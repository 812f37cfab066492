use actix_web::web;
use diesel::SqliteConnection;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::crypto::Passwords;
use crate::error::AppResult;
use crate::models::{
    Appointment, Attachment, Provider, Symptom, Treatment, User, UserSymptom, UserSymptomTreatment,
};

pub mod descriptor;
pub mod resources;
pub mod views;

pub use descriptor::Descriptor;

pub trait Resource: Serialize + Send + Sized + 'static {
    const DESCRIPTOR: &'static Descriptor;

    type Form: DeserializeOwned + Send + 'static;

    fn id(&self) -> i32;

    fn list(conn: &mut SqliteConnection, limit: i64, offset: i64) -> AppResult<Vec<Self>>;

    fn count(conn: &mut SqliteConnection) -> AppResult<i64>;

    fn find(conn: &mut SqliteConnection, id: i32) -> AppResult<Self>;

    fn create(conn: &mut SqliteConnection, form: &Self::Form, passwords: &Passwords) -> AppResult<Self>;

    fn update(
        conn: &mut SqliteConnection,
        id: i32,
        form: &Self::Form,
        passwords: &Passwords,
    ) -> AppResult<Self>;

    fn delete(conn: &mut SqliteConnection, id: i32) -> AppResult<()>;
}

fn register<R: Resource>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope(&format!("/{}", R::DESCRIPTOR.table))
            .route("", web::get().to(views::list::<R>))
            .route("", web::post().to(views::create::<R>))
            .route("/schema", web::get().to(views::schema::<R>))
            .route("/{id}", web::get().to(views::show::<R>))
            .route("/{id}", web::put().to(views::edit::<R>))
            .route("/{id}", web::delete().to(views::delete::<R>)),
    );
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("", web::get().to(views::index))
            .configure(register::<User>)
            .configure(register::<Appointment>)
            .configure(register::<Treatment>)
            .configure(register::<Symptom>)
            .configure(register::<UserSymptom>)
            .configure(register::<UserSymptomTreatment>)
            .configure(register::<Attachment>)
            .configure(register::<Provider>),
    );
}
