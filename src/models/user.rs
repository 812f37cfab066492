use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use serde::{Deserialize, Serialize};

use crate::crypto::Passwords;
use crate::error::{AppError, AppResult};
use crate::models::attachment::{self, Owner, OwnerKind};
use crate::schema::{appointment, attachment as attachments, symptom, user_symptom, users};

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    pub id: i32,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<i32>,
    pub registered_on: NaiveDateTime,
    pub admin: bool,
}

crud!(User, users);

impl User {
    pub fn find_by_email(conn: &mut SqliteConnection, email: &str) -> AppResult<Option<Self>> {
        Ok(users::table
            .filter(users::email.eq(email))
            .select(User::as_select())
            .first(conn)
            .optional()?)
    }

    pub fn appointments(&self) -> appointment::BoxedQuery<'static, Sqlite> {
        appointment::table
            .filter(appointment::user_id.eq(self.id))
            .into_boxed()
    }

    pub fn user_symptoms(&self) -> user_symptom::BoxedQuery<'static, Sqlite> {
        user_symptom::table
            .filter(user_symptom::user_id.eq(self.id))
            .into_boxed()
    }

    // Symptoms linked through `user_symptom`, each listed once.
    pub fn symptoms(&self) -> symptom::BoxedQuery<'static, Sqlite> {
        symptom::table
            .filter(
                symptom::id.eq_any(
                    user_symptom::table
                        .filter(user_symptom::user_id.eq(self.id))
                        .select(user_symptom::symptom_id),
                ),
            )
            .into_boxed()
    }

    pub fn attachments(&self) -> attachments::BoxedQuery<'static, Sqlite> {
        attachment::owned_by(Owner::new(OwnerKind::User, self.id))
    }

    pub fn update_profile(
        conn: &mut SqliteConnection,
        id: i32,
        profile: &UserProfile,
    ) -> AppResult<Self> {
        diesel::update(users::table.find(id))
            .set(profile)
            .returning(User::as_returning())
            .get_result(conn)
            .map_err(|e| crate::models::missing(e, "users", id))
    }

    pub fn set_password(
        conn: &mut SqliteConnection,
        id: i32,
        password: &str,
        passwords: &Passwords,
    ) -> AppResult<Self> {
        let hash = passwords.hash(password)?;
        diesel::update(users::table.find(id))
            .set(users::password.eq(hash))
            .returning(User::as_returning())
            .get_result(conn)
            .map_err(|e| crate::models::missing(e, "users", id))
    }

    pub fn set_admin(conn: &mut SqliteConnection, id: i32, admin: bool) -> AppResult<Self> {
        diesel::update(users::table.find(id))
            .set(users::admin.eq(admin))
            .returning(User::as_returning())
            .get_result(conn)
            .map_err(|e| crate::models::missing(e, "users", id))
    }
}

// A user ready to insert. Only `NewUser::new` builds one, so the stored
// password is always a hash and `registered_on` is stamped exactly once.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    email: String,
    password: String,
    street_address: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zip_code: Option<i32>,
    registered_on: NaiveDateTime,
    admin: bool,
}

impl NewUser {
    pub fn new(
        email: impl Into<String>,
        password: &str,
        admin: bool,
        passwords: &Passwords,
    ) -> AppResult<Self> {
        Ok(Self {
            email: email.into(),
            password: passwords.hash(password)?,
            street_address: None,
            city: None,
            state: None,
            zip_code: None,
            registered_on: Utc::now().naive_utc(),
            admin,
        })
    }

    pub fn with_address(mut self, profile: &UserProfile) -> Self {
        self.street_address = profile.street_address.clone();
        self.city = profile.city.clone();
        self.state = profile.state.clone();
        self.zip_code = profile.zip_code;
        self
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn registered_on(&self) -> NaiveDateTime {
        self.registered_on
    }

    pub fn insert(&self, conn: &mut SqliteConnection) -> AppResult<User> {
        Ok(diesel::insert_into(users::table)
            .values(self)
            .returning(User::as_returning())
            .get_result(conn)?)
    }
}

#[derive(Debug, Clone, Default, Deserialize, AsChangeset)]
#[diesel(table_name = users, treat_none_as_null = true)]
pub struct UserProfile {
    pub email: String,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<i32>,
    #[serde(default)]
    pub admin: bool,
}

// Admin create/edit form. `password` is required on create and replaces
// the stored hash on edit when present.
#[derive(Debug, Clone, Deserialize)]
pub struct UserForm {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub password: Option<String>,
}

impl UserForm {
    pub fn create(&self, conn: &mut SqliteConnection, passwords: &Passwords) -> AppResult<User> {
        let password = self
            .password
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("password is required".to_string()))?;
        NewUser::new(self.profile.email.clone(), password, self.profile.admin, passwords)?
            .with_address(&self.profile)
            .insert(conn)
    }

    pub fn apply(&self, conn: &mut SqliteConnection, id: i32, passwords: &Passwords) -> AppResult<User> {
        conn.transaction(|conn| {
            let user = User::update_profile(conn, id, &self.profile)?;
            match self.password.as_deref() {
                Some(password) => User::set_password(conn, id, password, passwords),
                None => Ok(user),
            }
        })
    }
}
