use diesel::result::Error as DieselError;

use crate::error::AppError;

// Shared read/delete helpers for a row type. The three-argument form also
// wires `insert` on the form and `update` on the row.
macro_rules! crud {
    ($row:ident, $table:ident) => {
        impl $row {
            pub fn find(conn: &mut diesel::SqliteConnection, id: i32) -> $crate::error::AppResult<Self> {
                $table::table
                    .find(id)
                    .select($row::as_select())
                    .first(conn)
                    .map_err(|e| $crate::models::missing(e, stringify!($table), id))
            }

            pub fn page(
                conn: &mut diesel::SqliteConnection,
                limit: i64,
                offset: i64,
            ) -> $crate::error::AppResult<Vec<Self>> {
                Ok($table::table
                    .order($table::id)
                    .limit(limit)
                    .offset(offset)
                    .select($row::as_select())
                    .load(conn)?)
            }

            pub fn count(conn: &mut diesel::SqliteConnection) -> $crate::error::AppResult<i64> {
                Ok($table::table.count().get_result(conn)?)
            }

            pub fn delete(conn: &mut diesel::SqliteConnection, id: i32) -> $crate::error::AppResult<()> {
                match diesel::delete($table::table.find(id)).execute(conn)? {
                    0 => Err($crate::error::AppError::NotFound(format!("{} {}", stringify!($table), id))),
                    _ => Ok(()),
                }
            }
        }
    };
    ($row:ident, $form:ident, $table:ident) => {
        crud!($row, $table);

        impl $form {
            pub fn insert(&self, conn: &mut diesel::SqliteConnection) -> $crate::error::AppResult<$row> {
                Ok(diesel::insert_into($table::table)
                    .values(self)
                    .returning($row::as_returning())
                    .get_result(conn)?)
            }
        }

        impl $row {
            pub fn update(
                conn: &mut diesel::SqliteConnection,
                id: i32,
                form: &$form,
            ) -> $crate::error::AppResult<Self> {
                diesel::update($table::table.find(id))
                    .set(form)
                    .returning($row::as_returning())
                    .get_result(conn)
                    .map_err(|e| $crate::models::missing(e, stringify!($table), id))
            }
        }
    };
}

pub mod appointment;
pub mod attachment;
pub mod provider;
pub mod symptom;
pub mod treatment;
pub mod user;
pub mod user_symptom;
pub mod user_symptom_treatment;

#[cfg(test)]
pub(crate) mod fixtures;

pub use appointment::{Appointment, NewAppointment};
pub use attachment::{Attachment, NewAttachment, Owner, OwnerKind};
pub use provider::{NewProvider, Provider};
pub use symptom::{NewSymptom, Symptom};
pub use treatment::{NewTreatment, Treatment};
pub use user::{NewUser, User, UserForm, UserProfile};
pub use user_symptom::{NewUserSymptom, UserSymptom};
pub use user_symptom_treatment::{NewUserSymptomTreatment, UserSymptomTreatment};

pub(crate) fn missing(e: DieselError, table: &str, id: i32) -> AppError {
    match e {
        DieselError::NotFound => AppError::NotFound(format!("{} {}", table, id)),
        other => other.into(),
    }
}
