use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::models::attachment::{self, Owner, OwnerKind};
use crate::models::{Appointment, Treatment, UserSymptom};
use crate::schema::{attachment as attachments, user_symptom_treatment};

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = user_symptom_treatment)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserSymptomTreatment {
    pub id: i32,
    pub user_symptom_id: i32,
    pub treatment_id: i32,
    pub appointment_id: i32,
    pub date: NaiveDateTime,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Insertable, AsChangeset)]
#[diesel(table_name = user_symptom_treatment, treat_none_as_null = true)]
pub struct NewUserSymptomTreatment {
    pub user_symptom_id: i32,
    pub treatment_id: i32,
    pub appointment_id: i32,
    pub date: NaiveDateTime,
    pub notes: Option<String>,
}

crud!(UserSymptomTreatment, NewUserSymptomTreatment, user_symptom_treatment);

impl UserSymptomTreatment {
    pub fn user_symptom(&self, conn: &mut SqliteConnection) -> AppResult<UserSymptom> {
        UserSymptom::find(conn, self.user_symptom_id)
    }

    pub fn treatment(&self, conn: &mut SqliteConnection) -> AppResult<Treatment> {
        Treatment::find(conn, self.treatment_id)
    }

    pub fn appointment(&self, conn: &mut SqliteConnection) -> AppResult<Appointment> {
        Appointment::find(conn, self.appointment_id)
    }

    pub fn attachments(&self) -> attachments::BoxedQuery<'static, Sqlite> {
        attachment::owned_by(Owner::new(OwnerKind::UserSymptomTreatment, self.id))
    }
}
