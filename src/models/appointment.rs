use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::models::attachment::{self, Owner, OwnerKind};
use crate::models::User;
use crate::schema::{appointment, attachment as attachments, treatment, user_symptom_treatment};

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = appointment)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Appointment {
    pub id: i32,
    pub user_id: i32,
    pub date: NaiveDateTime,
    pub notes: String,
}

#[derive(Debug, Clone, Deserialize, Insertable, AsChangeset)]
#[diesel(table_name = appointment)]
pub struct NewAppointment {
    pub user_id: i32,
    pub date: NaiveDateTime,
    pub notes: String,
}

crud!(Appointment, NewAppointment, appointment);

impl Appointment {
    pub fn user(&self, conn: &mut SqliteConnection) -> AppResult<User> {
        User::find(conn, self.user_id)
    }

    pub fn links(&self) -> user_symptom_treatment::BoxedQuery<'static, Sqlite> {
        user_symptom_treatment::table
            .filter(user_symptom_treatment::appointment_id.eq(self.id))
            .into_boxed()
    }

    pub fn treatments(&self) -> treatment::BoxedQuery<'static, Sqlite> {
        treatment::table
            .filter(
                treatment::id.eq_any(
                    user_symptom_treatment::table
                        .filter(user_symptom_treatment::appointment_id.eq(self.id))
                        .select(user_symptom_treatment::treatment_id),
                ),
            )
            .into_boxed()
    }

    pub fn attachments(&self) -> attachments::BoxedQuery<'static, Sqlite> {
        attachment::owned_by(Owner::new(OwnerKind::Appointment, self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, Constraint};
    use crate::models::fixtures;
    use crate::models::{NewUserSymptomTreatment, Treatment};

    #[test]
    fn appointment_belongs_to_its_user() {
        let mut conn = fixtures::conn();
        let user = fixtures::user(&mut conn, "a@example.com");
        let visit = fixtures::appointment(&mut conn, &user);
        assert_eq!(visit.user(&mut conn).unwrap(), user);
    }

    #[test]
    fn unknown_user_is_a_foreign_key_violation() {
        let mut conn = fixtures::conn();
        let err = NewAppointment {
            user_id: 404,
            date: fixtures::day(2),
            notes: "orphan".into(),
        }
        .insert(&mut conn)
        .unwrap_err();
        assert_eq!(err.constraint(), Some(Constraint::ForeignKey));
    }

    #[test]
    fn treatments_come_through_links() {
        let mut conn = fixtures::conn();
        let user = fixtures::user(&mut conn, "a@example.com");
        let visit = fixtures::appointment(&mut conn, &user);
        let headache = fixtures::symptom(&mut conn, "Headache");
        let entry = fixtures::user_symptom(&mut conn, &user, &headache);
        let rest = fixtures::treatment(&mut conn, "Rest");
        fixtures::treatment(&mut conn, "Surgery");
        NewUserSymptomTreatment {
            user_symptom_id: entry.id,
            treatment_id: rest.id,
            appointment_id: visit.id,
            date: fixtures::day(10),
            notes: None,
        }
        .insert(&mut conn)
        .unwrap();

        let treatments: Vec<Treatment> = visit.treatments().load(&mut conn).unwrap();
        assert_eq!(treatments, vec![rest]);
        let links: i64 = visit.links().count().get_result(&mut conn).unwrap();
        assert_eq!(links, 1);
    }

    #[test]
    fn update_replaces_fields_and_delete_removes_row() {
        let mut conn = fixtures::conn();
        let user = fixtures::user(&mut conn, "a@example.com");
        let visit = fixtures::appointment(&mut conn, &user);
        let edited = Appointment::update(
            &mut conn,
            visit.id,
            &NewAppointment {
                user_id: user.id,
                date: fixtures::day(20),
                notes: "moved".into(),
            },
        )
        .unwrap();
        assert_eq!(edited.date, fixtures::day(20));
        assert_eq!(edited.notes, "moved");

        Appointment::delete(&mut conn, visit.id).unwrap();
        assert!(matches!(
            Appointment::delete(&mut conn, visit.id),
            Err(AppError::NotFound(_))
        ));
        assert_eq!(Appointment::count(&mut conn).unwrap(), 0);
    }
}
