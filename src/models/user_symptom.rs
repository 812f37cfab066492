use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::models::attachment::{self, Owner, OwnerKind};
use crate::models::{Symptom, User};
use crate::schema::{attachment as attachments, treatment, user_symptom, user_symptom_treatment};

// One episode of a symptom for a user. Dates are stored as given;
// an end before the start is accepted.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = user_symptom)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserSymptom {
    pub id: i32,
    pub user_id: i32,
    pub symptom_id: i32,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Insertable, AsChangeset)]
#[diesel(table_name = user_symptom, treat_none_as_null = true)]
pub struct NewUserSymptom {
    pub user_id: i32,
    pub symptom_id: i32,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub notes: Option<String>,
}

crud!(UserSymptom, NewUserSymptom, user_symptom);

impl UserSymptom {
    pub fn user(&self, conn: &mut SqliteConnection) -> AppResult<User> {
        User::find(conn, self.user_id)
    }

    pub fn symptom(&self, conn: &mut SqliteConnection) -> AppResult<Symptom> {
        Symptom::find(conn, self.symptom_id)
    }

    pub fn links(&self) -> user_symptom_treatment::BoxedQuery<'static, Sqlite> {
        user_symptom_treatment::table
            .filter(user_symptom_treatment::user_symptom_id.eq(self.id))
            .into_boxed()
    }

    pub fn treatments(&self) -> treatment::BoxedQuery<'static, Sqlite> {
        treatment::table
            .filter(
                treatment::id.eq_any(
                    user_symptom_treatment::table
                        .filter(user_symptom_treatment::user_symptom_id.eq(self.id))
                        .select(user_symptom_treatment::treatment_id),
                ),
            )
            .into_boxed()
    }

    pub fn attachments(&self) -> attachments::BoxedQuery<'static, Sqlite> {
        attachment::owned_by(Owner::new(OwnerKind::UserSymptom, self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{fixtures, Appointment, Attachment, NewAttachment, UserSymptomTreatment};

    #[test]
    fn end_before_start_is_accepted() {
        let mut conn = fixtures::conn();
        let user = fixtures::user(&mut conn, "a@example.com");
        let cough = fixtures::symptom(&mut conn, "Cough");
        let entry = NewUserSymptom {
            user_id: user.id,
            symptom_id: cough.id,
            start_date: fixtures::day(10),
            end_date: fixtures::day(2),
            notes: None,
        }
        .insert(&mut conn)
        .unwrap();
        assert!(entry.end_date < entry.start_date);
        assert_eq!(UserSymptom::find(&mut conn, entry.id).unwrap(), entry);
    }

    #[test]
    fn many_to_one_traversals() {
        let mut conn = fixtures::conn();
        let user = fixtures::user(&mut conn, "a@example.com");
        let cough = fixtures::symptom(&mut conn, "Cough");
        let entry = fixtures::user_symptom(&mut conn, &user, &cough);
        assert_eq!(entry.user(&mut conn).unwrap(), user);
        assert_eq!(entry.symptom(&mut conn).unwrap(), cough);
    }

    #[test]
    fn notes_can_be_cleared_on_update() {
        let mut conn = fixtures::conn();
        let user = fixtures::user(&mut conn, "a@example.com");
        let cough = fixtures::symptom(&mut conn, "Cough");
        let mut form = NewUserSymptom {
            user_id: user.id,
            symptom_id: cough.id,
            start_date: fixtures::day(1),
            end_date: fixtures::day(2),
            notes: Some("dry".into()),
        };
        let entry = form.insert(&mut conn).unwrap();
        form.notes = None;
        let entry = UserSymptom::update(&mut conn, entry.id, &form).unwrap();
        assert_eq!(entry.notes, None);
    }

    #[test]
    fn deleting_user_cascades_through_owned_rows() {
        let mut conn = fixtures::conn();
        let user = fixtures::user(&mut conn, "a@example.com");
        let visit = fixtures::appointment(&mut conn, &user);
        let cough = fixtures::symptom(&mut conn, "Cough");
        let entry = fixtures::user_symptom(&mut conn, &user, &cough);
        let syrup = fixtures::treatment(&mut conn, "Syrup");
        let link = crate::models::NewUserSymptomTreatment {
            user_symptom_id: entry.id,
            treatment_id: syrup.id,
            appointment_id: visit.id,
            date: fixtures::day(10),
            notes: None,
        }
        .insert(&mut conn)
        .unwrap();
        crate::auth::Session::open(&mut conn, user.id, std::time::Duration::from_secs(60)).unwrap();
        for owner in [
            Owner::new(OwnerKind::User, user.id),
            Owner::new(OwnerKind::Appointment, visit.id),
            Owner::new(OwnerKind::UserSymptom, entry.id),
            Owner::new(OwnerKind::UserSymptomTreatment, link.id),
            Owner::new(OwnerKind::Symptom, cough.id),
        ] {
            NewAttachment::new(format!("/files/{}.pdf", owner.kind), None, owner)
                .insert(&mut conn)
                .unwrap();
        }

        User::delete(&mut conn, user.id).unwrap();
        assert_eq!(Appointment::count(&mut conn).unwrap(), 0);
        assert_eq!(UserSymptom::count(&mut conn).unwrap(), 0);
        assert_eq!(UserSymptomTreatment::count(&mut conn).unwrap(), 0);
        let sessions: i64 = crate::schema::sessions::table
            .count()
            .get_result(&mut conn)
            .unwrap();
        assert_eq!(sessions, 0);
        // only the symptom's attachment is left
        let left: Vec<Attachment> = crate::schema::attachment::table
            .select(Attachment::as_select())
            .load(&mut conn)
            .unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].owner(), Owner::new(OwnerKind::Symptom, cough.id));
        // catalog rows survive
        assert_eq!(Symptom::count(&mut conn).unwrap(), 1);
    }
}
