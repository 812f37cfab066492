use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use serde::{Deserialize, Serialize};

use crate::models::attachment::{self, Owner, OwnerKind};
use crate::schema::{attachment as attachments, symptom, user_symptom, users};

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = symptom)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Symptom {
    pub id: i32,
    pub name: String,
    pub notes: String,
}

#[derive(Debug, Clone, Deserialize, Insertable, AsChangeset)]
#[diesel(table_name = symptom)]
pub struct NewSymptom {
    pub name: String,
    pub notes: String,
}

crud!(Symptom, NewSymptom, symptom);

impl Symptom {
    pub fn user_symptoms(&self) -> user_symptom::BoxedQuery<'static, Sqlite> {
        user_symptom::table
            .filter(user_symptom::symptom_id.eq(self.id))
            .into_boxed()
    }

    pub fn users(&self) -> users::BoxedQuery<'static, Sqlite> {
        users::table
            .filter(
                users::id.eq_any(
                    user_symptom::table
                        .filter(user_symptom::symptom_id.eq(self.id))
                        .select(user_symptom::user_id),
                ),
            )
            .into_boxed()
    }

    pub fn attachments(&self) -> attachments::BoxedQuery<'static, Sqlite> {
        attachment::owned_by(Owner::new(OwnerKind::Symptom, self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Constraint;
    use crate::models::{fixtures, User, UserSymptom};

    #[test]
    fn users_follow_the_association() {
        let mut conn = fixtures::conn();
        let a = fixtures::user(&mut conn, "a@example.com");
        fixtures::user(&mut conn, "b@example.com");
        let cough = fixtures::symptom(&mut conn, "Cough");
        fixtures::user_symptom(&mut conn, &a, &cough);
        let users: Vec<User> = cough.users().load(&mut conn).unwrap();
        assert_eq!(users, vec![a]);
    }

    #[test]
    fn referenced_symptom_cannot_be_deleted() {
        let mut conn = fixtures::conn();
        let user = fixtures::user(&mut conn, "a@example.com");
        let cough = fixtures::symptom(&mut conn, "Cough");
        let entry = fixtures::user_symptom(&mut conn, &user, &cough);

        let err = Symptom::delete(&mut conn, cough.id).unwrap_err();
        assert_eq!(err.constraint(), Some(Constraint::ForeignKey));
        assert!(Symptom::find(&mut conn, cough.id).is_ok());

        UserSymptom::delete(&mut conn, entry.id).unwrap();
        Symptom::delete(&mut conn, cough.id).unwrap();
        assert_eq!(Symptom::count(&mut conn).unwrap(), 0);
    }

    #[test]
    fn name_longer_than_eighty_is_rejected() {
        let mut conn = fixtures::conn();
        let err = NewSymptom {
            name: "x".repeat(81),
            notes: String::new(),
        }
        .insert(&mut conn)
        .unwrap_err();
        assert_eq!(err.constraint(), Some(Constraint::Check));
    }

    #[test]
    fn page_orders_by_id() {
        let mut conn = fixtures::conn();
        for name in ["Cough", "Fever", "Rash"] {
            fixtures::symptom(&mut conn, name);
        }
        let second: Vec<String> = Symptom::page(&mut conn, 2, 1)
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(second, vec!["Fever", "Rash"]);
    }
}
