use diesel::prelude::*;

use crate::crypto::Passwords;
use crate::db;
use crate::error::AppResult;
use crate::models::{NewProvider, NewSymptom, NewTreatment, NewUser, Symptom, User};

pub const DEFAULT_ADMIN_EMAIL: &str = "ad@min.com";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin";

const SYMPTOMS: &[(&str, &str)] = &[
    ("Headache", "Pain in the head or neck."),
    ("Fatigue", "Persistent tiredness."),
    ("Nausea", "Urge to vomit."),
    ("Fever", "Body temperature above 38C."),
];

const TREATMENTS: &[(&str, &str)] = &[
    ("Ibuprofen", "200mg every six hours."),
    ("Rest", "Eight hours of sleep."),
    ("Hydration", "Two litres of water a day."),
];

const PROVIDERS: &[(&str, &str, Option<&str>, Option<&str>)] = &[
    ("Gregory", "House", Some("MD"), Some("Diagnostics")),
    ("Lisa", "Cuddy", Some("MD"), Some("Endocrinology")),
    ("James", "Wilson", Some("MD"), Some("Oncology")),
];

pub fn create_db(conn: &mut SqliteConnection) -> AppResult<i32> {
    db::migrate(conn)?;
    Ok(db::version(conn))
}

pub fn drop_db(conn: &mut SqliteConnection) -> AppResult<()> {
    db::drop_all(conn)
}

pub fn create_admin(
    conn: &mut SqliteConnection,
    email: &str,
    password: &str,
    passwords: &Passwords,
) -> AppResult<User> {
    let admin = NewUser::new(email, password, true, passwords)?.insert(conn)?;
    log::info!("created admin {} ({})", admin.email, admin.id);
    Ok(admin)
}

// Seeds the catalog tables. Returns the number of rows written; a database
// that already has symptoms is left alone.
pub fn create_data(conn: &mut SqliteConnection) -> AppResult<usize> {
    if Symptom::count(conn)? > 0 {
        log::info!("catalog already seeded");
        return Ok(0);
    }
    conn.transaction(|conn| {
        let mut written = 0;
        for (name, notes) in SYMPTOMS {
            NewSymptom {
                name: name.to_string(),
                notes: notes.to_string(),
            }
            .insert(conn)?;
            written += 1;
        }
        for (name, notes) in TREATMENTS {
            NewTreatment {
                name: name.to_string(),
                notes: notes.to_string(),
            }
            .insert(conn)?;
            written += 1;
        }
        for (first, last, suffix, specialty) in PROVIDERS {
            NewProvider {
                first_name: first.to_string(),
                last_name: last.to_string(),
                suffix: suffix.map(str::to_string),
                specialty: specialty.map(str::to_string),
            }
            .insert(conn)?;
            written += 1;
        }
        log::info!("seeded {} catalog rows", written);
        Ok(written)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{fixtures, Provider, Treatment};

    #[test]
    fn create_admin_sets_flag() {
        let mut conn = fixtures::conn();
        let admin = create_admin(
            &mut conn,
            DEFAULT_ADMIN_EMAIL,
            DEFAULT_ADMIN_PASSWORD,
            &fixtures::passwords(),
        )
        .unwrap();
        assert!(admin.admin);
        assert!(fixtures::passwords().verify(DEFAULT_ADMIN_PASSWORD, &admin.password));
    }

    #[test]
    fn create_data_seeds_once() {
        let mut conn = fixtures::conn();
        assert_eq!(create_data(&mut conn).unwrap(), 10);
        assert_eq!(create_data(&mut conn).unwrap(), 0);
        assert_eq!(Symptom::count(&mut conn).unwrap(), 4);
        assert_eq!(Treatment::count(&mut conn).unwrap(), 3);
        assert_eq!(Provider::count(&mut conn).unwrap(), 3);
    }

    #[test]
    fn drop_then_create_restores_schema() {
        let mut conn = fixtures::conn();
        drop_db(&mut conn).unwrap();
        assert_eq!(db::version(&mut conn), 0);
        assert_eq!(create_db(&mut conn).unwrap(), 1);
        assert_eq!(User::count(&mut conn).unwrap(), 0);
    }
}
