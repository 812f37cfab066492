use chrono::{NaiveDate, NaiveDateTime};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;

use crate::config::HashCost;
use crate::crypto::Passwords;
use crate::db;
use crate::models::*;

pub fn conn() -> SqliteConnection {
    let mut conn = SqliteConnection::establish(":memory:").unwrap();
    conn.batch_execute("PRAGMA foreign_keys = ON;").unwrap();
    db::migrate(&mut conn).unwrap();
    conn
}

pub fn passwords() -> Passwords {
    Passwords::new(HashCost { rounds: 1, memory_kib: 1024 }).unwrap()
}

pub fn day(day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, day)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

pub fn user(conn: &mut SqliteConnection, email: &str) -> User {
    NewUser::new(email, "secret123", false, &passwords())
        .unwrap()
        .insert(conn)
        .unwrap()
}

pub fn symptom(conn: &mut SqliteConnection, name: &str) -> Symptom {
    NewSymptom {
        name: name.to_string(),
        notes: format!("{} notes", name),
    }
    .insert(conn)
    .unwrap()
}

pub fn treatment(conn: &mut SqliteConnection, name: &str) -> Treatment {
    NewTreatment {
        name: name.to_string(),
        notes: format!("{} notes", name),
    }
    .insert(conn)
    .unwrap()
}

pub fn appointment(conn: &mut SqliteConnection, user: &User) -> Appointment {
    NewAppointment {
        user_id: user.id,
        date: day(10),
        notes: "checkup".to_string(),
    }
    .insert(conn)
    .unwrap()
}

pub fn user_symptom(conn: &mut SqliteConnection, user: &User, symptom: &Symptom) -> UserSymptom {
    NewUserSymptom {
        user_id: user.id,
        symptom_id: symptom.id,
        start_date: day(1),
        end_date: day(3),
        notes: None,
    }
    .insert(conn)
    .unwrap()
}

pub fn provider(conn: &mut SqliteConnection) -> Provider {
    NewProvider {
        first_name: "Gregory".to_string(),
        last_name: "House".to_string(),
        suffix: Some("MD".to_string()),
        specialty: Some("Diagnostics".to_string()),
    }
    .insert(conn)
    .unwrap()
}
