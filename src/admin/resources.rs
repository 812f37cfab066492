use diesel::SqliteConnection;

use super::descriptor::{Descriptor, Field, FieldKind as K, Relation};
use super::Resource;
use crate::crypto::Passwords;
use crate::error::AppResult;
use crate::models::*;

pub const USERS: Descriptor = Descriptor {
    name: "User",
    table: "users",
    fields: &[
        Field::id(),
        Field::new("email", K::Text).unique().max_len(255),
        Field::new("password", K::Text).nullable().write_only(),
        Field::new("street_address", K::Text).nullable().max_len(64),
        Field::new("city", K::Text).nullable().max_len(64),
        Field::new("state", K::Text).nullable().max_len(2),
        Field::new("zip_code", K::Integer).nullable(),
        Field::new("registered_on", K::DateTime).readonly(),
        Field::new("admin", K::Boolean),
    ],
    relations: &[
        Relation::many_to_many("symptoms", "symptom", "user_symptom"),
        Relation::one_to_many("appointments", "appointment"),
        Relation::one_to_many("user_symptoms", "user_symptom"),
        Relation::one_to_many("attachments", "attachment"),
    ],
};

pub const APPOINTMENTS: Descriptor = Descriptor {
    name: "Appointment",
    table: "appointment",
    fields: &[
        Field::id(),
        Field::new("user_id", K::ForeignKey("users")),
        Field::new("date", K::DateTime),
        Field::new("notes", K::Text),
    ],
    relations: &[
        Relation::many_to_one("user", "users"),
        Relation::many_to_many("treatments", "treatment", "user_symptom_treatment"),
        Relation::one_to_many("attachments", "attachment"),
    ],
};

pub const TREATMENTS: Descriptor = Descriptor {
    name: "Treatment",
    table: "treatment",
    fields: &[
        Field::id(),
        Field::new("name", K::Text).max_len(80),
        Field::new("notes", K::Text),
    ],
    relations: &[
        Relation::many_to_many("user_symptoms", "user_symptom", "user_symptom_treatment"),
        Relation::one_to_many("links", "user_symptom_treatment"),
        Relation::one_to_many("attachments", "attachment"),
    ],
};

pub const SYMPTOMS: Descriptor = Descriptor {
    name: "Symptom",
    table: "symptom",
    fields: &[
        Field::id(),
        Field::new("name", K::Text).max_len(80),
        Field::new("notes", K::Text),
    ],
    relations: &[
        Relation::many_to_many("users", "users", "user_symptom"),
        Relation::one_to_many("attachments", "attachment"),
    ],
};

pub const USER_SYMPTOMS: Descriptor = Descriptor {
    name: "User_Symptom",
    table: "user_symptom",
    fields: &[
        Field::id(),
        Field::new("user_id", K::ForeignKey("users")),
        Field::new("symptom_id", K::ForeignKey("symptom")),
        Field::new("start_date", K::DateTime),
        Field::new("end_date", K::DateTime),
        Field::new("notes", K::Text).nullable(),
    ],
    relations: &[
        Relation::many_to_one("user", "users"),
        Relation::many_to_one("symptom", "symptom"),
        Relation::many_to_many("treatments", "treatment", "user_symptom_treatment"),
        Relation::one_to_many("attachments", "attachment"),
    ],
};

pub const USER_SYMPTOM_TREATMENTS: Descriptor = Descriptor {
    name: "User_Symptom_Treatment",
    table: "user_symptom_treatment",
    fields: &[
        Field::id(),
        Field::new("user_symptom_id", K::ForeignKey("user_symptom")),
        Field::new("treatment_id", K::ForeignKey("treatment")),
        Field::new("appointment_id", K::ForeignKey("appointment")),
        Field::new("date", K::DateTime),
        Field::new("notes", K::Text).nullable(),
    ],
    relations: &[
        Relation::many_to_one("user_symptom", "user_symptom"),
        Relation::many_to_one("treatment", "treatment"),
        Relation::many_to_one("appointment", "appointment"),
        Relation::one_to_many("attachments", "attachment"),
    ],
};

pub const ATTACHMENTS: Descriptor = Descriptor {
    name: "Attachment",
    table: "attachment",
    fields: &[
        Field::id(),
        Field::new("path", K::Text).max_len(4096),
        Field::new("attachment_type", K::Text).nullable().max_len(255),
        Field::new("owner_kind", K::OwnerKind),
        Field::new("owner_id", K::Integer),
    ],
    relations: &[],
};

pub const PROVIDERS: Descriptor = Descriptor {
    name: "Provider",
    table: "provider",
    fields: &[
        Field::id(),
        Field::new("first_name", K::Text).max_len(80),
        Field::new("last_name", K::Text).max_len(80),
        Field::new("suffix", K::Text).nullable().max_len(8),
        Field::new("specialty", K::Text).nullable().max_len(80),
    ],
    relations: &[Relation::one_to_many("attachments", "attachment")],
};

pub const ALL: &[&Descriptor] = &[
    &USERS,
    &APPOINTMENTS,
    &TREATMENTS,
    &SYMPTOMS,
    &USER_SYMPTOMS,
    &USER_SYMPTOM_TREATMENTS,
    &ATTACHMENTS,
    &PROVIDERS,
];

macro_rules! resource {
    ($row:ident, $form:ident, $descriptor:ident) => {
        impl Resource for $row {
            const DESCRIPTOR: &'static Descriptor = &$descriptor;
            type Form = $form;

            fn id(&self) -> i32 {
                self.id
            }

            fn list(conn: &mut SqliteConnection, limit: i64, offset: i64) -> AppResult<Vec<Self>> {
                $row::page(conn, limit, offset)
            }

            fn count(conn: &mut SqliteConnection) -> AppResult<i64> {
                $row::count(conn)
            }

            fn find(conn: &mut SqliteConnection, id: i32) -> AppResult<Self> {
                $row::find(conn, id)
            }

            fn create(conn: &mut SqliteConnection, form: &$form, _: &Passwords) -> AppResult<Self> {
                form.insert(conn)
            }

            fn update(
                conn: &mut SqliteConnection,
                id: i32,
                form: &$form,
                _: &Passwords,
            ) -> AppResult<Self> {
                $row::update(conn, id, form)
            }

            fn delete(conn: &mut SqliteConnection, id: i32) -> AppResult<()> {
                $row::delete(conn, id)
            }
        }
    };
}

resource!(Appointment, NewAppointment, APPOINTMENTS);
resource!(Treatment, NewTreatment, TREATMENTS);
resource!(Symptom, NewSymptom, SYMPTOMS);
resource!(UserSymptom, NewUserSymptom, USER_SYMPTOMS);
resource!(UserSymptomTreatment, NewUserSymptomTreatment, USER_SYMPTOM_TREATMENTS);
resource!(Attachment, NewAttachment, ATTACHMENTS);
resource!(Provider, NewProvider, PROVIDERS);

// Users hash their password on create and may re-hash it on edit.
impl Resource for User {
    const DESCRIPTOR: &'static Descriptor = &USERS;
    type Form = UserForm;

    fn id(&self) -> i32 {
        self.id
    }

    fn list(conn: &mut SqliteConnection, limit: i64, offset: i64) -> AppResult<Vec<Self>> {
        User::page(conn, limit, offset)
    }

    fn count(conn: &mut SqliteConnection) -> AppResult<i64> {
        User::count(conn)
    }

    fn find(conn: &mut SqliteConnection, id: i32) -> AppResult<Self> {
        User::find(conn, id)
    }

    fn create(conn: &mut SqliteConnection, form: &UserForm, passwords: &Passwords) -> AppResult<Self> {
        form.create(conn, passwords)
    }

    fn update(
        conn: &mut SqliteConnection,
        id: i32,
        form: &UserForm,
        passwords: &Passwords,
    ) -> AppResult<Self> {
        form.apply(conn, id, passwords)
    }

    fn delete(conn: &mut SqliteConnection, id: i32) -> AppResult<()> {
        User::delete(conn, id)
    }
}
