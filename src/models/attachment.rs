use diesel::backend::Backend;
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::dsl::exists;
use diesel::expression::AsExpression;
use diesel::prelude::*;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::sqlite::Sqlite;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AppError, AppResult, Constraint};
use crate::schema::{
    appointment, attachment, provider, symptom, treatment, user_symptom, user_symptom_treatment,
    users,
};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[serde(rename_all = "snake_case")]
#[diesel(sql_type = Text)]
pub enum OwnerKind {
    User,
    Symptom,
    UserSymptom,
    UserSymptomTreatment,
    Treatment,
    Appointment,
    Provider,
}

impl OwnerKind {
    pub const ALL: [OwnerKind; 7] = [
        Self::User,
        Self::Symptom,
        Self::UserSymptom,
        Self::UserSymptomTreatment,
        Self::Treatment,
        Self::Appointment,
        Self::Provider,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Symptom => "symptom",
            Self::UserSymptom => "user_symptom",
            Self::UserSymptomTreatment => "user_symptom_treatment",
            Self::Treatment => "treatment",
            Self::Appointment => "appointment",
            Self::Provider => "provider",
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            Self::User => "users",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown attachment owner kind: {0}")]
pub struct UnknownOwnerKind(String);

impl FromStr for OwnerKind {
    type Err = UnknownOwnerKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownOwnerKind(s.to_string()))
    }
}

impl ToSql<Text, Sqlite> for OwnerKind {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(self.as_str());
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Sqlite> for OwnerKind {
    fn from_sql(bytes: <Sqlite as Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let text = <String as FromSql<Text, Sqlite>>::from_sql(bytes)?;
        Ok(text.parse()?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub kind: OwnerKind,
    pub id: i32,
}

impl Owner {
    pub fn new(kind: OwnerKind, id: i32) -> Self {
        Self { kind, id }
    }

    pub fn exists(&self, conn: &mut SqliteConnection) -> AppResult<bool> {
        let id = self.id;
        let found: bool = match self.kind {
            OwnerKind::User => diesel::select(exists(users::table.find(id))).get_result(conn)?,
            OwnerKind::Symptom => diesel::select(exists(symptom::table.find(id))).get_result(conn)?,
            OwnerKind::UserSymptom => {
                diesel::select(exists(user_symptom::table.find(id))).get_result(conn)?
            }
            OwnerKind::UserSymptomTreatment => {
                diesel::select(exists(user_symptom_treatment::table.find(id))).get_result(conn)?
            }
            OwnerKind::Treatment => {
                diesel::select(exists(treatment::table.find(id))).get_result(conn)?
            }
            OwnerKind::Appointment => {
                diesel::select(exists(appointment::table.find(id))).get_result(conn)?
            }
            OwnerKind::Provider => diesel::select(exists(provider::table.find(id))).get_result(conn)?,
        };
        Ok(found)
    }

    fn ensure_exists(&self, conn: &mut SqliteConnection) -> AppResult<()> {
        match self.exists(conn)? {
            true => Ok(()),
            false => Err(AppError::Integrity {
                constraint: Constraint::ForeignKey,
                message: format!("no {} row with id {}", self.kind.table(), self.id),
            }),
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

// Attachments of one owner, as a refinable query.
pub fn owned_by(owner: Owner) -> attachment::BoxedQuery<'static, Sqlite> {
    attachment::table
        .filter(attachment::owner_kind.eq(owner.kind))
        .filter(attachment::owner_id.eq(owner.id))
        .into_boxed()
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = attachment)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Attachment {
    pub id: i32,
    pub path: String,
    pub attachment_type: Option<String>,
    pub owner_kind: OwnerKind,
    pub owner_id: i32,
}

crud!(Attachment, attachment);

impl Attachment {
    pub fn owner(&self) -> Owner {
        Owner::new(self.owner_kind, self.owner_id)
    }

    pub fn update(conn: &mut SqliteConnection, id: i32, form: &NewAttachment) -> AppResult<Self> {
        conn.transaction(|conn| {
            form.owner().ensure_exists(conn)?;
            diesel::update(attachment::table.find(id))
                .set(form)
                .returning(Attachment::as_returning())
                .get_result(conn)
                .map_err(|e| crate::models::missing(e, "attachment", id))
        })
    }
}

#[derive(Debug, Clone, Deserialize, Insertable, AsChangeset)]
#[diesel(table_name = attachment, treat_none_as_null = true)]
pub struct NewAttachment {
    pub path: String,
    pub attachment_type: Option<String>,
    pub owner_kind: OwnerKind,
    pub owner_id: i32,
}

impl NewAttachment {
    pub fn new(path: impl Into<String>, attachment_type: Option<String>, owner: Owner) -> Self {
        Self {
            path: path.into(),
            attachment_type,
            owner_kind: owner.kind,
            owner_id: owner.id,
        }
    }

    pub fn owner(&self) -> Owner {
        Owner::new(self.owner_kind, self.owner_id)
    }

    pub fn insert(&self, conn: &mut SqliteConnection) -> AppResult<Attachment> {
        conn.transaction(|conn| {
            self.owner().ensure_exists(conn)?;
            Ok(diesel::insert_into(attachment::table)
                .values(self)
                .returning(Attachment::as_returning())
                .get_result(conn)?)
        })
    }
}
