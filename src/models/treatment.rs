use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use serde::{Deserialize, Serialize};

use crate::models::attachment::{self, Owner, OwnerKind};
use crate::schema::{attachment as attachments, treatment, user_symptom, user_symptom_treatment};

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = treatment)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Treatment {
    pub id: i32,
    pub name: String,
    pub notes: String,
}

#[derive(Debug, Clone, Deserialize, Insertable, AsChangeset)]
#[diesel(table_name = treatment)]
pub struct NewTreatment {
    pub name: String,
    pub notes: String,
}

crud!(Treatment, NewTreatment, treatment);

impl Treatment {
    pub fn links(&self) -> user_symptom_treatment::BoxedQuery<'static, Sqlite> {
        user_symptom_treatment::table
            .filter(user_symptom_treatment::treatment_id.eq(self.id))
            .into_boxed()
    }

    pub fn user_symptoms(&self) -> user_symptom::BoxedQuery<'static, Sqlite> {
        user_symptom::table
            .filter(
                user_symptom::id.eq_any(
                    user_symptom_treatment::table
                        .filter(user_symptom_treatment::treatment_id.eq(self.id))
                        .select(user_symptom_treatment::user_symptom_id),
                ),
            )
            .into_boxed()
    }

    pub fn attachments(&self) -> attachments::BoxedQuery<'static, Sqlite> {
        attachment::owned_by(Owner::new(OwnerKind::Treatment, self.id))
    }
}
