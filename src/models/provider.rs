use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use serde::{Deserialize, Serialize};

use crate::models::attachment::{self, Owner, OwnerKind};
use crate::schema::{attachment as attachments, provider};

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = provider)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Provider {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub suffix: Option<String>,
    pub specialty: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Insertable, AsChangeset)]
#[diesel(table_name = provider, treat_none_as_null = true)]
pub struct NewProvider {
    pub first_name: String,
    pub last_name: String,
    pub suffix: Option<String>,
    pub specialty: Option<String>,
}

crud!(Provider, NewProvider, provider);

impl Provider {
    pub fn attachments(&self) -> attachments::BoxedQuery<'static, Sqlite> {
        attachment::owned_by(Owner::new(OwnerKind::Provider, self.id))
    }
}
