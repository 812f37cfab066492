use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "target", rename_all = "snake_case")]
pub enum FieldKind {
    Integer,
    Text,
    Boolean,
    DateTime,
    ForeignKey(&'static str),
    OwnerKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    pub nullable: bool,
    pub unique: bool,
    pub max_len: Option<usize>,
    // Shown in listings, never accepted from a form.
    pub readonly: bool,
    // Accepted from a form, never shown.
    pub write_only: bool,
}

impl Field {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            nullable: false,
            unique: false,
            max_len: None,
            readonly: false,
            write_only: false,
        }
    }

    pub const fn id() -> Self {
        Self::new("id", FieldKind::Integer).readonly()
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub const fn max_len(mut self, len: usize) -> Self {
        self.max_len = Some(len);
        self
    }

    pub const fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    pub const fn write_only(mut self) -> Self {
        self.write_only = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelationKind {
    ManyToOne,
    OneToMany,
    ManyToMany { through: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Relation {
    pub name: &'static str,
    pub target: &'static str,
    #[serde(flatten)]
    pub kind: RelationKind,
}

impl Relation {
    pub const fn many_to_one(name: &'static str, target: &'static str) -> Self {
        Self {
            name,
            target,
            kind: RelationKind::ManyToOne,
        }
    }

    pub const fn one_to_many(name: &'static str, target: &'static str) -> Self {
        Self {
            name,
            target,
            kind: RelationKind::OneToMany,
        }
    }

    pub const fn many_to_many(
        name: &'static str,
        target: &'static str,
        through: &'static str,
    ) -> Self {
        Self {
            name,
            target,
            kind: RelationKind::ManyToMany { through },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Descriptor {
    pub name: &'static str,
    pub table: &'static str,
    pub fields: &'static [Field],
    pub relations: &'static [Relation],
}

impl Descriptor {
    pub fn field(&self, name: &str) -> Option<&'static Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn form_fields(&self) -> impl Iterator<Item = &'static Field> {
        self.fields.iter().filter(|f| !f.readonly)
    }

    pub fn list_fields(&self) -> impl Iterator<Item = &'static Field> {
        self.fields.iter().filter(|f| !f.write_only)
    }

    pub fn foreign_keys(&self) -> impl Iterator<Item = (&'static str, &'static str)> {
        self.fields.iter().filter_map(|f| match f.kind {
            FieldKind::ForeignKey(target) => Some((f.name, target)),
            _ => None,
        })
    }

    // A form may only carry keys that name a writable field.
    pub fn check_form<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> Result<(), String> {
        for key in keys {
            if self.form_fields().any(|f| f.name == key) {
                continue;
            }
            return Err(match self.field(key) {
                Some(_) => format!("{} is read-only", key),
                None => format!("{} has no field {}", self.name, key),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct Schema {
    #[serde(flatten)]
    pub descriptor: &'static Descriptor,
    pub form: Vec<&'static str>,
    pub columns: Vec<&'static str>,
    pub foreign_keys: Vec<(&'static str, &'static str)>,
}

impl From<&'static Descriptor> for Schema {
    fn from(descriptor: &'static Descriptor) -> Self {
        Self {
            descriptor,
            form: descriptor.form_fields().map(|f| f.name).collect(),
            columns: descriptor.list_fields().map(|f| f.name).collect(),
            foreign_keys: descriptor.foreign_keys().collect(),
        }
    }
}
