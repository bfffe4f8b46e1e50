//! Relations between object types
//!
//! A relation is a matched pair of relation fields. Side A is the field
//! discovered first when walking object types and fields in declaration
//! order; side B is its counterpart.

use heck::ToSnakeCase;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::naming::{capitalize, foreign_key_column};
use crate::types::{Field, ObjectType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

/// One end of a relation: the field and the object type declaring it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationSide {
    pub object_type: String,
    pub field: String,
    pub list: bool,
    pub required: bool,
}

impl RelationSide {
    pub fn of(object_type: &ObjectType, field: &Field) -> Self {
        Self {
            object_type: object_type.name().to_string(),
            field: field.name().to_string(),
            list: field.is_list(),
            required: field.is_required(),
        }
    }
}

impl fmt::Display for RelationSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.object_type, self.field)
    }
}

/// Relation cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Cardinality {
    OneToOne,
    /// `owner` is the single-valued side; its table holds the reference column.
    OneToMany { owner: Side },
    ManyToMany,
}

/// Cardinality as seen from one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationKind {
    OneToOne,
    ManyToOne,
    OneToMany,
    ManyToMany,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    name: String,
    explicit_name: bool,
    a: RelationSide,
    b: RelationSide,
    cardinality: Cardinality,
}

impl Relation {
    /// Classify and name the pair `a` / `b`. An explicit `hint` wins over the
    /// computed name.
    pub fn new(a: RelationSide, b: RelationSide, hint: Option<&str>) -> Self {
        let cardinality = match (a.list, b.list) {
            (false, false) => Cardinality::OneToOne,
            (false, true) => Cardinality::OneToMany { owner: Side::A },
            (true, false) => Cardinality::OneToMany { owner: Side::B },
            (true, true) => Cardinality::ManyToMany,
        };

        let (name, explicit_name) = match hint {
            Some(hint) => (hint.to_string(), true),
            None => (computed_name(&a, &b, cardinality), false),
        };

        Self {
            name,
            explicit_name,
            a,
            b,
            cardinality,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_explicit_name(&self) -> bool {
        self.explicit_name
    }

    pub fn side(&self, side: Side) -> &RelationSide {
        match side {
            Side::A => &self.a,
            Side::B => &self.b,
        }
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn is_self_referencing(&self) -> bool {
        self.a.object_type == self.b.object_type
    }

    /// Which side `object_type.field` is on, if any.
    pub fn side_of(&self, object_type: &str, field: &str) -> Option<Side> {
        if self.a.object_type == object_type && self.a.field == field {
            Some(Side::A)
        } else if self.b.object_type == object_type && self.b.field == field {
            Some(Side::B)
        } else {
            None
        }
    }

    pub fn involves(&self, object_type: &str) -> bool {
        self.a.object_type == object_type || self.b.object_type == object_type
    }

    /// Whether both relations pair the same two fields, in either order.
    pub fn same_pair(&self, other: &Relation) -> bool {
        (self.a == other.a && self.b == other.b) || (self.a == other.b && self.b == other.a)
    }

    pub fn kind_for(&self, side: Side) -> RelationKind {
        match self.cardinality {
            Cardinality::OneToOne => RelationKind::OneToOne,
            Cardinality::OneToMany { owner } if owner == side => RelationKind::ManyToOne,
            Cardinality::OneToMany { .. } => RelationKind::OneToMany,
            Cardinality::ManyToMany => RelationKind::ManyToMany,
        }
    }

    /// Whether `side`'s table carries a reference column for its field.
    ///
    /// Both sides of a one-to-one own a column, except side B of a
    /// self-referencing one-to-one, which is answered by side A's column.
    pub fn owns_foreign_key(&self, side: Side) -> bool {
        match self.cardinality {
            Cardinality::OneToOne => side == Side::A || !self.is_self_referencing(),
            Cardinality::OneToMany { owner } => owner == side,
            Cardinality::ManyToMany => false,
        }
    }

    /// Reference column on `side`'s table.
    pub fn foreign_key_column(&self, side: Side) -> String {
        foreign_key_column(&self.side(side).field)
    }

    /// Junction table name for a many-to-many relation.
    pub fn junction_table(&self) -> &str {
        &self.name
    }

    /// Junction column holding rows of `side`'s object type.
    pub fn junction_column(&self, side: Side) -> String {
        if self.is_self_referencing() {
            foreign_key_column(&self.side(side).field)
        } else {
            format!("{}_id", self.side(side).object_type.to_snake_case())
        }
    }
}

fn computed_name(a: &RelationSide, b: &RelationSide, cardinality: Cardinality) -> String {
    match cardinality {
        Cardinality::OneToOne => sorted_concat(capitalize(&a.field), capitalize(&b.field)),
        Cardinality::OneToMany { owner } => {
            let owner = if owner == Side::A { a } else { b };
            format!("{}{}", capitalize(&owner.object_type), capitalize(&owner.field))
        }
        Cardinality::ManyToMany => {
            sorted_concat(capitalize(&a.object_type), capitalize(&b.object_type))
        }
    }
}

fn sorted_concat(x: String, y: String) -> String {
    if x <= y {
        x + &y
    } else {
        y + &x
    }
}
