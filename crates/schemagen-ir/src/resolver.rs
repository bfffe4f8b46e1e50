//! Relationship resolution
//!
//! Pairs every relation field with its counterpart on the target type and
//! produces the document-wide, name-keyed [`RelationSet`].

use std::collections::HashMap;
use tracing::{debug, trace};

use crate::document::Document;
use crate::error::IrError;
use crate::relation::{Relation, RelationSide, Side};
use crate::types::{Field, ObjectType};

/// Resolved relations in canonical traversal order.
#[derive(Debug, Clone, Default)]
pub struct RelationSet {
    relations: Vec<Relation>,
    by_name: HashMap<String, usize>,
}

impl RelationSet {
    /// Resolve every relation in `document`.
    pub fn resolve(document: &Document) -> Result<Self, IrError> {
        check_relation_names(document)?;

        let mut set = RelationSet::default();
        for object_type in document.object_types() {
            for field in object_type.relation_fields() {
                let target = document.object_type(field.type_name()).ok_or_else(|| {
                    IrError::UnknownType {
                        object_type: object_type.name().to_string(),
                        field: field.name().to_string(),
                        type_name: field.type_name().to_string(),
                    }
                })?;

                let counterpart = matching_field(object_type, field, target)?;
                let relation = Relation::new(
                    RelationSide::of(object_type, field),
                    RelationSide::of(target, counterpart),
                    field.relation_name(),
                );
                set.insert(relation)?;
            }
        }

        for relation in &set.relations {
            for side in [Side::A, Side::B] {
                let name = &relation.side(side).object_type;
                let has_key = document
                    .object_type(name)
                    .and_then(ObjectType::primary_key)
                    .is_some();
                if !has_key {
                    return Err(IrError::MissingPrimaryKey {
                        object_type: name.clone(),
                    });
                }
            }
        }
        set.check_foreign_key_columns(document)?;

        debug!(relations = set.relations.len(), "Resolved relations");
        Ok(set)
    }

    fn insert(&mut self, relation: Relation) -> Result<(), IrError> {
        if let Some(&index) = self.by_name.get(relation.name()) {
            let existing = &self.relations[index];
            if existing.same_pair(&relation) {
                return Ok(());
            }
            return Err(IrError::RelationNameCollision {
                name: relation.name().to_string(),
                first: format!("{} <-> {}", existing.side(Side::A), existing.side(Side::B)),
                second: format!("{} <-> {}", relation.side(Side::A), relation.side(Side::B)),
            });
        }

        for side in [Side::A, Side::B] {
            let end = relation.side(side);
            if let Some((existing, _)) = self.for_field(&end.object_type, &end.field) {
                return Err(IrError::FieldAlreadyPaired {
                    object_type: end.object_type.clone(),
                    field: end.field.clone(),
                    first: existing.name().to_string(),
                    second: relation.name().to_string(),
                });
            }
        }

        trace!(
            name = relation.name(),
            a = %relation.side(Side::A),
            b = %relation.side(Side::B),
            cardinality = ?relation.cardinality(),
            "Resolved relation"
        );
        self.by_name
            .insert(relation.name().to_string(), self.relations.len());
        self.relations.push(relation);
        Ok(())
    }

    /// Reference columns must not reuse a scalar or enum column name, nor each other.
    fn check_foreign_key_columns(&self, document: &Document) -> Result<(), IrError> {
        for object_type in document.object_types() {
            let mut columns: HashMap<String, String> = object_type
                .fields()
                .iter()
                .filter(|f| !f.is_relation())
                .map(|f| (f.name().to_string(), format!("field {}", f.name())))
                .collect();

            for field in object_type.relation_fields() {
                let Some((relation, side)) = self.for_field(object_type.name(), field.name()) else {
                    continue;
                };
                if !relation.owns_foreign_key(side) {
                    continue;
                }
                let column = relation.foreign_key_column(side);
                let owner = format!("the reference column of {}", field.name());
                if let Some(existing) = columns.insert(column.clone(), owner) {
                    return Err(IrError::ForeignKeyColumnCollision {
                        object_type: object_type.name().to_string(),
                        field: field.name().to_string(),
                        column,
                        existing,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relation> {
        self.relations.iter()
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Relation> {
        self.by_name.get(name).map(|&index| &self.relations[index])
    }

    /// Relations with at least one side on `object_type`.
    pub fn for_object_type<'a>(&'a self, object_type: &'a str) -> impl Iterator<Item = &'a Relation> {
        self.relations.iter().filter(move |r| r.involves(object_type))
    }

    /// The relation `object_type.field` belongs to, with the field's side.
    pub fn for_field(&self, object_type: &str, field: &str) -> Option<(&Relation, Side)> {
        self.relations
            .iter()
            .find_map(|r| r.side_of(object_type, field).map(|side| (r, side)))
    }
}

impl<'a> IntoIterator for &'a RelationSet {
    type Item = &'a Relation;
    type IntoIter = std::slice::Iter<'a, Relation>;

    fn into_iter(self) -> Self::IntoIter {
        self.relations.iter()
    }
}

/// Every relation-name hint must be shared by exactly two fields.
fn check_relation_names(document: &Document) -> Result<(), IrError> {
    let mut uses: HashMap<&str, usize> = HashMap::new();
    let mut order = Vec::new();
    for field in document
        .object_types()
        .iter()
        .flat_map(|t| t.relation_fields())
    {
        if let Some(name) = field.relation_name() {
            let count = uses.entry(name).or_insert(0);
            if *count == 0 {
                order.push(name);
            }
            *count += 1;
        }
    }

    for name in order {
        let count = uses[name];
        if count != 2 {
            return Err(IrError::DuplicateOrAmbiguousRelationName {
                name: name.to_string(),
                uses: count,
            });
        }
    }
    Ok(())
}

/// The single field on `target` that pairs with `source.field`.
fn matching_field<'a>(
    source: &ObjectType,
    field: &Field,
    target: &'a ObjectType,
) -> Result<&'a Field, IrError> {
    let candidates: Vec<&Field> = target
        .relation_fields()
        .filter(|f| f.type_name() == source.name())
        .filter(|f| !(target.name() == source.name() && f.name() == field.name()))
        .filter(|f| match field.relation_name() {
            Some(hint) => f.relation_name() == Some(hint),
            None => true,
        })
        .collect();

    match candidates.as_slice() {
        [counterpart] => Ok(*counterpart),
        [] => Err(IrError::MissingRelationField {
            source_type: source.name().to_string(),
            target_type: target.name().to_string(),
            field: field.name().to_string(),
        }),
        _ => Err(IrError::AmbiguousRelation {
            source_type: source.name().to_string(),
            target_type: target.name().to_string(),
            field: field.name().to_string(),
            candidates: candidates.iter().map(|f| f.name().to_string()).collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relation::{Cardinality, RelationKind};
    use crate::types::{FieldKind, ScalarType};

    fn id() -> Field {
        Field::scalar("id", ScalarType::ID).required(true)
    }

    fn rel(name: &str, target: &str, list: bool) -> Field {
        Field::new(name, target, FieldKind::Relation).list(list)
    }

    fn doc(object_types: Vec<ObjectType>) -> Document {
        Document::new(object_types, vec![]).unwrap()
    }

    #[test]
    fn test_author_books_one_to_many() {
        let document = doc(vec![
            ObjectType::new("Author", vec![id(), rel("books", "Book", true)]),
            ObjectType::new("Book", vec![id(), rel("author", "Author", false)]),
        ]);
        let relations = RelationSet::resolve(&document).unwrap();

        assert_eq!(relations.len(), 1);
        let relation = relations.get("BookAuthor").unwrap();
        assert_eq!(relation.cardinality(), Cardinality::OneToMany { owner: Side::B });
        assert_eq!(relation.side(Side::A).object_type, "Author");

        let (found, side) = relations.for_field("Book", "author").unwrap();
        assert_eq!(found.name(), "BookAuthor");
        assert_eq!(found.kind_for(side), RelationKind::ManyToOne);
        assert_eq!(relations.for_object_type("Author").count(), 1);
    }

    #[test]
    fn test_declaration_order_decides_sides_not_names() {
        let forward = doc(vec![
            ObjectType::new("Author", vec![id(), rel("books", "Book", true)]),
            ObjectType::new("Book", vec![id(), rel("author", "Author", false)]),
        ]);
        let backward = doc(vec![
            ObjectType::new("Book", vec![id(), rel("author", "Author", false)]),
            ObjectType::new("Author", vec![id(), rel("books", "Book", true)]),
        ]);

        let forward = RelationSet::resolve(&forward).unwrap();
        let backward = RelationSet::resolve(&backward).unwrap();
        let f = forward.get("BookAuthor").unwrap();
        let b = backward.get("BookAuthor").unwrap();

        assert!(f.same_pair(b));
        assert_eq!(f.kind_for(Side::A), RelationKind::OneToMany);
        assert_eq!(b.kind_for(Side::A), RelationKind::ManyToOne);
    }

    #[test]
    fn test_many_to_many_single_relation() {
        let document = doc(vec![
            ObjectType::new("User", vec![id(), rel("roles", "Role", true)]),
            ObjectType::new("Role", vec![id(), rel("users", "User", true)]),
        ]);
        let relations = RelationSet::resolve(&document).unwrap();
        let names: Vec<_> = relations.iter().map(Relation::name).collect();
        assert_eq!(names, vec!["RoleUser"]);
    }

    #[test]
    fn test_self_reference_without_hint() {
        let document = doc(vec![ObjectType::new(
            "User",
            vec![id(), rel("mentor", "User", false), rel("mentee", "User", false)],
        )]);
        let relations = RelationSet::resolve(&document).unwrap();
        assert_eq!(relations.len(), 1);
        let relation = relations.iter().next().unwrap();
        assert_eq!(relation.side(Side::A).field, "mentor");
        assert!(relation.is_self_referencing());
    }

    #[test]
    fn test_self_reference_needs_hints_when_ambiguous() {
        let document = doc(vec![ObjectType::new(
            "User",
            vec![
                id(),
                rel("mentor", "User", false),
                rel("mentee", "User", false),
                rel("friends", "User", true),
            ],
        )]);
        let err = RelationSet::resolve(&document).unwrap_err();
        match err {
            IrError::AmbiguousRelation { field, candidates, .. } => {
                assert_eq!(field, "mentor");
                assert_eq!(candidates, vec!["mentee", "friends"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_hints_disambiguate() {
        let document = doc(vec![
            ObjectType::new(
                "User",
                vec![
                    id(),
                    rel("written", "Post", true).with_relation_name("Authorship"),
                    rel("reviewed", "Post", true).with_relation_name("Review"),
                ],
            ),
            ObjectType::new(
                "Post",
                vec![
                    id(),
                    rel("author", "User", false).with_relation_name("Authorship"),
                    rel("reviewer", "User", false).with_relation_name("Review"),
                ],
            ),
        ]);
        let relations = RelationSet::resolve(&document).unwrap();
        let names: Vec<_> = relations.iter().map(Relation::name).collect();
        assert_eq!(names, vec!["Authorship", "Review"]);
        assert_eq!(
            relations.for_field("Post", "reviewer").map(|(r, _)| r.name()),
            Some("Review")
        );
    }

    #[test]
    fn test_hint_used_once_or_thrice_fails() {
        let once = doc(vec![
            ObjectType::new("User", vec![id(), rel("posts", "Post", true).with_relation_name("Writes")]),
            ObjectType::new("Post", vec![id(), rel("author", "User", false)]),
        ]);
        assert_eq!(
            RelationSet::resolve(&once).unwrap_err(),
            IrError::DuplicateOrAmbiguousRelationName {
                name: "Writes".into(),
                uses: 1
            }
        );

        let thrice = doc(vec![
            ObjectType::new(
                "User",
                vec![
                    id(),
                    rel("posts", "Post", true).with_relation_name("Writes"),
                    rel("drafts", "Post", true).with_relation_name("Writes"),
                ],
            ),
            ObjectType::new("Post", vec![id(), rel("author", "User", false).with_relation_name("Writes")]),
        ]);
        assert!(matches!(
            RelationSet::resolve(&thrice).unwrap_err(),
            IrError::DuplicateOrAmbiguousRelationName { uses: 3, .. }
        ));
    }

    #[test]
    fn test_unhinted_field_sees_hinted_candidates() {
        let document = doc(vec![ObjectType::new(
            "User",
            vec![
                id(),
                rel("a", "User", false).with_relation_name("R"),
                rel("b", "User", false).with_relation_name("R"),
                rel("mentor", "User", false),
                rel("mentee", "User", false),
            ],
        )]);
        match RelationSet::resolve(&document).unwrap_err() {
            IrError::AmbiguousRelation { field, candidates, .. } => {
                assert_eq!(field, "mentor");
                assert_eq!(candidates, vec!["a", "b", "mentee"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_field_cannot_join_two_relations() {
        let document = doc(vec![
            ObjectType::new(
                "User",
                vec![
                    id(),
                    rel("posts", "Post", true),
                    rel("drafts", "Post", true).with_relation_name("Drafts"),
                ],
            ),
            ObjectType::new(
                "Post",
                vec![id(), rel("author", "User", false).with_relation_name("Drafts")],
            ),
        ]);
        assert_eq!(
            RelationSet::resolve(&document).unwrap_err(),
            IrError::FieldAlreadyPaired {
                object_type: "Post".into(),
                field: "author".into(),
                first: "PostAuthor".into(),
                second: "Drafts".into(),
            }
        );
    }

    #[test]
    fn test_reference_column_clashes_with_scalar() {
        let document = doc(vec![
            ObjectType::new("Author", vec![id(), rel("books", "Book", true)]),
            ObjectType::new(
                "Book",
                vec![
                    id(),
                    Field::scalar("author_id", ScalarType::Int),
                    rel("author", "Author", false),
                ],
            ),
        ]);
        assert_eq!(
            RelationSet::resolve(&document).unwrap_err(),
            IrError::ForeignKeyColumnCollision {
                object_type: "Book".into(),
                field: "author".into(),
                column: "author_id".into(),
                existing: "field author_id".into(),
            }
        );
    }

    #[test]
    fn test_reference_columns_clash_with_each_other() {
        let document = doc(vec![
            ObjectType::new(
                "Account",
                vec![
                    id(),
                    rel("starred", "Repo", true).with_relation_name("Stars"),
                    rel("watched", "Repo", true).with_relation_name("Watches"),
                ],
            ),
            ObjectType::new(
                "Repo",
                vec![
                    id(),
                    rel("starredBy", "Account", false).with_relation_name("Stars"),
                    rel("starred_by", "Account", false).with_relation_name("Watches"),
                ],
            ),
        ]);
        assert_eq!(
            RelationSet::resolve(&document).unwrap_err(),
            IrError::ForeignKeyColumnCollision {
                object_type: "Repo".into(),
                field: "starred_by".into(),
                column: "starred_by_id".into(),
                existing: "the reference column of starredBy".into(),
            }
        );
    }

    #[test]
    fn test_missing_counterpart() {
        let document = doc(vec![
            ObjectType::new("Author", vec![id(), rel("books", "Book", true)]),
            ObjectType::new("Book", vec![id()]),
        ]);
        assert_eq!(
            RelationSet::resolve(&document).unwrap_err(),
            IrError::MissingRelationField {
                source_type: "Author".into(),
                target_type: "Book".into(),
                field: "books".into(),
            }
        );
    }

    #[test]
    fn test_missing_primary_key() {
        let document = doc(vec![
            ObjectType::new("Author", vec![id(), rel("books", "Book", true)]),
            ObjectType::new(
                "Book",
                vec![Field::scalar("isbn", ScalarType::String), rel("author", "Author", false)],
            ),
        ]);
        assert_eq!(
            RelationSet::resolve(&document).unwrap_err(),
            IrError::MissingPrimaryKey {
                object_type: "Book".into()
            }
        );
    }

    #[test]
    fn test_computed_name_collision() {
        // Both pairs compute the one-to-one name "ProfileUser".
        let document = doc(vec![
            ObjectType::new("User", vec![id(), rel("profile", "Profile", false)]),
            ObjectType::new("Profile", vec![id(), rel("user", "User", false)]),
            ObjectType::new("Admin", vec![id(), rel("profile", "Badge", false)]),
            ObjectType::new("Badge", vec![id(), rel("user", "Admin", false)]),
        ]);
        assert!(matches!(
            RelationSet::resolve(&document).unwrap_err(),
            IrError::RelationNameCollision { ref name, .. } if name == "ProfileUser"
        ));
    }
}
