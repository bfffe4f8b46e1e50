mod common;

use common::{Call, MemoryExecutor};
use schemagen_graphql::{generate_sdl, Direction, Filter, Operator, OrderBy, SchemaGenerator};
use schemagen_ir::{Document, RelationSet};
use serde_json::json;
use std::sync::Arc;

const LIBRARY: &str = r#"
    type Author { id: ID! name: String! books: [Book] }
    type Book { id: ID! title: String! author: Author }
"#;

const MEMBERSHIP: &str = r#"
    enum Level { FREE PRO }
    type User @options(constraints: { unique: [{ fields: ["email"] }, { fields: ["handle", "org"] }] }) {
        id: ID!
        name: String
        email: String!
        handle: String!
        org: String!
        age: Int
        level: Level
        active: Boolean
        joinedOn: DateTime
        roles: [Role!]!
    }
    type Role { id: ID! name: String! users: [User!]! }
"#;

fn lower(source: &str) -> (Document, RelationSet) {
    let document = schemagen_ast::parse(source).unwrap().to_ir().unwrap();
    let relations = RelationSet::resolve(&document).unwrap();
    (document, relations)
}

fn library_executor() -> Arc<MemoryExecutor> {
    Arc::new(
        MemoryExecutor::default()
            .with_table("authors", json!([{ "id": 1, "name": "Ann" }, { "id": 2, "name": "Bo" }]))
            .with_table(
                "books",
                json!([
                    { "id": 10, "title": "Tides", "author_id": 1 },
                    { "id": 11, "title": "Unsigned", "author_id": null },
                    { "id": 12, "title": "Vale", "author_id": 1 }
                ]),
            ),
    )
}

async fn run(
    source: &str,
    executor: Arc<MemoryExecutor>,
    query: &str,
) -> serde_json::Value {
    let (document, relations) = lower(source);
    let schema = SchemaGenerator::new(&document, &relations, executor).generate().unwrap();
    let response = schema.execute(query).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    response.data.into_json().unwrap()
}

#[tokio::test]
async fn test_book_author_follows_the_foreign_key() {
    let executor = library_executor();
    let data = run(LIBRARY, executor.clone(), "{ books { id title author { name } } }").await;

    assert_eq!(
        data,
        json!({ "books": [
            { "id": "10", "title": "Tides", "author": { "name": "Ann" } },
            { "id": "11", "title": "Unsigned", "author": null },
            { "id": "12", "title": "Vale", "author": { "name": "Ann" } }
        ]})
    );

    let calls = executor.calls();
    assert_eq!(
        calls[0],
        Call::FindMany {
            table: "books".into(),
            filter: None,
            order: vec![],
        }
    );
    let lookups: Vec<_> = calls[1..].to_vec();
    assert_eq!(lookups.len(), 2);
    assert!(lookups.iter().all(|c| *c
        == Call::FindById {
            table: "authors".into(),
            id: json!(1),
        }));
}

#[tokio::test]
async fn test_author_books_filters_by_the_reference_column() {
    let executor = library_executor();
    let data = run(
        LIBRARY,
        executor.clone(),
        r#"{ author(where: { id: "1" }) { name books { title } } }"#,
    )
    .await;

    assert_eq!(
        data,
        json!({ "author": { "name": "Ann", "books": [{ "title": "Tides" }, { "title": "Vale" }] } })
    );
    assert_eq!(
        executor.calls(),
        vec![
            Call::FindFirst {
                table: "authors".into(),
                filter: Filter::eq("id", json!("1")),
            },
            Call::FindMany {
                table: "books".into(),
                filter: Some(Filter::eq("author_id", json!(1))),
                order: vec![],
            },
        ]
    );
}

#[tokio::test]
async fn test_named_relation_resolves_like_the_computed_one() {
    let hinted = r#"
        type Author { id: ID! name: String! books: [Book] @relation(name: "Writes") }
        type Book { id: ID! title: String! author: Author @relation(name: "Writes") }
    "#;
    let (_, relations) = lower(hinted);
    assert!(relations.get("Writes").is_some());

    let executor = library_executor();
    let data = run(
        hinted,
        executor.clone(),
        r#"{ author(where: { id: "1" }) { books { title author { name } } } }"#,
    )
    .await;

    assert_eq!(
        data,
        json!({ "author": { "books": [
            { "title": "Tides", "author": { "name": "Ann" } },
            { "title": "Vale", "author": { "name": "Ann" } }
        ]}})
    );
    assert_eq!(
        executor.calls()[1],
        Call::FindMany {
            table: "books".into(),
            filter: Some(Filter::eq("author_id", json!(1))),
            order: vec![],
        }
    );
}

#[tokio::test]
async fn test_parent_row_without_key_is_an_error() {
    let executor = Arc::new(
        MemoryExecutor::default()
            .with_table("authors", json!([{ "name": "Ann" }]))
            .with_table("books", json!([])),
    );
    let (document, relations) = lower(LIBRARY);
    let schema = SchemaGenerator::new(&document, &relations, executor).generate().unwrap();

    let response = schema.execute("{ authors { name books { title } } }").await;
    assert!(
        response
            .errors
            .iter()
            .any(|e| e.message.contains("parent row has no id column")),
        "{:?}",
        response.errors
    );
}

#[tokio::test]
async fn test_datetime_arguments_are_validated() {
    let (document, relations) = lower(MEMBERSHIP);
    let executor = Arc::new(MemoryExecutor::default().with_table("users", json!([])));
    let schema = SchemaGenerator::new(&document, &relations, executor.clone())
        .generate()
        .unwrap();

    let rejected = schema
        .execute(r#"{ users(where: { joinedOn_gt: "yesterday" }) { id } }"#)
        .await;
    assert!(!rejected.errors.is_empty());
    assert!(executor.calls().is_empty());

    let accepted = schema
        .execute(r#"{ users(where: { joinedOn_gt: "2024-05-01" }) { id } }"#)
        .await;
    assert!(accepted.errors.is_empty(), "{:?}", accepted.errors);
}

#[tokio::test]
async fn test_plural_query_translates_where_and_order() {
    let executor = library_executor();
    let data = run(
        LIBRARY,
        executor.clone(),
        r#"{ books(where: { _or: [{ title_starts_with: "T" }, { id_gt: "11" }] }, orderBy: [title_DESC]) { title } }"#,
    )
    .await;

    assert_eq!(data, json!({ "books": [{ "title": "Vale" }, { "title": "Tides" }] }));
    assert_eq!(
        executor.calls(),
        vec![Call::FindMany {
            table: "books".into(),
            filter: Some(Filter::Or(vec![
                Filter::Condition {
                    column: "title".into(),
                    operator: Operator::StartsWith,
                    value: json!("T"),
                },
                Filter::Condition {
                    column: "id".into(),
                    operator: Operator::Gt,
                    value: json!("11"),
                },
            ])),
            order: vec![OrderBy {
                column: "title".into(),
                direction: Direction::Desc,
            }],
        }]
    );
}

#[tokio::test]
async fn test_many_to_many_goes_through_the_junction_table() {
    let executor = Arc::new(
        MemoryExecutor::default()
            .with_table(
                "users",
                json!([{ "id": 1, "email": "a@x.io", "handle": "a", "org": "x", "level": "PRO" }]),
            )
            .with_table("roles", json!([{ "id": 5, "name": "admin" }, { "id": 6, "name": "editor" }]))
            .with_table("RoleUser", json!([{ "user_id": 1, "role_id": 6 }])),
    );
    let data = run(
        MEMBERSHIP,
        executor.clone(),
        r#"{ user(where: { email: "a@x.io" }) { level roles { name } } }"#,
    )
    .await;

    assert_eq!(data, json!({ "user": { "level": "PRO", "roles": [{ "name": "editor" }] } }));
    assert_eq!(
        executor.calls()[1..],
        [
            Call::FindMany {
                table: "RoleUser".into(),
                filter: Some(Filter::eq("user_id", json!(1))),
                order: vec![],
            },
            Call::FindMany {
                table: "roles".into(),
                filter: Some(Filter::is_in("id", vec![json!(6)])),
                order: vec![],
            },
        ]
    );
}

#[tokio::test]
async fn test_compound_unique_lookup() {
    let executor = Arc::new(MemoryExecutor::default().with_table(
        "users",
        json!([{ "id": 1, "email": "a@x.io", "handle": "a", "org": "x" }]),
    ));
    let data = run(
        MEMBERSHIP,
        executor.clone(),
        r#"{ user(where: { handle_org: { handle: "a", org: "x" } }) { email } }"#,
    )
    .await;

    assert_eq!(data, json!({ "user": { "email": "a@x.io" } }));
    assert_eq!(
        executor.calls(),
        vec![Call::FindFirst {
            table: "users".into(),
            filter: Filter::And(vec![
                Filter::eq("handle", json!("a")),
                Filter::eq("org", json!("x")),
            ]),
        }]
    );
}

#[tokio::test]
async fn test_unbound_schema_reports_executor_errors() {
    let (document, relations) = lower(LIBRARY);
    let schema = SchemaGenerator::new(
        &document,
        &relations,
        Arc::new(schemagen_graphql::UnboundExecutor),
    )
    .generate()
    .unwrap();

    let response = schema.execute("{ books { id } }").await;
    assert_eq!(response.errors.len(), 1);
}

#[test]
fn test_sdl_lists_derived_inputs() {
    let (document, relations) = lower(MEMBERSHIP);
    let sdl = generate_sdl(&document, &relations).unwrap();

    for fragment in [
        "input UserWhereInput",
        "name_starts_with: String",
        "name_contains: String",
        "age_lte: Int",
        "age_in: [Int!]",
        "level_in: [Level!]",
        "active: Boolean",
        "active_in: [Boolean!]",
        "joinedOn_gt: DateTime",
        "_not: [UserWhereInput!]",
        "input UserWhereUniqueInput",
        "handle_org: UserHandleOrgUniqueInput",
        "input UserHandleOrgUniqueInput",
        "_or: [UserWhereUniqueInput!]",
        "enum UserOrderByInput",
        "joinedOn_DESC",
        "scalar DateTime",
        "enum Level",
        "roles: [Role!]!",
    ] {
        assert!(sdl.contains(fragment), "missing {:?} in\n{}", fragment, sdl);
    }
    assert!(!sdl.contains("active_lt"));
}

#[test]
fn test_sdl_is_deterministic() {
    let (document, relations) = lower(MEMBERSHIP);
    assert_eq!(
        generate_sdl(&document, &relations).unwrap(),
        generate_sdl(&document, &relations).unwrap()
    );
}

#[test]
fn test_empty_document_is_rejected() {
    let document = Document::new(vec![], vec![]).unwrap();
    let relations = RelationSet::resolve(&document).unwrap();
    assert!(generate_sdl(&document, &relations).is_err());
}
