use async_trait::async_trait;
use schemagen_graphql::{Direction, ExecutorError, Filter, Operator, OrderBy, QueryExecutor, Row};
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    FindById { table: String, id: JsonValue },
    FindMany { table: String, filter: Option<Filter>, order: Vec<OrderBy> },
    FindFirst { table: String, filter: Filter },
}

/// In-memory tables that record every executor call.
#[derive(Default)]
pub struct MemoryExecutor {
    tables: HashMap<String, Vec<Row>>,
    calls: Mutex<Vec<Call>>,
}

impl MemoryExecutor {
    pub fn with_table(mut self, table: &str, rows: JsonValue) -> Self {
        let rows = match rows {
            JsonValue::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    JsonValue::Object(row) => row,
                    other => panic!("row must be an object, got {}", other),
                })
                .collect(),
            other => panic!("rows must be an array, got {}", other),
        };
        self.tables.insert(table.to_string(), rows);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn rows(&self, table: &str) -> Result<&[Row], ExecutorError> {
        self.tables
            .get(table)
            .map(Vec::as_slice)
            .ok_or_else(|| ExecutorError::Query(format!("no table {}", table)))
    }
}

#[async_trait]
impl QueryExecutor for MemoryExecutor {
    async fn find_by_id(&self, table: &str, id: &JsonValue) -> Result<Option<Row>, ExecutorError> {
        self.calls.lock().unwrap().push(Call::FindById {
            table: table.to_string(),
            id: id.clone(),
        });
        let filter = Filter::eq("id", id.clone());
        Ok(self.rows(table)?.iter().find(|row| matches(row, &filter)).cloned())
    }

    async fn find_many(
        &self,
        table: &str,
        filter: Option<&Filter>,
        order: &[OrderBy],
    ) -> Result<Vec<Row>, ExecutorError> {
        self.calls.lock().unwrap().push(Call::FindMany {
            table: table.to_string(),
            filter: filter.cloned(),
            order: order.to_vec(),
        });
        let mut rows: Vec<Row> = self
            .rows(table)?
            .iter()
            .filter(|row| filter.map_or(true, |f| matches(row, f)))
            .cloned()
            .collect();
        for key in order.iter().rev() {
            rows.sort_by(|a, b| {
                let ordering = compare(a.get(&key.column), b.get(&key.column));
                match key.direction {
                    Direction::Asc => ordering,
                    Direction::Desc => ordering.reverse(),
                }
            });
        }
        Ok(rows)
    }

    async fn find_first(&self, table: &str, filter: &Filter) -> Result<Option<Row>, ExecutorError> {
        self.calls.lock().unwrap().push(Call::FindFirst {
            table: table.to_string(),
            filter: filter.clone(),
        });
        Ok(self.rows(table)?.iter().find(|row| matches(row, filter)).cloned())
    }
}

fn matches(row: &Row, filter: &Filter) -> bool {
    match filter {
        Filter::Condition {
            column,
            operator,
            value,
        } => {
            let actual = row.get(column);
            match operator {
                Operator::Eq => compare(actual, Some(value)) == Ordering::Equal,
                Operator::Lt => compare(actual, Some(value)) == Ordering::Less,
                Operator::Lte => compare(actual, Some(value)) != Ordering::Greater,
                Operator::Gt => compare(actual, Some(value)) == Ordering::Greater,
                Operator::Gte => compare(actual, Some(value)) != Ordering::Less,
                Operator::In => value
                    .as_array()
                    .map_or(false, |items| items.iter().any(|v| compare(actual, Some(v)) == Ordering::Equal)),
                Operator::StartsWith => text(actual).starts_with(&text(Some(value))),
                Operator::EndsWith => text(actual).ends_with(&text(Some(value))),
                Operator::Contains => text(actual).contains(&text(Some(value))),
            }
        }
        Filter::And(clauses) => clauses.iter().all(|c| matches(row, c)),
        Filter::Or(clauses) => clauses.iter().any(|c| matches(row, c)),
        Filter::Not(clauses) => !clauses.iter().all(|c| matches(row, c)),
    }
}

/// Numbers compare numerically; everything else by its text, so `"1"` equals `1`.
fn compare(a: Option<&JsonValue>, b: Option<&JsonValue>) -> Ordering {
    match (a.and_then(JsonValue::as_f64), b.and_then(JsonValue::as_f64)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => text(a).cmp(&text(b)),
    }
}

fn text(value: Option<&JsonValue>) -> String {
    match value {
        None | Some(JsonValue::Null) => String::new(),
        Some(JsonValue::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
