//! DDL compiler: IR document + relations -> ordered statements

use schemagen_ir::naming::table_name;
use schemagen_ir::{Cardinality, Document, ObjectType, Relation, RelationSet, Side};
use tracing::{debug, info};

use crate::column::{self, KEY_TYPE};
use crate::escape::{quote_identifier, quote_identifiers};
use crate::SqlError;

const INDENT: &str = "  ";

/// Compiles a document into MySQL DDL.
///
/// Output order: one `CREATE TABLE` per object type in declaration order,
/// then per relation (traversal order) its `ALTER TABLE ... FOREIGN KEY`
/// statements or its junction table.
pub struct SqlCompiler<'a> {
    document: &'a Document,
    relations: &'a RelationSet,
}

impl<'a> SqlCompiler<'a> {
    pub fn new(document: &'a Document, relations: &'a RelationSet) -> Self {
        Self {
            document,
            relations,
        }
    }

    /// Compile every statement, without trailing semicolons.
    pub fn compile(&self) -> Result<Vec<String>, SqlError> {
        let mut statements = Vec::new();

        for object_type in self.document.object_types() {
            statements.push(self.compile_table(object_type)?);
        }

        for relation in self.relations {
            match relation.cardinality() {
                Cardinality::ManyToMany => statements.push(self.compile_junction_table(relation)?),
                _ => statements.extend(self.compile_foreign_keys(relation)?),
            }
        }

        info!(
            statements = statements.len(),
            tables = self.document.object_types().len(),
            "Compiled SQL schema"
        );
        Ok(statements)
    }

    /// `CREATE TABLE` for one object type.
    pub fn compile_table(&self, object_type: &ObjectType) -> Result<String, SqlError> {
        let table = table_name(object_type.name());
        let mut lines = Vec::new();

        for field in object_type.scalar_fields() {
            lines.push(column::scalar_column(object_type, field)?);
        }

        for field in object_type.enum_fields() {
            let enum_type = self.document.enum_type(field.type_name()).ok_or_else(|| {
                SqlError::UnknownType(field.type_name().to_string())
            })?;
            lines.push(column::enum_column(field, enum_type));
        }

        for field in object_type.relation_fields() {
            let (relation, side) = self
                .relations
                .for_field(object_type.name(), field.name())
                .ok_or_else(|| SqlError::UnresolvedRelation {
                    object_type: object_type.name().to_string(),
                    field: field.name().to_string(),
                })?;
            if relation.owns_foreign_key(side) {
                lines.push(column::foreign_key_column(
                    &relation.foreign_key_column(side),
                    field.is_required(),
                ));
            }
        }

        for constraint in object_type.unique_constraints() {
            let name = constraint
                .name
                .clone()
                .unwrap_or_else(|| default_name(&table, &constraint.fields, "unique"));
            lines.push(format!(
                "CONSTRAINT {} UNIQUE ({})",
                quote_identifier(&name),
                quote_identifiers(&constraint.fields)
            ));
        }

        for index in object_type.indexes() {
            let name = index
                .name
                .clone()
                .unwrap_or_else(|| default_name(&table, &index.fields, "index"));
            let prefix = index
                .index_type
                .as_deref()
                .map(|t| format!("{} ", t))
                .unwrap_or_default();
            lines.push(format!(
                "{}INDEX {} ({})",
                prefix,
                quote_identifier(&name),
                quote_identifiers(&index.fields)
            ));
        }

        lines.extend(column::timestamp_columns());

        debug!(table = %table, columns = lines.len(), "Compiled table");
        Ok(create_table(&table, &lines))
    }

    /// `ALTER TABLE` statements for every reference column `relation` owns.
    fn compile_foreign_keys(&self, relation: &Relation) -> Result<Vec<String>, SqlError> {
        let mut statements = Vec::new();
        for side in [Side::A, Side::B] {
            if !relation.owns_foreign_key(side) {
                continue;
            }
            let table = table_name(&relation.side(side).object_type);
            let column = relation.foreign_key_column(side);
            let constraint = foreign_key_constraint(
                &table,
                &column,
                &relation.side(side.opposite()).object_type,
                self.document,
            )?;
            statements.push(format!(
                "ALTER TABLE {} ADD {}",
                quote_identifier(&table),
                constraint
            ));
        }
        Ok(statements)
    }

    /// Junction table for a many-to-many relation.
    fn compile_junction_table(&self, relation: &Relation) -> Result<String, SqlError> {
        let table = relation.junction_table();
        let columns = [Side::A, Side::B].map(|side| relation.junction_column(side));

        let mut lines: Vec<String> = columns
            .iter()
            .map(|column| format!("{} {} NOT NULL", quote_identifier(column), KEY_TYPE))
            .collect();

        for (side, column) in [Side::A, Side::B].into_iter().zip(&columns) {
            lines.push(foreign_key_constraint(
                table,
                column,
                &relation.side(side).object_type,
                self.document,
            )?);
        }

        debug!(table = %table, relation = relation.name(), "Compiled junction table");
        Ok(create_table(table, &lines))
    }
}

/// `CONSTRAINT ... FOREIGN KEY (column) REFERENCES target_table (pk)`.
fn foreign_key_constraint(
    table: &str,
    column: &str,
    target_type: &str,
    document: &Document,
) -> Result<String, SqlError> {
    let target = document
        .object_type(target_type)
        .ok_or_else(|| SqlError::UnknownType(target_type.to_string()))?;
    let primary_key = target.primary_key().ok_or_else(|| SqlError::MissingPrimaryKey {
        object_type: target_type.to_string(),
    })?;

    Ok(format!(
        "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
        quote_identifier(&default_name(table, &[column], "foreign")),
        quote_identifier(column),
        quote_identifier(&table_name(target.name())),
        quote_identifier(primary_key.name())
    ))
}

/// Constraint name `{table}_{columns}_{suffix}`, lowercased.
fn default_name<S: AsRef<str>>(table: &str, columns: &[S], suffix: &str) -> String {
    let columns = columns.iter().map(|c| c.as_ref()).collect::<Vec<_>>().join("_");
    format!("{}_{}_{}", table, columns, suffix).to_lowercase()
}

fn create_table(table: &str, lines: &[String]) -> String {
    let body = lines
        .iter()
        .map(|line| format!("{}{}", INDENT, line))
        .collect::<Vec<_>>()
        .join(",\n");
    format!("CREATE TABLE {} (\n{}\n)", quote_identifier(table), body)
}
