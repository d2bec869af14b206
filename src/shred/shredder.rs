//! Record shredder
//!
//! Walks a record in schema order and appends one or more entries to every
//! leaf column. Absent fields (missing key, JSON null, or an empty array for a
//! repeated field) write one null entry to each leaf under them, at the
//! definition level of the deepest present ancestor.

use serde_json::Value;

use crate::column::{ColumnEntry, StripedColumns};
use crate::schema::{Level, NodeId, Schema};

use super::errors::{kind_of, ShredError, ShredResult};

/// Shreds records of one schema into striped columns.
#[derive(Debug, Clone, Copy)]
pub struct Shredder<'a> {
    schema: &'a Schema,
    strict: bool,
}

impl<'a> Shredder<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            strict: false,
        }
    }

    /// Rejects records carrying keys the schema does not declare.
    ///
    /// Off by default: undeclared keys are ignored.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    /// Appends one record to `columns`.
    ///
    /// On error nothing of the record remains in `columns`. Columns created
    /// for another schema fail with `DREMEL_SHRED_FOREIGN_COLUMNS`.
    pub fn shred(&self, record: &Value, columns: &mut StripedColumns) -> ShredResult<()> {
        self.check_columns(columns)?;

        let checkpoint = columns.checkpoint();
        let result = self.shred_group(NodeId::ROOT, record, 0, columns);
        if result.is_err() {
            columns.rollback(&checkpoint);
        }
        result
    }

    /// Shreds a single record into fresh columns
    pub fn shred_record(&self, record: &Value) -> ShredResult<StripedColumns> {
        let mut columns = StripedColumns::new(self.schema);
        self.shred(record, &mut columns)?;
        Ok(columns)
    }

    fn check_columns(&self, columns: &StripedColumns) -> ShredResult<()> {
        if columns.len() != self.schema.leaf_count() {
            return Err(ShredError::foreign_columns(
                "",
                format!(
                    "{} columns for a schema of {} leaves",
                    columns.len(),
                    self.schema.leaf_count()
                ),
            ));
        }
        for (column, expected) in columns.columns().iter().zip(self.schema.paths()) {
            if column.path != expected {
                return Err(ShredError::foreign_columns(
                    &column.path,
                    format!("column '{}' found where '{}' was expected", column.path, expected),
                ));
            }
        }
        Ok(())
    }

    fn shred_group(
        &self,
        group: NodeId,
        value: &Value,
        r: Level,
        columns: &mut StripedColumns,
    ) -> ShredResult<()> {
        let node = self.schema.node(group);
        let fields = match value {
            Value::Object(fields) => fields,
            other => return Err(ShredError::not_an_object(node.path(), kind_of(other))),
        };

        if self.strict {
            for key in fields.keys() {
                let declared = node
                    .children()
                    .iter()
                    .any(|child| self.schema.node(*child).name() == key);
                if !declared {
                    return Err(ShredError::undeclared_field(node.path(), key));
                }
            }
        }

        for &child in node.children() {
            match fields.get(self.schema.node(child).name()) {
                None | Some(Value::Null) => {
                    self.write_absent(child, r, node.max_definition_level(), columns)
                }
                Some(value) => self.shred_field(child, value, r, columns)?,
            }
        }
        Ok(())
    }

    fn shred_field(
        &self,
        field: NodeId,
        value: &Value,
        r: Level,
        columns: &mut StripedColumns,
    ) -> ShredResult<()> {
        let node = self.schema.node(field);

        if !node.is_repeated() {
            if value.is_array() {
                return Err(ShredError::unexpected_array(node.path()));
            }
            return self.shred_element(field, value, r, columns);
        }

        let items = match value {
            Value::Array(items) => items,
            other => return Err(ShredError::expected_array(node.path(), kind_of(other))),
        };
        if items.is_empty() {
            self.write_absent(field, r, node.max_definition_level() - 1, columns);
            return Ok(());
        }

        for (index, item) in items.iter().enumerate() {
            if item.is_null() {
                return Err(ShredError::null_element(node.path(), index));
            }
            // Later elements repeat at this field's own level.
            let item_r = if index == 0 { r } else { node.max_repetition_level() };
            self.shred_element(field, item, item_r, columns)?;
        }
        Ok(())
    }

    fn shred_element(
        &self,
        field: NodeId,
        value: &Value,
        r: Level,
        columns: &mut StripedColumns,
    ) -> ShredResult<()> {
        let node = self.schema.node(field);
        match self.schema.leaf_index(field) {
            Some(leaf) => {
                if value.is_object() || value.is_array() {
                    return Err(ShredError::not_a_scalar(node.path(), kind_of(value)));
                }
                columns.push(
                    leaf,
                    ColumnEntry::value(value.clone(), r, node.max_definition_level()),
                );
                Ok(())
            }
            None => self.shred_group(field, value, r, columns),
        }
    }

    fn write_absent(&self, field: NodeId, r: Level, d: Level, columns: &mut StripedColumns) {
        for leaf in self.schema.leaf_range(field) {
            columns.push(leaf, ColumnEntry::null(r, d));
        }
    }
}
