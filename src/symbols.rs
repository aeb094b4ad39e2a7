//! Global symbol tables for arrays and structs (spec.md §4.2).
//!
//! Lookups scan linearly, which is fine for the tens of declarations a
//! realistic translation unit has (spec.md: "N is bounded by tens"). Both
//! tables grow as needed; the capacity constants below are soft caps kept
//! for fidelity to the source, enforced as a silent truncation rather than
//! a panic, since running out of symbol slots is a compiler limitation, not
//! a user error.

/// Soft capacity for the array table (spec.md §3: "bounded capacity, >=128").
pub const ARRAY_TABLE_CAPACITY: usize = 128;
/// Soft capacity for the struct table (spec.md §3: "bounded capacity, >=64").
pub const STRUCT_TABLE_CAPACITY: usize = 64;

/// `identifier -> positive size` mapping for declared C arrays.
#[derive(Debug, Default, Clone)]
pub struct ArrayTable {
    entries: Vec<(String, usize)>,
}

impl ArrayTable {
    pub fn new() -> Self {
        ArrayTable::default()
    }

    /// Register `name` with `size`. Updates an existing entry in place;
    /// appends a new one otherwise. A non-positive size or a table already
    /// at capacity is a silent no-op (spec.md §3).
    pub fn register(&mut self, name: &str, size: i64) {
        if size <= 0 {
            return;
        }
        let size = size as usize;
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| n == name) {
            entry.1 = size;
            return;
        }
        if self.entries.len() >= ARRAY_TABLE_CAPACITY {
            return;
        }
        self.entries.push((name.to_string(), size));
    }

    /// Returns the registered size, or `-1` if `name` is unknown (spec.md §8
    /// invariant 5).
    pub fn find(&self, name: &str) -> i64 {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, size)| *size as i64)
            .unwrap_or(-1)
    }
}

/// A single struct field: name and its C type spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub c_type: String,
}

/// `struct-name -> ordered field list` mapping.
#[derive(Debug, Default, Clone)]
pub struct StructTable {
    entries: Vec<(String, Vec<Field>)>,
}

/// Sentinel returned by `find_field` for unknown struct/field pairs.
pub const FIELD_NOT_FOUND: &str = "<not found>";

impl StructTable {
    pub fn new() -> Self {
        StructTable::default()
    }

    /// Register (or replace) the field list for `name`.
    pub fn register(&mut self, name: &str, fields: Vec<Field>) {
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| n == name) {
            entry.1 = fields;
            return;
        }
        if self.entries.len() >= STRUCT_TABLE_CAPACITY {
            return;
        }
        self.entries.push((name.to_string(), fields));
    }

    /// Append one field to an already-registered struct. A no-op if the
    /// struct hasn't been registered yet.
    pub fn add_field(&mut self, struct_name: &str, field: Field) {
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| n == struct_name) {
            entry.1.push(field);
        }
    }

    pub fn fields(&self, struct_name: &str) -> Option<&[Field]> {
        self.entries
            .iter()
            .find(|(n, _)| n == struct_name)
            .map(|(_, fields)| fields.as_slice())
    }

    /// Returns the field's C type, or [`FIELD_NOT_FOUND`] if the struct or
    /// field is unknown (spec.md §3).
    pub fn find_field(&self, struct_name: &str, field_name: &str) -> &str {
        self.fields(struct_name)
            .and_then(|fields| fields.iter().find(|f| f.name == field_name))
            .map(|f| f.c_type.as_str())
            .unwrap_or(FIELD_NOT_FOUND)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s5_array_table_idempotence() {
        let mut table = ArrayTable::new();
        table.register("buf", 10);
        table.register("buf", 20);
        assert_eq!(table.find("buf"), 20);
        assert_eq!(table.find("nope"), -1);
    }

    #[test]
    fn array_table_ignores_non_positive_sizes() {
        let mut table = ArrayTable::new();
        table.register("buf", 0);
        table.register("buf", -5);
        assert_eq!(table.find("buf"), -1);
    }

    #[test]
    fn struct_table_field_lookup() {
        let mut table = StructTable::new();
        table.register(
            "Point",
            vec![
                Field { name: "x".into(), c_type: "int".into() },
                Field { name: "y".into(), c_type: "int".into() },
            ],
        );
        assert_eq!(table.find_field("Point", "y"), "int");
        assert_eq!(table.find_field("Point", "z"), FIELD_NOT_FOUND);
        assert_eq!(table.find_field("Missing", "y"), FIELD_NOT_FOUND);
    }
}
