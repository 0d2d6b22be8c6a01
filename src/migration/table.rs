// ABOUTME: Table identifiers and the default dependency-ordered table list
// ABOUTME: Parses `table` / `schema.table` names and renders them as quoted SQL

use crate::utils::{quote_ident, validate_postgres_identifier};
use anyhow::{bail, Context, Result};
use std::collections::HashSet;
use std::fmt;

/// Tables copied when no list is configured, parents before children
pub const DEFAULT_TABLES: [&str; 4] = ["personas", "asuntos", "asunto_instancia", "asistencia"];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName {
    pub schema: Option<String>,
    pub name: String,
}

impl TableName {
    /// Parse `table` or `schema.table`, validating each part
    ///
    /// ```
    /// # use pg_table_copier::migration::TableName;
    /// let table = TableName::parse("public.personas").unwrap();
    /// assert_eq!(table.schema.as_deref(), Some("public"));
    /// assert_eq!(table.quoted(), "\"public\".\"personas\"");
    /// assert!(TableName::parse("personas; DROP TABLE x").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        let (schema, name) = match input.split_once('.') {
            Some((schema, name)) => (Some(schema), name),
            None => (None, input),
        };

        if let Some(schema) = schema {
            validate_postgres_identifier(schema)
                .with_context(|| format!("Invalid schema in table name '{}'", input))?;
        }
        validate_postgres_identifier(name)
            .with_context(|| format!("Invalid table name '{}'", input))?;

        Ok(Self {
            schema: schema.map(str::to_string),
            name: name.to_string(),
        })
    }

    pub fn qualified(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
            name: name.into(),
        }
    }

    /// SQL form with every part double-quoted
    pub fn quoted(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", quote_ident(schema), quote_ident(&self.name)),
            None => quote_ident(&self.name),
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Parse an ordered table list, rejecting empty lists and duplicates
pub fn parse_table_list<S: AsRef<str>>(names: &[S]) -> Result<Vec<TableName>> {
    if names.is_empty() {
        bail!("Table list cannot be empty");
    }

    let mut seen = HashSet::new();
    let mut tables = Vec::with_capacity(names.len());
    for raw in names {
        let table = TableName::parse(raw.as_ref())?;
        if !seen.insert(table.clone()) {
            bail!("Table '{}' is listed more than once", table);
        }
        tables.push(table);
    }

    Ok(tables)
}

pub fn default_tables() -> Vec<TableName> {
    DEFAULT_TABLES
        .iter()
        .map(|name| TableName {
            schema: None,
            name: (*name).to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unqualified() {
        let table = TableName::parse("personas").unwrap();
        assert_eq!(table.schema, None);
        assert_eq!(table.name, "personas");
        assert_eq!(table.quoted(), "\"personas\"");
        assert_eq!(table.to_string(), "personas");
    }

    #[test]
    fn test_parse_qualified_trims_whitespace() {
        let table = TableName::parse("  municipal.asistencia ").unwrap();
        assert_eq!(table.schema.as_deref(), Some("municipal"));
        assert_eq!(table.name, "asistencia");
        assert_eq!(table.to_string(), "municipal.asistencia");
    }

    #[test]
    fn test_parse_rejects_bad_identifiers() {
        assert!(TableName::parse("").is_err());
        assert!(TableName::parse(".personas").is_err());
        assert!(TableName::parse("public.").is_err());
        assert!(TableName::parse("a.b.c").is_err());
        assert!(TableName::parse("personas\"--").is_err());
        assert!(TableName::parse("1personas").is_err());
    }

    #[test]
    fn test_parse_table_list_keeps_order() {
        let tables = parse_table_list(&["asuntos", "personas"]).unwrap();
        let names: Vec<String> = tables.iter().map(|t| t.to_string()).collect();
        assert_eq!(names, vec!["asuntos", "personas"]);
    }

    #[test]
    fn test_parse_table_list_rejects_duplicates_and_empty() {
        let empty: [&str; 0] = [];
        assert!(parse_table_list(&empty).is_err());

        let err = parse_table_list(&["personas", "asuntos", "personas"]).unwrap_err();
        assert!(err.to_string().contains("listed more than once"));
    }

    #[test]
    fn test_default_tables_order() {
        let names: Vec<String> = default_tables().iter().map(|t| t.to_string()).collect();
        assert_eq!(
            names,
            vec!["personas", "asuntos", "asunto_instancia", "asistencia"]
        );
    }
}
