// ABOUTME: Checks a table list against foreign keys so parents are copied first
// ABOUTME: Reports every child table listed ahead of a parent it references

use crate::migration::TableName;
use crate::postgres::catalog::ForeignKeyEdge;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderViolation {
    pub child: TableName,
    pub parent: TableName,
    pub constraint: String,
}

impl fmt::Display for OrderViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' is copied before '{}', which it references through {}",
            self.child, self.parent, self.constraint
        )
    }
}

/// Find foreign keys whose referencing table comes before the referenced one
///
/// Only edges between two listed tables count. Self-references are ignored
/// since a table's rows are inserted in read order either way.
pub fn find_order_violations(
    tables: &[TableName],
    edges: &[ForeignKeyEdge],
) -> Vec<OrderViolation> {
    let position: HashMap<&TableName, usize> =
        tables.iter().enumerate().map(|(i, t)| (t, i)).collect();

    edges
        .iter()
        .filter(|edge| edge.child != edge.parent)
        .filter_map(|edge| {
            let child = position.get(&edge.child)?;
            let parent = position.get(&edge.parent)?;
            (child < parent).then(|| OrderViolation {
                child: edge.child.clone(),
                parent: edge.parent.clone(),
                constraint: edge.constraint.clone(),
            })
        })
        .collect()
}
