// ABOUTME: Opaque column values carried from a source row to a destination INSERT
// ABOUTME: Keeps the binary wire encoding and checks the destination type before writing

use bytes::BytesMut;
use std::error::Error;
use std::fmt;
use tokio_postgres::types::{to_sql_checked, FromSql, IsNull, Kind, ToSql, Type};

/// A single column value in PostgreSQL binary format
///
/// Reading a row into `PassthroughValue`s never decodes the data, so every
/// column type the server knows (including enums, arrays and domains) is
/// carried across unchanged. Writing a non-NULL value only succeeds when the
/// destination parameter and the source column share a base type name.
/// Domains are compared by their underlying type, since result metadata
/// reports a domain column by its base type while INSERT parameters are
/// typed as the domain itself.
#[derive(Clone, PartialEq, Eq)]
pub struct PassthroughValue {
    ty: Type,
    bytes: Option<Vec<u8>>,
}

impl PassthroughValue {
    pub fn new(ty: Type, bytes: Option<Vec<u8>>) -> Self {
        Self { ty, bytes }
    }

    pub fn null(ty: Type) -> Self {
        Self { ty, bytes: None }
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }
}

/// Strip any chain of domains down to the type that defines the encoding
fn base_type(ty: &Type) -> &Type {
    match ty.kind() {
        Kind::Domain(inner) => base_type(inner),
        _ => ty,
    }
}

impl fmt::Debug for PassthroughValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.bytes {
            Some(bytes) => write!(f, "{}({} bytes)", self.ty.name(), bytes.len()),
            None => write!(f, "{}(NULL)", self.ty.name()),
        }
    }
}

/// Raised when a destination column's type differs from the source column's
#[derive(Debug)]
pub struct TypeMismatch {
    pub source: String,
    pub destination: String,
}

impl fmt::Display for TypeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "column type mismatch: source is {}, destination is {}",
            self.source, self.destination
        )
    }
}

impl Error for TypeMismatch {}

impl<'a> FromSql<'a> for PassthroughValue {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        Ok(Self::new(ty.clone(), Some(raw.to_vec())))
    }

    fn from_sql_null(ty: &Type) -> Result<Self, Box<dyn Error + Sync + Send>> {
        Ok(Self::null(ty.clone()))
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

impl ToSql for PassthroughValue {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        let Some(bytes) = &self.bytes else {
            return Ok(IsNull::Yes);
        };

        // Custom types get different OIDs per database, so compare by name.
        let source = base_type(&self.ty);
        let destination = base_type(ty);
        if destination.name() != source.name() {
            return Err(Box::new(TypeMismatch {
                source: source.name().to_string(),
                destination: destination.name().to_string(),
            }));
        }

        out.extend_from_slice(bytes);
        Ok(IsNull::No)
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}
