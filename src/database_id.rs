//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseID = i64;
/// The primary key of an expense record.
pub type ExpenseID = DatabaseID;
