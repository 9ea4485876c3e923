use rusqlite::Row;

/// Build a model from a row selected with its table's column names.
///
/// Used as `stmt.query_map(params, Model::from_row)`.
pub trait FromSqliteRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}
