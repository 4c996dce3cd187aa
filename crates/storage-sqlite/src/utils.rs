//! Utility functions for SQLite storage operations.

/// Upper bound on bound parameters in one statement (SQLITE_MAX_VARIABLE_NUMBER
/// of the bundled SQLite).
pub const SQLITE_MAX_PARAMS: usize = 32_766;

/// Splits `rows` into batches whose multi-row INSERT stays under
/// [`SQLITE_MAX_PARAMS`], given `columns` bound values per row.
///
/// # Example
///
/// ```ignore
/// for chunk in chunk_rows(&frames, 7) {
///     diesel::replace_into(ohlc_frames).values(chunk).execute(conn)?;
/// }
/// ```
pub fn chunk_rows<T>(rows: &[T], columns: usize) -> impl Iterator<Item = &[T]> {
    let per_chunk = (SQLITE_MAX_PARAMS / columns.max(1)).max(1);
    rows.chunks(per_chunk)
}
