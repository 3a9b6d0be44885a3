//! Query composition for `recurring_series`.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::db::connection::DbConnection;
use crate::db::schema::recurring_series;
use crate::model::series::{NewRecurringSeries, RecurringSeries};

/// ## Summary
/// Inserts a series and returns the stored row.
///
/// ## Errors
/// Returns an error if the database operation fails, including a unique
/// violation when the idempotency key is already taken.
pub async fn insert(
    conn: &mut DbConnection<'_>,
    series: &NewRecurringSeries<'_>,
) -> QueryResult<RecurringSeries> {
    diesel::insert_into(recurring_series::table)
        .values(series)
        .returning(RecurringSeries::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Finds the series committed under an idempotency key.
///
/// ## Errors
/// Returns an error if the database query fails.
pub async fn by_idempotency_key(
    conn: &mut DbConnection<'_>,
    key: &str,
) -> QueryResult<Option<RecurringSeries>> {
    recurring_series::table
        .filter(recurring_series::idempotency_key.eq(key))
        .select(RecurringSeries::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Errors
/// Returns an error if the database query fails.
pub async fn by_id(conn: &mut DbConnection<'_>, id: Uuid) -> QueryResult<Option<RecurringSeries>> {
    recurring_series::table
        .find(id)
        .select(RecurringSeries::as_select())
        .first(conn)
        .await
        .optional()
}
