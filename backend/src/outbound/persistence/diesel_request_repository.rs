//! PostgreSQL-backed `RequestRepository`.
//!
//! Lifecycle transitions are single conditional `UPDATE ... RETURNING`
//! statements: a row comes back only when the guard held, so two racing
//! helpers cannot both claim a request.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::{exists, not};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RequestFilter, RequestRepository, RequestRepositoryError};
use crate::domain::{
    HelpRequest, MemberId, Page, PageRequest, RequestDetails, RequestId, RequestStatus,
};

use super::error_mapping::{Failure, classify, decode_failure, impl_from_failure, pool_failure};
use super::models::{NewRequestRow, RequestDetailsUpdate, RequestRow};
use super::paging::{total, window};
use super::pool::DbPool;
use super::schema::{chats, help_requests};

impl_from_failure!(RequestRepositoryError);

/// Diesel implementation of the request repository port.
#[derive(Clone)]
pub struct DieselRequestRepository {
    pool: DbPool,
}

impl DieselRequestRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn decode(row: RequestRow) -> Result<HelpRequest, Failure> {
    HelpRequest::try_from(row).map_err(decode_failure)
}

fn decode_optional(row: Option<RequestRow>) -> Result<Option<HelpRequest>, RequestRepositoryError> {
    Ok(row.map(decode).transpose()?)
}

fn decode_page(
    rows: Vec<RequestRow>,
    page: PageRequest,
    count: i64,
) -> Result<Page<HelpRequest>, RequestRepositoryError> {
    let items = rows.into_iter().map(decode).collect::<Result<Vec<_>, _>>()?;
    Ok(Page::from_window(items, page, total(count)))
}

/// Rows whose effective status and facets match `filter` at `now`.
fn filtered(
    filter: &RequestFilter,
    now: DateTime<Utc>,
) -> help_requests::BoxedQuery<'static, Pg> {
    let open = RequestStatus::Open.as_str();
    let mut query = help_requests::table.into_boxed();
    query = match filter.status {
        RequestStatus::Open => query
            .filter(help_requests::status.eq(open))
            .filter(help_requests::expires_at.gt(now)),
        RequestStatus::Expired => query
            .filter(help_requests::status.eq(open))
            .filter(help_requests::expires_at.le(now)),
        stored => query.filter(help_requests::status.eq(stored.as_str())),
    };
    if let Some(category) = filter.category {
        query = query.filter(help_requests::category.eq(category.as_str()));
    }
    if let Some(urgency) = filter.urgency {
        query = query.filter(help_requests::urgency.eq(urgency.as_str()));
    }
    query
}

#[async_trait]
impl RequestRepository for DieselRequestRepository {
    async fn insert(&self, request: &HelpRequest) -> Result<(), RequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        diesel::insert_into(help_requests::table)
            .values(NewRequestRow::from(request))
            .execute(&mut conn)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn find(&self, id: RequestId) -> Result<Option<HelpRequest>, RequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        let row = help_requests::table
            .find(*id.as_uuid())
            .select(RequestRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(classify)?;
        decode_optional(row)
    }

    async fn list(
        &self,
        filter: RequestFilter,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<Page<HelpRequest>, RequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        let (limit, offset) = window(page);
        let count: i64 = filtered(&filter, now)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(classify)?;
        let rows = filtered(&filter, now)
            .order((help_requests::created_at.desc(), help_requests::id.desc()))
            .limit(limit)
            .offset(offset)
            .select(RequestRow::as_select())
            .load(&mut conn)
            .await
            .map_err(classify)?;
        decode_page(rows, page, count)
    }

    async fn list_by_owner(
        &self,
        owner: MemberId,
        page: PageRequest,
    ) -> Result<Page<HelpRequest>, RequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        let (limit, offset) = window(page);
        let owner = *owner.as_uuid();
        let count: i64 = help_requests::table
            .filter(help_requests::requested_by.eq(owner))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(classify)?;
        let rows = help_requests::table
            .filter(help_requests::requested_by.eq(owner))
            .order((help_requests::created_at.desc(), help_requests::id.desc()))
            .limit(limit)
            .offset(offset)
            .select(RequestRow::as_select())
            .load(&mut conn)
            .await
            .map_err(classify)?;
        decode_page(rows, page, count)
    }

    async fn update_details(
        &self,
        id: RequestId,
        details: &RequestDetails,
        now: DateTime<Utc>,
    ) -> Result<Option<HelpRequest>, RequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        let row = diesel::update(
            help_requests::table
                .find(*id.as_uuid())
                .filter(help_requests::status.ne(RequestStatus::Fulfilled.as_str()))
                .filter(help_requests::status.ne(RequestStatus::Cancelled.as_str())),
        )
        .set(RequestDetailsUpdate::new(details, now))
        .returning(RequestRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(classify)?;
        decode_optional(row)
    }

    async fn claim_helper(
        &self,
        id: RequestId,
        helper: MemberId,
        now: DateTime<Utc>,
    ) -> Result<Option<HelpRequest>, RequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        let row = diesel::update(
            help_requests::table
                .find(*id.as_uuid())
                .filter(help_requests::status.eq(RequestStatus::Open.as_str()))
                .filter(help_requests::accepted_helper.is_null())
                .filter(help_requests::expires_at.gt(now)),
        )
        .set((
            help_requests::status.eq(RequestStatus::InProgress.as_str()),
            help_requests::accepted_helper.eq(Some(*helper.as_uuid())),
            help_requests::updated_at.eq(now),
        ))
        .returning(RequestRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(classify)?;
        decode_optional(row)
    }

    async fn cancel(
        &self,
        id: RequestId,
        now: DateTime<Utc>,
    ) -> Result<Option<HelpRequest>, RequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        let row = diesel::update(
            help_requests::table
                .find(*id.as_uuid())
                .filter(help_requests::status.ne(RequestStatus::Fulfilled.as_str())),
        )
        .set((
            help_requests::status.eq(RequestStatus::Cancelled.as_str()),
            help_requests::accepted_helper.eq(None::<uuid::Uuid>),
            help_requests::updated_at.eq(now),
        ))
        .returning(RequestRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(classify)?;
        decode_optional(row)
    }

    async fn fulfill(
        &self,
        id: RequestId,
        now: DateTime<Utc>,
    ) -> Result<Option<HelpRequest>, RequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        let row = diesel::update(
            help_requests::table
                .find(*id.as_uuid())
                .filter(help_requests::status.eq(RequestStatus::InProgress.as_str())),
        )
        .set((
            help_requests::status.eq(RequestStatus::Fulfilled.as_str()),
            help_requests::fulfilled_at.eq(Some(now)),
            help_requests::updated_at.eq(now),
        ))
        .returning(RequestRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(classify)?;
        decode_optional(row)
    }

    async fn delete_unengaged(
        &self,
        id: RequestId,
        cutoff: DateTime<Utc>,
    ) -> Result<bool, RequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        let request_id = *id.as_uuid();
        let outcome = diesel::delete(
            help_requests::table
                .find(request_id)
                .filter(help_requests::status.eq(RequestStatus::Open.as_str()))
                .filter(help_requests::created_at.ge(cutoff))
                .filter(not(exists(
                    chats::table.filter(chats::request_id.eq(request_id)),
                ))),
        )
        .execute(&mut conn)
        .await;
        match outcome {
            Ok(deleted) => Ok(deleted > 0),
            // A chat committed between the check and the delete.
            Err(DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)) => {
                Ok(false)
            }
            Err(err) => Err(classify(err).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::outbound::persistence::pool::PoolError;

    #[rstest]
    fn pool_failure_becomes_connection_error() {
        let err: RequestRepositoryError = pool_failure(PoolError::checkout("refused")).into();
        assert!(matches!(err, RequestRepositoryError::Connection { .. }));
    }

    #[rstest]
    fn unexpected_duplicate_becomes_query_error() {
        let err: RequestRepositoryError = Failure::Duplicate("help_requests_pkey".to_owned()).into();
        assert!(matches!(err, RequestRepositoryError::Query { .. }));
        assert!(err.to_string().contains("help_requests_pkey"));
    }

    #[rstest]
    fn expired_filter_renders_expiry_comparison() {
        let filter = RequestFilter {
            status: RequestStatus::Expired,
            ..RequestFilter::default()
        };
        let sql = diesel::debug_query::<Pg, _>(&filtered(&filter, chrono::Utc::now())).to_string();
        assert!(sql.contains("\"expires_at\" <="));
    }
}
