//! PostgreSQL-backed `ResponseRepository`.
//!
//! The `(request_id, responder)` unique key and the partial index on
//! accepted responses make the database the final arbiter; violations come
//! back as `Duplicate`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ResponseRepository, ResponseRepositoryError};
use crate::domain::{
    HelpResponse, MemberId, Page, PageRequest, RequestId, ResponseId, ResponseStatus,
};

use super::error_mapping::{Failure, classify, decode_failure, impl_from_failure, pool_failure};
use super::models::{NewResponseRow, ResponseRow};
use super::paging::{total, window};
use super::pool::DbPool;
use super::schema::help_responses;

impl_from_failure!(ResponseRepositoryError, duplicate);

/// Diesel implementation of the response repository port.
#[derive(Clone)]
pub struct DieselResponseRepository {
    pool: DbPool,
}

impl DieselResponseRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn decode(row: ResponseRow) -> Result<HelpResponse, Failure> {
    HelpResponse::try_from(row).map_err(decode_failure)
}

fn decode_all(rows: Vec<ResponseRow>) -> Result<Vec<HelpResponse>, ResponseRepositoryError> {
    Ok(rows.into_iter().map(decode).collect::<Result<Vec<_>, _>>()?)
}

fn decode_optional(
    row: Option<ResponseRow>,
) -> Result<Option<HelpResponse>, ResponseRepositoryError> {
    Ok(row.map(decode).transpose()?)
}

#[async_trait]
impl ResponseRepository for DieselResponseRepository {
    async fn insert(&self, response: &HelpResponse) -> Result<(), ResponseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        diesel::insert_into(help_responses::table)
            .values(NewResponseRow::from(response))
            .execute(&mut conn)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn find(&self, id: ResponseId) -> Result<Option<HelpResponse>, ResponseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        let row = help_responses::table
            .find(*id.as_uuid())
            .select(ResponseRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(classify)?;
        decode_optional(row)
    }

    async fn find_for_responder(
        &self,
        request_id: RequestId,
        responder: MemberId,
    ) -> Result<Option<HelpResponse>, ResponseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        let row = help_responses::table
            .filter(help_responses::request_id.eq(*request_id.as_uuid()))
            .filter(help_responses::responder.eq(*responder.as_uuid()))
            .select(ResponseRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(classify)?;
        decode_optional(row)
    }

    async fn list_for_request(
        &self,
        request_id: RequestId,
    ) -> Result<Vec<HelpResponse>, ResponseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        let rows = help_responses::table
            .filter(help_responses::request_id.eq(*request_id.as_uuid()))
            .order((help_responses::created_at.asc(), help_responses::id.asc()))
            .select(ResponseRow::as_select())
            .load(&mut conn)
            .await
            .map_err(classify)?;
        decode_all(rows)
    }

    async fn list_by_responder(
        &self,
        responder: MemberId,
        page: PageRequest,
    ) -> Result<Page<HelpResponse>, ResponseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        let responder = *responder.as_uuid();
        let (limit, offset) = window(page);
        let count: i64 = help_responses::table
            .filter(help_responses::responder.eq(responder))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(classify)?;
        let rows = help_responses::table
            .filter(help_responses::responder.eq(responder))
            .order((help_responses::created_at.desc(), help_responses::id.desc()))
            .limit(limit)
            .offset(offset)
            .select(ResponseRow::as_select())
            .load(&mut conn)
            .await
            .map_err(classify)?;
        Ok(Page::from_window(decode_all(rows)?, page, total(count)))
    }

    async fn mark_accepted(
        &self,
        id: ResponseId,
        now: DateTime<Utc>,
    ) -> Result<Option<HelpResponse>, ResponseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        let row = diesel::update(
            help_responses::table
                .find(*id.as_uuid())
                .filter(help_responses::status.ne(ResponseStatus::Rejected.as_str())),
        )
        .set((
            help_responses::status.eq(ResponseStatus::Accepted.as_str()),
            help_responses::updated_at.eq(now),
        ))
        .returning(ResponseRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(classify)?;
        decode_optional(row)
    }

    async fn mark_rejected(
        &self,
        id: ResponseId,
        now: DateTime<Utc>,
    ) -> Result<Option<HelpResponse>, ResponseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        let row = diesel::update(
            help_responses::table
                .find(*id.as_uuid())
                .filter(help_responses::status.ne(ResponseStatus::Accepted.as_str())),
        )
        .set((
            help_responses::status.eq(ResponseStatus::Rejected.as_str()),
            help_responses::updated_at.eq(now),
        ))
        .returning(ResponseRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(classify)?;
        decode_optional(row)
    }

    async fn revoke_acceptance(
        &self,
        id: ResponseId,
        now: DateTime<Utc>,
    ) -> Result<(), ResponseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        diesel::update(
            help_responses::table
                .find(*id.as_uuid())
                .filter(help_responses::status.eq(ResponseStatus::Accepted.as_str())),
        )
        .set((
            help_responses::status.eq(ResponseStatus::Rejected.as_str()),
            help_responses::updated_at.eq(now),
        ))
        .execute(&mut conn)
        .await
        .map_err(classify)?;
        Ok(())
    }

    async fn reject_pending_siblings(
        &self,
        request_id: RequestId,
        keep: Option<ResponseId>,
        now: DateTime<Utc>,
    ) -> Result<Vec<HelpResponse>, ResponseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        // Response ids are random v4 UUIDs, so nil never matches a real row.
        let keep = keep.map_or(Uuid::nil(), |id| *id.as_uuid());
        let rows = diesel::update(
            help_responses::table
                .filter(help_responses::request_id.eq(*request_id.as_uuid()))
                .filter(help_responses::status.eq(ResponseStatus::Pending.as_str()))
                .filter(help_responses::id.ne(keep)),
        )
        .set((
            help_responses::status.eq(ResponseStatus::Rejected.as_str()),
            help_responses::updated_at.eq(now),
        ))
        .returning(ResponseRow::as_returning())
        .get_results(&mut conn)
        .await
        .map_err(classify)?;
        let mut rejected = decode_all(rows)?;
        rejected.sort_by_key(|response| (response.created_at, response.id));
        Ok(rejected)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn unique_violation_surfaces_as_duplicate() {
        let err: ResponseRepositoryError =
            Failure::Duplicate("help_responses_one_accepted_idx".to_owned()).into();
        assert!(matches!(err, ResponseRepositoryError::Duplicate { .. }));
    }

    #[rstest]
    fn undecodable_status_is_a_query_error() {
        let now = crate::test_support::fixture_now();
        let row = ResponseRow {
            id: Uuid::new_v4(),
            request_id: Uuid::new_v4(),
            responder: Uuid::new_v4(),
            message: "Happy to help".to_owned(),
            image_url: None,
            status: "withdrawn".to_owned(),
            created_at: now,
            updated_at: now,
        };

        let err = decode_optional(Some(row)).expect_err("unknown status");

        assert!(matches!(err, ResponseRepositoryError::Query { .. }));
    }
}
