//! PostgreSQL-backed `ReportRepository`.
//!
//! Validated reports are filed in the same transaction that locks the
//! reported member, applies the warning rule, and appends the history row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::exists;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;

use crate::domain::ports::{ReportRepository, ReportRepositoryError, WarningRecorded};
use crate::domain::{
    BlockThreshold, Member, MemberId, Page, PageRequest, Report, ReportId, ReportReason,
    ReportReview, ReportStatus,
};

use super::error_mapping::{
    Failure, TxError, classify, decode_failure, impl_from_failure, pool_failure,
};
use super::models::{
    MemberRow, NewReportRow, NewWarningRow, ReportReviewUpdate, ReportRow, TrustUpdate,
};
use super::paging::{total, window};
use super::pool::DbPool;
use super::schema::{member_warnings, members, reports};

impl_from_failure!(ReportRepositoryError, duplicate);

/// Diesel implementation of the report repository port.
#[derive(Clone)]
pub struct DieselReportRepository {
    pool: DbPool,
}

impl DieselReportRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn decode(row: ReportRow) -> Result<Report, Failure> {
    Report::try_from(row).map_err(decode_failure)
}

fn decode_page(
    rows: Vec<ReportRow>,
    page: PageRequest,
    count: i64,
) -> Result<Page<Report>, ReportRepositoryError> {
    let items = rows.into_iter().map(decode).collect::<Result<Vec<_>, _>>()?;
    Ok(Page::from_window(items, page, total(count)))
}

#[async_trait]
impl ReportRepository for DieselReportRepository {
    async fn insert(&self, report: &Report) -> Result<(), ReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        diesel::insert_into(reports::table)
            .values(NewReportRow::from(report))
            .execute(&mut conn)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn file_with_warning(
        &self,
        report: &Report,
        threshold: BlockThreshold,
        now: DateTime<Utc>,
    ) -> Result<Option<WarningRecorded>, ReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        let row = NewReportRow::from(report);
        let member_id = *report.reported_id.as_uuid();
        let report_id = *report.id.as_uuid();
        let recorded = conn
            .transaction::<_, TxError, _>(|conn| {
                async move {
                    let Some(member_row) = members::table
                        .find(member_id)
                        .select(MemberRow::as_select())
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?
                    else {
                        return Ok(None);
                    };
                    diesel::insert_into(reports::table)
                        .values(row)
                        .execute(conn)
                        .await?;
                    let mut member = Member::try_from(member_row)?;
                    let outcome = member.trust.record_warning(threshold, now);
                    diesel::update(members::table.find(member_id))
                        .set(TrustUpdate::from(&member.trust))
                        .execute(conn)
                        .await?;
                    diesel::insert_into(member_warnings::table)
                        .values(NewWarningRow {
                            member_id,
                            report_id,
                            recorded_at: now,
                        })
                        .execute(conn)
                        .await?;
                    Ok(Some(WarningRecorded { member, outcome }))
                }
                .scope_boxed()
            })
            .await
            .map_err(Failure::from)?;
        Ok(recorded)
    }

    async fn find(&self, id: ReportId) -> Result<Option<Report>, ReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        let row = reports::table
            .find(*id.as_uuid())
            .select(ReportRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(classify)?;
        Ok(row.map(decode).transpose()?)
    }

    async fn exists(
        &self,
        reported: MemberId,
        reporter: MemberId,
        reason: ReportReason,
    ) -> Result<bool, ReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        let found = diesel::select(exists(
            reports::table
                .filter(reports::reported_id.eq(*reported.as_uuid()))
                .filter(reports::reporter_id.eq(*reporter.as_uuid()))
                .filter(reports::reason.eq(reason.as_str())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(classify)?;
        Ok(found)
    }

    async fn save_review(
        &self,
        id: ReportId,
        review: &ReportReview,
    ) -> Result<Option<Report>, ReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        let changes = ReportReviewUpdate {
            status: review.status.as_str(),
            reviewed_by: Some(*review.reviewer.as_uuid()),
            reviewed_at: Some(review.reviewed_at),
            review_notes: review.notes.as_deref(),
        };
        let row = diesel::update(reports::table.find(*id.as_uuid()))
            .set(changes)
            .returning(ReportRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(classify)?;
        Ok(row.map(decode).transpose()?)
    }

    async fn list(
        &self,
        status: Option<ReportStatus>,
        page: PageRequest,
    ) -> Result<Page<Report>, ReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        let (limit, offset) = window(page);
        let scoped = || -> reports::BoxedQuery<'static, Pg> {
            let mut query = reports::table.into_boxed();
            if let Some(status) = status {
                query = query.filter(reports::status.eq(status.as_str()));
            }
            query
        };
        let count: i64 = scoped()
            .count()
            .get_result(&mut conn)
            .await
            .map_err(classify)?;
        let rows = scoped()
            .order((reports::created_at.desc(), reports::id.desc()))
            .limit(limit)
            .offset(offset)
            .select(ReportRow::as_select())
            .load(&mut conn)
            .await
            .map_err(classify)?;
        decode_page(rows, page, count)
    }

    async fn list_against(
        &self,
        reported: MemberId,
        page: PageRequest,
    ) -> Result<Page<Report>, ReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        let reported = *reported.as_uuid();
        let (limit, offset) = window(page);
        let count: i64 = reports::table
            .filter(reports::reported_id.eq(reported))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(classify)?;
        let rows = reports::table
            .filter(reports::reported_id.eq(reported))
            .order((reports::created_at.desc(), reports::id.desc()))
            .limit(limit)
            .offset(offset)
            .select(ReportRow::as_select())
            .load(&mut conn)
            .await
            .map_err(classify)?;
        decode_page(rows, page, count)
    }
}
