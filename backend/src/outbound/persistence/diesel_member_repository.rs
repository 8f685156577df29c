//! PostgreSQL-backed `MemberRepository` and trust ledger.
//!
//! Resets lock the member row, apply the domain rule, and write the
//! counters and history in one transaction. Warnings take the same lock from
//! the report repository, alongside the report insert.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use uuid::Uuid;

use crate::domain::ports::{MemberRepository, MemberRepositoryError, TrustReset};
use crate::domain::{
    Member, MemberId, Page, PageRequest, ResetOptions, Role, VerifiedIdentity, WarningEntry,
};

use super::error_mapping::{
    Failure, TxError, classify, decode_failure, impl_from_failure, pool_failure,
};
use super::models::{MemberRow, NewMemberRow, TrustUpdate, WarningRow, to_column};
use super::paging::{total, window};
use super::pool::DbPool;
use super::schema::{member_warnings, members};

impl_from_failure!(MemberRepositoryError);

/// Diesel implementation of the member repository port.
#[derive(Clone)]
pub struct DieselMemberRepository {
    pool: DbPool,
}

impl DieselMemberRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn decode(row: MemberRow) -> Result<Member, Failure> {
    Member::try_from(row).map_err(decode_failure)
}

fn decode_page(
    rows: Vec<MemberRow>,
    page: PageRequest,
    count: i64,
) -> Result<Page<Member>, MemberRepositoryError> {
    let items = rows.into_iter().map(decode).collect::<Result<Vec<_>, _>>()?;
    Ok(Page::from_window(items, page, total(count)))
}

#[async_trait]
impl MemberRepository for DieselMemberRepository {
    async fn find(&self, id: MemberId) -> Result<Option<Member>, MemberRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        let row = members::table
            .find(*id.as_uuid())
            .select(MemberRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(classify)?;
        Ok(row.map(decode).transpose()?)
    }

    async fn upsert_identity(
        &self,
        identity: &VerifiedIdentity,
        now: DateTime<Utc>,
    ) -> Result<Member, MemberRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        let row = diesel::insert_into(members::table)
            .values(NewMemberRow {
                id: *identity.member_id.as_uuid(),
                display_name: &identity.display_name,
                role: identity.role.as_str(),
                is_active: identity.is_active,
                created_at: now,
            })
            .on_conflict(members::id)
            .do_update()
            .set((
                members::display_name.eq(excluded(members::display_name)),
                members::role.eq(excluded(members::role)),
                members::is_active.eq(excluded(members::is_active)),
            ))
            .returning(MemberRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(classify)?;
        Ok(decode(row)?)
    }

    async fn list_ids_by_role(&self, role: Role) -> Result<Vec<MemberId>, MemberRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        let ids: Vec<Uuid> = members::table
            .filter(members::role.eq(role.as_str()))
            .filter(members::is_active.eq(true))
            .order(members::id.asc())
            .select(members::id)
            .load(&mut conn)
            .await
            .map_err(classify)?;
        Ok(ids.into_iter().map(MemberId::from_uuid).collect())
    }

    async fn increment_help_count(&self, id: MemberId) -> Result<(), MemberRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        diesel::update(members::table.find(*id.as_uuid()))
            .set(members::help_count.eq(members::help_count + 1))
            .execute(&mut conn)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn reset_trust(
        &self,
        id: MemberId,
        options: ResetOptions,
    ) -> Result<Option<TrustReset>, MemberRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        let member_id = *id.as_uuid();
        let reset = conn
            .transaction::<_, TxError, _>(|conn| {
                async move {
                    let Some(row) = members::table
                        .find(member_id)
                        .select(MemberRow::as_select())
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?
                    else {
                        return Ok(None);
                    };
                    let mut member = Member::try_from(row)?;
                    let unblocked = member.trust.reset(options);
                    diesel::update(members::table.find(member_id))
                        .set(TrustUpdate::from(&member.trust))
                        .execute(conn)
                        .await?;
                    if options.reset_count {
                        diesel::delete(
                            member_warnings::table
                                .filter(member_warnings::member_id.eq(member_id)),
                        )
                        .execute(conn)
                        .await?;
                    }
                    Ok(Some(TrustReset { member, unblocked }))
                }
                .scope_boxed()
            })
            .await
            .map_err(Failure::from)?;
        Ok(reset)
    }

    async fn warning_history(
        &self,
        id: MemberId,
    ) -> Result<Vec<WarningEntry>, MemberRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        let rows: Vec<WarningRow> = member_warnings::table
            .filter(member_warnings::member_id.eq(*id.as_uuid()))
            .order((member_warnings::recorded_at.desc(), member_warnings::id.desc()))
            .select(WarningRow::as_select())
            .load(&mut conn)
            .await
            .map_err(classify)?;
        Ok(rows.into_iter().map(WarningEntry::from).collect())
    }

    async fn list_blocked(&self, page: PageRequest) -> Result<Page<Member>, MemberRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        let (limit, offset) = window(page);
        let count: i64 = members::table
            .filter(members::is_blocked.eq(true))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(classify)?;
        let rows = members::table
            .filter(members::is_blocked.eq(true))
            .order((members::blocked_at.desc(), members::id.desc()))
            .limit(limit)
            .offset(offset)
            .select(MemberRow::as_select())
            .load(&mut conn)
            .await
            .map_err(classify)?;
        decode_page(rows, page, count)
    }

    async fn list_at_risk(
        &self,
        threshold: u32,
        page: PageRequest,
    ) -> Result<Page<Member>, MemberRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        let threshold = to_column(threshold);
        let (limit, offset) = window(page);
        let count: i64 = members::table
            .filter(members::is_blocked.eq(false))
            .filter(members::warning_count.ge(threshold))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(classify)?;
        let rows = members::table
            .filter(members::is_blocked.eq(false))
            .filter(members::warning_count.ge(threshold))
            .order((members::warning_count.desc(), members::id.desc()))
            .limit(limit)
            .offset(offset)
            .select(MemberRow::as_select())
            .load(&mut conn)
            .await
            .map_err(classify)?;
        decode_page(rows, page, count)
    }
}
