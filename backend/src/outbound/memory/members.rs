//! Member and trust ledger storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{MemoryStore, newest_first};
use crate::domain::ports::{MemberRepository, MemberRepositoryError, TrustReset};
use crate::domain::{
    Member, MemberId, Page, PageRequest, ResetOptions, Role, VerifiedIdentity, WarningEntry,
};

fn poisoned(err: super::StorePoisoned) -> MemberRepositoryError {
    MemberRepositoryError::query(err.to_string())
}

#[async_trait]
impl MemberRepository for MemoryStore {
    async fn find(&self, id: MemberId) -> Result<Option<Member>, MemberRepositoryError> {
        let state = self.lock().map_err(poisoned)?;
        Ok(state.members.get(&id).cloned())
    }

    async fn upsert_identity(
        &self,
        identity: &VerifiedIdentity,
        now: DateTime<Utc>,
    ) -> Result<Member, MemberRepositoryError> {
        let mut state = self.lock().map_err(poisoned)?;
        let member = state
            .members
            .entry(identity.member_id)
            .and_modify(|existing| {
                existing.display_name.clone_from(&identity.display_name);
                existing.role = identity.role;
                existing.is_active = identity.is_active;
            })
            .or_insert_with(|| Member::from_identity(identity, now));
        Ok(member.clone())
    }

    async fn list_ids_by_role(&self, role: Role) -> Result<Vec<MemberId>, MemberRepositoryError> {
        let state = self.lock().map_err(poisoned)?;
        let mut ids: Vec<MemberId> = state
            .members
            .values()
            .filter(|member| member.role == role && member.is_active)
            .map(|member| member.id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn increment_help_count(&self, id: MemberId) -> Result<(), MemberRepositoryError> {
        let mut state = self.lock().map_err(poisoned)?;
        if let Some(member) = state.members.get_mut(&id) {
            member.help_count = member.help_count.saturating_add(1);
        }
        Ok(())
    }

    async fn reset_trust(
        &self,
        id: MemberId,
        options: ResetOptions,
    ) -> Result<Option<TrustReset>, MemberRepositoryError> {
        let mut state = self.lock().map_err(poisoned)?;
        let Some(member) = state.members.get_mut(&id) else {
            return Ok(None);
        };
        let unblocked = member.trust.reset(options);
        let member = member.clone();
        if options.reset_count {
            state.warnings.retain(|entry| entry.member_id != id);
        }
        Ok(Some(TrustReset { member, unblocked }))
    }

    async fn warning_history(
        &self,
        id: MemberId,
    ) -> Result<Vec<WarningEntry>, MemberRepositoryError> {
        let state = self.lock().map_err(poisoned)?;
        let mut entries: Vec<WarningEntry> = state
            .warnings
            .iter()
            .filter(|entry| entry.member_id == id)
            .cloned()
            .collect();
        newest_first(&mut entries, |entry| (entry.recorded_at, entry.report_id));
        Ok(entries)
    }

    async fn list_blocked(&self, page: PageRequest) -> Result<Page<Member>, MemberRepositoryError> {
        let state = self.lock().map_err(poisoned)?;
        let mut blocked: Vec<Member> = state
            .members
            .values()
            .filter(|member| member.trust.is_blocked)
            .cloned()
            .collect();
        newest_first(&mut blocked, |member| (member.trust.blocked_at, member.id));
        Ok(Page::from_ordered(blocked, page))
    }

    async fn list_at_risk(
        &self,
        threshold: u32,
        page: PageRequest,
    ) -> Result<Page<Member>, MemberRepositoryError> {
        let state = self.lock().map_err(poisoned)?;
        let mut at_risk: Vec<Member> = state
            .members
            .values()
            .filter(|member| !member.trust.is_blocked && member.trust.warning_count >= threshold)
            .cloned()
            .collect();
        newest_first(&mut at_risk, |member| (member.trust.warning_count, member.id));
        Ok(Page::from_ordered(at_risk, page))
    }
}
