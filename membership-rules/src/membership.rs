// SPDX-License-Identifier: MIT OR Apache-2.0

use tracing::debug;

use crate::error::RuleError;
use crate::item::MembershipId;
use crate::traits::{Membership, MembershipProvider};

/// Lazily loaded list of all memberships.
///
/// The list is fetched from the provider on first use and reused afterwards. Whoever creates or
/// deletes memberships has to call `invalidate` so the next lookup reloads it.
#[derive(Debug)]
pub struct MembershipCache<M> {
    memberships: Option<Vec<M>>,
}

impl<M> MembershipCache<M>
where
    M: Membership + Clone,
{
    pub fn new() -> Self {
        Self { memberships: None }
    }

    /// All memberships, loading them first if required.
    pub fn load<P>(&mut self, provider: &P) -> Result<&[M], RuleError>
    where
        P: MembershipProvider<Membership = M>,
    {
        if self.memberships.is_none() {
            let memberships = provider
                .memberships()
                .map_err(|err| RuleError::Collaborator(format!("{err:?}")))?;
            debug!(count = memberships.len(), "loaded memberships");
            self.memberships = Some(memberships);
        }

        Ok(self.memberships.as_deref().unwrap_or_default())
    }

    /// The base membership, `None` if no membership is marked as base.
    pub fn base<P>(&mut self, provider: &P) -> Result<Option<&M>, RuleError>
    where
        P: MembershipProvider<Membership = M>,
    {
        let memberships = self.load(provider)?;
        Ok(memberships.iter().find(|membership| membership.is_base()))
    }

    pub fn get<P>(&mut self, provider: &P, id: MembershipId) -> Result<Option<&M>, RuleError>
    where
        P: MembershipProvider<Membership = M>,
    {
        let memberships = self.load(provider)?;
        Ok(memberships.iter().find(|membership| membership.id() == id))
    }

    /// Drop the cached list.
    pub fn invalidate(&mut self) {
        debug!("invalidated membership cache");
        self.memberships = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.memberships.is_some()
    }
}

impl<M> Default for MembershipCache<M>
where
    M: Membership + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
