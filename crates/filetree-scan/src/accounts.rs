//! Cached user and group name resolution.

use std::collections::HashMap;

use compact_str::CompactString;
use filetree_core::Account;

/// Resolves numeric uids and gids to names, caching every answer.
///
/// Trees are usually owned by a handful of accounts, so each id hits the
/// account database once per scan. Ids without an entry resolve to
/// [`Account::Id`].
#[derive(Debug, Default)]
pub struct AccountCache {
    users: HashMap<u32, Account>,
    groups: HashMap<u32, Account>,
}

impl AccountCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the owner name for a uid.
    pub fn user(&mut self, uid: u32) -> Account {
        self.users
            .entry(uid)
            .or_insert_with(|| to_account(lookup_user(uid), uid))
            .clone()
    }

    /// Resolve the group name for a gid.
    pub fn group(&mut self, gid: u32) -> Account {
        self.groups
            .entry(gid)
            .or_insert_with(|| to_account(lookup_group(gid), gid))
            .clone()
    }

    /// Number of distinct ids looked up so far.
    pub fn len(&self) -> usize {
        self.users.len() + self.groups.len()
    }

    /// Check if nothing has been looked up.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.groups.is_empty()
    }
}

fn to_account(name: Option<CompactString>, id: u32) -> Account {
    name.map(Account::Name).unwrap_or(Account::Id(id))
}

#[cfg(unix)]
fn lookup_user(uid: u32) -> Option<CompactString> {
    use nix::unistd::{Uid, User};

    match User::from_uid(Uid::from_raw(uid)) {
        Ok(user) => user.map(|u| CompactString::from(u.name)),
        Err(err) => {
            tracing::debug!(target: "filetree::accounts", uid, %err, "user lookup failed");
            None
        }
    }
}

#[cfg(unix)]
fn lookup_group(gid: u32) -> Option<CompactString> {
    use nix::unistd::{Gid, Group};

    match Group::from_gid(Gid::from_raw(gid)) {
        Ok(group) => group.map(|g| CompactString::from(g.name)),
        Err(err) => {
            tracing::debug!(target: "filetree::accounts", gid, %err, "group lookup failed");
            None
        }
    }
}

#[cfg(not(unix))]
fn lookup_user(_uid: u32) -> Option<CompactString> {
    None // No account database to consult
}

#[cfg(not(unix))]
fn lookup_group(_gid: u32) -> Option<CompactString> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    // Far above any id a distribution hands out.
    const UNKNOWN_ID: u32 = 3_999_999_999;

    #[test]
    fn test_unknown_uid_falls_back_to_number() {
        let mut cache = AccountCache::new();
        assert_eq!(cache.user(UNKNOWN_ID), Account::Id(UNKNOWN_ID));
        assert_eq!(cache.group(UNKNOWN_ID), Account::Id(UNKNOWN_ID));
    }

    #[cfg(unix)]
    #[test]
    fn test_root_resolves_to_name() {
        let mut cache = AccountCache::new();
        assert_eq!(cache.user(0).name(), Some("root"));
    }

    #[test]
    fn test_lookups_are_cached() {
        let mut cache = AccountCache::new();
        assert!(cache.is_empty());

        cache.user(UNKNOWN_ID);
        cache.user(UNKNOWN_ID);
        cache.group(UNKNOWN_ID);

        assert_eq!(cache.len(), 2);
    }
}
