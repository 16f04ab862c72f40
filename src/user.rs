use std::collections::HashMap;

use nix::unistd::{self, Uid as NixUid};

use crate::process::Uid;

//Represents the user the process list is filtered for.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uid,
    pub name: String,
}

impl User {
    /// The user this program runs as.
    pub fn current() -> Self {
        let id = unistd::getuid().as_raw();
        User {
            id,
            name: lookup_name(id).unwrap_or_else(|| id.to_string()),
        }
    }

    pub fn is_root(&self) -> bool {
        self.id == 0
    }
}

fn lookup_name(uid: Uid) -> Option<String> {
    unistd::User::from_uid(NixUid::from_raw(uid))
        .ok()
        .flatten()
        .map(|user| user.name)
}

/// Memoizes passwd lookups; a refresh touches every process and most of
/// them share a handful of owners.
#[derive(Debug, Default)]
pub struct UserNameCache {
    names: HashMap<Uid, String>,
}

impl UserNameCache {
    pub fn name(&mut self, uid: Uid) -> String {
        self.names
            .entry(uid)
            .or_insert_with(|| lookup_name(uid).unwrap_or_else(|| uid.to_string()))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_has_a_name() {
        let mut cache = UserNameCache::default();
        assert_eq!(cache.name(0), "root");
        let root = User {
            id: 0,
            name: "root".to_string(),
        };
        assert!(root.is_root());
    }

    #[test]
    fn unknown_uid_falls_back_to_number() {
        let mut cache = UserNameCache::default();
        assert_eq!(cache.name(4_000_000_000), "4000000000");
    }

    #[test]
    fn current_matches_getuid() {
        let me = User::current();
        assert_eq!(me.id, unistd::getuid().as_raw());
        assert!(!me.name.is_empty());
    }
}
