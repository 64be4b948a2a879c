//! In-memory user directory.
//!
//! The directory owns the canonical ordered list of users for the lifetime
//! of the session. All mutation goes through the methods here; callers are
//! expected to validate input (see `validate`) before committing an add or
//! an update.

use anyhow::{anyhow, Result};
use serde::Serialize;

use crate::validate::UserInput;

/// Cosmetic avatar tags, assigned round-robin by id at creation.
const AVATARS: &[&str] = &[
    "👨‍💻", "👩‍💻", "👨‍🎓", "👩‍🎓", "👨‍💼", "👩‍💼", "👨‍🔧", "👩‍🔧", "👨‍🍳", "👩‍🍳",
];

/// One directory record. `id` and `avatar` are fixed at creation; only
/// `name` and `email` change on update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub avatar: String,
}

pub struct Directory {
    users: Vec<User>,
}

impl Directory {
    pub fn new() -> Self {
        Self { users: Vec::new() }
    }

    /// Build a directory from a seed list, preserving the given ids and
    /// order. Seed entries are assumed to already satisfy the invariants
    /// (config validation enforces this before we get here).
    pub fn with_seed(seed: Vec<User>) -> Self {
        Self { users: seed }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn get(&self, id: u64) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Next id is max(existing) + 1, or 1 for an empty directory. Not a
    /// monotonic counter: deleting the max-id user frees that id for the
    /// next add.
    fn next_id(&self) -> u64 {
        self.users.iter().map(|u| u.id).max().unwrap_or(0) + 1
    }

    /// Append a new user. Input must have passed validation; this layer
    /// has no error path. Returns the created record.
    pub fn add(&mut self, input: UserInput) -> User {
        let id = self.next_id();
        let user = User {
            id,
            name: input.name.trim().to_string(),
            email: input.email.trim().to_string(),
            avatar: AVATARS[(id as usize - 1) % AVATARS.len()].to_string(),
        };
        self.users.push(user.clone());
        user
    }

    /// Replace name/email on the user with `id`, keeping its position and
    /// avatar. An unknown id is a caller bug, reported as an error rather
    /// than silently ignored.
    pub fn update(&mut self, id: u64, input: UserInput) -> Result<User> {
        let user = self
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| anyhow!("no user with id {}", id))?;
        user.name = input.name.trim().to_string();
        user.email = input.email.trim().to_string();
        Ok(user.clone())
    }

    /// Remove the user with `id` if present. Removing an unknown id is a
    /// no-op; the return value says whether anything was removed.
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.users.len();
        self.users.retain(|u| u.id != id);
        self.users.len() != before
    }

    /// The filtered view: users whose name or email contains `query` as a
    /// case-insensitive substring, in insertion order. An empty (or
    /// whitespace-only) query yields the whole directory.
    pub fn search(&self, query: &str) -> Vec<&User> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.users.iter().collect();
        }
        self.users
            .iter()
            .filter(|u| {
                u.name.to_lowercase().contains(&query) || u.email.to_lowercase().contains(&query)
            })
            .collect()
    }
}

impl Default for Directory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, email: &str) -> UserInput {
        UserInput {
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    fn seeded() -> Directory {
        Directory::with_seed(crate::config::Config::default().seed_users())
    }

    #[test]
    fn test_add_assigns_unique_ids() {
        let mut dir = Directory::new();
        let a = dir.add(input("Ann", "ann@example.com"));
        let b = dir.add(input("Ben", "ben@example.com"));
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(dir.len(), 2);
    }

    #[test]
    fn test_add_trims_fields() {
        let mut dir = Directory::new();
        let u = dir.add(input("  Ann  ", " ann@example.com "));
        assert_eq!(u.name, "Ann");
        assert_eq!(u.email, "ann@example.com");
    }

    #[test]
    fn test_add_reuses_freed_max_id() {
        let mut dir = Directory::new();
        dir.add(input("Ann", "ann@example.com"));
        dir.add(input("Ben", "ben@example.com"));
        assert!(dir.remove(2));
        let c = dir.add(input("Cal", "cal@example.com"));
        assert_eq!(c.id, 2);
    }

    #[test]
    fn test_add_after_removing_middle_id() {
        let mut dir = Directory::new();
        dir.add(input("Ann", "ann@example.com"));
        dir.add(input("Ben", "ben@example.com"));
        dir.add(input("Cal", "cal@example.com"));
        dir.remove(2);
        // Max id is still 3, so the next add gets 4, not 2.
        let d = dir.add(input("Dee", "dee@example.com"));
        assert_eq!(d.id, 4);
    }

    #[test]
    fn test_update_changes_only_target_fields() {
        let mut dir = seeded();
        let avatars: Vec<String> = dir.users().iter().map(|u| u.avatar.clone()).collect();
        let before: Vec<User> = dir.users().to_vec();

        let updated = dir
            .update(3, input("Priya S", "priya.s@example.com"))
            .unwrap();
        assert_eq!(updated.id, 3);
        assert_eq!(updated.name, "Priya S");
        assert_eq!(updated.avatar, avatars[2]);

        for (i, u) in dir.users().iter().enumerate() {
            assert_eq!(u.id, before[i].id, "order must be preserved");
            if u.id != 3 {
                assert_eq!(*u, before[i]);
            }
        }
    }

    #[test]
    fn test_update_unknown_id_is_error() {
        let mut dir = seeded();
        let err = dir.update(99, input("X", "x@y.zz")).unwrap_err();
        assert!(err.to_string().contains("99"));
        assert_eq!(dir.len(), 4);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut dir = seeded();
        assert!(dir.remove(2));
        let after_once: Vec<User> = dir.users().to_vec();
        assert!(!dir.remove(2));
        assert_eq!(dir.users(), after_once.as_slice());
    }

    #[test]
    fn test_search_empty_query_is_identity() {
        let dir = seeded();
        let all = dir.search("");
        assert_eq!(all.len(), 4);
        let ids: Vec<u64> = all.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        // Whitespace-only behaves the same.
        assert_eq!(dir.search("   ").len(), 4);
    }

    #[test]
    fn test_search_is_case_insensitive_over_name_and_email() {
        let dir = seeded();
        assert_eq!(dir.search("PRIYA").len(), 1);
        assert_eq!(dir.search("gmail.COM").len(), 4);
        assert_eq!(dir.search("ra").len(), 2); // Praveen, Rahul
        assert!(dir.search("nobody").is_empty());
    }

    #[test]
    fn test_end_to_end_seed_scenario() {
        let mut dir = seeded();
        let before: Vec<User> = dir.users().to_vec();

        let zoe = dir.add(input("Zoe", "zoe@x.com"));
        assert_eq!(zoe.id, 5);
        assert_eq!(dir.len(), 5);

        assert!(dir.remove(5));
        assert_eq!(dir.users(), before.as_slice());

        let hits = dir.search("priya");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Priya");
    }
}
