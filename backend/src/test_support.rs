//! Test utilities for the backend crate.
//!
//! Shared helpers for both unit tests (in `src/`) and integration tests (in
//! `tests/`). Compiled only for tests or when the `test-support` feature is
//! enabled.

use crate::domain::ports::fixtures::FixtureStore;
use crate::domain::{User, Username};

pub use crate::inbound::http::test_utils::{fixture_app, login_cookie, test_session_middleware};

/// Seed a fixture store with one user per name, password `"password"`.
///
/// Returns the store and the seeded identities in the given order.
///
/// # Panics
///
/// Panics when a name fails username validation; test inputs are expected to
/// be valid.
pub fn seeded_store(usernames: &[&str]) -> (FixtureStore, Vec<User>) {
    let store = FixtureStore::new();
    let users = usernames
        .iter()
        .map(|name| {
            store.seed_user(
                Username::new(*name).expect("valid username"),
                format!("{name}@example.net"),
                "password",
            )
        })
        .collect();
    (store, users)
}
