//! Event access rules as standalone predicates.
//!
//! Handlers and services call these instead of embedding the checks in query
//! builders, so every rule is testable in isolation:
//!
//! - mutation rule: only the organizer may write to an event
//! - visibility rule: public events are open; private events are readable by
//!   the organizer and invitees only
//!
//! The baseline rule that unauthenticated callers may only read is enforced
//! at the HTTP edge by requiring a session for every write endpoint.

use super::event::Event;
use super::user::UserId;

/// Mutation rule: may `caller` modify or delete `event`?
///
/// Reads never reach this predicate; every write path does.
pub fn can_modify(event: &Event, caller: &UserId) -> bool {
    event.organizer == *caller
}

/// Visibility rule: may `caller` (anonymous when `None`) read `event`?
pub fn can_view(event: &Event, caller: Option<&UserId>) -> bool {
    if event.is_public {
        return true;
    }
    let Some(caller) = caller else {
        return false;
    };
    event.organizer == *caller || event.invited_users.contains(caller)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::EventId;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    fn event(is_public: bool, organizer: UserId, invited: Vec<UserId>) -> Event {
        let start = Utc.with_ymd_and_hms(2030, 1, 1, 10, 0, 0).single().expect("valid");
        Event {
            id: EventId::random(),
            title: "Quarterly picnic".into(),
            description: String::new(),
            organizer,
            location: "Park".into(),
            start_time: start,
            end_time: start + chrono::Duration::hours(2),
            is_public,
            invited_users: invited,
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn only_the_organizer_may_modify() {
        let organizer = UserId::random();
        let other = UserId::random();
        let e = event(true, organizer, vec![other]);
        assert!(can_modify(&e, &organizer));
        assert!(!can_modify(&e, &other));
    }

    #[rstest]
    #[case::anonymous(None)]
    #[case::stranger(Some(UserId::random()))]
    fn public_events_are_visible_to_everyone(#[case] caller: Option<UserId>) {
        let e = event(true, UserId::random(), Vec::new());
        assert!(can_view(&e, caller.as_ref()));
    }

    #[test]
    fn private_events_admit_organizer_and_invitees_only() {
        let organizer = UserId::random();
        let invitee = UserId::random();
        let stranger = UserId::random();
        let e = event(false, organizer, vec![invitee]);

        assert!(can_view(&e, Some(&organizer)));
        assert!(can_view(&e, Some(&invitee)));
        assert!(!can_view(&e, Some(&stranger)));
        assert!(!can_view(&e, None));
    }
}
