use crate::error::{GristError, Result};
use crate::model::{sort_key, User};
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::thread;

/// Run `task` once per item, each on its own scoped thread, and return the results in
/// input order.
///
/// Every thread writes only its own join slot, so no collection is shared while the
/// tasks run. The call returns after all threads have joined.
pub fn fan_out<T, R, F>(items: &[T], task: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
{
    let task = &task;
    thread::scope(|scope| {
        let handles: Vec<_> = items
            .iter()
            .map(|item| scope.spawn(move || task(item)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|p| panic::resume_unwind(p)))
            .collect()
    })
}

/// Shared cancellation for a fan-out.
///
/// The first fatal error raises the flag and is kept; siblings skip requests they have
/// not started yet. In-flight requests finish or time out on their own.
#[derive(Default)]
pub struct Abort {
    raised: AtomicBool,
    cause: Mutex<Option<GristError>>,
}

impl Abort {
    /// `None` when the fan-out is aborted (before or because of this call).
    pub fn run<T>(&self, call: impl FnOnce() -> Result<T>) -> Option<Result<T>> {
        if self.raised.load(Ordering::SeqCst) {
            return None;
        }
        match call() {
            Err(e) if e.is_fatal() => {
                let mut cause = self.cause.lock().unwrap_or_else(|p| p.into_inner());
                if cause.is_none() {
                    *cause = Some(e);
                }
                self.raised.store(true, Ordering::SeqCst);
                None
            }
            other => Some(other),
        }
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }

    /// Surface the recorded fatal error, if any.
    pub fn check(self) -> Result<()> {
        match self.cause.into_inner().unwrap_or_else(|p| p.into_inner()) {
            Some(cause) => Err(cause),
            None => Ok(()),
        }
    }
}

/// Drop entries that carry no access at all and order the rest by email.
pub fn visible_users(users: Vec<User>, direct_only: bool) -> Vec<User> {
    let mut users: Vec<User> = users
        .into_iter()
        .filter(|u| {
            if direct_only {
                u.has_direct_access()
            } else {
                u.has_any_access()
            }
        })
        .collect();
    users.sort_by_key(|u| sort_key(&u.email));
    users
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AccessLevel;
    use std::time::{Duration, Instant};

    #[test]
    fn fan_out_keeps_input_order() {
        let items = vec![30u64, 0, 15];
        let out = fan_out(&items, |ms| {
            thread::sleep(Duration::from_millis(*ms));
            *ms * 2
        });
        assert_eq!(out, vec![60, 0, 30]);
    }

    #[test]
    fn fan_out_runs_concurrently() {
        let items = vec![(); 5];
        let started = Instant::now();
        fan_out(&items, |_| thread::sleep(Duration::from_millis(150)));
        assert!(started.elapsed() < Duration::from_millis(600));
    }

    #[test]
    fn abort_keeps_first_fatal_error_and_skips_later_calls() {
        let abort = Abort::default();
        let ok = abort.run(|| Ok(1));
        assert!(matches!(ok, Some(Ok(1))));

        let non_fatal = abort.run::<()>(|| Err(GristError::InvalidInput("x".into())));
        assert!(matches!(non_fatal, Some(Err(_))));
        assert!(!abort.is_raised());

        let fatal = abort.run::<()>(|| {
            Err(GristError::Transport {
                path: "orgs".into(),
                reason: "refused".into(),
            })
        });
        assert!(fatal.is_none());
        assert!(abort.is_raised());

        let mut called = false;
        assert!(abort
            .run(|| {
                called = true;
                Ok(())
            })
            .is_none());
        assert!(!called);

        assert_eq!(abort.check().unwrap_err().kind(), "transport");
    }

    #[test]
    fn visible_users_filters_and_sorts() {
        let user = |email: &str, access: Option<AccessLevel>, parent: Option<AccessLevel>| User {
            email: email.into(),
            access,
            parent_access: parent,
            ..User::default()
        };
        let users = vec![
            user("zed@x.org", Some(AccessLevel::Owners), None),
            user("Bob@x.org", None, Some(AccessLevel::Viewers)),
            user("nobody@x.org", None, None),
            user("amy@x.org", Some(AccessLevel::Editors), None),
        ];

        let any: Vec<_> = visible_users(users.clone(), false)
            .into_iter()
            .map(|u| u.email)
            .collect();
        assert_eq!(any, vec!["amy@x.org", "Bob@x.org", "zed@x.org"]);

        let direct: Vec<_> = visible_users(users, true)
            .into_iter()
            .map(|u| u.email)
            .collect();
        assert_eq!(direct, vec!["amy@x.org", "zed@x.org"]);
    }
}
