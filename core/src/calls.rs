//! Sequencing policies: mapping the Nth invocation to an expected call.
//!
//! # Design
//! A closed two-variant enum rather than a trait: exactly these two behaviors
//! exist and nothing suggests a third is coming. Both
//! operations are pure functions of the invocation count, so the policy needs
//! no locking; the harness owns the atomic counter.

use crate::call::Call;

/// Strategy deciding which [`Call`] answers a given 1-based invocation number
/// and whether a total invocation count satisfies the policy.
#[derive(Debug, Clone)]
pub enum Calls {
    /// An ordered list: invocation `n` answers with element `n - 1`,
    /// invocations beyond the list are unanswered.
    Sequence(Vec<Call>),

    /// A fixed list cycled by `(n - 1) % len`. An empty list never answers.
    Static(Vec<Call>),
}

impl Calls {
    /// The call answering invocation `called_times`, if any.
    ///
    /// The minimum invocation number is 1; 0 yields `None`.
    pub fn call(&self, called_times: u64) -> Option<&Call> {
        let index = called_times.checked_sub(1)? as usize;

        match self {
            Calls::Sequence(calls) => calls.get(index),
            Calls::Static(calls) => {
                if calls.is_empty() {
                    return None;
                }

                calls.get(index % calls.len())
            }
        }
    }

    /// Whether `called_times` completed invocations satisfy every expected
    /// call.
    ///
    /// A sequence is done exactly when the count equals its length (an empty
    /// sequence is trivially done). A static policy is always done:
    /// repetition has no notion of incompleteness.
    pub fn done(&self, called_times: u64) -> bool {
        match self {
            Calls::Sequence(calls) => calls.is_empty() || called_times == calls.len() as u64,
            Calls::Static(_) => true,
        }
    }
}
