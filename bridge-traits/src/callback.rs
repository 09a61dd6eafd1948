//! Designated callback context
//!
//! Operation results are computed on worker threads but must be handed to the
//! caller on one designated execution context (a UI thread, an event loop, a
//! dedicated dispatcher thread). Hosts provide that context by implementing
//! [`CallbackContext`].

/// A unit of work to run on the callback context.
pub type CallbackJob = Box<dyn FnOnce() + Send + 'static>;

/// Execution context that runs posted jobs, in posting order, on the host's
/// designated thread.
///
/// `post` must never block on the job itself and must never run it inline on
/// the posting thread.
pub trait CallbackContext: Send + Sync {
    fn post(&self, job: CallbackJob);
}
