/// Classification for retry policy.
///
/// Used by the recovery loop to decide what to do after a failed page fetch.
///
/// | Class | Retry same cursor? | Cycle outcome |
/// |-------|--------------------|---------------|
/// | `Never` | No | Error is propagated |
/// | `WithBackoff` | Yes, after the blocked backoff | Continues |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Never retry - the source returned something we cannot interpret.
    Never,

    /// Sleep the blocked backoff and request the same cursor again.
    ///
    /// Used for blocks, rate limiting, timeouts and socket failures.
    /// Retried without limit since the source is expected to recover.
    WithBackoff,
}
