/// Domain-aware logging macros.
///
/// Each macro injects a `domain` field so log consumers can filter by
/// subsystem. Domains: `sys` (startup/shutdown), `conf` (config and
/// document loading), `pipe` (filter/rule/projection), `res` (files and
/// sinks).
///
/// ```ignore
/// pr_info!(sys, records = 120, "workspace loaded");
/// pr_warn!(pipe, record = %id, error = %e, "action skipped");
/// ```
///
/// The domain is a bare identifier, not a string.

#[doc(hidden)]
macro_rules! pr_log {
    ($level:ident, $domain:ident, $($field:tt)*) => {
        tracing::$level!(domain = stringify!($domain), $($field)*)
    };
}

#[allow(unused_macros)]
macro_rules! pr_error {
    ($domain:ident, $($rest:tt)*) => {
        pr_log!(error, $domain, $($rest)*)
    };
}

macro_rules! pr_warn {
    ($domain:ident, $($rest:tt)*) => {
        pr_log!(warn, $domain, $($rest)*)
    };
}

macro_rules! pr_info {
    ($domain:ident, $($rest:tt)*) => {
        pr_log!(info, $domain, $($rest)*)
    };
}

macro_rules! pr_debug {
    ($domain:ident, $($rest:tt)*) => {
        pr_log!(debug, $domain, $($rest)*)
    };
}

#[allow(unused_macros)]
macro_rules! pr_trace {
    ($domain:ident, $($rest:tt)*) => {
        pr_log!(trace, $domain, $($rest)*)
    };
}
