//! Operator-facing status macros.
//!
//! One-line run outcomes go through their own `conncheck::status` target so
//! front ends can filter and format them independently of diagnostic output.

/// Reports a completed operation to the operator.
#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        $crate::tracing::info!(target: "conncheck::status", $($arg)*)
    };
}
