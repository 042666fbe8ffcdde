//! Operation logging macros
//!
//! A mapper operation emits one `start` event and then exactly one of `end`
//! or `end_error`. Key names and event values come from
//! `dataaccess_core::schema`; callers append their own context fields
//! (`table = ..`, `rows = ..`) after the fixed ones.

#[doc(hidden)]
#[macro_export]
macro_rules! __log_op_event {
    ($level:expr, $op:expr, $event:expr, $($field:tt)*) => {
        $crate::__tracing::event!(
            $level,
            component = module_path!(),
            op = $op,
            event = $event,
            $($field)*
        )
    };
}

/// Operation entry
///
/// ```
/// # use dataaccess_core::log_op_start;
/// log_op_start!("count");
/// log_op_start!("count", table = "TestObject");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        $crate::__log_op_event!(
            $crate::__tracing::Level::INFO,
            $op,
            $crate::schema::EVENT_START,
            $($($field)*)?
        )
    };
}

/// Successful operation exit; `duration_ms` is mandatory
///
/// ```
/// # use dataaccess_core::log_op_end;
/// log_op_end!("count", duration_ms = 3);
/// log_op_end!("get", duration_ms = 3, rows = 2);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        $crate::__log_op_event!(
            $crate::__tracing::Level::INFO,
            $op,
            $crate::schema::EVENT_END,
            duration_ms = $duration,
            $($($field)*)?
        )
    };
}

/// Failed operation exit
///
/// `$err` is anything convertible into `DataError`. Outcomes whose kind is
/// expected (nothing matched, nothing affected) go out at info, everything
/// else at error.
///
/// ```
/// # use dataaccess_core::log_op_error;
/// # use dataaccess_core::{DataError, DataErrorKind};
/// let err = DataError::new(DataErrorKind::NotFound).with_message("no row");
/// log_op_error!("first", err, duration_ms = 1, table = "TestObject");
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let failure: $crate::errors::DataError = ($err).into();
        if failure.is_expected() {
            $crate::__log_op_event!(
                $crate::__tracing::Level::INFO,
                $op,
                $crate::schema::EVENT_END_ERROR,
                duration_ms = $duration,
                err.kind = ?failure.kind(),
                err.code = failure.code(),
                err.message = failure.message(),
                $($($field)*)?
            );
        } else {
            $crate::__log_op_event!(
                $crate::__tracing::Level::ERROR,
                $op,
                $crate::schema::EVENT_END_ERROR,
                duration_ms = $duration,
                err.kind = ?failure.kind(),
                err.code = failure.code(),
                err.message = failure.message(),
                $($($field)*)?
            );
        }
    }};
}
