#[doc(hidden)]
#[macro_export]
macro_rules! __hawthorn_trace_internal {
    ($trace_type:ident; $($element:expr),*) => {{
        #[cfg(feature = "tracing")]
        tracing::$trace_type!($($element),*);
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __hawthorn_trace {
    ($($element:expr),*) => {{
        $crate::__hawthorn_trace_internal!(trace; $($element),*)
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __hawthorn_trace_debug {
    ($($element:expr),*) => {{
        $crate::__hawthorn_trace_internal!(debug; $($element),*)
    }};
}
