// LVALUE LOGGING MACROS
#[macro_export]
#[cfg(feature = "show_lvalue")]
macro_rules! lvalue_log {
    ($($arg:tt)*) => {
        saying::say!($($arg)*);
    };
}

#[macro_export]
#[cfg(not(feature = "show_lvalue"))]
macro_rules! lvalue_log {
    ($($arg:tt)*) => {
        // Nothing
    };
}
