//! Module-tagged log stream.
//!
//! Each line is `[+] [module    ] message` on stderr. The `[+]` stream
//! compiles to a no-op sink unless the `log-output` feature is enabled; the
//! `[!]` critical stream always writes.

#[doc(hidden)]
pub fn write_line(critical: bool, module: &str, args: std::fmt::Arguments<'_>) {
    let leading = if critical { '!' } else { '+' };
    eprintln!("[{}] [{:<10}] {}", leading, module, args);
}

/// Informational line, tagged with a module identifier.
#[macro_export]
macro_rules! log {
    ($module:expr, $($arg:tt)*) => {
        if cfg!(feature = "log-output") {
            $crate::logger::write_line(false, $module, format_args!($($arg)*));
        }
    };
}

/// Critical line; always written.
#[macro_export]
macro_rules! elog {
    ($module:expr, $($arg:tt)*) => {
        $crate::logger::write_line(true, $module, format_args!($($arg)*));
    };
}
