//! Output macros for the KDK CLI.
//!
//! User-facing output goes through these macros so every crate writes to the
//! same streams. Templates live in the `kdk-messages` crate.

#[macro_export]
macro_rules! kdk_println {
    () => {
        println!();
    };
    ($($arg:tt)*) => {
        println!("{}", format!($($arg)*));
    }
}

#[macro_export]
macro_rules! kdk_error {
    ($($arg:tt)*) => {
        eprintln!("{}", format!($($arg)*));
    }
}
