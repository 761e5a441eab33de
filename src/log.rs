#![allow(unused_macros)]

// defmt on target; on host builds the arguments are only borrowed so they
// still count as used
cfg_if::cfg_if! {
    if #[cfg(feature = "defmt")] {
        macro_rules! info {
            ($($arg:tt)*) => { ::defmt::info!($($arg)*) };
        }

        macro_rules! warn {
            ($($arg:tt)*) => { ::defmt::warn!($($arg)*) };
        }

        macro_rules! error {
            ($($arg:tt)*) => { ::defmt::error!($($arg)*) };
        }

        macro_rules! debug {
            ($($arg:tt)*) => { ::defmt::debug!($($arg)*) };
        }
    } else {
        macro_rules! info {
            ($fmt:literal $(, $arg:expr)* $(,)?) => {{ $(let _ = &$arg;)* }};
        }

        macro_rules! warn {
            ($fmt:literal $(, $arg:expr)* $(,)?) => {{ $(let _ = &$arg;)* }};
        }

        macro_rules! error {
            ($fmt:literal $(, $arg:expr)* $(,)?) => {{ $(let _ = &$arg;)* }};
        }

        macro_rules! debug {
            ($fmt:literal $(, $arg:expr)* $(,)?) => {{ $(let _ = &$arg;)* }};
        }
    }
}
