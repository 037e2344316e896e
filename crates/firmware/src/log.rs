//! Logging shim
//!
//! Target builds log through `defmt` (feature `defmt`), desktop builds through
//! `tracing` (feature `emulator`). With neither enabled every macro compiles
//! to nothing but still borrows its arguments, so call sites do not trip the
//! unused-variable lint.
//!
//! Format strings must stay within the subset both backends understand: plain
//! `{}` placeholders whose arguments implement both `Display` and
//! `defmt::Format`.

macro_rules! log_macro {
    ($d:tt $name:ident) => {
        macro_rules! $name {
            ($d fmt:literal $d(, $d arg:expr)* $d(,)?) => {{
                #[cfg(feature = "defmt")]
                defmt::$name!($d fmt $d(, $d arg)*);
                #[cfg(feature = "emulator")]
                tracing::$name!($d fmt $d(, $d arg)*);
                #[cfg(not(any(feature = "defmt", feature = "emulator")))]
                {
                    $d( let _ = &$d arg; )*
                }
            }};
        }
    };
}

log_macro!($ error);
log_macro!($ warn);
log_macro!($ info);
log_macro!($ debug);
log_macro!($ trace);
