// Diagnostics share the console with the menu. They only go out with the
// `trace` feature on; otherwise the arguments are type-checked and dropped.

#[macro_export]
macro_rules! trace {
    ($w:expr, $($fmt:tt)*) => {
        if cfg!(feature = "trace") {
            let _ = ufmt::uwrite!($w, "[trace] ");
            let _ = ufmt::uwriteln!($w, $($fmt)*);
        }
    };
}
