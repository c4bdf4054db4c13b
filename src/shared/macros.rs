/***************************************/
/*               Macros                */
/***************************************/

/// Unwraps a start-up result, or logs the error with its whole source chain
/// and exits with status 1. An optional context string prefixes the message.
#[macro_export]
macro_rules! unwrap_or_exit {
    ($expr:expr) => {
        $crate::unwrap_or_exit!($expr, "ERROR")
    };
    ($expr:expr, $context:expr) => {
        match $expr {
            Ok(val) => val,
            Err(e) => {
                ::log::error!("{}: {}", $context, $crate::shared::error_chain(&e));
                ::std::process::exit(1);
            }
        }
    };
}
