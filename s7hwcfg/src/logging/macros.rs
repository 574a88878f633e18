//! Logging macros taking trailing `"key" => value` context pairs
//!
//! Values may be anything implementing `Display`. `log_debug!` formats its
//! context only when debug output is enabled. Arms taking `span =` come
//! first so the span is never parsed as a context key.

/// Collects `"key" => value` pairs into owned strings
#[doc(hidden)]
#[macro_export]
macro_rules! __log_context {
    () => {
        ::std::vec::Vec::<(&'static str, ::std::string::String)>::new()
    };
    ($($key:expr => $value:expr),+) => {
        vec![$(($key, ::std::format!("{}", $value))),+]
    };
}

/// Log an error under its `Code`, with optional span and context
#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr, span = $span:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::log_error_with_context(
            $code, $message, Some($span), $crate::__log_context!($($key => $value),*),
        )
    };
    ($code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::log_error_with_context(
            $code, $message, None, $crate::__log_context!($($key => $value),*),
        )
    };
}

/// Log a warning; `span` takes an `Option<Span>`
#[macro_export]
macro_rules! log_warning {
    (code = $code:expr, $message:expr, span = $span:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::log_warning_with_context(
            $code, $message, $span, $crate::__log_context!($($key => $value),*),
        )
    };
    (code = $code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::log_warning_with_context(
            $code, $message, None, $crate::__log_context!($($key => $value),*),
        )
    };
}

/// Log a stage completion under an `I0xx` code
#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::log_success_with_context(
            $code, $message, $crate::__log_context!($($key => $value),*),
        )
    };
}

#[macro_export]
macro_rules! log_info {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::log_info_with_context(
            $message, $crate::__log_context!($($key => $value),*),
        )
    };
}

#[macro_export]
macro_rules! log_debug {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        if $crate::logging::debug_enabled() {
            $crate::logging::log_debug_with_context(
                $message, $crate::__log_context!($($key => $value),*),
            )
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::logging::codes;
    use crate::utils::Span;

    #[test]
    fn test_every_macro_form_expands() {
        let rack: u32 = 0;
        let span = Span::lines(10, 14);

        log_error!(codes::section_format::UNKNOWN_RACK, "Rack not declared");
        log_error!(codes::section_format::UNKNOWN_SLOT, "Slot not declared",
            "rack" => rack,
            "slot" => 4
        );
        log_error!(codes::file_format::UNTERMINATED_SECTION, "Missing END", span = span);
        log_error!(codes::file_format::UNTERMINATED_SECTION, "Missing END",
            span = span, "header" => "RACK 0, \"X\", \"Y\"");

        log_warning!(code = codes::resolution::BUS_ADDRESS_OCCUPIED, "Address taken");
        log_warning!(code = codes::resolution::DANGLING_SUBSYSTEM_REFERENCE,
            "Subsystem not declared",
            span = Some(span),
            "subsystem" => 1,
            "address" => 2
        );

        log_success!(codes::success::SEGMENTATION_COMPLETE, "Segmentation complete",
            "sections" => 12);
        log_info!("Starting pass", "pass" => "rack-slot");
        log_debug!("Section consumed");
        log_debug!("Section consumed", "header" => "RACK 0, \"X\", \"Y\"");
    }
}
