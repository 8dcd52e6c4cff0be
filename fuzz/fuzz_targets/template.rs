#![no_main]

use libfuzzer_sys::fuzz_target;
use tabletest_core::{MessageTemplate, Severity, format_message};

fuzz_target!(|data: &[u8]| {
    // Convert bytes to UTF-8 string (ignore invalid UTF-8)
    if let Ok(s) = std::str::from_utf8(data) {
        // Any template that parses must render without panicking
        if let Ok(template) = MessageTemplate::parse(s) {
            let _ = template.render("scope", "detail");
            let _ = format_message(&template, true, "scope", Severity::Fatal, s);
        }
    }
});
