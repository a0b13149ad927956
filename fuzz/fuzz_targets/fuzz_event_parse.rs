#![no_main]

use hostevent_core::event::{decode_payload, substitute_token};
use hostevent_core::ParsedEvent;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Token substitution must keep a parseable event parseable
    let substituted = substitute_token(text, Some("tok\"en\\"));
    if parses(text) {
        assert!(parses(&substituted));
    }

    if let Ok(event) = ParsedEvent::parse(text) {
        let _ = decode_payload(&event.event_kind, event.raw_payload.as_deref());
        let _ = event.repository();
    }
});

fn parses(text: &str) -> bool {
    ParsedEvent::parse(text).is_ok()
}
