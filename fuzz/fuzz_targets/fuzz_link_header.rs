#![no_main]

use hostevent_core::PageLinks;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(header) = std::str::from_utf8(data) {
        let links = PageLinks::parse(header);

        // Page hints are 1-based
        assert_ne!(links.next, Some(0));
        assert_ne!(links.last, Some(0));
    }
});
