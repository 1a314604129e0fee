#![no_main]

use libfuzzer_sys::fuzz_target;
use scriptlet::Options;

fuzz_target!(|data: (&str, bool, bool)| {
    let (source, debug, strict) = data;
    let options = Options::builder()
        .compile_debug(debug)
        .strict(strict)
        .build();
    if let Ok(func) = scriptlet::compile(source, &options) {
        assert_eq!(scriptlet::compile(source, &options).ok(), Some(func));
    }
});
