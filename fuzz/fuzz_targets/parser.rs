// fuzz_targets/parser.rs
#![no_main]

use gotype_parser::{parse_source, parse_type, Parser, ParserConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let s = std::string::String::from_utf8_lossy(data);

    match parse_source(&s) {
        Ok(file) => {
            // Anything accepted must survive a print/parse cycle unchanged.
            let printed = file.to_string();
            let reparsed = parse_source(&printed).expect("printed source reparses");
            assert_eq!(reparsed, file);
        }
        Err(failure) => {
            assert_eq!(failure.diags.len(), 1);
            let span = failure.diags[0].span;
            assert!(span.start <= span.end);
            assert!(span.end as usize <= s.len());
        }
    }

    let _ = parse_type(&s);
    let shallow = ParserConfig::default().with_max_depth(8);
    let _ = Parser::with_config(&s, shallow).parse_source();
});
