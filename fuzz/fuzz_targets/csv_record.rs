#![no_main]

use catstat::csv_output::{escape_field, split_record, split_records};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let _ = split_record(input);

        // Escaping must always split back into the original field
        let line = format!("{},1", escape_field(input));
        let fields = split_record(&line).expect("escaped field parses");
        assert_eq!(fields, vec![input.to_string(), "1".to_string()]);

        // Quoted line breaks stay inside a single record
        let content = format!("{}\nRED,2\n", line);
        let records = split_records(&content);
        assert_eq!(records.len(), 2);
        assert_eq!(split_record(&records[0].1).expect("record parses"), fields);
    }
});
