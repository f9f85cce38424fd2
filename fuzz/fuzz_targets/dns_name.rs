#![no_main]

use dnstk_proto::DnsError;
use dnstk_proto::dns::Name;
use dnstk_proto::io::OffsetStream;
use libfuzzer_sys::{Corpus, fuzz_target};
use std::io::Cursor;
use std::str::FromStr;

fuzz_target!(|data: &[u8]| -> Corpus {
    // Try parsing the bytes as a binary DNS name
    if let Ok(mut view) = OffsetStream::new(Cursor::new(data), 0, None, true) {
        if let Ok(n) = Name::read_network_bytes(&mut view) {
            let _ = n.to_string();
            let mut buf = Vec::new();
            n.write_network_bytes(&mut buf).unwrap();
            return Corpus::Keep;
        }
    }

    // Try parsing the bytes as a text representation of the name
    if let Ok(n) = str::from_utf8(data)
        .map_err(|e| DnsError::runtime_cause("utf-8", e))
        .and_then(Name::from_str)
    {
        let _ = n.to_string();
        let mut buf = Vec::new();
        n.write_network_bytes(&mut buf).unwrap();
        return Corpus::Keep;
    }

    Corpus::Reject
});
