#![no_main]

use dnstk_proto::dns::NameServerAddress;
use libfuzzer_sys::{Corpus, fuzz_target};
use std::io::Cursor;

fuzz_target!(|data: &[u8]| -> Corpus {
    // Try parsing the bytes as any version of the binary format
    if let Ok(a) = NameServerAddress::read_binary(Cursor::new(data)) {
        let _ = a.to_string();
        let _ = a.transport_endpoint();
        return Corpus::Keep;
    }

    // Try parsing the bytes as the text form of an address
    if let Ok(a) = str::from_utf8(data).map_err(|_| ()).and_then(|s| NameServerAddress::parse(s).map_err(|_| ())) {
        let mut buf = Vec::new();
        if a.original_address().len() <= 255 {
            a.write_binary(&mut buf).unwrap();
        }
        return Corpus::Keep;
    }

    Corpus::Reject
});
