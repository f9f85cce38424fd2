#![no_main]

use dnstk_proto::dns::Message;
use libfuzzer_sys::{Corpus, fuzz_target};
use std::io::Cursor;

fuzz_target!(|data: &[u8]| -> Corpus {
    let mut cur = Cursor::new(data);
    if let Ok(m) = Message::read_network_bytes(&mut cur) {
        let mut buf = Vec::new();
        m.write_network_bytes(&mut buf).unwrap();
        Corpus::Keep
    } else {
        Corpus::Reject
    }
});
