use dnstk_proto::dns::{
    extract_referrals, Endpoint, Flags, Message, MessageId, Name, NameServerAddress, Protocol, Question, Record,
    RecordClass, RecordData, RecordDataA, RecordDataNS, RecordType,
};
use std::io::Cursor;
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;

fn referral_response() -> Message {
    let zone = Name::from_str("example.").unwrap();
    let ns1 = Name::from_str("ns1.example.").unwrap();
    let ns2 = Name::from_str("ns2.example.").unwrap();

    Message::new(MessageId::from(4321), Flags::default().set_response())
        .add_question(Question::new(Name::from_str("www.example.").unwrap(), RecordType::A))
        .add_authority(Record::new(
            zone.clone(),
            RecordType::NS,
            RecordClass::INET,
            172800,
            RecordData::NS(RecordDataNS::new(ns1.clone())),
        ))
        .add_authority(Record::new(
            zone,
            RecordType::NS,
            RecordClass::INET,
            172800,
            RecordData::NS(RecordDataNS::new(ns2)),
        ))
        .add_additional(Record::new(
            ns1,
            RecordType::A,
            RecordClass::INET,
            172800,
            RecordData::A(RecordDataA::new(Ipv4Addr::new(198, 51, 100, 1))),
        ))
}

#[test]
fn test_referral_from_wire_response() {
    let mut buf = Vec::new();
    referral_response().write_network_bytes(&mut buf).unwrap();

    let msg = Message::read_network_bytes(Cursor::new(buf)).unwrap();
    assert_eq!(referral_response(), msg);

    let mut servers = extract_referrals(&msg, false, false).unwrap();
    assert_eq!(2, servers.len());

    NameServerAddress::sort_by_preference(&mut servers);
    assert_eq!(
        Some(SocketAddr::from_str("198.51.100.1:53").unwrap()),
        servers[0].ip_endpoint()
    );
    assert_eq!("ns1.example.", servers[0].host());
    assert_eq!(Protocol::Udp, servers[0].protocol());

    assert!(matches!(servers[1].endpoint(), Endpoint::Domain(de) if de.domain() == "ns2.example."));
    assert!(servers[1].is_ip_stale());

    let glue_only = extract_referrals(&msg, false, true).unwrap();
    assert_eq!(vec![servers[0].clone()], glue_only);
}

#[test]
fn test_referral_addresses_survive_binary_round_trip() {
    let servers = extract_referrals(&referral_response(), false, false).unwrap();

    for server in servers {
        let mut buf = Vec::new();
        server.write_binary(&mut buf).unwrap();

        let read = NameServerAddress::read_binary(Cursor::new(buf)).unwrap();
        assert_eq!(server, read);
    }
}
