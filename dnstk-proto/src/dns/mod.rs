mod address;
mod core;
mod json;
mod message;
mod name;
mod rdata;
mod referral;
mod resolv;

pub use crate::dns::address::{DomainEndpoint, Endpoint, NameServerAddress, Protocol, ResolvedIp, TransportEndpoint};
pub use crate::dns::core::{RecordClass, RecordType};
pub use crate::dns::json::read_json_message;
pub use crate::dns::message::{Flags, Message, MessageId, Operation, Question, Record, ResponseCode};
pub use crate::dns::name::{CompressionTable, Name};
pub use crate::dns::rdata::{
    RecordData, RecordDataA, RecordDataAAAA, RecordDataMX, RecordDataNS, RecordDataPTR, RecordDataTXT,
    RecordDataUnknown,
};
pub use crate::dns::referral::extract_referrals;
pub use crate::dns::resolv::{config, ResolvConf, ResolvConfOptions};
