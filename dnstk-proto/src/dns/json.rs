use crate::core::{DnsError, ErrorKind};
use crate::dns::core::{RecordClass, RecordType};
use crate::dns::message::{Flags, Message, MessageId, Question, Record, ResponseCode};
use crate::dns::name::Name;
use crate::dns::rdata::RecordData;
use serde::Deserialize;
use std::str::FromStr;

/// Response body returned by DNS-over-HTTPS resolvers that speak the JSON format
/// (`application/dns-json`) instead of the binary message format.
#[derive(Debug, Deserialize)]
struct JsonResponse {
    #[serde(rename = "Status")]
    status: u16,
    #[serde(rename = "TC", default)]
    truncated: bool,
    #[serde(rename = "RD", default)]
    recursion_desired: bool,
    #[serde(rename = "RA", default)]
    recursion_available: bool,
    #[serde(rename = "Question", default)]
    question: Vec<JsonQuestion>,
    #[serde(rename = "Answer", default)]
    answer: Vec<JsonRecord>,
    #[serde(rename = "Authority", default)]
    authority: Vec<JsonRecord>,
    #[serde(rename = "Additional", default)]
    additional: Vec<JsonRecord>,
}

#[derive(Debug, Deserialize)]
struct JsonQuestion {
    name: String,
    #[serde(rename = "type")]
    qtype: u16,
}

#[derive(Debug, Deserialize)]
struct JsonRecord {
    name: String,
    #[serde(rename = "type")]
    rtype: u16,
    #[serde(rename = "TTL", default)]
    ttl: u32,
    data: String,
}

impl JsonRecord {
    /// Convert to a record, returning `None` for record types that have no
    /// textual form that can be parsed here.
    fn into_record(self) -> Result<Option<Record>, DnsError> {
        let rtype = RecordType::from(self.rtype);
        let rdata = match RecordData::from_text(rtype, &self.data) {
            Ok(rd) => rd,
            Err(e) if e.kind() == ErrorKind::UnsupportedOperation => {
                tracing::debug!(
                    message = "skipping JSON record with unsupported type",
                    name = %self.name,
                    rtype = %rtype
                );
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let name = Name::from_str(&self.name)?;
        Ok(Some(Record::new(name, rtype, RecordClass::INET, self.ttl, rdata)))
    }
}

fn convert_records(records: Vec<JsonRecord>) -> Result<Vec<Record>, DnsError> {
    let mut out = Vec::with_capacity(records.len());
    for r in records {
        if let Some(rec) = r.into_record()? {
            out.push(rec);
        }
    }

    Ok(out)
}

/// Decode a JSON DNS response into a `Message`.
///
/// JSON responses don't carry a message ID so `id` is used instead, normally
/// the ID of the query this is a response to. Records of types without a
/// supported textual form are skipped.
pub fn read_json_message(id: MessageId, bytes: &[u8]) -> Result<Message, DnsError> {
    let res: JsonResponse =
        serde_json::from_slice(bytes).map_err(|e| DnsError::runtime_cause("unable to parse JSON DNS response", e))?;

    let mut flags = Flags::default()
        .set_response()
        .set_response_code(ResponseCode::try_from(res.status)?);
    if res.truncated {
        flags = flags.set_truncated();
    }
    if res.recursion_desired {
        flags = flags.set_recursion_desired();
    }
    if res.recursion_available {
        flags = flags.set_recursion_available();
    }

    let mut msg = Message::new(id, flags);
    for q in res.question {
        msg = msg.add_question(Question::new(Name::from_str(&q.name)?, RecordType::from(q.qtype)));
    }

    for r in convert_records(res.answer)? {
        msg = msg.add_answer(r);
    }

    for r in convert_records(res.authority)? {
        msg = msg.add_authority(r);
    }

    for r in convert_records(res.additional)? {
        msg = msg.add_additional(r);
    }

    Ok(msg)
}
