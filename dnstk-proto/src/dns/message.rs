use crate::core::DnsError;
use crate::dns::core::{RecordClass, RecordType};
use crate::dns::name::{CompressionTable, Name};
use crate::dns::rdata::RecordData;
use crate::io::OffsetStream;
use byteorder::{NetworkEndian, ReadBytesExt, WriteBytesExt};
use std::fmt;
use std::fmt::{Debug, Formatter};
use std::io::{Cursor, Read, Seek, SeekFrom};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct MessageId(u16);

impl MessageId {
    pub fn random() -> Self {
        Self(rand::random())
    }

    pub fn size(&self) -> usize {
        2
    }
}

impl From<u16> for MessageId {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl From<MessageId> for u16 {
    fn from(value: MessageId) -> Self {
        value.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Message {
    id: MessageId,
    flags: Flags,
    questions: Vec<Question>,
    answers: Vec<Record>,
    authority: Vec<Record>,
    additional: Vec<Record>,
}

impl Message {
    pub fn new(id: MessageId, flags: Flags) -> Self {
        Self {
            id,
            flags,
            questions: Vec::new(),
            answers: Vec::new(),
            authority: Vec::new(),
            additional: Vec::new(),
        }
    }

    /// Size of the message in bytes when written without name compression. The
    /// encoded message is never larger than this.
    pub fn size(&self) -> usize {
        self.id.size()
            + self.flags.size()
            + (2 * 4) // lengths of questions, answers, authority, additional
            + self.questions.iter().map(|q| q.size()).sum::<usize>()
            + self.answers.iter().map(|r| r.size()).sum::<usize>()
            + self.authority.iter().map(|r| r.size()).sum::<usize>()
            + self.additional.iter().map(|r| r.size()).sum::<usize>()
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn add_question(mut self, q: Question) -> Self {
        self.questions.push(q);
        self
    }

    pub fn answers(&self) -> &[Record] {
        &self.answers
    }

    pub fn add_answer(mut self, r: Record) -> Self {
        self.answers.push(r);
        self
    }

    pub fn authority(&self) -> &[Record] {
        &self.authority
    }

    pub fn add_authority(mut self, r: Record) -> Self {
        self.authority.push(r);
        self
    }

    pub fn additional(&self) -> &[Record] {
        &self.additional
    }

    pub fn add_additional(mut self, r: Record) -> Self {
        self.additional.push(r);
        self
    }

    fn header(&self) -> Result<Header, DnsError> {
        let count = |kind: &str, n: usize| {
            u16::try_from(n).map_err(|_| DnsError::runtime(format!("too many {} in message: {}", kind, n)))
        };

        Ok(Header {
            id: self.id,
            flags: self.flags,
            num_questions: count("questions", self.questions.len())?,
            num_answers: count("answers", self.answers.len())?,
            num_authority: count("authority records", self.authority.len())?,
            num_additional: count("additional records", self.additional.len())?,
        })
    }

    /// Write the message to `buf`, compressing names that appear more than once.
    ///
    /// The message is assembled in memory first since compression pointers are
    /// offsets from the start of the message and record data lengths are only
    /// known after the data has been written.
    pub fn write_network_bytes<T>(&self, mut buf: T) -> Result<(), DnsError>
    where
        T: WriteBytesExt,
    {
        let mut cur = Cursor::new(Vec::with_capacity(self.size()));
        let mut table = CompressionTable::new();

        let header = self.header()?;
        header.write_network_bytes(&mut cur)?;

        for q in self.questions.iter() {
            q.write_network_bytes(&mut cur, &mut table)?;
        }

        for r in self.answers.iter() {
            r.write_network_bytes(&mut cur, &mut table)?;
        }

        for r in self.authority.iter() {
            r.write_network_bytes(&mut cur, &mut table)?;
        }

        for r in self.additional.iter() {
            r.write_network_bytes(&mut cur, &mut table)?;
        }

        Ok(buf.write_all(cur.get_ref())?)
    }

    /// Read a message starting at the current position of `buf` and extending
    /// to the end of `buf`.
    pub fn read_network_bytes<T>(mut buf: T) -> Result<Self, DnsError>
    where
        T: Read + Seek,
    {
        let start = buf.stream_position()?;
        let mut view = OffsetStream::new(buf, start, None, true)?;
        let header = Header::read_network_bytes(&mut view)?;

        let mut questions = Vec::new();
        for _ in 0..header.num_questions {
            questions.push(Question::read_network_bytes(&mut view)?);
        }

        let mut answers = Vec::new();
        for _ in 0..header.num_answers {
            answers.push(Record::read_network_bytes(&mut view)?);
        }

        let mut authority = Vec::new();
        for _ in 0..header.num_authority {
            authority.push(Record::read_network_bytes(&mut view)?);
        }

        let mut additional = Vec::new();
        for _ in 0..header.num_additional {
            additional.push(Record::read_network_bytes(&mut view)?);
        }

        Ok(Self {
            id: header.id,
            flags: header.flags,
            questions,
            answers,
            authority,
            additional,
        })
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
struct Header {
    id: MessageId,
    flags: Flags,
    num_questions: u16,
    num_answers: u16,
    num_authority: u16,
    num_additional: u16,
}

impl Header {
    fn write_network_bytes<T>(&self, mut buf: T) -> Result<(), DnsError>
    where
        T: WriteBytesExt,
    {
        buf.write_u16::<NetworkEndian>(self.id.into())?;
        buf.write_u16::<NetworkEndian>(self.flags.as_u16())?;
        buf.write_u16::<NetworkEndian>(self.num_questions)?;
        buf.write_u16::<NetworkEndian>(self.num_answers)?;
        buf.write_u16::<NetworkEndian>(self.num_authority)?;
        Ok(buf.write_u16::<NetworkEndian>(self.num_additional)?)
    }

    fn read_network_bytes<T>(mut buf: T) -> Result<Self, DnsError>
    where
        T: ReadBytesExt,
    {
        let id = MessageId::from(buf.read_u16::<NetworkEndian>()?);
        let flags = Flags::try_from(buf.read_u16::<NetworkEndian>()?)?;
        let num_questions = buf.read_u16::<NetworkEndian>()?;
        let num_answers = buf.read_u16::<NetworkEndian>()?;
        let num_authority = buf.read_u16::<NetworkEndian>()?;
        let num_additional = buf.read_u16::<NetworkEndian>()?;

        Ok(Header {
            id,
            flags,
            num_questions,
            num_answers,
            num_authority,
            num_additional,
        })
    }
}

#[derive(Default, Copy, Clone, Eq, PartialEq)]
#[repr(transparent)]
pub struct Flags(u16);

impl Flags {
    const MASK_QR: u16 = 0b1000_0000_0000_0000; // query / response
    const MASK_OP: u16 = 0b0111_1000_0000_0000; // 4 bits, op code
    const MASK_AA: u16 = 0b0000_0100_0000_0000; // authoritative answer
    const MASK_TC: u16 = 0b0000_0010_0000_0000; // truncated
    const MASK_RD: u16 = 0b0000_0001_0000_0000; // recursion desired
    const MASK_RA: u16 = 0b0000_0000_1000_0000; // recursion available
    const MASK_RC: u16 = 0b0000_0000_0000_1111; // 4 bits, response code

    const OFFSET_QR: usize = 15;
    const OFFSET_OP: usize = 11;
    const OFFSET_AA: usize = 10;
    const OFFSET_TC: usize = 9;
    const OFFSET_RD: usize = 8;
    const OFFSET_RA: usize = 7;
    const OFFSET_RC: usize = 0;

    pub fn size(&self) -> usize {
        2
    }

    pub fn is_query(&self) -> bool {
        self.0 & Self::MASK_QR == 0
    }

    pub fn set_query(self) -> Self {
        Flags(self.0 & !Self::MASK_QR)
    }

    pub fn is_response(&self) -> bool {
        self.0 & Self::MASK_QR > 0
    }

    pub fn set_response(self) -> Self {
        Flags(self.0 | Self::MASK_QR)
    }

    pub fn get_op_code(&self) -> Operation {
        // Flags can only be built from valid op codes.
        Operation::try_from((self.0 & Self::MASK_OP) >> Self::OFFSET_OP).unwrap_or_default()
    }

    pub fn set_op_code(self, op: Operation) -> Self {
        let op = (op as u16) << Self::OFFSET_OP;
        Flags((self.0 & !Self::MASK_OP) | op)
    }

    pub fn is_authoritative(&self) -> bool {
        self.0 & Self::MASK_AA > 0
    }

    pub fn set_authoritative(self) -> Self {
        Flags(self.0 | Self::MASK_AA)
    }

    pub fn is_truncated(&self) -> bool {
        self.0 & Self::MASK_TC > 0
    }

    pub fn set_truncated(self) -> Self {
        Flags(self.0 | Self::MASK_TC)
    }

    pub fn is_recursion_desired(&self) -> bool {
        self.0 & Self::MASK_RD > 0
    }

    pub fn set_recursion_desired(self) -> Self {
        Flags(self.0 | Self::MASK_RD)
    }

    pub fn is_recursion_available(&self) -> bool {
        self.0 & Self::MASK_RA > 0
    }

    pub fn set_recursion_available(self) -> Self {
        Flags(self.0 | Self::MASK_RA)
    }

    pub fn get_response_code(&self) -> ResponseCode {
        // Flags can only be built from valid response codes.
        ResponseCode::try_from((self.0 & Self::MASK_RC) >> Self::OFFSET_RC).unwrap_or_default()
    }

    pub fn set_response_code(self, code: ResponseCode) -> Self {
        let code = (code as u16) << Self::OFFSET_RC;
        Flags((self.0 & !Self::MASK_RC) | code)
    }

    pub fn as_u16(&self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for Flags {
    type Error = DnsError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        // Ensure that operation and response code are valid values but
        // otherwise use the value as is. The rest of the fields are on/off
        // bits so any combination is valid even if they don't make sense.
        let _op = Operation::try_from((value & Self::MASK_OP) >> Self::OFFSET_OP)?;
        let _rc = ResponseCode::try_from((value & Self::MASK_RC) >> Self::OFFSET_RC)?;
        Ok(Flags(value))
    }
}

impl Debug for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let qr = (self.0 & Self::MASK_QR) >> Self::OFFSET_QR;
        let op = self.get_op_code();
        let aa = (self.0 & Self::MASK_AA) >> Self::OFFSET_AA;
        let tc = (self.0 & Self::MASK_TC) >> Self::OFFSET_TC;
        let rd = (self.0 & Self::MASK_RD) >> Self::OFFSET_RD;
        let ra = (self.0 & Self::MASK_RA) >> Self::OFFSET_RA;
        let rc = self.get_response_code();

        write!(
            f,
            "Flags{{qr = {qr}, op = {op:?}, aa = {aa}, tc = {tc}, rd = {rd}, ra = {ra}, rc = {rc:?}}}"
        )
    }
}

#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
#[repr(u16)]
pub enum ResponseCode {
    #[default]
    NoError = 0,
    FormatError = 1,
    ServerFailure = 2,
    NameError = 3,
    NotImplemented = 4,
    Refused = 5,
    YxDomain = 6,
    YxRrSet = 7,
    NxRrSet = 8,
    NotAuth = 9,
    NotZone = 10,
    BadVersion = 16,
}

impl TryFrom<u16> for ResponseCode {
    type Error = DnsError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ResponseCode::NoError),
            1 => Ok(ResponseCode::FormatError),
            2 => Ok(ResponseCode::ServerFailure),
            3 => Ok(ResponseCode::NameError),
            4 => Ok(ResponseCode::NotImplemented),
            5 => Ok(ResponseCode::Refused),
            6 => Ok(ResponseCode::YxDomain),
            7 => Ok(ResponseCode::YxRrSet),
            8 => Ok(ResponseCode::NxRrSet),
            9 => Ok(ResponseCode::NotAuth),
            10 => Ok(ResponseCode::NotZone),
            16 => Ok(ResponseCode::BadVersion),
            _ => Err(DnsError::runtime(format!(
                "invalid or unsupported response code {}",
                value
            ))),
        }
    }
}

#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
#[repr(u16)]
pub enum Operation {
    #[default]
    Query = 0,
    IQuery = 1,
    Status = 2,
    Notify = 4,
    Update = 5,
}

impl TryFrom<u16> for Operation {
    type Error = DnsError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Operation::Query),
            1 => Ok(Operation::IQuery),
            2 => Ok(Operation::Status),
            4 => Ok(Operation::Notify),
            5 => Ok(Operation::Update),
            _ => Err(DnsError::runtime(format!(
                "invalid or unsupported operation {}",
                value
            ))),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Question {
    name: Name,
    qtype: RecordType,
    qclass: RecordClass,
}

impl Question {
    pub fn new(name: Name, qtype: RecordType) -> Self {
        Self {
            name,
            qtype,
            qclass: RecordClass::INET,
        }
    }

    pub fn size(&self) -> usize {
        usize::from(self.name.size())
            + 2 // qtype
            + 2 // qclass
    }

    pub fn set_qclass(mut self, qclass: RecordClass) -> Self {
        self.qclass = qclass;
        self
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn qtype(&self) -> RecordType {
        self.qtype
    }

    pub fn qclass(&self) -> RecordClass {
        self.qclass
    }

    pub fn write_network_bytes<T>(&self, mut buf: T, table: &mut CompressionTable) -> Result<(), DnsError>
    where
        T: WriteBytesExt + Seek,
    {
        self.name.write_compressed_bytes(&mut buf, table)?;
        buf.write_u16::<NetworkEndian>(self.qtype.into())?;
        Ok(buf.write_u16::<NetworkEndian>(self.qclass.into())?)
    }

    pub fn read_network_bytes<S>(buf: &mut OffsetStream<S>) -> Result<Self, DnsError>
    where
        S: Read + Seek,
    {
        let name = Name::read_network_bytes(buf)?;
        let qtype = RecordType::from(buf.read_u16::<NetworkEndian>()?);
        let qclass = RecordClass::from(buf.read_u16::<NetworkEndian>()?);
        Ok(Self { name, qtype, qclass })
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Record {
    name: Name,
    rtype: RecordType,
    rclass: RecordClass,
    ttl: u32,
    rdata: RecordData,
}

impl Record {
    pub fn new(name: Name, rtype: RecordType, rclass: RecordClass, ttl: u32, rdata: RecordData) -> Self {
        Self {
            name,
            rtype,
            rclass,
            ttl,
            rdata,
        }
    }

    pub fn size(&self) -> usize {
        usize::from(self.name.size())
            + 2 // rtype
            + 2 // rclass
            + 4 // ttl
            + 2 // rdata length
            + self.rdata.size()
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn rtype(&self) -> RecordType {
        self.rtype
    }

    pub fn rclass(&self) -> RecordClass {
        self.rclass
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    pub fn rdata(&self) -> &RecordData {
        &self.rdata
    }

    /// Write the record, compressing the owner name and any names in the record data.
    /// The record data length is written after the data itself since compression means
    /// it isn't known ahead of time.
    pub fn write_network_bytes<T>(&self, mut buf: T, table: &mut CompressionTable) -> Result<(), DnsError>
    where
        T: WriteBytesExt + Seek,
    {
        self.name.write_compressed_bytes(&mut buf, table)?;
        buf.write_u16::<NetworkEndian>(self.rtype.into())?;
        buf.write_u16::<NetworkEndian>(self.rclass.into())?;
        buf.write_u32::<NetworkEndian>(self.ttl)?;

        let len_pos = buf.stream_position()?;
        buf.write_u16::<NetworkEndian>(0)?;
        self.rdata.write_network_bytes(&mut buf, table)?;
        let end = buf.stream_position()?;

        let size = end - len_pos - 2;
        let size = u16::try_from(size).map_err(|_| {
            DnsError::runtime(format!(
                "rdata length of {} bytes exceeds max of {} bytes",
                size,
                u16::MAX
            ))
        })?;

        buf.seek(SeekFrom::Start(len_pos))?;
        buf.write_u16::<NetworkEndian>(size)?;
        buf.seek(SeekFrom::Start(end))?;
        Ok(())
    }

    /// Read a record from a view over the entire message.
    ///
    /// While the record data is decoded the view is narrowed to end where the data
    /// ends, so a decoder can't consume bytes belonging to the following record. The
    /// view is restored to the entire message afterwards.
    pub fn read_network_bytes<S>(buf: &mut OffsetStream<S>) -> Result<Self, DnsError>
    where
        S: Read + Seek,
    {
        let name = Name::read_network_bytes(buf)?;
        let rtype = RecordType::from(buf.read_u16::<NetworkEndian>()?);
        let rclass = RecordClass::from(buf.read_u16::<NetworkEndian>()?);
        let ttl = buf.read_u32::<NetworkEndian>()?;
        let rdata_len = buf.read_u16::<NetworkEndian>()?;

        let msg_len = buf.len();
        let start = buf.position();
        let end = start + u64::from(rdata_len);
        if end > msg_len {
            return Err(DnsError::truncated(format!(
                "{} record data of {} bytes at {} runs past end of {} byte message",
                rtype, rdata_len, start, msg_len
            )));
        }

        let offset = buf.offset();
        buf.reset(offset, end, start)?;
        let res = RecordData::read_network_bytes(rtype, rdata_len, buf);
        let consumed = buf.position() - start;
        buf.reset(offset, msg_len, end)?;

        let rdata = res?;
        if consumed != u64::from(rdata_len) {
            return Err(DnsError::truncated(format!(
                "{} record data declared {} bytes but {} were used",
                rtype, rdata_len, consumed
            )));
        }

        Ok(Self {
            name,
            rtype,
            rclass,
            ttl,
            rdata,
        })
    }
}

#[cfg(test)]
mod test {
    use super::{Flags, Header, Message, MessageId, Operation, Question, Record, ResponseCode};
    use crate::core::ErrorKind;
    use crate::dns::core::{RecordClass, RecordType};
    use crate::dns::name::{CompressionTable, Name};
    use crate::dns::rdata::{RecordData, RecordDataA, RecordDataMX};
    use crate::dns::referral::extract_referrals;
    use crate::io::OffsetStream;
    use std::io::Cursor;
    use std::net::Ipv4Addr;
    use std::str::FromStr;

    fn new_message() -> Message {
        let question = Question::new(Name::from_str("example.com.").unwrap(), RecordType::MX);
        let answer = Record::new(
            Name::from_str("example.com.").unwrap(),
            RecordType::MX,
            RecordClass::INET,
            300,
            RecordData::MX(RecordDataMX::new(10, Name::from_str("mail.example.com.").unwrap())),
        );
        let additional = Record::new(
            Name::from_str("mail.example.com.").unwrap(),
            RecordType::A,
            RecordClass::INET,
            60,
            RecordData::A(RecordDataA::new(Ipv4Addr::new(192, 0, 2, 1))),
        );

        Message::new(
            MessageId::from(4660),
            Flags::default()
                .set_response()
                .set_op_code(Operation::Query)
                .set_response_code(ResponseCode::NoError),
        )
        .add_question(question)
        .add_answer(answer)
        .add_additional(additional)
    }

    #[rustfmt::skip]
    fn message_bytes() -> Vec<u8> {
        vec![
            // Header
            18, 52,   // ID
            128, 0,   // Flags: response, query op, no error
            0, 1,     // questions
            0, 1,     // answers
            0, 0,     // authority
            0, 1,     // additional

            // Question
            7,                                // length
            101, 120, 97, 109, 112, 108, 101, // "example"
            3,                                // length
            99, 111, 109,                     // "com"
            0,                                // root
            0, 15,                            // record type, MX
            0, 1,                             // record class, INET

            // Answer
            192, 12,                          // pointer to "example.com."
            0, 15,                            // record type, MX
            0, 1,                             // record class, INET
            0, 0, 1, 44,                      // TTL
            0, 9,                             // rdata size
            0, 10,                            // preference
            4,                                // length
            109, 97, 105, 108,                // "mail"
            192, 12,                          // pointer to "example.com."

            // Additional
            192, 43,                          // pointer to "mail.example.com."
            0, 1,                             // record type, A
            0, 1,                             // record class, INET
            0, 0, 0, 60,                      // TTL
            0, 4,                             // rdata size
            192, 0, 2, 1,                     // address
        ]
    }

    #[test]
    fn test_message_write_network_bytes() {
        let message = new_message();
        let mut buf = Vec::new();
        message.write_network_bytes(&mut buf).unwrap();

        assert_eq!(message_bytes(), buf);
        assert!(buf.len() < message.size());
    }

    #[test]
    fn test_message_read_network_bytes() {
        let cur = Cursor::new(message_bytes());
        let message = Message::read_network_bytes(cur).unwrap();

        assert_eq!(new_message(), message);
        assert_eq!(MessageId::from(4660), message.id());
        assert!(message.flags().is_response());

        let answers = message.answers();
        assert_eq!(1, answers.len());
        assert_eq!("10 mail.example.com.", answers[0].rdata().to_string());
        assert_eq!(9, answers[0].rdata().raw_len());

        let additional = message.additional();
        assert_eq!(1, additional.len());
        assert_eq!("mail.example.com.", additional[0].name().to_string());
    }

    #[rustfmt::skip]
    #[test]
    fn test_message_read_network_bytes_classless_delegation() {
        let bytes = vec![
            0, 1,                               // id
            128, 0,                             // flags, response
            0, 0,                               // questions
            0, 0,                               // answers
            0, 1,                               // authority
            0, 0,                               // additional
            4,                                  // length
            48, 47, 50, 53,                     // "0/25"
            1,                                  // length
            50,                                 // "2"
            1,                                  // length
            48,                                 // "0"
            3,                                  // length
            49, 57, 50,                         // "192"
            7,                                  // length
            105, 110, 45, 97, 100, 100, 114,    // "in-addr"
            4,                                  // length
            97, 114, 112, 97,                   // "arpa"
            0,                                  // root
            0, 2,                               // type NS
            0, 1,                               // class INET
            0, 0, 14, 16,                       // TTL 3600
            0, 13,                              // rdata length
            3,                                  // length
            110, 115, 49,                       // "ns1"
            7,                                  // length
            101, 120, 97, 109, 112, 108, 101,   // "example"
            0,                                  // root
        ];

        let msg = Message::read_network_bytes(Cursor::new(bytes)).unwrap();
        assert_eq!(1, msg.authority().len());
        assert_eq!("0/25.2.0.192.in-addr.arpa.", msg.authority()[0].name().to_string());
        assert_eq!(RecordType::NS, msg.authority()[0].rtype());

        let servers = extract_referrals(&msg, false, false).unwrap();
        assert_eq!(1, servers.len());
        assert_eq!("ns1.example.", servers[0].host());
        assert_eq!(53, servers[0].port());
    }

    #[test]
    fn test_message_read_network_bytes_not_at_start() {
        let mut bytes = vec![0xFF, 0xFF, 0xFF];
        bytes.extend(message_bytes());

        let mut cur = Cursor::new(bytes);
        cur.set_position(3);
        let message = Message::read_network_bytes(cur).unwrap();
        assert_eq!(new_message(), message);
    }

    #[rustfmt::skip]
    #[test]
    fn test_message_read_network_bytes_rdata_past_end() {
        let cur = Cursor::new(vec![
            // Header
            0, 1,         // ID
            128, 0,       // Flags
            0, 0,         // questions
            0, 1,         // answers
            0, 0,         // authority
            0, 0,         // additional

            // Answer
            0,            // root
            0, 1,         // record type, A
            0, 1,         // record class, INET
            0, 0, 0, 60,  // TTL
            0, 4,         // rdata size
            127, 0,       // only half an address
        ]);

        let res = Message::read_network_bytes(cur);
        assert_eq!(ErrorKind::TruncatedData, res.unwrap_err().kind());
    }

    #[rustfmt::skip]
    #[test]
    fn test_message_read_network_bytes_rdata_not_consumed() {
        let cur = Cursor::new(vec![
            // Header
            0, 1,         // ID
            128, 0,       // Flags
            0, 0,         // questions
            0, 0,         // answers
            0, 1,         // authority
            0, 0,         // additional

            // Authority
            0,            // root
            0, 2,         // record type, NS
            0, 1,         // record class, INET
            0, 0, 0, 60,  // TTL
            0, 3,         // rdata size
            0,            // root
            0, 0,         // padding
        ]);

        let res = Message::read_network_bytes(cur);
        assert_eq!(ErrorKind::TruncatedData, res.unwrap_err().kind());
    }

    #[rustfmt::skip]
    #[test]
    fn test_message_read_network_bytes_rdata_bounded() {
        // The TXT chunk length claims more bytes than the record has. They exist in
        // the message (the next record) but must not be read as part of this one.
        let cur = Cursor::new(vec![
            // Header
            0, 1,         // ID
            128, 0,       // Flags
            0, 0,         // questions
            0, 2,         // answers
            0, 0,         // authority
            0, 0,         // additional

            // Answer
            0,            // root
            0, 16,        // record type, TXT
            0, 1,         // record class, INET
            0, 0, 0, 60,  // TTL
            0, 2,         // rdata size
            8, 104,       // chunk of 8 bytes, "h"

            // Answer
            0,            // root
            0, 1,         // record type, A
            0, 1,         // record class, INET
        ]);

        let res = Message::read_network_bytes(cur);
        assert_eq!(ErrorKind::TruncatedData, res.unwrap_err().kind());
    }

    #[rustfmt::skip]
    #[test]
    fn test_header_write_network_bytes() {
        let h = Header {
            id: MessageId::from(65333),
            flags: Flags::default().set_recursion_desired(),
            num_questions: 1,
            num_answers: 2,
            num_authority: 3,
            num_additional: 4,
        };
        let mut cur = Cursor::new(Vec::new());
        h.write_network_bytes(&mut cur).unwrap();
        let buf = cur.into_inner();

        assert_eq!(
            vec![
                255, 53, // ID
                1, 0,    // Flags, recursion desired
                0, 1,    // questions
                0, 2,    // answers
                0, 3,    // authority
                0, 4,    // additional
            ],
            buf,
        )
    }

    #[test]
    fn test_flags() {
        let f = Flags::default()
            .set_response()
            .set_op_code(Operation::Status)
            .set_authoritative()
            .set_truncated()
            .set_recursion_desired()
            .set_recursion_available()
            .set_response_code(ResponseCode::ServerFailure);

        assert!(f.is_response());
        assert!(!f.is_query());
        assert_eq!(Operation::Status, f.get_op_code());
        assert!(f.is_authoritative());
        assert!(f.is_truncated());
        assert!(f.is_recursion_desired());
        assert!(f.is_recursion_available());
        assert_eq!(ResponseCode::ServerFailure, f.get_response_code());

        let f = f.set_query().set_response_code(ResponseCode::NoError);
        assert!(f.is_query());
        assert_eq!(ResponseCode::NoError, f.get_response_code());
    }

    #[test]
    fn test_flags_invalid_response_code() {
        assert!(Flags::try_from(0b0000_0000_0000_1111).is_err());
    }

    #[rustfmt::skip]
    #[test]
    fn test_question_write_network_bytes() {
        let q = Question::new(Name::from_str("www.example.com.").unwrap(), RecordType::AAAA);
        let mut cur = Cursor::new(Vec::new());
        let mut table = CompressionTable::new();
        q.write_network_bytes(&mut cur, &mut table).unwrap();
        let buf = cur.into_inner();

        assert_eq!(
            vec![
                3,                                // length
                119, 119, 119,                    // "www"
                7,                                // length
                101, 120, 97, 109, 112, 108, 101, // "example"
                3,                                // length
                99, 111, 109,                     // "com"
                0,                                // root
                0, 28,                            // record type, AAAA
                0, 1,                             // record class, INET
            ],
            buf,
        );
    }

    #[rustfmt::skip]
    #[test]
    fn test_question_read_network_bytes() {
        let mut view = OffsetStream::new(Cursor::new(vec![
            3,                                // length
            119, 119, 119,                    // "www"
            7,                                // length
            101, 120, 97, 109, 112, 108, 101, // "example"
            3,                                // length
            99, 111, 109,                     // "com"
            0,                                // root
            0, 12,                            // record type, PTR
            0, 1,                             // record class, INET
        ]), 0, None, true).unwrap();

        let q = Question::read_network_bytes(&mut view).unwrap();
        assert_eq!("www.example.com.", q.name().to_string());
        assert_eq!(RecordType::PTR, q.qtype());
        assert_eq!(RecordClass::INET, q.qclass());
    }

    #[rustfmt::skip]
    #[test]
    fn test_record_write_network_bytes() {
        let rec = Record::new(
            Name::from_str("www.example.com.").unwrap(),
            RecordType::A,
            RecordClass::INET,
            300,
            RecordData::A(RecordDataA::new(Ipv4Addr::new(127, 0, 0, 100))),
        );
        let mut cur = Cursor::new(Vec::new());
        let mut table = CompressionTable::new();
        rec.write_network_bytes(&mut cur, &mut table).unwrap();
        let buf = cur.into_inner();

        assert_eq!(
            vec![
                3,                                // length
                119, 119, 119,                    // "www"
                7,                                // length
                101, 120, 97, 109, 112, 108, 101, // "example"
                3,                                // length
                99, 111, 109,                     // "com"
                0,                                // root
                0, 1,                             // record type, A
                0, 1,                             // record class, INET
                0, 0, 1, 44,                      // TTL
                0, 4,                             // rdata size
                127, 0, 0, 100,                   // rdata, A address
            ],
            buf,
        )
    }
}
