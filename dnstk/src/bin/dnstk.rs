use clap::{Args, Parser, Subcommand, ValueHint};
use dnstk_proto::dns::{
    Endpoint, Flags, Message, MessageId, Name, NameServerAddress, Protocol, Question, Record, RecordClass, RecordType,
};
use std::fmt::Write;
use std::io::Cursor;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::Level;

const DEFAULT_LOG_LEVEL: Level = Level::INFO;
const DEFAULT_RECORD_TYPE: RecordType = RecordType::A;
const DEFAULT_RECORD_CLASS: RecordClass = RecordClass::INET;

/// dnstk: Read and write binary format DNS messages, follow referrals, and inspect name server addresses
#[derive(Debug, Parser)]
#[command(name = "dnstk", version = clap::crate_version!())]
struct DnstkConfig {
    /// Logging verbosity. Allowed values are 'trace', 'debug', 'info', 'warn', and 'error'
    /// (case-insensitive).
    #[arg(long, default_value_t = DEFAULT_LOG_LEVEL)]
    log_level: Level,

    #[command(subcommand)]
    mode: Action,
}

#[derive(Debug, Subcommand)]
enum Action {
    Read(ReadCommand),
    Write(WriteCommand),
    Referral(ReferralCommand),
    Address(AddressCommand),
    Servers(ServersCommand),
}

/// Read a DNS message from standard input and display it as dig-like text output.
#[derive(Debug, Args)]
struct ReadCommand {
    /// Read a JSON format DNS-over-HTTPS response instead of a binary format message.
    #[arg(long, default_value_t = false)]
    json: bool,
}

/// Write a binary format DNS query to standard output.
#[derive(Debug, Args)]
struct WriteCommand {
    /// Type of record to request. Supported: A, NS, PTR, MX, TXT, AAAA.
    #[arg(long, default_value_t = DEFAULT_RECORD_TYPE)]
    rtype: RecordType,

    /// Class of record to request. Supported: INET, CHAOS, HESIOD, NONE, ANY.
    #[arg(long, default_value_t = DEFAULT_RECORD_CLASS)]
    rclass: RecordClass,

    /// Domain name to lookup.
    #[arg(required = true)]
    name: Name,
}

/// Read a binary format DNS response from standard input and display the name servers
/// it refers to, most preferred first.
#[derive(Debug, Args)]
struct ReferralCommand {
    /// Use AAAA glue records in addition to A glue records.
    #[arg(long, default_value_t = false)]
    prefer_ipv6: bool,

    /// Skip name servers that don't have any glue records.
    #[arg(long, default_value_t = false)]
    glue_only: bool,
}

/// Parse a name server address and display its fields and binary encoding.
#[derive(Debug, Args)]
struct AddressCommand {
    /// Protocol to use for the name server. Supported: udp, tcp, tls, https, https-json.
    /// If not set, the protocol is guessed from the address.
    #[arg(long)]
    protocol: Option<Protocol>,

    /// Address of the name server, e.g. '192.0.2.1', '[2001:db8::1]:853',
    /// 'dns.example.com (192.0.2.1)', or 'https://dns.example.com/dns-query'.
    #[arg(required = true)]
    address: String,
}

/// Load name servers from a resolv.conf style file and display them, most preferred first.
#[derive(Debug, Args)]
struct ServersCommand {
    /// Path to resolv.conf style file for loading name servers. If this file can't be
    /// loaded, default values are used instead.
    #[arg(long, default_value = default_resolv_conf().into_os_string(), value_hint = ValueHint::FilePath)]
    resolv_conf: PathBuf,
}

fn default_resolv_conf() -> PathBuf {
    PathBuf::from("/etc/resolv.conf")
}

#[tokio::main]
async fn main() -> ExitCode {
    let opts = DnstkConfig::parse();

    let console_subscriber =
        dnstk::tracing::console_subscriber(opts.log_level).expect("failed to setup console logging");
    tracing::subscriber::set_global_default(console_subscriber).expect("failed to initialize console logging");

    match &opts.mode {
        Action::Read(cmd) => run_read(cmd).await,
        Action::Write(cmd) => run_write(cmd).await,
        Action::Referral(cmd) => run_referral(cmd).await,
        Action::Address(cmd) => run_address(cmd).await,
        Action::Servers(cmd) => run_servers(cmd).await,
    }
}

async fn read_stdin() -> Option<Vec<u8>> {
    let mut buf = Vec::new();
    let mut input = tokio::io::stdin();

    match input.read_to_end(&mut buf).await {
        Ok(_) => Some(buf),
        Err(e) => {
            tracing::error!(message = "unable to read message from stdin", err = %e);
            None
        }
    }
}

async fn run_read(cmd: &ReadCommand) -> ExitCode {
    let buf = match read_stdin().await {
        Some(b) => b,
        None => return ExitCode::FAILURE,
    };

    let res = if cmd.json {
        dnstk_proto::dns::read_json_message(MessageId::random(), &buf)
    } else {
        Message::read_network_bytes(Cursor::new(&buf))
    };

    let msg = match res {
        Ok(m) => m,
        Err(e) => {
            tracing::error!(message = "malformed message", err = %e);
            return ExitCode::FAILURE;
        }
    };

    write_text(&format_message(&msg)).await
}

async fn run_write(cmd: &WriteCommand) -> ExitCode {
    let id = MessageId::random();
    let msg = Message::new(id, Flags::default().set_query().set_recursion_desired())
        .add_question(Question::new(cmd.name.clone(), cmd.rtype).set_qclass(cmd.rclass));

    let mut buf = Vec::new();
    if let Err(e) = msg.write_network_bytes(&mut buf) {
        tracing::error!(message = "unable to encode message to wire format", err = %e);
        return ExitCode::FAILURE;
    }

    let mut out = tokio::io::stdout();
    if let Err(e) = out.write_all(&buf).await {
        tracing::error!(message = "unable to write wire encoded message to stdout", err = %e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn run_referral(cmd: &ReferralCommand) -> ExitCode {
    let buf = match read_stdin().await {
        Some(b) => b,
        None => return ExitCode::FAILURE,
    };

    let msg = match Message::read_network_bytes(Cursor::new(&buf)) {
        Ok(m) => m,
        Err(e) => {
            tracing::error!(message = "malformed message", err = %e);
            return ExitCode::FAILURE;
        }
    };

    let mut servers = match dnstk_proto::dns::extract_referrals(&msg, cmd.prefer_ipv6, cmd.glue_only) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(message = "unable to extract referrals", id = %msg.id(), err = %e);
            return ExitCode::FAILURE;
        }
    };

    NameServerAddress::sort_by_preference(&mut servers);
    write_text(&format_servers(&servers)).await
}

async fn run_address(cmd: &AddressCommand) -> ExitCode {
    let res = match cmd.protocol {
        Some(p) => NameServerAddress::parse_with_protocol(&cmd.address, p),
        None => NameServerAddress::parse(&cmd.address),
    };

    let addr = match res {
        Ok(a) => a,
        Err(e) => {
            tracing::error!(message = "invalid name server address", address = %cmd.address, err = %e);
            return ExitCode::FAILURE;
        }
    };

    let mut encoded = Vec::new();
    if let Err(e) = addr.write_binary(&mut encoded) {
        tracing::error!(message = "unable to encode name server address", address = %addr, err = %e);
        return ExitCode::FAILURE;
    }

    write_text(&format_address(&addr, &encoded)).await
}

async fn run_servers(cmd: &ServersCommand) -> ExitCode {
    let cfg = dnstk::config::load_resolv_conf(&cmd.resolv_conf).await;
    let mut servers = cfg.nameservers;
    NameServerAddress::sort_by_preference(&mut servers);

    let mut buf = format_servers(&servers);
    let _ = writeln!(
        buf,
        ";; options: prefer-ipv6={} glue-only={} ip-ttl={}s",
        cfg.options.prefer_ipv6,
        cfg.options.glue_only,
        cfg.options.ip_ttl_or_default().as_secs()
    );

    write_text(&buf).await
}

async fn write_text(text: &str) -> ExitCode {
    let mut out = tokio::io::stdout();
    if let Err(e) = out.write_all(text.as_bytes()).await {
        tracing::error!(message = "unable to write human readable output to stdout", err = %e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn format_message(msg: &Message) -> String {
    let mut buf = String::new();
    let _ = writeln!(
        buf,
        ";; >>HEADER<< opcode: {:?}, status: {:?}, id: {}",
        msg.flags().get_op_code(),
        msg.flags().get_response_code(),
        msg.id()
    );
    let _ = writeln!(buf, ";; flags: {:?}", msg.flags());

    let _ = writeln!(buf, ";; QUESTION SECTION:");
    for q in msg.questions() {
        let _ = writeln!(buf, "; {}\t\t\t{}\t{}", q.name(), q.qclass(), q.qtype());
    }

    let _ = writeln!(buf, ";; ANSWER SECTION:");
    format_records(&mut buf, msg.answers());
    let _ = writeln!(buf, ";; AUTHORITY SECTION:");
    format_records(&mut buf, msg.authority());
    let _ = writeln!(buf, ";; ADDITIONAL SECTION:");
    format_records(&mut buf, msg.additional());

    buf
}

fn format_records(buf: &mut String, records: &[Record]) {
    for r in records {
        let _ = writeln!(
            buf,
            "{}\t\t{}\t{}\t{}\t{}",
            r.name(),
            r.ttl(),
            r.rclass(),
            r.rtype(),
            r.rdata()
        );
    }
}

fn format_servers(servers: &[NameServerAddress]) -> String {
    let mut buf = String::new();
    let _ = writeln!(buf, ";; NAME SERVERS:");
    for s in servers {
        let _ = writeln!(buf, "{}\t{}\t{}", s.protocol(), s.transport_endpoint(), s);
    }

    buf
}

fn format_address(addr: &NameServerAddress, encoded: &[u8]) -> String {
    let kind = match addr.endpoint() {
        Endpoint::Doh(_) => "doh",
        Endpoint::Domain(_) => "domain",
        Endpoint::Ip(_) => "ip",
    };

    let mut buf = String::new();
    let _ = writeln!(buf, "original:\t{}", addr.original_address());
    let _ = writeln!(buf, "protocol:\t{}", addr.protocol());
    let _ = writeln!(buf, "endpoint:\t{}", kind);
    let _ = writeln!(buf, "host:\t\t{}", addr.host());
    let _ = writeln!(buf, "port:\t\t{}", addr.port());
    match addr.ip_endpoint() {
        Some(ip) => {
            let _ = writeln!(buf, "ip:\t\t{}", ip);
        }
        None => {
            let _ = writeln!(buf, "ip:\t\t-");
        }
    }
    let _ = writeln!(buf, "stale:\t\t{}", addr.is_ip_stale());
    let _ = writeln!(buf, "preference:\t{}", addr.preference());
    let _ = writeln!(buf, "display:\t{}", addr);

    let _ = write!(buf, "binary:\t\t");
    for b in encoded {
        let _ = write!(buf, "{:02x}", b);
    }
    let _ = writeln!(buf);

    buf
}
