use crate::core::DnsError;
use crate::dns::address::NameServerAddress;
use std::fmt::Debug;
use std::str::FromStr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

const MAX_NAMESERVERS: usize = 8;

/// Name servers and referral settings parsed from a resolv.conf style file.
///
/// Name server lines accept any address that `NameServerAddress::parse` does,
/// including DoH URLs and `domain (ip)` pairs.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct ResolvConf {
    pub nameservers: Vec<NameServerAddress>,
    pub options: ResolvConfOptions,
}

/// Options that change how referrals are followed and resolved IPs cached.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct ResolvConfOptions {
    pub prefer_ipv6: bool,
    pub glue_only: bool,
    pub ip_ttl: Option<Duration>,
}

impl ResolvConfOptions {
    /// Configured resolved IP TTL or the default if none was set.
    pub fn ip_ttl_or_default(&self) -> Duration {
        self.ip_ttl.unwrap_or(NameServerAddress::DEFAULT_IP_TTL)
    }
}

/// Read name servers and options from a resolv.conf style configuration file.
pub async fn config<R>(read: R) -> Result<ResolvConf, DnsError>
where
    R: AsyncRead + Send + Sync + Unpin + 'static,
{
    let mut lines = BufReader::new(read).lines();
    let mut conf = ResolvConf::default();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        let (key, rest) = match line.split_once(char::is_whitespace) {
            Some((k, r)) => (k, r.trim()),
            None => (line, ""),
        };

        match Token::get(key) {
            Some(Token::NameServer) => {
                if conf.nameservers.len() < MAX_NAMESERVERS {
                    conf.nameservers.push(parse_nameserver(line, rest)?);
                } else {
                    tracing::debug!(message = "skipping extra resolv.conf nameserver", line = line);
                }
            }
            Some(Token::Options) => {
                for opt in parse_options(rest.split_whitespace()) {
                    match opt {
                        OptionsToken::PreferIpv6 => {
                            conf.options.prefer_ipv6 = true;
                        }
                        OptionsToken::GlueOnly => {
                            conf.options.glue_only = true;
                        }
                        OptionsToken::IpTtl(secs) => {
                            conf.options.ip_ttl = Some(Duration::from_secs(u64::from(secs)));
                        }
                    }
                }
            }
            None => {
                tracing::debug!(
                    message = "skipping unknown resolv.conf setting",
                    setting = key,
                    line = line
                );
                continue;
            }
        }
    }

    Ok(conf)
}

/// Parse the address from a `nameserver` line in a resolv.conf file, guessing the
/// protocol, and returning an error if the address is missing or malformed.
fn parse_nameserver(line: &str, address: &str) -> Result<NameServerAddress, DnsError> {
    if address.is_empty() {
        return Err(DnsError::configuration(format!(
            "malformed nameserver configuration '{}'",
            line
        )));
    }

    NameServerAddress::parse(address)
        .map_err(|e| DnsError::configuration_cause(format!("malformed nameserver address '{}'", address), e))
}

/// Parse one or more options from an `options` line in a resolv.conf file, ignoring any
/// malformed or unsupported options.
fn parse_options<'a>(parts: impl Iterator<Item = &'a str>) -> Vec<OptionsToken> {
    let mut out = Vec::new();

    for part in parts {
        let opt = match part.parse() {
            Ok(o) => o,
            Err(e) => {
                tracing::debug!(message = "skipping unknown resolv.conf option", option = part, err = %e);
                continue;
            }
        };

        out.push(opt);
    }
    out
}

/// Top-level configuration setting in a resolv.conf file.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
enum Token {
    NameServer,
    Options,
}

impl Token {
    fn get(s: &str) -> Option<Self> {
        match s {
            "nameserver" => Some(Self::NameServer),
            "options" => Some(Self::Options),
            _ => None,
        }
    }
}

/// Keyword or key-value pair associated with an option token.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
enum OptionsToken {
    PreferIpv6,
    GlueOnly,
    IpTtl(u32),
}

impl OptionsToken {
    const MAX_IP_TTL: u32 = 86400;

    fn parse(line: &str, val: &str, max: u32) -> Result<u32, DnsError> {
        let n: u32 = val
            .parse()
            .map_err(|e| DnsError::configuration_cause(format!("unable to parse {} value '{}'", line, val), e))?;

        Ok(n.min(max))
    }
}

impl FromStr for OptionsToken {
    type Err = DnsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prefer-ipv6" => Ok(Self::PreferIpv6),
            "glue-only" => Ok(Self::GlueOnly),
            _ => match s.split_once(':') {
                Some(("ip-ttl", v)) => Ok(Self::IpTtl(Self::parse(s, v, Self::MAX_IP_TTL)?)),
                _ => Err(DnsError::configuration(format!("unknown option {}", s))),
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::{config, OptionsToken, ResolvConf, ResolvConfOptions, Token};
    use crate::core::ErrorKind;
    use crate::dns::address::{NameServerAddress, Protocol};
    use std::io::{Cursor, Error as IOError, ErrorKind as IOErrorKind};
    use std::pin::Pin;
    use std::str::FromStr;
    use std::task::{Context, Poll};
    use std::time::Duration;
    use tokio::io::{AsyncRead, ReadBuf};

    #[test]
    fn test_configuration() {
        assert_eq!(Some(Token::NameServer), Token::get("nameserver"));
        assert_eq!(Some(Token::Options), Token::get("options"));
        assert_eq!(None, Token::get("search"));
    }

    #[test]
    fn test_configuration_option_success() {
        assert_eq!(OptionsToken::PreferIpv6, OptionsToken::from_str("prefer-ipv6").unwrap());
        assert_eq!(OptionsToken::GlueOnly, OptionsToken::from_str("glue-only").unwrap());
        assert_eq!(OptionsToken::IpTtl(300), OptionsToken::from_str("ip-ttl:300").unwrap());
    }

    #[test]
    fn test_configuration_option_limits() {
        assert_eq!(
            OptionsToken::IpTtl(86400),
            OptionsToken::from_str("ip-ttl:100000").unwrap()
        );
    }

    #[test]
    fn test_configuration_option_error() {
        assert!(OptionsToken::from_str("ndots:3").is_err());
        assert!(OptionsToken::from_str("ip-ttl:bad").is_err());
        assert!(OptionsToken::from_str("ip-ttl:-5").is_err());
    }

    #[test]
    fn test_ip_ttl_or_default() {
        assert_eq!(Duration::from_secs(900), ResolvConfOptions::default().ip_ttl_or_default());
    }

    #[tokio::test]
    async fn test_config_read_error() {
        struct ErrAsyncRead;
        impl AsyncRead for ErrAsyncRead {
            fn poll_read(
                self: Pin<&mut Self>,
                _cx: &mut Context<'_>,
                _buf: &mut ReadBuf<'_>,
            ) -> Poll<std::io::Result<()>> {
                Poll::Ready(Err(IOError::new(IOErrorKind::Other, "test error")))
            }
        }

        let reader = ErrAsyncRead;
        let res = config(reader).await.unwrap_err();
        assert_eq!(ErrorKind::IO, res.kind());
    }

    #[tokio::test]
    async fn test_config_no_content() {
        let reader = Cursor::new(Vec::new());
        let res = config(reader).await.unwrap();
        assert_eq!(ResolvConf::default(), res);
    }

    #[tokio::test]
    async fn test_config_all_comments() {
        #[rustfmt::skip]
        let reader = Cursor::new(concat!(
            "# this is a comment\n",
            "; another comment\n",
        ));
        let res = config(reader).await.unwrap();
        assert_eq!(ResolvConf::default(), res);
    }

    #[tokio::test]
    async fn test_config_all_unsupported() {
        #[rustfmt::skip]
        let reader = Cursor::new(concat!(
            "search example.com\n",
            "invalid directive\n",
        ));
        let res = config(reader).await.unwrap();
        assert_eq!(ResolvConf::default(), res);
    }

    #[tokio::test]
    async fn test_config_malformed_nameserver() {
        #[rustfmt::skip]
        let reader = Cursor::new(concat!(
            "nameserver [2001:db8::1\n",
        ));
        let res = config(reader).await.unwrap_err();
        assert_eq!(ErrorKind::Configuration, res.kind());
    }

    #[tokio::test]
    async fn test_config_missing_nameserver() {
        #[rustfmt::skip]
        let reader = Cursor::new(concat!(
            "nameserver\n",
        ));
        let res = config(reader).await.unwrap_err();
        assert_eq!(ErrorKind::Configuration, res.kind());
    }

    #[tokio::test]
    async fn test_config_nameservers_no_options() {
        #[rustfmt::skip]
        let reader = Cursor::new(concat!(
            "# this is a comment\n",
            "nameserver 127.0.0.53\n",
            "nameserver dns.example.com (192.0.2.1)\n",
            "nameserver https://dns.example.com/dns-query\n",
            "nameserver [2001:db8::1]:853\n",
        ));

        let res = config(reader).await.unwrap();
        assert_eq!(4, res.nameservers.len());
        assert_eq!(NameServerAddress::parse("127.0.0.53:53").unwrap(), res.nameservers[0]);
        assert_eq!("dns.example.com (192.0.2.1)", res.nameservers[1].original_address());
        assert_eq!(Protocol::Https, res.nameservers[2].protocol());
        assert_eq!(Protocol::Tls, res.nameservers[3].protocol());
        assert_eq!(ResolvConfOptions::default(), res.options);
    }

    #[tokio::test]
    async fn test_config_nameservers_limit() {
        let mut contents = String::new();
        for i in 1..=10 {
            contents.push_str(&format!("nameserver 192.0.2.{}\n", i));
        }

        let res = config(Cursor::new(contents)).await.unwrap();
        assert_eq!(8, res.nameservers.len());
        assert_eq!("192.0.2.8", res.nameservers[7].original_address());
    }

    #[tokio::test]
    async fn test_config_nameservers_options() {
        #[rustfmt::skip]
        let reader = Cursor::new(concat!(
            "# this is a comment\n",
            "nameserver 127.0.0.53\n",
            "options ndots:3 prefer-ipv6 glue-only ip-ttl:60 rotate\n",
        ));

        let expected = ResolvConf {
            nameservers: vec![NameServerAddress::parse("127.0.0.53").unwrap()],
            options: ResolvConfOptions {
                prefer_ipv6: true,
                glue_only: true,
                ip_ttl: Some(Duration::from_secs(60)),
            },
        };

        let res = config(reader).await.unwrap();
        assert_eq!(expected, res);
    }
}
