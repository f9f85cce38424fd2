use dnstk_proto::DnsError;
use dnstk_proto::dns::{NameServerAddress, ResolvConf};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use tokio::fs::File;

const DEFAULT_SERVER: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Load name servers and options from the provided resolv.conf style file. If the file
/// cannot be opened or is malformed, default configuration values will be used. If no
/// name servers are configured, a name server on localhost is used.
pub async fn load_resolv_conf<P>(resolv: P) -> ResolvConf
where
    P: AsRef<Path> + fmt::Debug,
{
    let mut cfg = match load_config(&resolv).await {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!(message = "unable to load resolv.conf", path = ?resolv, err = %e);
            ResolvConf::default()
        }
    };

    if cfg.nameservers.is_empty() {
        match NameServerAddress::parse(&DEFAULT_SERVER.to_string()) {
            Ok(addr) => cfg.nameservers.push(addr),
            Err(e) => tracing::warn!(message = "unable to use default name server", err = %e),
        }
    }

    cfg
}

async fn load_config<P>(resolv: P) -> Result<ResolvConf, DnsError>
where
    P: AsRef<Path> + fmt::Debug,
{
    let handle = File::open(&resolv)
        .await
        .map_err(|e| DnsError::configuration_cause(format!("unable to open {:?}", resolv), e))?;
    dnstk_proto::dns::config(handle).await
}
