//! Hostname resolution backends

use crate::{
    error::{AppError, Result},
    types::DnsConfig,
};
use async_trait::async_trait;
use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::Duration,
};
use trust_dns_resolver::{
    config::{NameServerConfig, Protocol, ResolverConfig, ResolverOpts},
    system_conf,
    TokioAsyncResolver,
};

/// Something that can turn a hostname into addresses.
///
/// The probe only depends on this trait, so tests can substitute resolvers
/// with scripted latency and failures.
#[async_trait]
pub trait HostResolver: Send + Sync {
    /// Resolve `hostname` to its addresses
    async fn lookup_host(&self, hostname: &str) -> Result<Vec<IpAddr>>;

    /// Short description for banners and logs
    fn describe(&self) -> String;
}

/// trust-dns backed resolver
#[derive(Clone)]
pub struct DnsResolver {
    resolver: TokioAsyncResolver,
    config: DnsConfig,
}

impl DnsResolver {
    pub fn config(&self) -> &DnsConfig {
        &self.config
    }
}

#[async_trait]
impl HostResolver for DnsResolver {
    async fn lookup_host(&self, hostname: &str) -> Result<Vec<IpAddr>> {
        let response = self
            .resolver
            .lookup_ip(hostname)
            .await
            .map_err(|e| AppError::dns_resolution(format!("lookup {} failed: {}", hostname, e)))?;

        Ok(response.iter().collect())
    }

    fn describe(&self) -> String {
        self.config.name()
    }
}

/// Builds resolvers for a run
pub struct DnsManager;

impl DnsManager {
    /// Options shared by every resolver: one attempt per lookup and no
    /// answer cache, so every probe reaches a name server.
    pub fn probe_options(timeout: Duration, base: ResolverOpts) -> ResolverOpts {
        let mut opts = base;
        opts.timeout = timeout;
        opts.attempts = 1;
        opts.cache_size = 0;
        opts
    }

    /// Resolver using the operating system's name server configuration
    pub fn system_resolver(timeout: Duration) -> Result<DnsResolver> {
        let (config, opts) = system_conf::read_system_conf()
            .map_err(|e| AppError::dns_resolution(format!("Failed to read system DNS config: {}", e)))?;

        Ok(DnsResolver {
            resolver: TokioAsyncResolver::tokio(config, Self::probe_options(timeout, opts)),
            config: DnsConfig::System,
        })
    }

    /// Resolver querying the given servers on port 53, UDP with TCP fallback
    pub fn custom_resolver(servers: &[IpAddr], timeout: Duration) -> Result<DnsResolver> {
        if servers.is_empty() {
            return Err(AppError::validation("No DNS servers provided"));
        }

        let mut config = ResolverConfig::new();
        for &server in servers {
            let socket_addr = SocketAddr::new(server, 53);
            config.add_name_server(NameServerConfig::new(socket_addr, Protocol::Udp));
            config.add_name_server(NameServerConfig::new(socket_addr, Protocol::Tcp));
        }

        Ok(DnsResolver {
            resolver: TokioAsyncResolver::tokio(config, Self::probe_options(timeout, ResolverOpts::default())),
            config: DnsConfig::Custom { servers: servers.to_vec() },
        })
    }

    /// Build the resolver for a configuration
    pub fn create_resolver(dns_config: &DnsConfig, timeout: Duration) -> Result<Arc<dyn HostResolver>> {
        let resolver = match dns_config {
            DnsConfig::System => Self::system_resolver(timeout)?,
            DnsConfig::Custom { servers } => Self::custom_resolver(servers, timeout)?,
        };
        Ok(Arc::new(resolver))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_options() {
        let opts = DnsManager::probe_options(Duration::from_millis(750), ResolverOpts::default());
        assert_eq!(opts.timeout, Duration::from_millis(750));
        assert_eq!(opts.attempts, 1);
        assert_eq!(opts.cache_size, 0);
    }

    #[tokio::test]
    async fn test_custom_resolver_requires_servers() {
        assert!(matches!(
            DnsManager::custom_resolver(&[], Duration::from_secs(1)),
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_custom_resolver_describes_servers() {
        let servers: Vec<IpAddr> = vec!["127.0.0.1".parse().unwrap(), "::1".parse().unwrap()];
        let resolver = DnsManager::custom_resolver(&servers, Duration::from_secs(1)).unwrap();
        assert_eq!(resolver.describe(), "custom (2 servers)");
        assert_eq!(resolver.config(), &DnsConfig::Custom { servers });
    }

    #[tokio::test]
    #[ignore = "requires a working system resolver"]
    async fn test_system_resolver_localhost() {
        let resolver = DnsManager::create_resolver(&DnsConfig::System, Duration::from_secs(2)).unwrap();
        let addresses = resolver.lookup_host("localhost").await.unwrap();
        assert!(!addresses.is_empty());
    }
}
