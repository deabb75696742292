//! Nameserver selection strategies.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rand::Rng;

use crate::error::Error;
use crate::transport::ProxyFn;
use crate::NetAddr;

/// A list of DNS nameserver addresses, convertible into the proxy functions
/// a [`Transport`][crate::Transport] rewrites dial targets with.
#[derive(Clone, Debug, Default)]
pub struct NameServers(pub Vec<NetAddr>);

impl NameServers {
    /// Picks a uniformly random address whose network matches the dialed
    /// network, every time.
    pub fn random(self) -> ProxyFn {
        let by_network = self.by_network();

        Arc::new(move |_cx, addr| {
            let network = addr.network();
            let addrs = by_network
                .get(&network)
                .ok_or(Error::NoNameservers(network))?;

            Ok(addrs[rand::thread_rng().gen_range(0..addrs.len())])
        })
    }

    /// Cycles through the addresses of the dialed network in order.
    pub fn round_robin(self) -> ProxyFn {
        let by_network = self.by_network();
        let indexes: HashMap<String, AtomicUsize> = by_network
            .keys()
            .map(|network| (network.clone(), AtomicUsize::new(0)))
            .collect();

        Arc::new(move |_cx, addr| {
            let network = addr.network();
            let addrs = by_network
                .get(&network)
                .ok_or(Error::NoNameservers(network.clone()))?;

            let idx = indexes[&network].fetch_add(1, Ordering::Relaxed);
            Ok(addrs[idx % addrs.len()])
        })
    }

    /// Returns the first address by default; a context with the upstream
    /// marker set gets a random one of the remaining addresses instead.
    ///
    /// Typical usage puts a local resolver first and the upstream servers
    /// after it. A single-entry list always yields its only address,
    /// upstream marker or not.
    pub fn upstream(self) -> ProxyFn {
        let addrs = self.0;

        Arc::new(move |cx, _addr| {
            let first = *addrs.first().ok_or(Error::NoNameservers("any".to_string()))?;
            if !cx.upstream || addrs.len() == 1 {
                return Ok(first);
            }

            let idx = rand::thread_rng().gen_range(0..addrs.len() - 1);
            Ok(addrs[idx + 1])
        })
    }

    fn by_network(&self) -> HashMap<String, Vec<NetAddr>> {
        let mut by_network: HashMap<String, Vec<NetAddr>> = HashMap::new();
        for addr in &self.0 {
            by_network.entry(addr.network()).or_default().push(*addr);
        }
        by_network
    }
}

#[cfg(test)]
mod tests {
    use crate::Context;

    use super::*;

    fn servers() -> NameServers {
        NameServers(vec![
            NetAddr::udp("8.8.8.8:53".parse().unwrap()),
            NetAddr::udp("8.8.4.4:53".parse().unwrap()),
            NetAddr::tcp("8.8.8.8:53".parse().unwrap()),
            NetAddr::tcp("8.8.4.4:53".parse().unwrap()),
        ])
    }

    #[test]
    fn round_robin_cycles_within_network() {
        let proxy = servers().round_robin();
        let cx = Context::new();
        let dial = NetAddr::udp("127.0.0.1:53".parse().unwrap());

        let picks: Vec<NetAddr> = (0..4).map(|_| proxy(&cx, dial).unwrap()).collect();
        assert_eq!(
            picks,
            vec![
                NetAddr::udp("8.8.8.8:53".parse().unwrap()),
                NetAddr::udp("8.8.4.4:53".parse().unwrap()),
                NetAddr::udp("8.8.8.8:53".parse().unwrap()),
                NetAddr::udp("8.8.4.4:53".parse().unwrap()),
            ]
        );
    }

    #[test]
    fn random_stays_within_network() {
        let proxy = servers().random();
        let cx = Context::new();
        let dial = NetAddr::tcp("127.0.0.1:53".parse().unwrap());

        for _ in 0..32 {
            let picked = proxy(&cx, dial).unwrap();
            assert_eq!(picked.network(), "tcp");
        }
    }

    #[test]
    fn unknown_network_is_an_error() {
        let proxy = servers().round_robin();
        let cx = Context::new();
        let dial = NetAddr::tcp("127.0.0.1:853".parse().unwrap()).over_tls();

        let err = proxy(&cx, dial).unwrap_err();
        assert!(matches!(err, Error::NoNameservers(network) if network == "tcp-tls"));
    }

    #[test]
    fn upstream_picks_primary_without_marker() {
        let proxy = servers().upstream();
        let dial = NetAddr::udp("127.0.0.1:53".parse().unwrap());

        let primary = NetAddr::udp("8.8.8.8:53".parse().unwrap());
        assert_eq!(proxy(&Context::new(), dial).unwrap(), primary);

        // the marker selects among the remaining entries
        let rest: Vec<NetAddr> = servers().0[1..].to_vec();
        for _ in 0..32 {
            let picked = proxy(&Context::new().upstream(), dial).unwrap();
            assert!(rest.contains(&picked));
        }
    }

    #[test]
    fn upstream_with_single_entry_always_picks_it() {
        let only = NetAddr::udp("127.0.0.1:53".parse().unwrap());
        let proxy = NameServers(vec![only]).upstream();
        let dial = NetAddr::udp("0.0.0.0:53".parse().unwrap());

        assert_eq!(proxy(&Context::new().upstream(), dial).unwrap(), only);
    }
}
