use axum::{extract::ConnectInfo, http::Request};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tower_governor::{GovernorError, key_extractor::KeyExtractor};

/// Per-client key for the governor layers.
///
/// Looks at `X-Forwarded-For` (first hop), then `X-Real-IP`, then the peer
/// address. Requests with none of those share the localhost bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIpKeyExtractor;

impl KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        Ok(client_ip(req).unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST)))
    }
}

fn client_ip<T>(req: &Request<T>) -> Option<IpAddr> {
    let headers = req.headers();

    if let Some(xff) = headers.get("x-forwarded-for")
        && let Ok(xff) = xff.to_str()
        && let Some(first) = xff.split(',').next()
        && let Ok(ip) = first.trim().parse::<IpAddr>()
    {
        return Some(ip);
    }

    if let Some(real_ip) = headers.get("x-real-ip")
        && let Ok(real_ip) = real_ip.to_str()
        && let Ok(ip) = real_ip.trim().parse::<IpAddr>()
    {
        return Some(ip);
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn extract(req: &Request<Body>) -> IpAddr {
        ClientIpKeyExtractor.extract(req).unwrap()
    }

    #[test]
    fn forwarded_for_wins_and_takes_first_hop() {
        let req = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .header("x-real-ip", "198.51.100.2")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract(&req), "203.0.113.7".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn real_ip_used_when_forwarded_for_is_garbage() {
        let req = Request::builder()
            .header("x-forwarded-for", "not-an-ip")
            .header("x-real-ip", "198.51.100.2")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract(&req), "198.51.100.2".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn peer_address_then_localhost() {
        let mut req = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(extract(&req), IpAddr::V4(Ipv4Addr::LOCALHOST));

        let peer: SocketAddr = "192.0.2.9:4242".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(peer));
        assert_eq!(extract(&req), peer.ip());
    }
}
