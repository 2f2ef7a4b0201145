use crate::error::ProxyError;
use std::net::{Ipv4Addr, Ipv6Addr};
use url::{Host, Url};

/// Check that a decoded token target may be fetched.
///
/// Targets must be absolute `http://` or `https://` URLs with a host. With
/// `block_private` set, IP-literal hosts in loopback, private, link-local or
/// unspecified ranges are refused as well. Hostnames are never resolved, so
/// a public name pointing at a private address still passes.
///
/// # Errors
/// [`ProxyError::InvalidTarget`] for a disallowed scheme, missing host or
/// blocked address.
pub fn validate_target(url: &Url, block_private: bool) -> Result<(), ProxyError> {
    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(ProxyError::InvalidTarget(format!(
                "scheme '{scheme}' not allowed, only http/https"
            )));
        }
    }

    let host = url
        .host()
        .ok_or_else(|| ProxyError::InvalidTarget(format!("no host in {url}")))?;

    if !block_private {
        return Ok(());
    }

    let blocked = match &host {
        Host::Ipv4(ip) => is_blocked_ipv4(*ip),
        Host::Ipv6(ip) => is_blocked_ipv6(*ip),
        Host::Domain(domain) => domain.eq_ignore_ascii_case("localhost"),
    };

    if blocked {
        return Err(ProxyError::InvalidTarget(format!(
            "private or reserved host not allowed: {host}"
        )));
    }

    Ok(())
}

/// 0.0.0.0/8, 10/8, 127/8, 169.254/16, 172.16/12, 192.168/16
fn is_blocked_ipv4(ip: Ipv4Addr) -> bool {
    let [a, b, ..] = ip.octets();

    a == 0
        || a == 10
        || a == 127
        || (a == 169 && b == 254)
        || (a == 172 && (16..=31).contains(&b))
        || (a == 192 && b == 168)
}

/// ::, ::1, fe80::/10, fc00::/7 and IPv4-mapped forms of blocked v4 ranges
fn is_blocked_ipv6(ip: Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_blocked_ipv4(v4);
    }

    let s = ip.segments();
    ip.is_unspecified()
        || ip.is_loopback()
        || (s[0] & 0xffc0) == 0xfe80
        || (s[0] & 0xfe00) == 0xfc00
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(url: &str, block_private: bool) -> Result<(), ProxyError> {
        validate_target(&Url::parse(url).unwrap(), block_private)
    }

    #[test]
    fn allows_http_and_https() {
        assert!(check("http://cdn.example/a.m3u8", false).is_ok());
        assert!(check("https://cdn.example/a.m3u8", true).is_ok());
    }

    #[test]
    fn rejects_other_schemes() {
        assert!(check("ftp://cdn.example/file.ts", false).is_err());
        assert!(check("file:///etc/passwd", false).is_err());
        assert!(check("data:text/plain,hello", false).is_err());
    }

    #[test]
    fn private_addresses_allowed_unless_blocking() {
        assert!(check("http://127.0.0.1:8080/a.ts", false).is_ok());
        assert!(check("http://192.168.1.10/a.ts", false).is_ok());
    }

    #[test]
    fn blocks_private_ipv4() {
        for url in [
            "http://127.0.0.1/a",
            "http://10.1.2.3/a",
            "http://172.16.0.1/a",
            "http://172.31.255.255/a",
            "http://192.168.0.1/a",
            "http://169.254.169.254/latest/meta-data/",
            "http://0.0.0.0/a",
        ] {
            assert!(
                matches!(check(url, true), Err(ProxyError::InvalidTarget(_))),
                "{}",
                url
            );
        }
    }

    #[test]
    fn blocks_private_ipv6() {
        assert!(check("http://[::1]/a", true).is_err());
        assert!(check("http://[::]/a", true).is_err());
        assert!(check("http://[fe80::1]/a", true).is_err());
        assert!(check("http://[fd00::1]/a", true).is_err());
        assert!(check("http://[::ffff:127.0.0.1]/a", true).is_err());
    }

    #[test]
    fn blocks_localhost_name() {
        assert!(check("http://localhost:3000/a", true).is_err());
        assert!(check("http://LOCALHOST/a", true).is_err());
    }

    #[test]
    fn range_boundaries_not_blocked() {
        assert!(check("http://172.15.255.255/a", true).is_ok());
        assert!(check("http://172.32.0.0/a", true).is_ok());
        assert!(check("http://8.8.8.8/a", true).is_ok());
        assert!(check("http://[2001:db8::1]/a", true).is_ok());
    }
}
