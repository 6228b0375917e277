//! Web server command.

use std::net::Ipv6Addr;

use console::style;

use crate::config::Settings;

/// Default port when the bind address names only a host.
const DEFAULT_PORT: u16 = 3000;

/// Start the web server.
pub async fn cmd_serve(settings: &Settings) -> anyhow::Result<()> {
    let (host, port) = parse_bind_address(&settings.bind)?;

    let shown_host = if host.contains(':') {
        format!("[{}]", host)
    } else {
        host.clone()
    };
    println!(
        "{} Starting cinscan server at http://{}:{}",
        style("→").cyan(),
        shown_host,
        port
    );
    println!("  POST /analyze with a multipart \"image\" field");
    println!("  Press Ctrl+C to stop");

    crate::server::serve(settings, &host, port).await
}

/// Parse a bind address that can be:
/// - Just a port: "3000" -> 127.0.0.1:3000
/// - Just a host: "0.0.0.0" -> 0.0.0.0:3000
/// - Host and port: "0.0.0.0:3000" or "localhost:3000"
/// - IPv6, bare or bracketed: "::1" -> [::1]:3000, "[::1]:8080"
///
/// The returned host never carries brackets.
fn parse_bind_address(bind: &str) -> anyhow::Result<(String, u16)> {
    let bind = bind.trim();
    if bind.is_empty() {
        anyhow::bail!("Empty bind address");
    }

    // Try parsing as just a port number
    if let Ok(port) = bind.parse::<u16>() {
        return Ok(("127.0.0.1".to_string(), port));
    }

    if let Some(rest) = bind.strip_prefix('[') {
        let (host, after) = rest
            .split_once(']')
            .ok_or_else(|| anyhow::anyhow!("Unclosed '[' in bind address {:?}", bind))?;
        let port = match after {
            "" => DEFAULT_PORT,
            _ => after
                .strip_prefix(':')
                .and_then(|p| p.parse::<u16>().ok())
                .ok_or_else(|| anyhow::anyhow!("Invalid port in bind address {:?}", bind))?,
        };
        return Ok((host.to_string(), port));
    }

    // A bare IPv6 address has colons but no port
    if bind.parse::<Ipv6Addr>().is_ok() {
        return Ok((bind.to_string(), DEFAULT_PORT));
    }

    // Try parsing as host:port
    if let Some((host, port_str)) = bind.rsplit_once(':') {
        if let Ok(port) = port_str.parse::<u16>() {
            return Ok((host.to_string(), port));
        }
    }

    // Must be just a host, use default port
    Ok((bind.to_string(), DEFAULT_PORT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bind_address() {
        assert_eq!(
            parse_bind_address("8080").unwrap(),
            ("127.0.0.1".to_string(), 8080)
        );
        assert_eq!(
            parse_bind_address("0.0.0.0").unwrap(),
            ("0.0.0.0".to_string(), 3000)
        );
        assert_eq!(
            parse_bind_address("0.0.0.0:9000").unwrap(),
            ("0.0.0.0".to_string(), 9000)
        );
        assert!(parse_bind_address("  ").is_err());
    }

    #[test]
    fn test_parse_bind_host_names() {
        assert_eq!(
            parse_bind_address("localhost:3000").unwrap(),
            ("localhost".to_string(), 3000)
        );
        assert_eq!(
            parse_bind_address("localhost").unwrap(),
            ("localhost".to_string(), 3000)
        );
    }

    #[test]
    fn test_parse_bind_ipv6() {
        assert_eq!(parse_bind_address("::1").unwrap(), ("::1".to_string(), 3000));
        assert_eq!(parse_bind_address("::").unwrap(), ("::".to_string(), 3000));
        assert_eq!(
            parse_bind_address("[::1]:8080").unwrap(),
            ("::1".to_string(), 8080)
        );
        assert_eq!(parse_bind_address("[::1]").unwrap(), ("::1".to_string(), 3000));
        assert!(parse_bind_address("[::1").is_err());
        assert!(parse_bind_address("[::1]:http").is_err());
    }
}
