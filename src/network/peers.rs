use std::sync::RwLock;

/// The registered peer set: deduplicated host:port strings, mutated only by
/// explicit registration. No discovery, no expiry.
pub struct Peers {
    inner: RwLock<Vec<String>>,
}

impl Default for Peers {
    fn default() -> Self {
        Self::new()
    }
}

impl Peers {
    pub fn new() -> Peers {
        Peers {
            inner: RwLock::new(vec![]),
        }
    }

    pub fn add_peer(&self, addr: String) {
        let mut inner = self
            .inner
            .write()
            .expect("Failed to acquire write lock on peers - this should never happen");
        if !inner.iter().any(|existing| existing.eq(&addr)) {
            inner.push(addr);
        }
    }

    pub fn get_peers(&self) -> Vec<String> {
        self.inner
            .read()
            .expect("Failed to acquire read lock on peers - this should never happen")
            .to_vec()
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .expect("Failed to acquire read lock on peers - this should never happen")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Reduce a peer address to bare host:port. Accepts either a plain
/// "host:port" or a URL like "http://192.168.0.5:5000"; anything after the
/// authority is dropped. Returns None when nothing usable remains.
pub fn normalize_peer_addr(addr: &str) -> Option<String> {
    let trimmed = addr.trim();
    let without_scheme = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .unwrap_or(trimmed);
    let host_port = without_scheme.split('/').next().unwrap_or("");
    if host_port.is_empty() {
        None
    } else {
        Some(host_port.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_scheme_and_path() {
        assert_eq!(
            normalize_peer_addr("http://192.168.0.5:5000"),
            Some("192.168.0.5:5000".to_string())
        );
        assert_eq!(
            normalize_peer_addr("https://node.example:2001/chain"),
            Some("node.example:2001".to_string())
        );
        assert_eq!(
            normalize_peer_addr("127.0.0.1:2002"),
            Some("127.0.0.1:2002".to_string())
        );
    }

    #[test]
    fn test_normalize_rejects_empty() {
        assert_eq!(normalize_peer_addr(""), None);
        assert_eq!(normalize_peer_addr("http://"), None);
        assert_eq!(normalize_peer_addr("   "), None);
    }

    #[test]
    fn test_peers_deduplicate() {
        let peers = Peers::new();
        peers.add_peer("127.0.0.1:2002".to_string());
        peers.add_peer("127.0.0.1:2002".to_string());
        peers.add_peer("127.0.0.1:2003".to_string());
        assert_eq!(peers.len(), 2);
    }
}
