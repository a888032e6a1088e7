use novea_interfaces::UrlEncoder;

/// Routes URLs through the egress proxy: `prefix` followed by the
/// percent-encoded target.
#[derive(Debug, Clone)]
pub struct ProxyEncoder {
    prefix: String,
}

impl ProxyEncoder {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl UrlEncoder for ProxyEncoder {
    fn encode(&self, url: &str) -> String {
        format!("{}{}", self.prefix, urlencoding::encode(url))
    }
}
