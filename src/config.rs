// Where requests go. Read from the environment with a fixed fallback, the
// same way the client has always been configured.

pub const HOST_ENV: &str = "PINATA_HOST";
pub const DEFAULT_HOST: &str = "api.pinata.cloud";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    base_url: String,
}

impl Config {
    /// `https://$PINATA_HOST`, or `https://api.pinata.cloud` when unset.
    pub fn from_env() -> Self {
        let host = std::env::var(HOST_ENV)
            .ok()
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.into());
        Config::for_host(&host)
    }

    pub fn for_host(host: &str) -> Self {
        Config::with_base_url(format!("https://{}", host.trim()))
    }

    /// Use a full base URL such as `http://127.0.0.1:8080`.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Config { base_url }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::for_host(DEFAULT_HOST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_join_cleanly() {
        let config = Config::with_base_url("http://localhost:1234/");
        assert_eq!(
            config.endpoint("/pinning/pinFileToIPFS"),
            "http://localhost:1234/pinning/pinFileToIPFS"
        );
        assert_eq!(
            Config::default().endpoint("data/pinList"),
            "https://api.pinata.cloud/data/pinList"
        );
    }
}
