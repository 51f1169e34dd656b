use super::{FeedSnapshot, FeedSource};
use crate::error::FeedError;
use std::time::Duration;

const TRAFFIC_PATH: &str = "/get_traffic";

/// Polls a traffic server's `/get_traffic` endpoint
pub struct HttpFeed {
    agent: ureq::Agent,
    url: String,
}

impl HttpFeed {
    /// `timeout` of `None` lets a request hang until the transport gives up
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Self {
        let mut builder = ureq::AgentBuilder::new()
            .user_agent(concat!("trafficglobe/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Self {
            agent: builder.build(),
            url: traffic_url(base_url),
        }
    }
}

impl FeedSource for HttpFeed {
    fn fetch(&self) -> Result<FeedSnapshot, FeedError> {
        let resp = self.agent.get(&self.url).call()?;
        FeedSnapshot::from_reader(resp.into_reader())
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Accept either the server root or the full endpoint URL
fn traffic_url(base_url: &str) -> String {
    let trimmed = base_url.trim().trim_end_matches('/');
    if trimmed.ends_with(TRAFFIC_PATH) {
        trimmed.to_string()
    } else {
        format!("{trimmed}{TRAFFIC_PATH}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_endpoint_to_server_root() {
        assert_eq!(traffic_url("http://127.0.0.1:5000"), "http://127.0.0.1:5000/get_traffic");
        assert_eq!(traffic_url("http://127.0.0.1:5000/"), "http://127.0.0.1:5000/get_traffic");
    }

    #[test]
    fn keeps_explicit_endpoint() {
        assert_eq!(
            traffic_url("https://feed.example/get_traffic/"),
            "https://feed.example/get_traffic"
        );
    }

    #[test]
    fn describes_itself_by_endpoint() {
        let feed = HttpFeed::new("http://127.0.0.1:5000/", None);
        assert_eq!(feed.describe(), "http://127.0.0.1:5000/get_traffic");
    }

    #[test]
    fn unreachable_server_is_a_fetch_error() {
        // Port 9 (discard) on localhost is closed on CI hosts
        let feed = HttpFeed::new("http://127.0.0.1:9", Some(Duration::from_millis(500)));
        let err = feed.fetch().unwrap_err();
        assert_eq!(err.kind(), "fetch");
    }
}
