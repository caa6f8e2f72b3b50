//! HTTP picture source

use dfdata::images::ImageSource;
use dfdata::FetchError;
use std::io::Read;
use std::time::Duration;

const USER_AGENT: &str = concat!("dfdata/", env!("CARGO_PKG_VERSION"));

/// Blocking fetches over one shared agent
pub struct HttpImageSource {
    agent: ureq::Agent,
}

impl HttpImageSource {
    /// `timeout` bounds each request from connect to last byte
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build();
        Self { agent }
    }
}

impl ImageSource for HttpImageSource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = match self.agent.get(url).call() {
            Ok(resp) => resp,
            Err(ureq::Error::Status(code, _)) => return Err(FetchError::Status(code)),
            Err(e) => return Err(FetchError::Transport(e.to_string())),
        };

        let mut bytes = Vec::new();
        response.into_reader().read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}
