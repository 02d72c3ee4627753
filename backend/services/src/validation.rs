use statusboard_shared::ServiceInput;
use url::Url;

use crate::error::{MonitorError, Result};

/// Name and URL that passed registration checks. Stores only accept this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDraft {
    name: String,
    url: String,
}

impl ServiceDraft {
    pub fn new(name: &str, url: &str) -> Result<Self> {
        let name = name.trim();
        let url = url.trim();

        if name.is_empty() || url.is_empty() {
            return Err(MonitorError::validation("Name and URL are required"));
        }

        let parsed = Url::parse(url).map_err(|_| MonitorError::validation("Invalid URL format"))?;
        if !parsed.has_host() {
            return Err(MonitorError::validation("Invalid URL format"));
        }

        Ok(Self {
            name: name.to_string(),
            url: url.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl TryFrom<ServiceInput> for ServiceDraft {
    type Error = MonitorError;

    fn try_from(input: ServiceInput) -> Result<Self> {
        match (input.name, input.url) {
            (Some(name), Some(url)) => ServiceDraft::new(&name, &url),
            _ => Err(MonitorError::validation("Name and URL are required")),
        }
    }
}
