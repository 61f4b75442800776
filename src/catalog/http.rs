use std::time::Duration;

use super::{CatalogError, PageSource};

pub const DEFAULT_API_BASE: &str = "https://api.jikan.moe/v4";

pub struct HttpCatalog {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpCatalog {
    pub fn new(base_url: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(10))
            .timeout_read(Duration::from_secs(30))
            .timeout_write(Duration::from_secs(30))
            .build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn page_url(&self, catalog_id: &str, page: u32) -> String {
        format!(
            "{}/anime/{}/episodes?page={}",
            self.base_url, catalog_id, page
        )
    }
}

impl PageSource for HttpCatalog {
    fn fetch_page(&self, catalog_id: &str, page: u32) -> Result<String, CatalogError> {
        let url = self.page_url(catalog_id, page);
        let response = self.agent.get(&url).call().map_err(|err| match err {
            ureq::Error::Status(code, _) => CatalogError::Status(code),
            ureq::Error::Transport(transport) => CatalogError::Transport(transport.to_string()),
        })?;
        Ok(response.into_string()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_url_targets_episode_listing() {
        let catalog = HttpCatalog::new("https://api.example.test/v4/");
        assert_eq!(
            catalog.page_url("40748", 3),
            "https://api.example.test/v4/anime/40748/episodes?page=3"
        );
    }
}
