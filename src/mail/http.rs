use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::GatewayError;
use crate::mail::gateway::{EmailBodyResponse, EmailGateway, EmailPage};

pub const DEFAULT_API_BASE_URL: &str = "https://flipkart-email-mock.now.sh";

pub struct HttpGateway {
    base: Url,
    client: Client,
}

impl HttpGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { base, client })
    }

    pub fn page_url(&self, page: u32) -> Result<Url, GatewayError> {
        let mut url = self.base.join("emails")?;
        url.query_pairs_mut().append_pair("page", &page.to_string());
        Ok(url)
    }

    pub fn body_url(&self, id: &str) -> Result<Url, GatewayError> {
        let mut url = self.base.clone();
        url.query_pairs_mut().append_pair("id", id);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, GatewayError> {
        log::debug!("GET {url}");
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(GatewayError::Status(status));
        }
        Ok(resp.json::<T>().await?)
    }
}

#[async_trait]
impl EmailGateway for HttpGateway {
    async fn fetch_page(&self, page: u32) -> Result<EmailPage, GatewayError> {
        let url = self.page_url(page)?;
        self.get_json(url).await
    }

    async fn fetch_body(&self, id: &str) -> Result<EmailBodyResponse, GatewayError> {
        let url = self.body_url(id)?;
        self.get_json(url).await
    }
}
