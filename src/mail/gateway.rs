use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::email::{EmailId, EmailSummary};
use crate::error::GatewayError;

/// One page of the remote listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailPage {
    pub list: Vec<EmailSummary>,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailBodyResponse {
    pub id: EmailId,
    pub body: String,
}

/// Remote source of summaries and bodies.
#[async_trait]
pub trait EmailGateway: Send + Sync {
    async fn fetch_page(&self, page: u32) -> Result<EmailPage, GatewayError>;
    async fn fetch_body(&self, id: &str) -> Result<EmailBodyResponse, GatewayError>;
}
