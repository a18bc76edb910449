use reqwest::Method;
use tracing::debug;

use saveplate_types::Donation;
use saveplate_types::api::CreateDonationRequest;

use crate::{ApiClient, ApiError};

impl ApiClient {
    pub async fn create_donation(
        &self,
        req: &CreateDonationRequest,
    ) -> Result<Option<String>, ApiError> {
        let builder = self.authed(Method::POST, "donations")?.json(req);
        self.send_message(builder, "Failed to create donation").await
    }

    /// The donor's own donations.
    pub async fn my_donations(&self) -> Result<Vec<Donation>, ApiError> {
        let req = self.authed(Method::GET, "donations/my")?;
        self.send(req, "Failed to load donations").await
    }

    /// Donations waiting for an NGO, limited to `city` (case-sensitive, as
    /// stored on the NGO's profile).
    pub async fn pending_donations(&self, city: Option<&str>) -> Result<Vec<Donation>, ApiError> {
        let req = self.authed(Method::GET, "donations/pending")?;
        let all: Vec<Donation> = self.send(req, "Failed to load donations").await?;
        let total = all.len();
        let available: Vec<Donation> = all
            .into_iter()
            .filter(|d| d.city.as_deref() == city)
            .collect();
        debug!(total, in_city = available.len(), "pending donations");
        Ok(available)
    }

    pub async fn accept_donation(&self, id: &str) -> Result<Option<String>, ApiError> {
        let req = self.authed(Method::PUT, &format!("donations/{id}/accept"))?;
        self.send_message(req, "Failed to accept donation").await
    }

    /// NGO tells the donor the food was picked up.
    pub async fn request_completion(&self, id: &str) -> Result<Option<String>, ApiError> {
        let req = self.authed(Method::PUT, &format!("donations/{id}/request-completion"))?;
        self.send_message(req, "Failed to request completion").await
    }

    /// Donor confirms the pickup. This starts the best-before countdown.
    pub async fn confirm_completion(&self, id: &str) -> Result<Option<String>, ApiError> {
        let req = self.authed(Method::PUT, &format!("donations/{id}/confirm-completion"))?;
        self.send_message(req, "Failed to confirm pickup").await
    }
}
