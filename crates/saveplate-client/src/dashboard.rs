use reqwest::Method;

use saveplate_types::api::{DashboardDonations, MeResponse, PlatformStats};
use saveplate_types::{Donation, UserProfile};

use crate::{ApiClient, ApiError};

impl ApiClient {
    /// Profile of the logged-in account.
    pub async fn me(&self) -> Result<UserProfile, ApiError> {
        let req = self.authed(Method::GET, "dashboard/me")?;
        let resp: MeResponse = self.send(req, "Failed to load profile").await?;
        Ok(resp.into_profile())
    }

    /// Donations this NGO accepted.
    pub async fn ngo_dashboard(&self) -> Result<Vec<Donation>, ApiError> {
        let req = self.authed(Method::GET, "dashboard/ngo-dashboard")?;
        let resp: DashboardDonations = self.send(req, "Failed to load dashboard").await?;
        Ok(resp.my_donations)
    }

    /// Donations headed to or received by this orphanage.
    pub async fn orphanage_dashboard(&self) -> Result<Vec<Donation>, ApiError> {
        let req = self.authed(Method::GET, "dashboard/orphanage-dashboard")?;
        let resp: DashboardDonations = self.send(req, "Failed to load dashboard").await?;
        Ok(resp.my_donations)
    }

    /// Platform-wide totals shown on the landing page. No login needed.
    pub async fn platform_stats(&self) -> Result<PlatformStats, ApiError> {
        let req = self.public(Method::GET, "stats");
        self.send_public(req, "Failed to load stats").await
    }
}
