//! Stock redistribution between NGOs and orphanages.

use reqwest::Method;

use saveplate_types::api::{
    ApproveFoodRequest, ConfirmDeliveryRequest, DeliveryCompletedRequest, DonateItemRequest,
    NgoStockResponse, RequestFoodRequest, StockResponse,
};
use saveplate_types::{Donation, NgoStock, StockItem, UserProfile};

use crate::{ApiClient, ApiError};

/// Which NGOs an orphanage browses for food.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockScope {
    SameCity,
    OutOfCity,
}

impl StockScope {
    fn path(self) -> &'static str {
        match self {
            StockScope::SameCity => "orphanage/ngo-city-stock",
            StockScope::OutOfCity => "orphanage/ngo-out-of-city-stock",
        }
    }
}

impl ApiClient {
    // -- NGO side --

    /// Items of completed pickups this NGO still holds.
    pub async fn ngo_food_stock(&self) -> Result<Vec<StockItem>, ApiError> {
        let req = self.authed(Method::GET, "orphanage/ngo-food-stock")?;
        let resp: StockResponse = self.send(req, "Failed to load stock").await?;
        Ok(resp.stock)
    }

    pub async fn city_orphanages(&self) -> Result<Vec<UserProfile>, ApiError> {
        let req = self.authed(Method::GET, "orphanage/city-orphanages")?;
        self.send(req, "Failed to load orphanages").await
    }

    pub async fn donate_item(&self, req: &DonateItemRequest) -> Result<Option<String>, ApiError> {
        let builder = self.authed(Method::POST, "orphanage/donate-item")?.json(req);
        self.send_message(builder, "Failed to donate").await
    }

    /// Answer an orphanage's food request by sending it the donation.
    pub async fn donate_to_orphanage(
        &self,
        req: &ApproveFoodRequest,
    ) -> Result<Option<String>, ApiError> {
        let builder = self
            .authed(Method::POST, "orphanage/donate-to-orphanage")?
            .json(req);
        self.send_message(builder, "Failed to confirm donation").await
    }

    /// Donations this NGO is delivering or has delivered.
    pub async fn deliveries(&self) -> Result<Vec<Donation>, ApiError> {
        let req = self.authed(Method::GET, "orphanage/deliveries")?;
        self.send(req, "Failed to load deliveries").await
    }

    /// NGO marks a delivery as dropped off; the orphanage then confirms it.
    pub async fn delivery_completed(&self, donation_id: &str) -> Result<Option<String>, ApiError> {
        let builder = self
            .authed(Method::PUT, "orphanage/delivery-completed")?
            .json(&DeliveryCompletedRequest {
                donation_id: donation_id.to_string(),
            });
        self.send_message(builder, "Failed to mark delivery").await
    }

    // -- Orphanage side --

    pub async fn ngo_stock(&self, scope: StockScope) -> Result<Vec<NgoStock>, ApiError> {
        let req = self.authed(Method::GET, scope.path())?;
        let resp: NgoStockResponse = self.send(req, "Failed to load stock").await?;
        Ok(resp.ngos)
    }

    pub async fn request_food(&self, req: &RequestFoodRequest) -> Result<Option<String>, ApiError> {
        let builder = self.authed(Method::POST, "orphanage/request-food")?.json(req);
        self.send_message(builder, "Request failed").await
    }

    pub async fn confirm_delivery(
        &self,
        req: &ConfirmDeliveryRequest,
    ) -> Result<Option<String>, ApiError> {
        let builder = self.authed(Method::PUT, "orphanage/confirm-delivery")?.json(req);
        self.send_message(builder, "Failed to confirm delivery").await
    }
}
