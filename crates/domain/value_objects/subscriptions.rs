use serde::{Deserialize, Serialize};

use super::enums::plans::Plan;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrentSubscriptionDto {
    pub plan: Plan,
    pub stripe_customer_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequestModel {
    pub plan: Plan,
}

#[derive(Debug, Clone, Serialize)]
pub struct RedirectUrlDto {
    pub url: String,
}
