use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::actions::{EmissionsEstimate, FinanceOffer, ShippingOption};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarbonFootprintRequest {
    pub flight_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarbonFootprintResponse {
    pub flight: FlightInfo,
    pub emissions: EmissionsEstimate,
    pub methodology: Methodology,
    pub timestamp: String,
    pub units: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightInfo {
    pub flight_number: String,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub distance_km: u32,
    pub passenger_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Methodology {
    pub calculation_basis: String,
    pub fuel_to_co2_ratio: f64,
    pub radiative_forcing_multiplier: f64,
    pub data_source: String,
}

impl Default for Methodology {
    fn default() -> Self {
        Self {
            calculation_basis: "DEFRA 2023 emission factors per passenger-km".to_string(),
            fuel_to_co2_ratio: 3.16,
            radiative_forcing_multiplier: 1.9,
            data_source: "DEFRA & ICAO Aviation Emissions Guidelines".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceCalculationRequest {
    pub customer_id: String,
    pub vehicle_id: String,
    pub max_interest_rate: f64,
    pub down_payment: f64,
    pub years: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceCalculationResponse {
    pub recommended_finance_offer: RecommendedFinanceOffer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedFinanceOffer {
    pub customer_id: String,
    pub vehicle_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_name: Option<String>,
    #[serde(flatten)]
    pub offer: FinanceOffer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingOptionsRequest {
    pub product_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingOptionsResponse {
    pub product: ProductInfo,
    pub shipping_options: Vec<ShippingOption>,
    pub recommended_option: ShippingOption,
    pub timestamp: String,
    pub units: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInfo {
    pub product_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub details: Option<serde_json::Value>,
}

pub(crate) fn units<const N: usize>(pairs: [(&str, &str); N]) -> BTreeMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
