use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingOption {
    pub carrier: String,
    pub service_level: String,
    pub estimated_delivery_days: u32,
    pub cost: f64,
    pub carbon_footprint_kg: f64,
}

impl ShippingOption {
    fn new(carrier: &str, service_level: &str, days: u32, cost: f64, carbon_kg: f64) -> Self {
        Self {
            carrier: carrier.to_string(),
            service_level: service_level.to_string(),
            estimated_delivery_days: days,
            cost,
            carbon_footprint_kg: carbon_kg,
        }
    }
}

/// The fixed catalog, ordered standard first.
pub fn shipping_options() -> Vec<ShippingOption> {
    vec![
        ShippingOption::new("UPS", "Standard Ground", 5, 8.99, 1.2),
        ShippingOption::new("FedEx", "Express", 2, 24.99, 3.8),
        ShippingOption::new("DHL", "Overnight", 1, 49.99, 7.5),
    ]
}

pub fn recommended_option(options: &[ShippingOption]) -> Option<&ShippingOption> {
    options.first()
}
