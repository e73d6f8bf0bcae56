//! Closed-form calculations behind each action endpoint.

pub mod carbon;
pub mod finance;
pub mod shipping;

pub use carbon::{calculate_emissions, estimate_distance_km, EmissionsEstimate, FareClass, PassengerTally};
pub use finance::{calculate_offer, FinanceError, FinanceOffer, FinanceTerms, MAX_INTEREST_RATE};
pub use shipping::{recommended_option, shipping_options, ShippingOption};
