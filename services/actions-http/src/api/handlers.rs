use agent_actions_crm::{CrmError, SoqlQuery};
use axum::extract::rejection::JsonRejection;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use tracing::{debug, info, instrument, Span};

use crate::actions::{
    calculate_emissions, calculate_offer, estimate_distance_km, recommended_option,
    shipping_options, FinanceTerms, PassengerTally,
};
use crate::context::{ClientContext, CrmConnection};

use super::error::ActionError;
use super::types::{
    units, CarbonFootprintRequest, CarbonFootprintResponse, FinanceCalculationRequest,
    FinanceCalculationResponse, FlightInfo, Methodology, ProductInfo, RecommendedFinanceOffer,
    ShippingOptionsRequest, ShippingOptionsResponse,
};

type ApiResult<T> = Result<Json<T>, ActionError>;

const FLIGHT_OBJECT: &str = "Flight__c";
const FLIGHT_AIRLINE: &str = "Airline__c";
const FLIGHT_ORIGIN: &str = "Origin_Airport_Code__c";
const FLIGHT_DESTINATION: &str = "Destination_Airport_Code__c";

const BOOKING_OBJECT: &str = "Booking__c";
const BOOKING_FLIGHT: &str = "Flight__c";
const BOOKING_CLASS: &str = "Class__c";

const VEHICLE_OBJECT: &str = "Vehicle__c";
const VEHICLE_NAME: &str = "Name";
const VEHICLE_PRICE: &str = "Price__c";

#[instrument(skip_all, fields(flight_id = tracing::field::Empty))]
pub async fn calculate_carbon_footprint(
    ctx: ClientContext,
    payload: Result<Json<CarbonFootprintRequest>, JsonRejection>,
) -> ApiResult<CarbonFootprintResponse> {
    let Json(request) = payload?;
    let flight_id = require_id("flightId", &request.flight_id)?;
    Span::current().record("flight_id", flight_id);

    info!("Processing carbon footprint calculation");

    let CrmConnection::Present(crm) = &ctx.crm else {
        return Err(ActionError::crm_unavailable());
    };

    let flights = crm.query(&flight_query(flight_id)?).await?;
    let flight = flights
        .first()
        .ok_or_else(|| ActionError::NotFound("Flight not found.".to_string()))?;

    // Incomplete flight records fall back to the default distance
    let airline = flight.get_str(FLIGHT_AIRLINE);
    let origin = flight.get_str(FLIGHT_ORIGIN).unwrap_or_default();
    let destination = flight.get_str(FLIGHT_DESTINATION).unwrap_or_default();
    let distance_km = estimate_distance_km(origin, destination);

    let bookings = crm.query(&bookings_query(flight_id)?).await?;
    let tally: PassengerTally = bookings
        .records
        .iter()
        .map(|booking| booking.get_str(BOOKING_CLASS))
        .collect();

    if tally.unclassified > 0 {
        debug!(
            unclassified = tally.unclassified,
            "Ignoring bookings without a recognised fare class"
        );
    }

    let emissions = calculate_emissions(distance_km, &tally);

    info!(
        distance_km,
        passengers = tally.total(),
        total_co2_kg = emissions.total_co2_kg,
        "Carbon footprint calculated"
    );

    Ok(Json(CarbonFootprintResponse {
        flight: FlightInfo {
            flight_number: flight_number(airline, flight_id),
            departure_airport: origin.to_string(),
            arrival_airport: destination.to_string(),
            distance_km,
            passenger_count: tally.total(),
        },
        emissions,
        methodology: Methodology::default(),
        timestamp: timestamp(),
        units: units([("distance", "km"), ("emissions", "kg CO2e")]),
    }))
}

#[instrument(skip_all, fields(customer_id = tracing::field::Empty, vehicle_id = tracing::field::Empty))]
pub async fn calculate_finance_agreement(
    ctx: ClientContext,
    payload: Result<Json<FinanceCalculationRequest>, JsonRejection>,
) -> ApiResult<FinanceCalculationResponse> {
    let Json(request) = payload?;
    let customer_id = require_id("customerId", &request.customer_id)?;
    let vehicle_id = require_id("vehicleId", &request.vehicle_id)?;
    Span::current()
        .record("customer_id", customer_id)
        .record("vehicle_id", vehicle_id);

    info!("Processing finance calculation");

    let CrmConnection::Present(crm) = &ctx.crm else {
        return Err(ActionError::crm_unavailable());
    };

    let vehicles = crm.query(&vehicle_query(vehicle_id)?).await?;
    let vehicle = vehicles
        .first()
        .ok_or_else(|| ActionError::NotFound("Vehicle not found.".to_string()))?;
    let price = vehicle.require_f64(VEHICLE_PRICE)?;

    let offer = calculate_offer(
        price,
        &FinanceTerms {
            max_interest_rate: request.max_interest_rate,
            down_payment: request.down_payment,
            years: request.years,
        },
    )?;

    info!(
        price,
        rate = offer.adjusted_interest_rate,
        monthly_payment = offer.monthly_payment,
        "Finance offer calculated"
    );

    Ok(Json(FinanceCalculationResponse {
        recommended_finance_offer: RecommendedFinanceOffer {
            customer_id: customer_id.to_string(),
            vehicle_id: vehicle_id.to_string(),
            vehicle_name: vehicle.get_str(VEHICLE_NAME).map(str::to_string),
            offer,
        },
    }))
}

#[instrument(skip_all, fields(product_id = tracing::field::Empty))]
pub async fn calculate_shipping_options(
    _ctx: ClientContext,
    payload: Result<Json<ShippingOptionsRequest>, JsonRejection>,
) -> ApiResult<ShippingOptionsResponse> {
    let Json(request) = payload?;
    let product_id = require_id("productId", &request.product_id)?;
    Span::current().record("product_id", product_id);

    info!("Processing shipping options calculation");

    let options = shipping_options();
    let recommended = recommended_option(&options)
        .cloned()
        .ok_or_else(|| ActionError::unexpected("shipping catalog is empty"))?;

    Ok(Json(ShippingOptionsResponse {
        product: ProductInfo {
            product_id: product_id.to_string(),
        },
        shipping_options: options,
        recommended_option: recommended,
        timestamp: timestamp(),
        units: units([
            ("cost", "USD"),
            ("deliveryTime", "days"),
            ("carbonFootprint", "kg CO2e"),
        ]),
    }))
}

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "agent-actions-http"
    }))
}

fn require_id<'a>(field: &str, value: &'a str) -> Result<&'a str, ActionError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ActionError::BadRequest(format!("{} cannot be empty", field)));
    }
    Ok(value)
}

fn flight_number(airline: Option<&str>, flight_id: &str) -> String {
    match airline.map(str::trim).filter(|a| !a.is_empty()) {
        Some(airline) => format!("{}-{}", airline, flight_id),
        None => flight_id.to_string(),
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn flight_query(flight_id: &str) -> Result<SoqlQuery, CrmError> {
    SoqlQuery::select([FLIGHT_AIRLINE, FLIGHT_ORIGIN, FLIGHT_DESTINATION])
        .from(FLIGHT_OBJECT)?
        .where_eq("Id", flight_id)
}

fn bookings_query(flight_id: &str) -> Result<SoqlQuery, CrmError> {
    SoqlQuery::select([BOOKING_CLASS])
        .from(BOOKING_OBJECT)?
        .where_eq(BOOKING_FLIGHT, flight_id)
}

fn vehicle_query(vehicle_id: &str) -> Result<SoqlQuery, CrmError> {
    SoqlQuery::select(["Id", VEHICLE_NAME, VEHICLE_PRICE])
        .from(VEHICLE_OBJECT)?
        .where_eq("Id", vehicle_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queries_target_the_expected_objects() {
        assert_eq!(
            flight_query("a01").unwrap().to_string(),
            "SELECT Airline__c, Origin_Airport_Code__c, Destination_Airport_Code__c FROM Flight__c WHERE Id = 'a01'"
        );
        assert_eq!(
            bookings_query("a01").unwrap().to_string(),
            "SELECT Class__c FROM Booking__c WHERE Flight__c = 'a01'"
        );
        assert_eq!(
            vehicle_query("a0B").unwrap().to_string(),
            "SELECT Id, Name, Price__c FROM Vehicle__c WHERE Id = 'a0B'"
        );
    }

    #[test]
    fn flight_number_omits_a_missing_airline() {
        assert_eq!(flight_number(Some("UA"), "a01"), "UA-a01");
        assert_eq!(flight_number(Some("  "), "a01"), "a01");
        assert_eq!(flight_number(None, "a01"), "a01");
    }

    #[test]
    fn blank_identifiers_are_rejected() {
        assert!(matches!(
            require_id("flightId", "   "),
            Err(ActionError::BadRequest(_))
        ));
        assert_eq!(require_id("flightId", " a01 ").unwrap(), "a01");
    }
}
