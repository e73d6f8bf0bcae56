use super::{encode_client_context, TestHarness};
use anyhow::Result;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

const FLIGHT_ID: &str = "a015g00000FLT01AAA";
const VEHICLE_ID: &str = "a0B5g00000VEH01AAA";

async fn mock_long_haul_flight(harness: &TestHarness) {
    harness
        .mock_query(
            &format!(
                "SELECT Airline__c, Origin_Airport_Code__c, Destination_Airport_Code__c FROM Flight__c WHERE Id = '{}'",
                FLIGHT_ID
            ),
            vec![json!({
                "attributes": { "type": "Flight__c", "url": format!("/services/data/v62.0/sobjects/Flight__c/{}", FLIGHT_ID) },
                "Airline__c": "B6",
                "Origin_Airport_Code__c": "jfk",
                "Destination_Airport_Code__c": "SFO"
            })],
        )
        .await;

    harness
        .mock_query(
            &format!(
                "SELECT Class__c FROM Booking__c WHERE Flight__c = '{}'",
                FLIGHT_ID
            ),
            vec![
                json!({ "attributes": { "type": "Booking__c" }, "Class__c": "First Class" }),
                json!({ "attributes": { "type": "Booking__c" }, "Class__c": "economy" }),
                json!({ "attributes": { "type": "Booking__c" }, "Class__c": null }),
            ],
        )
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_carbon_footprint_long_haul() -> Result<()> {
    let mut harness = TestHarness::start().await?;
    mock_long_haul_flight(&harness).await;

    let context = harness.client_context();
    let response = harness
        .post_action(
            "calculateCarbonFootprint",
            &json!({ "flightId": FLIGHT_ID }),
            Some(&context),
        )
        .await?;
    assert_eq!(response.status(), 200);
    assert!(response.headers().contains_key("x-request-id"));

    let body: Value = response.json().await?;
    assert_eq!(body["flight"]["flightNumber"], format!("B6-{}", FLIGHT_ID));
    assert_eq!(body["flight"]["distanceKm"], 4162);
    assert_eq!(body["flight"]["passengerCount"], 2);

    let expected = 0.435 * 4162.0 + 0.102 * 4162.0;
    let total = body["emissions"]["totalCo2Kg"].as_f64().unwrap();
    assert!((total - expected).abs() < 1e-9, "total {} != {}", total, expected);

    harness.shutdown().await
}

#[tokio::test(flavor = "multi_thread")]
async fn test_crm_receives_session_token() -> Result<()> {
    let mut harness = TestHarness::start().await?;

    Mock::given(method("GET"))
        .and(path("/services/data/v62.0/query"))
        .and(header("authorization", "Bearer rotated-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalSize": 1,
            "done": true,
            "records": [{
                "attributes": { "type": "Vehicle__c" },
                "Id": VEHICLE_ID,
                "Name": "Family Hatchback",
                "Price__c": "25000"
            }]
        })))
        .expect(1)
        .mount(harness.crm())
        .await;

    let context = encode_client_context(&harness.crm().uri(), "rotated-token");
    let response = harness
        .post_action(
            "calculateFinanceAgreement",
            &json!({
                "customerId": "0035g00000CUST1AAA",
                "vehicleId": VEHICLE_ID,
                "maxInterestRate": 0,
                "downPayment": 1000,
                "years": 2
            }),
            Some(&context),
        )
        .await?;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await?;
    let offer = &body["recommendedFinanceOffer"];
    assert_eq!(offer["loanAmount"], 24000.0);
    assert_eq!(offer["adjustedInterestRate"], 0.0);
    assert_eq!(offer["monthlyPayment"], 1000.0);
    assert_eq!(offer["totalFinancingCost"], 24000.0);

    harness.shutdown().await
}

#[tokio::test(flavor = "multi_thread")]
async fn test_down_payment_above_price_is_rejected() -> Result<()> {
    let mut harness = TestHarness::start().await?;
    harness
        .mock_query(
            &format!(
                "SELECT Id, Name, Price__c FROM Vehicle__c WHERE Id = '{}'",
                VEHICLE_ID
            ),
            vec![json!({ "attributes": { "type": "Vehicle__c" }, "Price__c": 9000 })],
        )
        .await;

    let context = harness.client_context();
    let response = harness
        .post_action(
            "calculateFinanceAgreement",
            &json!({
                "customerId": "0035g00000CUST1AAA",
                "vehicleId": VEHICLE_ID,
                "maxInterestRate": 2.5,
                "downPayment": 9500,
                "years": 4
            }),
            Some(&context),
        )
        .await?;
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await?;
    assert_eq!(body["code"], "BAD_REQUEST");

    harness.shutdown().await
}

#[tokio::test(flavor = "multi_thread")]
async fn test_shipping_without_crm() -> Result<()> {
    let mut harness = TestHarness::start().await?;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(harness.crm())
        .await;

    let response = harness
        .post_action(
            "calculateShippingOptions",
            &json!({ "productId": "01t5g00000PROD1AAA" }),
            None,
        )
        .await?;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await?;
    assert_eq!(body["shippingOptions"].as_array().map(Vec::len), Some(3));
    assert_eq!(body["recommendedOption"]["carrier"], "UPS");
    assert_eq!(body["recommendedOption"]["estimatedDeliveryDays"], 5);

    harness.shutdown().await
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_client_context_is_unavailable() -> Result<()> {
    let mut harness = TestHarness::start().await?;

    let response = harness
        .post_action(
            "calculateCarbonFootprint",
            &json!({ "flightId": FLIGHT_ID }),
            None,
        )
        .await?;
    assert_eq!(response.status(), 503);

    let body: Value = response.json().await?;
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");

    harness.shutdown().await
}
