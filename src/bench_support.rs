use agent_actions_crm::CrmRecord;
use agent_actions_http::actions::PassengerTally;
use serde_json::json;

// Re-export the e2e harness module
#[path = "../tests/e2e/harness.rs"]
pub mod e2e_harness;

pub use e2e_harness::{encode_client_context, find_free_port, query_response, TestHarness};

/// Booking class mix used by the emission benchmarks.
pub const FARE_CLASS_MIX: [&str; 5] = ["Economy", "Economy", "Business", "First Class", "Standby"];

pub struct ActionBenchFixture {
    pub client_context: String,
    pub bookings: Vec<CrmRecord>,
}

impl ActionBenchFixture {
    pub fn new(passengers: usize) -> Self {
        let bookings = FARE_CLASS_MIX
            .iter()
            .cycle()
            .take(passengers)
            .map(|class| booking(class))
            .collect();

        Self {
            client_context: encode_client_context("https://bench.my.salesforce.com", "bench-token"),
            bookings,
        }
    }

    pub fn tally(&self) -> PassengerTally {
        self.bookings
            .iter()
            .map(|booking| booking.get_str("Class__c"))
            .collect()
    }
}

fn booking(class: &str) -> CrmRecord {
    CrmRecord::new("Booking__c").with_field("Class__c", json!(class))
}
