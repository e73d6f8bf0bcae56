//! Per-passenger flight emissions using DEFRA 2023 factors.

use serde::{Deserialize, Serialize};

/// Flights strictly longer than this use long-haul factors.
pub const LONG_HAUL_THRESHOLD_KM: u32 = 1500;

/// Distance assumed for airport pairs missing from the route table.
pub const DEFAULT_DISTANCE_KM: u32 = 500;

const ROUTE_DISTANCES_KM: &[(&str, &str, u32)] = &[("LAX", "SFO", 543), ("JFK", "SFO", 4162)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FareClass {
    Economy,
    Business,
    First,
}

impl FareClass {
    pub const ALL: [FareClass; 3] = [FareClass::Economy, FareClass::Business, FareClass::First];

    /// Booking records spell first class several ways ("First", "FirstClass",
    /// "First Class"), so whitespace, underscores and case are ignored.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized: String = value
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "economy" => Some(FareClass::Economy),
            "business" => Some(FareClass::Business),
            "first" | "firstclass" => Some(FareClass::First),
            _ => None,
        }
    }

    /// kg CO2e per passenger-km.
    pub fn emission_factor(self, distance_km: u32) -> f64 {
        let long_haul = distance_km > LONG_HAUL_THRESHOLD_KM;
        match (self, long_haul) {
            (FareClass::Economy, false) => 0.158,
            (FareClass::Economy, true) => 0.102,
            (FareClass::Business, false) => 0.287,
            (FareClass::Business, true) => 0.293,
            (FareClass::First, false) => 0.474,
            (FareClass::First, true) => 0.435,
        }
    }
}

/// Direct distance between two airports, in either direction.
pub fn estimate_distance_km(origin: &str, destination: &str) -> u32 {
    let origin = origin.trim();
    let destination = destination.trim();

    ROUTE_DISTANCES_KM
        .iter()
        .find(|(a, b, _)| {
            (a.eq_ignore_ascii_case(origin) && b.eq_ignore_ascii_case(destination))
                || (a.eq_ignore_ascii_case(destination) && b.eq_ignore_ascii_case(origin))
        })
        .map(|(_, _, km)| *km)
        .unwrap_or(DEFAULT_DISTANCE_KM)
}

/// Bookings counted per fare class.
///
/// Bookings with a missing or unrecognised class are tracked in
/// `unclassified` but are not passengers for emissions purposes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassengerTally {
    pub economy: u32,
    pub business: u32,
    pub first: u32,
    pub unclassified: u32,
}

impl PassengerTally {
    pub fn record(&mut self, class: Option<&str>) {
        match class.and_then(FareClass::parse) {
            Some(FareClass::Economy) => self.economy += 1,
            Some(FareClass::Business) => self.business += 1,
            Some(FareClass::First) => self.first += 1,
            None => self.unclassified += 1,
        }
    }

    pub fn count(&self, class: FareClass) -> u32 {
        match class {
            FareClass::Economy => self.economy,
            FareClass::Business => self.business,
            FareClass::First => self.first,
        }
    }

    pub fn total(&self) -> u32 {
        self.economy + self.business + self.first
    }
}

impl<'a> FromIterator<Option<&'a str>> for PassengerTally {
    fn from_iter<I: IntoIterator<Item = Option<&'a str>>>(iter: I) -> Self {
        let mut tally = PassengerTally::default();
        for class in iter {
            tally.record(class);
        }
        tally
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionsEstimate {
    pub total_co2_kg: f64,
    pub co2_per_passenger_kg: f64,
    pub co2_per_km_kg: f64,
}

pub fn calculate_emissions(distance_km: u32, tally: &PassengerTally) -> EmissionsEstimate {
    let distance = f64::from(distance_km);

    let total_co2_kg: f64 = FareClass::ALL
        .iter()
        .map(|&class| f64::from(tally.count(class)) * class.emission_factor(distance_km) * distance)
        .sum();

    let passengers = tally.total();
    let co2_per_passenger_kg = if passengers > 0 {
        total_co2_kg / f64::from(passengers)
    } else {
        total_co2_kg
    };

    let co2_per_km_kg = if distance_km > 0 {
        total_co2_kg / distance
    } else {
        0.0
    };

    EmissionsEstimate {
        total_co2_kg,
        co2_per_passenger_kg,
        co2_per_km_kg,
    }
}
