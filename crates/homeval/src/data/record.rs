//! A single parsed dataset row.

use serde::{Deserialize, Serialize};

use super::schema::FEATURE_COUNT;

/// One row of the housing dataset: five features and the price target.
///
/// Fields deserialize from the CSV headers of the source dataset; extra
/// columns in a file are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HousingRecord {
    /// Average income of residents in the house's area.
    #[serde(rename = "Avg. Area Income")]
    pub area_income: f64,

    /// Average age of houses in the area, in years.
    #[serde(rename = "Avg. Area House Age")]
    pub house_age: f64,

    /// Average number of rooms for houses in the area.
    #[serde(rename = "Avg. Area Number of Rooms")]
    pub rooms: f64,

    /// Average number of bedrooms for houses in the area.
    #[serde(rename = "Avg. Area Number of Bedrooms")]
    pub bedrooms: f64,

    /// Population of the area.
    #[serde(rename = "Area Population")]
    pub population: f64,

    /// Sale price (target).
    #[serde(rename = "Price")]
    pub price: f64,
}

impl HousingRecord {
    /// Feature values in model weight order.
    pub fn features(&self) -> [f64; FEATURE_COUNT] {
        [
            self.area_income,
            self.house_age,
            self.rooms,
            self.bedrooms,
            self.population,
        ]
    }

    /// True when every feature and the target are finite.
    pub fn is_finite(&self) -> bool {
        self.features().iter().all(|v| v.is_finite()) && self.price.is_finite()
    }
}
