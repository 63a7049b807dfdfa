use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of spending categories. Variant order is significant:
/// it is both the display order and the tie-break order for keyword
/// matching during categorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Food & Groceries")]
    FoodGroceries,
    #[serde(rename = "Eating Out")]
    EatingOut,
    #[serde(rename = "Transport & Fuel")]
    TransportFuel,
    #[serde(rename = "Health & Wellness")]
    HealthWellness,
    #[serde(rename = "Shopping")]
    Shopping,
    #[serde(rename = "Entertainment")]
    Entertainment,
    #[serde(rename = "Utilities & Bills")]
    UtilitiesBills,
    #[serde(rename = "Rent/Mortgage")]
    RentMortgage,
    #[serde(rename = "Travel")]
    Travel,
    #[serde(rename = "Unknown")]
    Unknown,
    #[serde(rename = "Subscriptions")]
    Subscriptions,
    #[serde(rename = "Education")]
    Education,
    #[serde(rename = "Payment/Credit")]
    PaymentCredit,
}

impl Category {
    /// Every category, in canonical order.
    pub const ALL: [Category; 13] = [
        Category::FoodGroceries,
        Category::EatingOut,
        Category::TransportFuel,
        Category::HealthWellness,
        Category::Shopping,
        Category::Entertainment,
        Category::UtilitiesBills,
        Category::RentMortgage,
        Category::Travel,
        Category::Unknown,
        Category::Subscriptions,
        Category::Education,
        Category::PaymentCredit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::FoodGroceries => "Food & Groceries",
            Category::EatingOut => "Eating Out",
            Category::TransportFuel => "Transport & Fuel",
            Category::HealthWellness => "Health & Wellness",
            Category::Shopping => "Shopping",
            Category::Entertainment => "Entertainment",
            Category::UtilitiesBills => "Utilities & Bills",
            Category::RentMortgage => "Rent/Mortgage",
            Category::Travel => "Travel",
            Category::Unknown => "Unknown",
            Category::Subscriptions => "Subscriptions",
            Category::Education => "Education",
            Category::PaymentCredit => "Payment/Credit",
        }
    }

    /// Display color for summary widgets.
    pub fn color(self) -> &'static str {
        match self {
            Category::FoodGroceries => "#4caf50",
            Category::EatingOut => "#ff9800",
            Category::TransportFuel => "#2196f3",
            Category::HealthWellness => "#e91e63",
            Category::Shopping => "#9c27b0",
            Category::Entertainment => "#ff5722",
            Category::UtilitiesBills => "#607d8b",
            Category::RentMortgage => "#795548",
            Category::Travel => "#00bcd4",
            Category::Unknown => "#9e9e9e",
            Category::Subscriptions => "#3f51b5",
            Category::Education => "#8bc34a",
            Category::PaymentCredit => "#cddc39",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.label() == s)
            .ok_or_else(|| format!("Unknown category: '{s}'"))
    }
}
