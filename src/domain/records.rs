//! Canonical records the workflow operates on, whatever platform produced them.

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Warehouse {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub sku: String,
    pub price: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Customer {
    pub id: Option<String>,
    /// Platform record as returned, kept for the debug view.
    pub raw: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rate {
    pub courier_name: String,
    pub service_name: String,
    pub total_charge: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: Option<String>,
    pub status: String,
}

/// Customer fields as entered by the operator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CustomerDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub company: String,
}

impl CustomerDraft {
    pub fn has_required_fields(&self) -> bool {
        !self.name.is_empty() && !self.email.is_empty()
    }

    /// Labelled, non-empty fields in display order. Name and email are flagged as required.
    pub fn preview_fields(&self) -> Vec<(&'static str, &str, bool)> {
        [
            ("Name", self.name.as_str(), true),
            ("Email", self.email.as_str(), true),
            ("Phone", self.phone.as_str(), false),
            ("Address 1", self.address1.as_str(), false),
            ("Address 2", self.address2.as_str(), false),
            ("City", self.city.as_str(), false),
            ("State", self.state.as_str(), false),
            ("Postal Code", self.postal_code.as_str(), false),
            ("Country", self.country.as_str(), false),
            ("Company", self.company.as_str(), false),
        ]
        .into_iter()
        .filter(|(_, value, _)| !value.is_empty())
        .collect()
    }
}

/// Short customer form: name, email, phone and company only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ManualCustomer {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
}

impl ManualCustomer {
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            company: self.company.trim().to_string(),
        }
    }
}

/// Raw destination form values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestinationInput {
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DestinationAddress {
    pub line_1: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country_alpha2: String,
    pub line_2: String,
}

impl DestinationAddress {
    /// `None` unless address line 1, city, state, postal code and country are all filled.
    pub fn from_input(input: &DestinationInput) -> Option<Self> {
        let required = [
            input.address1.trim(),
            input.city.trim(),
            input.state.trim(),
            input.postal_code.trim(),
            input.country.trim(),
        ];
        if required.iter().any(|value| value.is_empty()) {
            return None;
        }
        let [line_1, city, state, postal_code, country_alpha2] = required.map(str::to_string);
        Some(Self {
            line_1,
            city,
            state,
            postal_code,
            country_alpha2,
            line_2: input.address2.trim().to_string(),
        })
    }
}
