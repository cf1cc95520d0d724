//! Maps each platform's native response shapes onto the canonical records.
//!
//! Easyship wraps collections in an envelope (`{"warehouses": [...]}`), Veeqo
//! returns bare arrays. Field names also drift between the two, so every
//! fallback chain lives here and nowhere else.

use serde_json::Value;

use super::{Customer, Order, PlatformId, Product, Rate, Warehouse};

/// First of `keys` holding a non-null, non-empty scalar, rendered as a string.
fn first_scalar(record: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match record.get(*key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn collection<'a>(platform: PlatformId, response: &'a Value, envelope: &str) -> &'a [Value] {
    let list = match platform {
        PlatformId::Easyship => response.get(envelope),
        PlatformId::Veeqo => Some(response).filter(|v| v.is_array()).or_else(|| response.get(envelope)),
    };
    list.and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[])
}

pub fn warehouse_id(record: &Value) -> Option<String> {
    first_scalar(record, &["id", "warehouse_id"])
}

pub fn product_id(record: &Value) -> Option<String> {
    first_scalar(record, &["id", "product_id"])
}

pub fn customer_id(record: &Value) -> Option<String> {
    first_scalar(record, &["id", "customer_id"])
}

pub fn warehouse(record: &Value) -> Option<Warehouse> {
    let id = warehouse_id(record)?;
    let name = first_scalar(record, &["name", "warehouse_name"]).unwrap_or_else(|| format!("Warehouse {}", id));
    Some(Warehouse {
        name,
        address: first_scalar(record, &["address", "address_line_1", "line_1"]),
        city: first_scalar(record, &["city"]),
        state: first_scalar(record, &["state"]),
        postal_code: first_scalar(record, &["postal_code", "zip"]),
        country: first_scalar(record, &["country", "country_alpha2", "country_code"]),
        id,
    })
}

pub fn warehouses(platform: PlatformId, response: &Value) -> Vec<Warehouse> {
    collection(platform, response, "warehouses").iter().filter_map(warehouse).collect()
}

pub fn product(record: &Value) -> Option<Product> {
    Some(Product {
        id: product_id(record)?,
        name: first_scalar(record, &["name", "title"]).unwrap_or_else(|| "Unnamed Product".to_string()),
        sku: first_scalar(record, &["sku", "sku_code"]).unwrap_or_else(|| "N/A".to_string()),
        price: first_scalar(record, &["price", "selling_price"]).unwrap_or_else(|| "0.00".to_string()),
    })
}

pub fn products(platform: PlatformId, response: &Value) -> Vec<Product> {
    collection(platform, response, "products").iter().filter_map(product).collect()
}

/// A customer create response is either `{"customer": {...}}` or the record itself.
pub fn saved_customer(response: &Value) -> Customer {
    let record = response.get("customer").filter(|c| !c.is_null()).unwrap_or(response);
    Customer {
        id: customer_id(record),
        raw: record.clone(),
    }
}

/// First entry of a `{"customers": [...]}` search result.
pub fn found_customer(response: &Value) -> Option<Customer> {
    let record = response.get("customers")?.as_array()?.first()?;
    Some(Customer {
        id: customer_id(record),
        raw: record.clone(),
    })
}

pub fn rates(response: &Value) -> Option<Vec<Rate>> {
    let list = response.get("rates")?.as_array()?;
    Some(
        list.iter()
            .map(|rate| Rate {
                courier_name: first_scalar(rate, &["courier_name"]).unwrap_or_else(|| "Unknown Courier".to_string()),
                service_name: first_scalar(rate, &["service_name"]).unwrap_or_else(|| "Standard Service".to_string()),
                total_charge: first_scalar(rate, &["total_charge"]).unwrap_or_else(|| "0.00".to_string()),
            })
            .collect(),
    )
}

pub fn order(response: &Value) -> Order {
    Order {
        id: first_scalar(response, &["id", "order_id"]),
        status: first_scalar(response, &["status"]).unwrap_or_else(|| "Created".to_string()),
    }
}
