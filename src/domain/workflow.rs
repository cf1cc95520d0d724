use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::customer::PastePreview;
use super::{
    normalize, Credentials, Customer, CustomerDraft, DebugSnapshot, DestinationAddress, DestinationInput,
    Dispatcher, ManualCustomer, Order, PlatformId, Product, Rate, RequestDescriptor, Result, ShippingError, Warehouse,
};
use crate::ports::{ConnectionStatus, PresentationPort, StatusKind};

/// The presenter only lists this many products.
pub const PRODUCT_DISPLAY_LIMIT: usize = 20;
/// The presenter only lists this many rates.
pub const RATE_DISPLAY_LIMIT: usize = 10;

/// Keys shorter than this are not worth a connection attempt.
const MIN_API_KEY_LEN: usize = 11;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActionGates {
    pub rates_enabled: bool,
    pub order_enabled: bool,
}

#[derive(Debug, Clone, Default)]
pub struct WorkflowState {
    pub platform: Option<PlatformId>,
    pub connected: bool,
    pub warehouses: Vec<Warehouse>,
    pub selected_warehouse: Option<Warehouse>,
    pub products: Vec<Product>,
    pub selected_products: Vec<Product>,
    pub customer: Option<Customer>,
    pub destination: Option<DestinationAddress>,
}

impl WorkflowState {
    pub fn can_get_rates(&self) -> bool {
        self.selected_warehouse.is_some()
            && self.destination.is_some()
            && self.platform.map_or(false, |p| p.supports_rates())
    }

    pub fn can_create_order(&self) -> bool {
        self.selected_warehouse.is_some() && self.customer.is_some() && self.destination.is_some()
    }

    pub fn gates(&self) -> ActionGates {
        ActionGates {
            rates_enabled: self.can_get_rates(),
            order_enabled: self.can_create_order(),
        }
    }

    pub fn is_product_selected(&self, product_id: &str) -> bool {
        self.selected_products.iter().any(|p| p.id == product_id)
    }

    fn selected_ids(&self) -> Vec<String> {
        self.selected_products.iter().map(|p| p.id.clone()).collect()
    }

    pub fn summary(&self) -> StateSummary {
        StateSummary {
            platform: self.platform,
            connected: self.connected,
            has_warehouse: self.selected_warehouse.is_some(),
            has_customer: self.customer.is_some(),
            has_destination: self.destination.is_some(),
            selected_products: self.selected_products.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateSummary {
    pub platform: Option<PlatformId>,
    pub connected: bool,
    pub has_warehouse: bool,
    pub has_customer: bool,
    pub has_destination: bool,
    pub selected_products: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebugView {
    pub snapshot: DebugSnapshot,
    pub state: StateSummary,
}

impl DebugView {
    pub fn request_text(&self) -> String {
        self.snapshot
            .last_request
            .as_ref()
            .and_then(|r| serde_json::to_string_pretty(r).ok())
            .unwrap_or_else(|| "No requests made yet".to_string())
    }

    pub fn response_text(&self) -> String {
        self.snapshot
            .last_response
            .as_ref()
            .and_then(|r| serde_json::to_string_pretty(r).ok())
            .unwrap_or_else(|| "No responses received yet".to_string())
    }

    pub fn state_text(&self) -> String {
        serde_json::to_string_pretty(&self.state).unwrap_or_default()
    }
}

/// One operator session: credentials, workflow state, and the collaborators
/// that act on them.
pub struct ShippingSession {
    id: Uuid,
    credentials: Option<Credentials>,
    state: WorkflowState,
    dispatcher: Dispatcher,
    presenter: Arc<dyn PresentationPort>,
}

impl ShippingSession {
    pub fn new(dispatcher: Dispatcher, presenter: Arc<dyn PresentationPort>) -> Self {
        Self {
            id: Uuid::new_v4(),
            credentials: None,
            state: WorkflowState::default(),
            dispatcher,
            presenter,
        }
    }

    /// Tags this session's log lines.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn gates(&self) -> ActionGates {
        self.state.gates()
    }

    /// Switching to another platform drops the connection and everything
    /// loaded from the previous one. The destination address is kept.
    pub fn select_platform(&mut self, platform: PlatformId) {
        let previous = self.state.platform.replace(platform);
        self.presenter.platform_selected(platform);
        info!("Platform selected: {}", platform);

        if previous.map_or(false, |p| p != platform) {
            self.credentials = None;
            self.state = WorkflowState {
                platform: Some(platform),
                destination: self.state.destination.take(),
                ..Default::default()
            };
            self.presenter
                .connection_status(ConnectionStatus::Disconnected, "Platform changed, reconnect required");
            self.presenter.warehouses(&[]);
            self.presenter.products(&[], &[]);
            self.presenter.selected_products(&[]);
            self.refresh_gates();
        }
    }

    pub fn api_key_is_plausible(api_key: &str) -> bool {
        api_key.trim().len() >= MIN_API_KEY_LEN
    }

    pub async fn connect(&mut self, api_key: &str) -> Result<()> {
        let platform = self
            .state
            .platform
            .ok_or_else(|| ShippingError::Validation("Select a platform first".to_string()))?;
        let credentials = Credentials::new(platform, api_key.trim());
        self.credentials = Some(credentials);
        self.state.connected = false;

        let result = self
            .call(RequestDescriptor::get(platform.test_endpoint()))
            .await
            .map_err(|e| ShippingError::operation(format!("Failed to connect to {}", platform), e));

        match result {
            Ok(_) => {
                self.state.connected = true;
                self.presenter
                    .connection_status(ConnectionStatus::Connected, "Connected successfully");
                info!("API connection successful");
                Ok(())
            }
            Err(err) => {
                self.presenter
                    .connection_status(ConnectionStatus::Disconnected, "Connection failed");
                Err(self.report(err))
            }
        }
    }

    pub async fn load_warehouses(&mut self) -> Result<&[Warehouse]> {
        if !self.state.connected {
            return Err(ShippingError::NotConnected);
        }
        let platform = self.platform()?;
        let response = self
            .call(RequestDescriptor::get(platform.warehouses_endpoint()))
            .await
            .map_err(|e| self.report(prefixed("Failed to load warehouses", e)))?;

        self.state.warehouses = normalize::warehouses(platform, &response);
        self.presenter.warehouses(&self.state.warehouses);
        info!("Loaded {} warehouses", self.state.warehouses.len());
        Ok(&self.state.warehouses)
    }

    pub fn select_warehouse(&mut self, warehouse_id: &str) -> Result<ActionGates> {
        let warehouse = self
            .state
            .warehouses
            .iter()
            .find(|w| w.id == warehouse_id)
            .cloned()
            .ok_or_else(|| ShippingError::NotFound(format!("Unknown warehouse: {}", warehouse_id)))?;
        info!("Warehouse selected: {} ({})", warehouse.name, warehouse.id);
        self.state.selected_warehouse = Some(warehouse);
        Ok(self.refresh_gates())
    }

    pub async fn load_products(&mut self) -> Result<&[Product]> {
        if self.state.selected_warehouse.is_none() {
            return Err(ShippingError::Validation("Select a warehouse first".to_string()));
        }
        let platform = self.platform()?;
        let response = self
            .call(RequestDescriptor::get("/products"))
            .await
            .map_err(|e| self.report(prefixed("Failed to load products", e)))?;

        self.state.products = normalize::products(platform, &response);
        let shown = self.state.products.len().min(PRODUCT_DISPLAY_LIMIT);
        self.presenter
            .products(&self.state.products[..shown], &self.state.selected_ids());
        info!("Loaded {} products", self.state.products.len());
        Ok(&self.state.products)
    }

    /// Adds the product to the selection, or removes it when already selected.
    pub fn toggle_product(&mut self, product_id: &str) -> Result<bool> {
        if self.state.is_product_selected(product_id) {
            self.remove_product(product_id);
            return Ok(false);
        }
        let product = self
            .state
            .products
            .iter()
            .find(|p| p.id == product_id)
            .cloned()
            .ok_or_else(|| ShippingError::NotFound(format!("Unknown product: {}", product_id)))?;
        self.state.selected_products.push(product);
        self.presenter.selected_products(&self.state.selected_products);
        self.refresh_gates();
        Ok(true)
    }

    pub fn remove_product(&mut self, product_id: &str) {
        self.state.selected_products.retain(|p| p.id != product_id);
        self.presenter.selected_products(&self.state.selected_products);
        self.refresh_gates();
    }

    pub fn preview_customer_paste(&self, text: &str) -> PastePreview {
        let preview = PastePreview::from_text(text);
        self.presenter.customer_preview(preview.draft.as_ref());
        preview
    }

    pub async fn save_customer(&mut self, draft: &CustomerDraft) -> Result<Customer> {
        if !draft.has_required_fields() {
            return Err(self.report(ShippingError::Validation("Name and email are required".to_string())));
        }
        let payload = serde_json::to_value(draft).map_err(|e| ShippingError::Validation(e.to_string()))?;
        self.create_customer(payload).await
    }

    pub async fn save_manual_customer(&mut self, manual: &ManualCustomer) -> Result<Customer> {
        let manual = manual.trimmed();
        if manual.name.is_empty() || manual.email.is_empty() {
            return Err(self.report(ShippingError::Validation("Name and email are required".to_string())));
        }
        let payload = serde_json::to_value(&manual).map_err(|e| ShippingError::Validation(e.to_string()))?;
        self.create_customer(payload).await
    }

    async fn create_customer(&mut self, customer: Value) -> Result<Customer> {
        let platform = self.platform()?;
        let payload = match platform {
            PlatformId::Veeqo => json!({ "customer": customer }),
            PlatformId::Easyship => customer,
        };
        let response = self
            .call(RequestDescriptor::post("/customers", payload))
            .await
            .map_err(|e| self.report(prefixed("Failed to save customer", e)))?;

        let customer = normalize::saved_customer(&response);
        info!("Customer saved: {:?}", customer.id);
        self.presenter
            .customer_status("Customer saved successfully", StatusKind::Success);
        self.state.customer = Some(customer.clone());
        self.refresh_gates();
        Ok(customer)
    }

    pub async fn find_customer(&mut self, email: &str) -> Result<Option<Customer>> {
        let endpoint = format!("/customers?email={}", urlencoding::encode(email.trim()));
        let response = self
            .call(RequestDescriptor::get(endpoint))
            .await
            .map_err(|e| self.report(prefixed("Failed to find customer", e)))?;

        match normalize::found_customer(&response) {
            Some(customer) => {
                info!("Customer found: {:?}", customer.id);
                self.presenter.customer_status("Existing customer found", StatusKind::Info);
                self.state.customer = Some(customer.clone());
                self.refresh_gates();
                Ok(Some(customer))
            }
            None => {
                self.presenter.customer_status(
                    "Customer not found. Click Save to create new customer.",
                    StatusKind::Warning,
                );
                Ok(None)
            }
        }
    }

    /// Stores the destination when every mandatory field is filled, clears it otherwise.
    pub fn set_destination(&mut self, input: &DestinationInput) -> ActionGates {
        self.state.destination = DestinationAddress::from_input(input);
        if self.state.destination.is_some() {
            info!("Destination address completed");
        }
        self.refresh_gates()
    }

    pub async fn get_rates(&mut self) -> Result<Vec<Rate>> {
        if !self.platform()?.supports_rates() {
            return Err(self.report(ShippingError::Unsupported(
                "Rates are only available for Easyship platform".to_string(),
            )));
        }
        let (warehouse, destination) = match (&self.state.selected_warehouse, &self.state.destination) {
            (Some(w), Some(d)) => (w, d),
            _ => {
                return Err(ShippingError::Validation(
                    "A warehouse and a destination address are required".to_string(),
                ))
            }
        };
        let payload = rates_payload(warehouse, destination);

        let response = self
            .call(RequestDescriptor::post("/rates", payload))
            .await
            .map_err(|e| self.report(prefixed("Failed to get rates", e)))?;

        let rates = normalize::rates(&response).unwrap_or_default();
        let shown = rates.len().min(RATE_DISPLAY_LIMIT);
        self.presenter.rates(&rates[..shown], rates.len());
        info!("Retrieved {} shipping rates", rates.len());
        Ok(rates)
    }

    pub async fn create_order(&mut self) -> Result<Order> {
        if !self.state.can_create_order() {
            return Err(ShippingError::Validation(
                "A warehouse, a customer and a destination address are required".to_string(),
            ));
        }
        let payload = json!({
            "customer_id": self.state.customer.as_ref().and_then(|c| c.id.clone()),
            "delivery_method_id": 1,
            "order_items": self
                .state
                .selected_products
                .iter()
                .map(|p| json!({ "sellable_id": p.id, "quantity": 1 }))
                .collect::<Vec<_>>(),
            "deliver_to": self.state.destination,
        });

        let response = self
            .call(RequestDescriptor::post("/orders", payload))
            .await
            .map_err(|e| self.report(prefixed("Failed to create order", e)))?;

        let order = normalize::order(&response);
        if order.id.is_none() {
            warn!("Order response carries no id");
        }
        self.presenter
            .order_created(&order, self.state.selected_products.len());
        info!("Order created: {:?}", order.id);
        Ok(order)
    }

    pub async fn debug_view(&self) -> DebugView {
        let view = DebugView {
            snapshot: self.dispatcher.snapshots().snapshot().await,
            state: self.state.summary(),
        };
        self.presenter.debug_view(&view);
        view
    }

    fn platform(&self) -> Result<PlatformId> {
        self.state.platform.ok_or(ShippingError::NotConnected)
    }

    async fn call(&self, descriptor: RequestDescriptor) -> Result<Value> {
        let credentials = self.credentials.as_ref().ok_or(ShippingError::NotConnected)?;
        debug!(session = %self.id, "{} {}", descriptor.method.as_str(), descriptor.endpoint);
        self.presenter.loading(true);
        let result = self.dispatcher.dispatch(credentials, &descriptor).await;
        self.presenter.loading(false);
        result
    }

    fn refresh_gates(&self) -> ActionGates {
        let gates = self.state.gates();
        self.presenter.action_gates(gates);
        gates
    }

    fn report(&self, err: ShippingError) -> ShippingError {
        warn!("{}", err);
        self.presenter.error(&err.to_string());
        err
    }
}

fn prefixed(context: &str, err: ShippingError) -> ShippingError {
    ShippingError::operation(context, err)
}

fn rates_payload(warehouse: &Warehouse, destination: &DestinationAddress) -> Value {
    let or = |value: &Option<String>, default: &str| value.clone().unwrap_or_else(|| default.to_string());
    json!({
        "origin_address": {
            "line_1": or(&warehouse.address, "123 Warehouse St"),
            "city": or(&warehouse.city, "New York"),
            "state": or(&warehouse.state, "NY"),
            "postal_code": or(&warehouse.postal_code, "10001"),
            "country_alpha2": or(&warehouse.country, "US"),
        },
        "destination_address": destination,
        "incoterms": "DDU",
        "insurance": { "is_insured": false },
        "courier_selection": { "apply_shipping_rules": true },
        "parcels": [{
            "total_actual_weight": 1.0,
            "box": { "length": 10, "width": 10, "height": 10 }
        }]
    })
}
