use crate::domain::{ActionGates, CustomerDraft, DebugView, Order, PlatformId, Product, Rate, Warehouse};
use crate::ports::{ConnectionStatus, PresentationPort, StatusKind};

/// Plain text output for the command line.
#[derive(Default)]
pub struct ConsolePresenter {
    verbose: bool,
}

impl ConsolePresenter {
    /// `verbose` also prints gate changes and the loading indicator.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl PresentationPort for ConsolePresenter {
    fn platform_selected(&self, platform: PlatformId) {
        println!("Platform: {}", platform);
    }

    fn connection_status(&self, status: ConnectionStatus, message: &str) {
        println!("[{}] {}", status.as_str(), message);
    }

    fn warehouses(&self, warehouses: &[Warehouse]) {
        println!("Warehouses ({}):", warehouses.len());
        for w in warehouses {
            match &w.city {
                Some(city) => println!("  {}  {} - {}", w.id, w.name, city),
                None => println!("  {}  {}", w.id, w.name),
            }
        }
    }

    fn products(&self, products: &[Product], selected: &[String]) {
        if products.is_empty() {
            println!("No products found. You can still proceed with the workflow.");
            return;
        }
        println!("Products:");
        for p in products {
            let mark = if selected.contains(&p.id) { "*" } else { " " };
            println!(" {} {}  {}  SKU: {}  ${}", mark, p.id, p.name, p.sku, p.price);
        }
    }

    fn selected_products(&self, products: &[Product]) {
        let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
        println!("Selected Products ({}): {}", products.len(), names.join(", "));
    }

    fn customer_preview(&self, draft: Option<&CustomerDraft>) {
        let Some(draft) = draft else { return };
        println!("Customer Preview");
        for (label, value, required) in draft.preview_fields() {
            println!("  {}{}: {}", label, if required { " *" } else { "" }, value);
        }
    }

    fn customer_status(&self, message: &str, kind: StatusKind) {
        println!("[{}] {}", kind.as_str(), message);
    }

    fn action_gates(&self, gates: ActionGates) {
        if self.verbose {
            println!(
                "Get Rates: {}  Create Order: {}",
                if gates.rates_enabled { "enabled" } else { "disabled" },
                if gates.order_enabled { "enabled" } else { "disabled" }
            );
        }
    }

    fn rates(&self, rates: &[Rate], total: usize) {
        println!("Shipping Rates ({} found)", total);
        for r in rates {
            println!("  {} / {}  ${}", r.courier_name, r.service_name, r.total_charge);
        }
    }

    fn order_created(&self, order: &Order, item_count: usize) {
        println!("Order Created Successfully");
        println!("  Order ID: {}", order.id.as_deref().unwrap_or("N/A"));
        println!("  Status: {}", order.status);
        println!("  Items: {}", item_count);
    }

    fn error(&self, message: &str) {
        eprintln!("Error: {}", message);
    }

    fn loading(&self, active: bool) {
        if self.verbose && active {
            println!("Loading...");
        }
    }

    fn debug_view(&self, view: &DebugView) {
        println!("Last request:\n{}", view.request_text());
        println!("Last response:\n{}", view.response_text());
        println!("State:\n{}", view.state_text());
    }
}
