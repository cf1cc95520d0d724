use askama::Template;
use std::collections::BTreeMap;
use std::sync::Mutex;
use tracing::error;

use crate::domain::{ActionGates, CustomerDraft, DebugView, Order, PlatformId, Product, Rate, Warehouse};
use crate::ports::{ConnectionStatus, PresentationPort, StatusKind};

/// Surface ids, in page order.
pub const SURFACES: [&str; 12] = [
    "platform",
    "connection",
    "warehouses",
    "products",
    "selected-products",
    "customer-preview",
    "customer-status",
    "actions",
    "results",
    "error",
    "loading",
    "debug",
];

struct WarehouseRow {
    id: String,
    label: String,
}

struct ProductRow {
    id: String,
    name: String,
    sku: String,
    price: String,
    selected: bool,
}

struct PreviewRow<'a> {
    label: &'static str,
    value: &'a str,
    required: bool,
}

#[derive(Template)]
#[template(path = "platform.html")]
struct PlatformTemplate<'a> {
    platform: &'a str,
    label: &'a str,
}

#[derive(Template)]
#[template(path = "connection.html")]
struct ConnectionTemplate<'a> {
    status: &'a str,
    message: &'a str,
}

#[derive(Template)]
#[template(path = "warehouses.html")]
struct WarehousesTemplate {
    warehouses: Vec<WarehouseRow>,
}

#[derive(Template)]
#[template(path = "products.html")]
struct ProductsTemplate {
    products: Vec<ProductRow>,
}

#[derive(Template)]
#[template(path = "selected_products.html")]
struct SelectedProductsTemplate<'a> {
    products: &'a [Product],
}

#[derive(Template)]
#[template(path = "customer_preview.html")]
struct CustomerPreviewTemplate<'a> {
    visible: bool,
    fields: Vec<PreviewRow<'a>>,
}

#[derive(Template)]
#[template(path = "customer_status.html")]
struct CustomerStatusTemplate<'a> {
    kind: &'a str,
    message: &'a str,
}

#[derive(Template)]
#[template(path = "actions.html")]
struct ActionsTemplate {
    rates_enabled: bool,
    order_enabled: bool,
}

#[derive(Template)]
#[template(path = "rates.html")]
struct RatesTemplate<'a> {
    rates: &'a [Rate],
    total: usize,
}

#[derive(Template)]
#[template(path = "order.html")]
struct OrderTemplate<'a> {
    id: &'a str,
    status: &'a str,
    item_count: usize,
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate<'a> {
    message: &'a str,
}

#[derive(Template)]
#[template(path = "loading.html")]
struct LoadingTemplate {
    active: bool,
}

#[derive(Template)]
#[template(path = "debug.html")]
struct DebugTemplate {
    request: String,
    response: String,
    state: String,
}

#[derive(Template)]
#[template(path = "page.html")]
struct PageTemplate {
    fragments: Vec<String>,
}

/// Renders every surface to an escaped HTML fragment.
#[derive(Default)]
pub struct HtmlPresenter {
    fragments: Mutex<BTreeMap<&'static str, String>>,
}

impl HtmlPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last fragment rendered for `surface`.
    pub fn fragment(&self, surface: &str) -> Option<String> {
        self.fragments.lock().ok()?.get(surface).cloned()
    }

    /// Every rendered fragment assembled into one document.
    pub fn page(&self) -> String {
        let fragments = match self.fragments.lock() {
            Ok(stored) => SURFACES.iter().filter_map(|s| stored.get(s).cloned()).collect(),
            Err(_) => Vec::new(),
        };
        PageTemplate { fragments }.render().unwrap_or_else(|e| {
            error!("Failed to render page: {}", e);
            String::new()
        })
    }

    fn store(&self, surface: &'static str, template: &impl Template) {
        match template.render() {
            Ok(html) => {
                if let Ok(mut fragments) = self.fragments.lock() {
                    fragments.insert(surface, html);
                }
            }
            Err(e) => error!("Failed to render {}: {}", surface, e),
        }
    }
}

impl PresentationPort for HtmlPresenter {
    fn platform_selected(&self, platform: PlatformId) {
        let label = match platform {
            PlatformId::Easyship => "Easyship",
            PlatformId::Veeqo => "Veeqo",
        };
        self.store(
            "platform",
            &PlatformTemplate {
                platform: platform.as_str(),
                label,
            },
        );
    }

    fn connection_status(&self, status: ConnectionStatus, message: &str) {
        self.store(
            "connection",
            &ConnectionTemplate {
                status: status.as_str(),
                message,
            },
        );
    }

    fn warehouses(&self, warehouses: &[Warehouse]) {
        let warehouses = warehouses
            .iter()
            .map(|w| WarehouseRow {
                id: w.id.clone(),
                label: match &w.city {
                    Some(city) => format!("{} - {}", w.name, city),
                    None => w.name.clone(),
                },
            })
            .collect();
        self.store("warehouses", &WarehousesTemplate { warehouses });
    }

    fn products(&self, products: &[Product], selected: &[String]) {
        let products = products
            .iter()
            .map(|p| ProductRow {
                id: p.id.clone(),
                name: p.name.clone(),
                sku: p.sku.clone(),
                price: p.price.clone(),
                selected: selected.contains(&p.id),
            })
            .collect();
        self.store("products", &ProductsTemplate { products });
    }

    fn selected_products(&self, products: &[Product]) {
        self.store("selected-products", &SelectedProductsTemplate { products });
    }

    fn customer_preview(&self, draft: Option<&CustomerDraft>) {
        let fields = draft
            .map(|d| {
                d.preview_fields()
                    .into_iter()
                    .map(|(label, value, required)| PreviewRow { label, value, required })
                    .collect()
            })
            .unwrap_or_default();
        self.store(
            "customer-preview",
            &CustomerPreviewTemplate {
                visible: draft.is_some(),
                fields,
            },
        );
    }

    fn customer_status(&self, message: &str, kind: StatusKind) {
        self.store(
            "customer-status",
            &CustomerStatusTemplate {
                kind: kind.as_str(),
                message,
            },
        );
    }

    fn action_gates(&self, gates: ActionGates) {
        self.store(
            "actions",
            &ActionsTemplate {
                rates_enabled: gates.rates_enabled,
                order_enabled: gates.order_enabled,
            },
        );
    }

    fn rates(&self, rates: &[Rate], total: usize) {
        self.store("results", &RatesTemplate { rates, total });
    }

    fn order_created(&self, order: &Order, item_count: usize) {
        self.store(
            "results",
            &OrderTemplate {
                id: order.id.as_deref().unwrap_or("N/A"),
                status: &order.status,
                item_count,
            },
        );
    }

    fn error(&self, message: &str) {
        self.store("error", &ErrorTemplate { message });
    }

    fn loading(&self, active: bool) {
        self.store("loading", &LoadingTemplate { active });
    }

    fn debug_view(&self, view: &DebugView) {
        self.store(
            "debug",
            &DebugTemplate {
                request: view.request_text(),
                response: view.response_text(),
                state: view.state_text(),
            },
        );
    }
}
