use crate::domain::{ActionGates, CustomerDraft, DebugView, Order, PlatformId, Product, Rate, Warehouse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Disconnected => "disconnected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Info,
    Warning,
}

impl StatusKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusKind::Success => "success",
            StatusKind::Info => "info",
            StatusKind::Warning => "warning",
        }
    }
}

/// Port for the presentation layer.
///
/// The session pushes state into it; implementations must render every
/// string as literal text.
pub trait PresentationPort: Send + Sync {
    fn platform_selected(&self, platform: PlatformId);

    fn connection_status(&self, status: ConnectionStatus, message: &str);

    fn warehouses(&self, warehouses: &[Warehouse]);

    /// `selected` holds canonical product ids.
    fn products(&self, products: &[Product], selected: &[String]);

    fn selected_products(&self, products: &[Product]);

    /// `None` hides the preview.
    fn customer_preview(&self, draft: Option<&CustomerDraft>);

    fn customer_status(&self, message: &str, kind: StatusKind);

    fn action_gates(&self, gates: ActionGates);

    /// `rates` may be truncated; `total` is how many the platform returned.
    fn rates(&self, rates: &[Rate], total: usize);

    fn order_created(&self, order: &Order, item_count: usize);

    fn error(&self, message: &str);

    fn loading(&self, active: bool);

    fn debug_view(&self, view: &DebugView);
}
