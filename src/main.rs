use clap::{Args, Parser, Subcommand, ValueEnum};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use shipping_manager::adapters::{
    key_server, ConfiguredProxyChain, ConsolePresenter, DebugRecorder, HtmlPresenter, KeyServerAdapter,
    KeyServerCredentials, ReqwestHttpClient, StaticCredentials,
};
use shipping_manager::config::{AppConfig, KeyServerConfig};
use shipping_manager::domain::{
    DestinationInput, Dispatcher, ManualCustomer, PastePreview, PlatformId, ShippingError, ShippingSession,
};
use shipping_manager::ports::{CredentialsPort, PresentationPort};

#[derive(Parser, Debug)]
#[command(version = env!("SHIPPING_MANAGER_VERSION"), author = env!("CARGO_PKG_AUTHORS"))]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Connect to a platform and run the shipping workflow
    Run(RunArgs),
    /// Parse a pasted customer block (from a file or stdin) and print the result
    ParseCustomer {
        /// Read from this file instead of stdin
        file: Option<PathBuf>,
    },
    /// Serve platform API keys to authenticated clients
    ServeKeys(ServeKeysArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Action {
    Connect,
    Rates,
    Order,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// easyship or veeqo
    #[arg(long, short)]
    platform: PlatformId,

    #[arg(long, env = "SHIPPING_API_KEY", hide_env_values = true, conflicts_with = "key_server")]
    api_key: Option<String>,

    /// Fetch the API key from this key server instead
    #[arg(long, env = "KEY_SERVER_URL")]
    key_server: Option<String>,

    #[arg(long, env = "CONFIG_API_TOKEN", hide_env_values = true)]
    key_server_token: Option<String>,

    /// TOML configuration file; created with defaults if missing
    #[arg(long, short)]
    config: Option<PathBuf>,

    #[arg(long, short)]
    warehouse: Option<String>,

    /// Product id to add to the order; repeatable
    #[arg(long = "product")]
    products: Vec<String>,

    /// File holding a pasted customer block, one field per line
    #[arg(long, conflicts_with_all = ["customer_name", "customer_email"])]
    customer_file: Option<PathBuf>,

    /// With --customer-email, creates the customer; on its own nothing is created
    #[arg(long)]
    customer_name: Option<String>,

    /// Alone, looks the customer up; with --customer-name, creates it
    #[arg(long)]
    customer_email: Option<String>,

    #[arg(long, default_value = "")]
    customer_phone: String,

    #[arg(long, default_value = "")]
    customer_company: String,

    #[command(flatten)]
    destination: DestinationArgs,

    #[arg(long, value_enum, default_value = "connect")]
    action: Action,

    /// Also render every surface into this HTML file
    #[arg(long)]
    html: Option<PathBuf>,

    /// Print the last request, last response and workflow state at the end
    #[arg(long)]
    debug: bool,

    #[arg(long, short)]
    verbose: bool,
}

#[derive(Args, Debug, Default)]
struct DestinationArgs {
    #[arg(long = "dest-address1", default_value = "")]
    address1: String,
    #[arg(long = "dest-address2", default_value = "")]
    address2: String,
    #[arg(long = "dest-city", default_value = "")]
    city: String,
    #[arg(long = "dest-state", default_value = "")]
    state: String,
    #[arg(long = "dest-postal-code", default_value = "")]
    postal_code: String,
    #[arg(long = "dest-country", default_value = "")]
    country: String,
}

impl DestinationArgs {
    fn to_input(&self) -> DestinationInput {
        DestinationInput {
            address1: self.address1.clone(),
            address2: self.address2.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            postal_code: self.postal_code.clone(),
            country: self.country.clone(),
        }
    }
}

#[derive(Args, Debug)]
struct ServeKeysArgs {
    #[arg(long, env = "CONFIG_API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[arg(long, env = "EASYSHIP_KEY", hide_env_values = true)]
    easyship_key: Option<String>,

    #[arg(long, env = "VEEQO_KEY", hide_env_values = true)]
    veeqo_key: Option<String>,

    #[arg(long, short, env = "PORT")]
    port: Option<u16>,

    #[arg(long, short, default_value = "0.0.0.0")]
    bind: IpAddr,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run(args).await?,
        Command::ParseCustomer { file } => parse_customer(file).await?,
        Command::ServeKeys(args) => serve_keys(args).await?,
    }
    Ok(())
}

async fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load(args.config.as_deref())?;

    let credentials: Arc<dyn CredentialsPort> = match (&args.api_key, &args.key_server) {
        (Some(key), _) => Arc::new(StaticCredentials::new().with_key(args.platform, key.clone())),
        (None, Some(server)) => {
            let token = args.key_server_token.clone().ok_or_else(|| {
                ShippingError::Configuration("--key-server needs --key-server-token or CONFIG_API_TOKEN".to_string())
            })?;
            Arc::new(KeyServerCredentials::new(server, token)?)
        }
        (None, None) => {
            return Err(ShippingError::Configuration("Pass --api-key or --key-server".to_string()).into());
        }
    };
    let api_key = credentials.api_key(args.platform).await?;
    if !ShippingSession::api_key_is_plausible(&api_key) {
        return Err(ShippingError::Validation("Please enter a valid API key".to_string()).into());
    }

    let dispatcher = Dispatcher::new(
        config.endpoints(),
        Arc::new(ConfiguredProxyChain::new(config.proxies.clone())?),
        Arc::new(ReqwestHttpClient::new(config.request_timeout())?),
        Arc::new(DebugRecorder::new()),
    );

    let html = args.html.as_ref().map(|_| Arc::new(HtmlPresenter::new()));
    let presenter: Arc<dyn PresentationPort> = match &html {
        Some(html) => html.clone(),
        None => Arc::new(ConsolePresenter::new(args.verbose)),
    };

    let mut session = ShippingSession::new(dispatcher, presenter);
    info!("Session {} started", session.id());
    session.select_platform(args.platform);

    let outcome = drive(&mut session, &args, &api_key).await;

    if args.debug {
        session.debug_view().await;
    }
    if let (Some(path), Some(html)) = (&args.html, &html) {
        tokio::fs::write(path, html.page()).await?;
        info!("Wrote {}", path.display());
    }

    outcome
}

async fn drive(session: &mut ShippingSession, args: &RunArgs, api_key: &str) -> Result<(), Box<dyn std::error::Error>> {
    session.connect(api_key).await?;
    if args.action == Action::Connect && args.warehouse.is_none() {
        return Ok(());
    }

    session.load_warehouses().await?;
    let Some(warehouse) = &args.warehouse else {
        warn!("No warehouse given, stopping after the warehouse list");
        return Ok(());
    };
    session.select_warehouse(warehouse)?;

    session.load_products().await?;
    for product in &args.products {
        if !session.state().is_product_selected(product) {
            session.toggle_product(product)?;
        }
    }

    if let Some(path) = &args.customer_file {
        let text = tokio::fs::read_to_string(path).await?;
        let preview = session.preview_customer_paste(&text);
        match preview.draft {
            Some(draft) if preview.is_valid() => {
                session.save_customer(&draft).await?;
            }
            _ => return Err(ShippingError::Validation("Name and email are required".to_string()).into()),
        }
    } else if let Some(email) = &args.customer_email {
        match &args.customer_name {
            Some(name) => {
                let manual = ManualCustomer {
                    name: name.clone(),
                    email: email.clone(),
                    phone: args.customer_phone.clone(),
                    company: args.customer_company.clone(),
                };
                session.save_manual_customer(&manual).await?;
            }
            None => {
                session.find_customer(email).await?;
            }
        }
    }

    session.set_destination(&args.destination.to_input());

    match args.action {
        Action::Connect => {}
        Action::Rates => {
            session.get_rates().await?;
        }
        Action::Order => {
            session.create_order().await?;
        }
    }
    Ok(())
}

async fn parse_customer(file: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let text = match file {
        Some(path) => tokio::fs::read_to_string(path).await?,
        None => tokio::task::spawn_blocking(|| std::io::read_to_string(std::io::stdin())).await??,
    };

    let preview = PastePreview::from_text(&text);
    match &preview.draft {
        Some(draft) => {
            ConsolePresenter::default().customer_preview(Some(draft));
            println!("{}", serde_json::to_string_pretty(draft)?);
            if !preview.is_valid() {
                return Err(ShippingError::Validation("Name and email are required".to_string()).into());
            }
        }
        None => {
            return Err(ShippingError::Validation(format!(
                "Need at least 3 non-empty lines, got {}",
                preview.lines.len()
            ))
            .into());
        }
    }
    Ok(())
}

async fn serve_keys(args: ServeKeysArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = KeyServerConfig::from_parts(args.token, args.easyship_key, args.veeqo_key, args.port).map_err(|e| {
        error!("{}", e);
        e
    })?;

    for platform in PlatformId::ALL {
        if config.key_for(platform).is_none() {
            warn!("No key configured for {}", platform);
        }
    }

    let addr = SocketAddr::new(args.bind, config.port);
    let listener = TcpListener::bind(addr).await?;
    info!("Config server running on {}", listener.local_addr()?);

    key_server::serve(listener, Arc::new(KeyServerAdapter::new(config))).await?;
    Ok(())
}
