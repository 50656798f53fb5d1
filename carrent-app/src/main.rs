use anyhow::Context;
use carrent_app::account::{self, RegistrationResult};
use carrent_app::dashboard::{AdminDashboard, CustomerDashboard, OwnerDashboard, UserQuery};
use carrent_app::{render, AppError, AppResult, BookingFlow};
use carrent_booking::{BookingForm, FormState};
use carrent_catalog::{AdditionalService, CarFilter, SeatFilter};
use carrent_core::{RentalApi, SessionContext};
use carrent_shared::{
    CarCategory, CarDraft, Credentials, EntityId, Fuel, Masked, PaymentMethod, Registration,
    Role, Transmission,
};
use carrent_store::{Config, HttpRentalApi, SessionStore};
use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "carrent")]
#[command(about = "Browse, price and book rental cars")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and keep the session for later commands
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        phone: String,
        /// customer or owner
        #[arg(long, default_value = "customer")]
        role: Role,
    },

    /// Forget the stored session
    Logout,

    /// Show who is signed in
    Whoami,

    /// Browse the car catalogue
    Cars(CarFilterArgs),

    /// Price a rental without booking it
    Quote(QuoteArgs),

    /// Book a car
    Book {
        #[command(flatten)]
        quote: QuoteArgs,
        #[arg(long)]
        pickup: String,
        #[arg(long)]
        dropoff: String,
        #[arg(long, default_value = "credit-card")]
        payment: PaymentMethod,
    },

    /// List your bookings
    Bookings,

    /// Owner dashboard
    Owner {
        #[command(subcommand)]
        command: OwnerCommands,
    },

    /// Admin dashboard
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },
}

#[derive(Args)]
struct CarFilterArgs {
    /// Matches brand or model
    #[arg(short, long, default_value = "")]
    search: String,
    #[arg(long, value_parser = parse_wire::<CarCategory>)]
    category: Option<CarCategory>,
    #[arg(long, default_value_t = 0.0)]
    min_price: f64,
    #[arg(long, default_value_t = 300.0)]
    max_price: f64,
    #[arg(long, value_parser = parse_wire::<Transmission>)]
    transmission: Option<Transmission>,
    #[arg(long, value_parser = parse_wire::<Fuel>)]
    fuel: Option<Fuel>,
    /// Exact seat count, or 7+
    #[arg(long)]
    seats: Option<SeatFilter>,
}

#[derive(Args)]
struct QuoteArgs {
    car_id: String,
    /// 2024-03-10 or 2024-03-10T10:00
    #[arg(long)]
    start: String,
    #[arg(long)]
    end: String,
    /// gps, insurance, child-seat, driver, wifi
    #[arg(long = "service")]
    services: Vec<AdditionalService>,
}

/// Listing fields. `add-car` needs them all except features and
/// chauffeur; `edit-car` overrides only the ones given.
#[derive(Args)]
struct CarFieldArgs {
    #[arg(long)]
    brand: Option<String>,
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    year: Option<i32>,
    /// Day-rate
    #[arg(long)]
    price: Option<f64>,
    #[arg(long, value_parser = parse_wire::<CarCategory>)]
    category: Option<CarCategory>,
    #[arg(long, value_parser = parse_wire::<Transmission>)]
    transmission: Option<Transmission>,
    #[arg(long, value_parser = parse_wire::<Fuel>)]
    fuel: Option<Fuel>,
    #[arg(long)]
    seats: Option<u32>,
    /// Comma-separated, e.g. "GPS, Bluetooth"
    #[arg(long)]
    features: Option<String>,
    #[arg(long)]
    wilaya: Option<String>,
    #[arg(long)]
    commune: Option<String>,
    #[arg(long, action = clap::ArgAction::Set)]
    chauffeur: Option<bool>,
}

fn required<T>(value: Option<T>, flag: &str) -> AppResult<T> {
    value.ok_or_else(|| AppError::InvalidInput(format!("--{} is required.", flag)))
}

impl CarFieldArgs {
    fn into_draft(self) -> AppResult<CarDraft> {
        Ok(CarDraft {
            brand: required(self.brand, "brand")?,
            car_model: required(self.model, "model")?,
            year: required(self.year, "year")?,
            price: required(self.price, "price")?,
            category: required(self.category, "category")?,
            transmission: required(self.transmission, "transmission")?,
            fuel: required(self.fuel, "fuel")?,
            seats: required(self.seats, "seats")?,
            features: self
                .features
                .as_deref()
                .map(CarDraft::parse_features)
                .unwrap_or_default(),
            wilaya: required(self.wilaya, "wilaya")?,
            commune: required(self.commune, "commune")?,
            chauffeur: self.chauffeur.unwrap_or(false),
        })
    }

    fn apply(self, draft: &mut CarDraft) {
        if let Some(brand) = self.brand {
            draft.brand = brand;
        }
        if let Some(model) = self.model {
            draft.car_model = model;
        }
        if let Some(year) = self.year {
            draft.year = year;
        }
        if let Some(price) = self.price {
            draft.price = price;
        }
        if let Some(category) = self.category {
            draft.category = category;
        }
        if let Some(transmission) = self.transmission {
            draft.transmission = transmission;
        }
        if let Some(fuel) = self.fuel {
            draft.fuel = fuel;
        }
        if let Some(seats) = self.seats {
            draft.seats = seats;
        }
        if let Some(features) = self.features {
            draft.features = CarDraft::parse_features(&features);
        }
        if let Some(wilaya) = self.wilaya {
            draft.wilaya = wilaya;
        }
        if let Some(commune) = self.commune {
            draft.commune = commune;
        }
        if let Some(chauffeur) = self.chauffeur {
            draft.chauffeur = chauffeur;
        }
    }
}

#[derive(Subcommand)]
enum OwnerCommands {
    /// List your cars
    Cars,
    /// Submit a new listing for approval
    AddCar {
        #[command(flatten)]
        fields: CarFieldArgs,
    },
    /// Change a listing and resubmit it
    EditCar {
        car_id: EntityId,
        #[command(flatten)]
        fields: CarFieldArgs,
    },
    /// Make a car available or unavailable
    Availability {
        car_id: EntityId,
        #[arg(long, action = clap::ArgAction::Set)]
        available: bool,
    },
    /// Bookings waiting for your answer
    Pending,
    Approve { booking_id: EntityId },
    Reject {
        booking_id: EntityId,
        #[arg(long)]
        reason: String,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    Stats,
    Users {
        #[arg(short, long, default_value = "")]
        search: String,
        #[arg(long)]
        role: Option<Role>,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    ApproveUser { user_id: EntityId },
    DeclineUser { user_id: EntityId },
    /// Cars waiting for review
    PendingCars,
    ApproveCar { car_id: EntityId },
    RejectCar {
        car_id: EntityId,
        #[arg(long, default_value = "")]
        reason: String,
        #[arg(long)]
        definitive: bool,
    },
    Bookings,
}

/// Parses an enum from its wire spelling (`SUV`, `Automatic`, ...).
fn parse_wire<T: DeserializeOwned>(raw: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(raw.to_string()))
        .map_err(|_| format!("unknown value: {}", raw))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "carrent=info,carrent_app=debug,carrent_store=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config::load().context("Failed to load config")?;
    tracing::debug!(base_url = %config.api.base_url, "Using backend");

    let api: Arc<dyn RentalApi> = Arc::new(HttpRentalApi::new(&config.api)?);
    let store = SessionStore::new(config.session.path.clone());
    let mut ctx = match store.load() {
        Ok(Some(session)) => SessionContext::with_session(session),
        Ok(None) => SessionContext::new(),
        Err(err) => {
            tracing::warn!(error = %err, "Ignoring unreadable session file");
            store.clear()?;
            SessionContext::new()
        }
    };

    let result = run(cli.command, api, &store, &mut ctx).await;

    if let Err(err) = &result {
        if err.requires_login() {
            store.clear()?;
            eprintln!("{}. Please log in with `carrent login`.", err);
            std::process::exit(2);
        }
    }
    result.map_err(anyhow::Error::from)
}

async fn run(
    command: Commands,
    api: Arc<dyn RentalApi>,
    store: &SessionStore,
    ctx: &mut SessionContext,
) -> AppResult<()> {
    match command {
        Commands::Login { email, password } => {
            let credentials = Credentials {
                email,
                password: Masked::new(password),
            };
            let session = account::login(api.as_ref(), ctx, &credentials).await?;
            store.save(&session)?;
            println!("Signed in as {} ({})", session.user().name, session.role());
        }

        Commands::Register {
            name,
            email,
            password,
            phone,
            role,
        } => {
            if role == Role::Admin {
                return Err(AppError::InvalidInput(
                    "Admin accounts cannot be self-registered.".to_string(),
                ));
            }
            let registration = Registration {
                name,
                email,
                password: Masked::new(password),
                phone,
                role,
            };
            match account::register(api.as_ref(), ctx, &registration).await? {
                RegistrationResult::SignedIn => {
                    if let Some(session) = ctx.current() {
                        store.save(session)?;
                    }
                    println!("Registered and signed in.");
                }
                RegistrationResult::AwaitingApproval(message) => println!("{}", message),
            }
        }

        Commands::Logout => {
            ctx.logout();
            store.clear()?;
            println!("Signed out.");
        }

        Commands::Whoami => match ctx.current() {
            Some(session) => {
                let user = session.user();
                println!("{} <{}> {}", user.name, user.email, user.role);
                if let Some(exp) = session.expires_at() {
                    println!("Session valid until {}", exp);
                }
            }
            None => println!("Not signed in."),
        },

        Commands::Cars(args) => {
            let filter = CarFilter {
                search: args.search,
                category: args.category,
                price_range: (args.min_price, args.max_price),
                transmission: args.transmission,
                fuel: args.fuel,
                seats: args.seats,
            };
            let cars = CustomerDashboard::new(api).browse(&filter).await?;
            if cars.is_empty() {
                println!("No cars match your filters.");
            }
            for car in &cars {
                println!("{}", render::car_line(car));
            }
        }

        Commands::Quote(args) => {
            let flow = BookingFlow::new(api);
            let form = prepare_form(&flow, &args).await?;
            print_form(&form);
        }

        Commands::Book {
            quote,
            pickup,
            dropoff,
            payment,
        } => {
            let flow = BookingFlow::new(api);
            let mut form = prepare_form(&flow, &quote).await?;
            form.set_pickup_location(&pickup)?;
            form.set_dropoff_location(&dropoff)?;
            form.set_payment_method(payment)?;
            print_form(&form);

            if !form.can_submit() {
                return Err(AppError::InvalidInput(render::form_status(&form)));
            }
            let submitted = flow.submit(&mut form, ctx).await;
            if ctx.current().is_none() {
                store.clear()?;
            }
            submitted?;
            println!("Booking request sent. The owner will confirm it.");
        }

        Commands::Bookings => {
            let bookings = CustomerDashboard::new(api).my_bookings(ctx).await?;
            if bookings.is_empty() {
                println!("No bookings yet.");
            }
            for booking in &bookings {
                println!("{}", render::booking_line(booking));
            }
        }

        Commands::Owner { command } => run_owner(command, OwnerDashboard::new(api), ctx).await?,

        Commands::Admin { command } => run_admin(command, AdminDashboard::new(api), ctx).await?,
    }
    Ok(())
}

async fn run_owner(command: OwnerCommands, owner: OwnerDashboard, ctx: &SessionContext) -> AppResult<()> {
    match command {
        OwnerCommands::Cars => {
            for car in owner.my_cars(ctx).await? {
                println!("{}", render::car_line(&car));
            }
        }
        OwnerCommands::AddCar { fields } => {
            let draft = fields.into_draft()?;
            println!("{}", owner.add_car(ctx, &draft).await?);
        }
        OwnerCommands::EditCar { car_id, fields } => {
            let mut draft = owner.draft_for(ctx, &car_id).await?;
            fields.apply(&mut draft);
            println!("{}", owner.edit_car(ctx, &car_id, &draft).await?);
        }
        OwnerCommands::Availability { car_id, available } => {
            println!("{}", owner.set_availability(ctx, &car_id, available).await?);
        }
        OwnerCommands::Pending => {
            for booking in owner.pending_bookings(ctx).await? {
                println!("{}", render::booking_line(&booking));
            }
        }
        OwnerCommands::Approve { booking_id } => {
            owner.approve_booking(ctx, &booking_id).await?;
            println!("Booking approved successfully.");
        }
        OwnerCommands::Reject { booking_id, reason } => {
            owner.reject_booking(ctx, &booking_id, &reason).await?;
            println!("Booking rejected successfully.");
        }
    }
    Ok(())
}

async fn run_admin(command: AdminCommands, admin: AdminDashboard, ctx: &SessionContext) -> AppResult<()> {
    match command {
        AdminCommands::Stats => {
            let stats = admin.stats(ctx).await?;
            println!("Total users:     {}", stats.total_users);
            println!("Fleet size:      {}", stats.fleet_size);
            println!("Monthly revenue: ${:.2}", stats.monthly_revenue);
        }
        AdminCommands::Users { search, role, page } => {
            let result = admin.users(ctx, &UserQuery { search, role, page }).await?;
            if !result.pending.is_empty() {
                println!("Pending approval:");
                for user in &result.pending {
                    println!("  {}", render::user_line(user));
                }
            }
            for user in &result.users {
                println!("{}", render::user_line(user));
            }
            println!(
                "Page {} of {} ({} users)",
                result.page,
                result.total_pages.max(1),
                result.total_matching
            );
        }
        AdminCommands::ApproveUser { user_id } => {
            admin.approve_user(ctx, &user_id).await?;
            println!("User approved.");
        }
        AdminCommands::DeclineUser { user_id } => {
            admin.decline_user(ctx, &user_id).await?;
            println!("User declined.");
        }
        AdminCommands::PendingCars => {
            let cars = admin.pending_cars(ctx).await?;
            if cars.is_empty() {
                println!("No cars pending approval.");
            }
            for car in &cars {
                println!("{}", render::car_line(car));
            }
        }
        AdminCommands::ApproveCar { car_id } => {
            admin.approve_car(ctx, &car_id).await?;
            println!("Car approved.");
        }
        AdminCommands::RejectCar {
            car_id,
            reason,
            definitive,
        } => {
            admin.reject_car(ctx, &car_id, &reason, definitive).await?;
            println!("Car rejected.");
        }
        AdminCommands::Bookings => {
            for booking in admin.all_bookings(ctx).await? {
                println!("{}", render::booking_line(&booking));
            }
        }
    }
    Ok(())
}

/// Loads the form and applies dates and services from the command line.
async fn prepare_form(flow: &BookingFlow, args: &QuoteArgs) -> AppResult<BookingForm> {
    let mut form = flow.open(&args.car_id).await?;
    if let FormState::FetchFailed(reason) = form.state() {
        return Err(AppError::InvalidInput(reason.clone()));
    }

    form.set_start_date(&args.start)?;
    form.set_end_date(&args.end)?;
    for service in &args.services {
        if !form.request().additional_services.iter().any(|s| s == service.id()) {
            form.toggle_service(service.id())?;
        }
    }
    Ok(form)
}

fn print_form(form: &BookingForm) {
    if let Some(car) = form.car() {
        println!("{}", render::car_line(car));
    }
    if let Some(booked) = form.booked_periods() {
        for period in booked {
            println!("  booked: {}", period);
        }
    }
    if let Some(breakdown) = form.breakdown() {
        for line in render::breakdown_lines(&breakdown) {
            println!("{}", line);
        }
    }
    println!("{}", render::form_status(form));
}
