//! Command-line front end over the view controllers

use std::path::PathBuf;

use api::models::provider::MAX_PRICE_FILTER;
use api::models::{
    Booking, BookingStatus, CustomerProfileUpdate, ProviderProfileUpdate, ProviderSearch,
};
use api::views::{
    BookingsView, ChatView, CustomerDashboard, DirectoryView, LoginView, OtpView, ProfileView,
    ProviderDashboard, RatingView, RegisterView, SettingsView,
};
use api::{AppState, ViewError, ViewResult, ViewState};
use auth::Role;
use auth::models::{NewCustomer, NewProvider};
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "marketplace",
    version,
    about = "Terminal client for the local-services marketplace"
)]
pub struct Cli {
    /// Backend address, overrides MARKETPLACE_BASE_URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Where the session is kept between runs
    #[arg(long, global = true)]
    pub session_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Create an account
    #[command(subcommand)]
    Register(RegisterCommand),
    /// Verify a mobile number
    #[command(subcommand)]
    Otp(OtpCommand),
    /// Search providers of a service category
    Providers(SearchArgs),
    /// Show a provider's profile and reviews
    Provider { id: i64 },
    /// Load the dashboard of the signed-in role
    Dashboard,
    /// Book a provider
    Book {
        #[arg(long)]
        provider_id: i64,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// HH:MM
        #[arg(long)]
        time: String,
        #[arg(long)]
        description: String,
    },
    /// Cancel one of your bookings
    Cancel { booking_id: i64 },
    /// Move a request to a new status (providers)
    Status { booking_id: i64, status: String },
    /// Rate a completed booking
    Rate {
        booking_id: i64,
        #[arg(long)]
        score: u8,
        #[arg(long)]
        comment: String,
    },
    /// Conversations
    #[command(subcommand)]
    Chat(ChatCommand),
    /// Edit your profile
    Profile(ProfileArgs),
    /// Change your password
    ChangePassword {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
    /// Delete your account
    DeleteAccount {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum RegisterCommand {
    Customer {
        #[command(flatten)]
        account: AccountArgs,
    },
    Provider {
        #[command(flatten)]
        account: AccountArgs,
        /// Written as XXXX XXXX XXXX
        #[arg(long)]
        aadhaar: String,
        #[arg(long)]
        service_type: String,
    },
}

#[derive(Args, Debug)]
pub struct AccountArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    address: String,
    #[arg(long)]
    password: String,
    #[arg(long)]
    confirm_password: String,
}

#[derive(Subcommand, Debug)]
pub enum OtpCommand {
    Request {
        #[arg(long)]
        user_id: i64,
        #[arg(long)]
        mobile: String,
    },
    Verify {
        #[arg(long)]
        user_id: i64,
        #[arg(long)]
        mobile: String,
        #[arg(long)]
        code: String,
    },
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    category: String,
    #[arg(long, default_value_t = 0.0)]
    min_rating: f64,
    #[arg(long, default_value_t = 0)]
    min_price: u32,
    #[arg(long, default_value_t = MAX_PRICE_FILTER)]
    max_price: u32,
    #[arg(long)]
    location: Option<String>,
    /// One-based page number
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long, default_value_t = 10)]
    size: u32,
}

#[derive(Subcommand, Debug)]
pub enum ChatCommand {
    /// Open the conversation with a customer or provider
    Open { counterpart_id: i64 },
    /// Print a conversation
    Show { conversation_id: i64 },
    /// Send a message
    Send { conversation_id: i64, text: String },
}

#[derive(Args, Debug)]
pub struct ProfileArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    state: Option<String>,
    #[arg(long)]
    country: Option<String>,
    #[arg(long)]
    service_type: Option<String>,
    #[arg(long)]
    bio: Option<String>,
    #[arg(long)]
    available: Option<bool>,
    /// The new phone number has been verified by OTP
    #[arg(long)]
    phone_verified: bool,
}

/// Run one command against the views
pub async fn execute(state: AppState, command: Command) -> ViewResult<()> {
    match command {
        Command::Login { email, password } => {
            let result = LoginView::new(&state).submit(&email, &password).await?;
            println!("{}", result.message);
            println!("Continue at {}", result.route);
        }
        Command::Logout => {
            let route = LoginView::new(&state).sign_out();
            println!("Signed out. Continue at {}", route);
        }
        Command::Whoami => match state.session.user() {
            Some(user) => {
                println!(
                    "{} ({})",
                    user.name().unwrap_or("<no name>"),
                    user.role().map(|r| r.as_str()).unwrap_or("<no role>")
                );
                if let Some(email) = user.email() {
                    println!("email: {}", email);
                }
                if let Some(id) = user.user_id() {
                    println!("user id: {}", id);
                }
            }
            None => println!("Not signed in"),
        },
        Command::Register(register) => {
            let view = RegisterView::new(&state);
            let pending = match register {
                RegisterCommand::Customer { account } => {
                    let (form, confirm) = customer_form(account);
                    view.register_customer(&form, &confirm).await?
                }
                RegisterCommand::Provider {
                    account,
                    aadhaar,
                    service_type,
                } => {
                    let (form, confirm) = customer_form(account);
                    let provider = NewProvider {
                        name: form.name,
                        email: form.email,
                        password: form.password,
                        phone: form.phone,
                        address: form.address,
                        aadhaar_number: aadhaar,
                        service_type,
                    };
                    view.register_provider(&provider, &confirm).await?
                }
            };
            println!("{}", pending.message);
            println!(
                "Verify with: marketplace otp request --user-id {} --mobile {}",
                pending.user_id, pending.mobile_number
            );
        }
        Command::Otp(otp) => {
            let view = OtpView::new(&state);
            let message = match otp {
                OtpCommand::Request { user_id, mobile } => view.request(user_id, &mobile).await?,
                OtpCommand::Verify {
                    user_id,
                    mobile,
                    code,
                } => view.verify(user_id, &mobile, &code).await?,
            };
            println!("{}", message);
        }
        Command::Providers(args) => {
            let search = ProviderSearch {
                category: args.category,
                min_rating: args.min_rating,
                min_price: args.min_price,
                max_price: args.max_price,
                location: args.location,
                page: args.page.saturating_sub(1),
                size: args.size,
            };
            let page = DirectoryView::new(&state).search(&search).await?;
            if page.providers.is_empty() {
                println!("No providers found");
            }
            for provider in &page.providers {
                println!(
                    "#{} {} [{}] {} rating {}",
                    provider.provider_id().unwrap_or_default(),
                    provider.name.as_deref().unwrap_or("<unnamed>"),
                    provider.service_type.as_deref().unwrap_or("-"),
                    provider.address.as_deref().unwrap_or("N/A"),
                    provider
                        .average_rating
                        .map(|r| format!("{:.1}", r))
                        .unwrap_or_else(|| "-".to_string())
                );
            }
        }
        Command::Provider { id } => {
            let details = DirectoryView::new(&state).provider(id).await?;
            println!(
                "{} [{}]",
                details.provider.name.as_deref().unwrap_or("<unnamed>"),
                details.provider.service_type.as_deref().unwrap_or("-")
            );
            if let Some(bio) = &details.provider.bio {
                println!("{}", bio);
            }
            match details.average_rating() {
                Some(avg) => println!("Average rating {:.1} from {} review(s)", avg, details.reviews.len()),
                None => println!("No reviews yet"),
            }
            for review in &details.reviews {
                println!(
                    "  {}/5 {}: {}",
                    review.score,
                    review.customer_name.as_deref().unwrap_or("Anonymous"),
                    review.comment.as_deref().unwrap_or("")
                );
            }
        }
        Command::Dashboard => dashboard(&state).await?,
        Command::Book {
            provider_id,
            date,
            time,
            description,
        } => {
            let details = DirectoryView::new(&state).provider(provider_id).await?;
            let booking = BookingsView::new(&state)
                .create(&details.provider, &date, &time, &description)
                .await?;
            println!("Booking created");
            print_booking(&booking);
        }
        Command::Cancel { booking_id } => {
            println!("{}", BookingsView::new(&state).cancel(booking_id).await?);
        }
        Command::Status { booking_id, status } => {
            let mut bookings = Vec::new();
            let booking = BookingsView::new(&state)
                .update_status(&mut bookings, booking_id, BookingStatus::from(status))
                .await?;
            print_booking(&booking);
        }
        Command::Rate {
            booking_id,
            score,
            comment,
        } => {
            let message = RatingView::new(&state)
                .submit(booking_id, score, &comment)
                .await?;
            println!("{}", message);
        }
        Command::Chat(chat) => {
            let view = ChatView::new(&state);
            match chat {
                ChatCommand::Open { counterpart_id } => {
                    let conversation = view.open(counterpart_id).await?;
                    println!("Conversation #{}", conversation.id);
                }
                ChatCommand::Show { conversation_id } => {
                    for line in view.messages(conversation_id).await? {
                        let who = if line.mine { "me" } else { "them" };
                        println!("[{}] {}", who, line.message.content);
                    }
                }
                ChatCommand::Send {
                    conversation_id,
                    text,
                } => match view.send(conversation_id, &text).await? {
                    Some(_) => println!("Sent"),
                    None => println!("Nothing to send"),
                },
            }
        }
        Command::Profile(args) => profile(&state, args).await?,
        Command::ChangePassword {
            current,
            new,
            confirm,
        } => {
            let message = SettingsView::new(&state)
                .change_password(&current, &new, &confirm)
                .await?;
            println!("{}", message);
        }
        Command::DeleteAccount { yes } => {
            if !yes {
                return Err(ViewError::Invalid(
                    "Pass --yes to delete your account. This cannot be undone.".to_string(),
                ));
            }
            let (message, route) = SettingsView::new(&state).delete_account().await?;
            println!("{}", message);
            println!("Continue at {}", route);
        }
    }
    Ok(())
}

fn customer_form(account: AccountArgs) -> (NewCustomer, String) {
    (
        NewCustomer {
            name: account.name,
            email: account.email,
            password: account.password,
            phone: account.phone,
            address: account.address,
        },
        account.confirm_password,
    )
}

async fn dashboard(state: &AppState) -> ViewResult<()> {
    match state.session.role() {
        Some(Role::Provider) => match ProviderDashboard::new(state).load().await? {
            ViewState::Ready(data) => {
                if let Some(name) = data.profile.as_ref().and_then(|p| p.name.as_deref()) {
                    println!("Welcome, {}", name);
                }
                print_notices(&data.notices);
                print_bookings(&data.bookings);
            }
            other => print_unready(other),
        },
        _ => match CustomerDashboard::new(state).load().await? {
            ViewState::Ready(data) => {
                println!(
                    "Welcome, {}",
                    data.profile.name.as_deref().unwrap_or("customer")
                );
                print_notices(&data.notices);
                print_bookings(&data.bookings);
            }
            other => print_unready(other),
        },
    }
    Ok(())
}

async fn profile(state: &AppState, args: ProfileArgs) -> ViewResult<()> {
    let Some(user) = state.session.user() else {
        return Err(ViewError::NotSignedIn(
            "Please log in to edit your profile.".to_string(),
        ));
    };
    let current = |key: &str| {
        user.get(key)
            .and_then(|value| value.as_str())
            .unwrap_or_default()
            .to_string()
    };
    let view = ProfileView::new(state);

    let saved = match user.role() {
        Some(Role::Provider) => {
            let update = ProviderProfileUpdate {
                name: args.name.unwrap_or_else(|| current("name")),
                email: args.email.unwrap_or_else(|| current("email")),
                phone: args.phone.unwrap_or_else(|| current("phone")),
                address: args.address.unwrap_or_else(|| current("address")),
                service_type: args.service_type.unwrap_or_else(|| current("serviceType")),
                bio: args.bio,
                available: args.available,
                price: None,
            };
            view.save_provider(&update).await?
        }
        _ => {
            let update = CustomerProfileUpdate {
                name: args.name.unwrap_or_else(|| current("name")),
                email: args.email.unwrap_or_else(|| current("email")),
                phone: args.phone.unwrap_or_else(|| current("phone")),
                address: args.address.unwrap_or_else(|| current("address")),
                city: args.city,
                state: args.state,
                country: args.country,
            };
            view.save_customer(&update, args.phone_verified).await?
        }
    };
    println!("Profile saved for {}", saved.label());
    Ok(())
}

fn print_unready<T>(state: ViewState<T>) {
    match state {
        ViewState::NotReady => println!("Session is still loading"),
        ViewState::Redirect(route) => println!("Redirecting to {}", route),
        ViewState::Ready(_) => {}
    }
}

fn print_notices(notices: &[String]) {
    for notice in notices {
        println!("! {}", notice);
    }
}

fn print_bookings(bookings: &[Booking]) {
    if bookings.is_empty() {
        println!("No bookings yet");
    }
    for booking in bookings {
        print_booking(booking);
    }
}

fn print_booking(booking: &Booking) {
    let when = match (booking.service_date, booking.service_time) {
        (Some(date), Some(time)) => format!("{} {}", date, time.format("%H:%M")),
        (Some(date), None) => date.to_string(),
        _ => "unscheduled".to_string(),
    };
    println!(
        "#{} {} {} {} {}",
        booking.id,
        booking.status,
        booking.service_type.as_deref().unwrap_or("-"),
        when,
        booking
            .provider_name
            .as_deref()
            .or(booking.customer_name.as_deref())
            .unwrap_or("")
    );
}
