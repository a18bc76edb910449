//! Command-line parsing.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use saveplate_core::forms::DonationForm;
use saveplate_types::Role;
use saveplate_types::api::{ProfileUpdate, RegisterRequest};

#[derive(Debug, Parser)]
#[command(name = "saveplate", version, about = "Save the Plate from the terminal")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    // -- Account --
    /// Log in with email, password and role
    Login {
        email: String,
        password: String,
        #[arg(value_parser = parse_role)]
        role: Role,
    },
    /// Create an account
    Register(RegisterArgs),
    /// Print the Google sign-in URL
    Google,
    /// Finish Google sign-in with the redirect URL
    #[command(name = "oauth")]
    OAuth { redirect: String },
    Logout,
    /// Show the logged-in profile
    #[command(name = "whoami")]
    WhoAmI,
    /// Move to a page and show the navigation
    Open { path: String },
    /// Show, set or toggle dark mode for the current role
    DarkMode {
        #[arg(value_enum)]
        mode: Option<DarkModeArg>,
    },
    /// Show the profile, or update it when any option is given
    Profile(ProfileArgs),
    ChangePassword {
        old: String,
        new: String,
        confirm: String,
    },

    // -- Dashboards --
    Dashboard {
        #[arg(long)]
        watch: bool,
    },
    Analytics,
    Notifications {
        #[arg(long)]
        watch: bool,
    },
    /// Carry out the action a notification asks for
    Resolve {
        #[arg(value_name = "NOTIFICATION_ID")]
        id: String,
    },
    ClearNotifications,

    // -- Donor --
    Donate(DonateArgs),
    Donations,
    ConfirmCompletion {
        #[arg(value_name = "DONATION_ID")]
        id: String,
    },

    // -- NGO --
    /// Donations waiting for pickup in your city
    Pending,
    Accept {
        #[arg(value_name = "DONATION_ID")]
        id: String,
    },
    RequestCompletion {
        #[arg(value_name = "DONATION_ID")]
        id: String,
    },
    /// Food stock with freshness countdown
    Stock {
        #[arg(long)]
        watch: bool,
    },
    Orphanages,
    DonateItem {
        donation_id: String,
        item_index: usize,
        orphanage_id: String,
    },
    ApproveRequest {
        donation_id: String,
        orphanage_id: String,
    },
    Deliveries,
    DeliveryCompleted {
        #[arg(value_name = "DONATION_ID")]
        id: String,
    },

    // -- Orphanage --
    /// Browse NGO stock to request from
    RequestStock {
        #[arg(long)]
        out_of_city: bool,
        #[arg(long)]
        watch: bool,
    },
    RequestFood {
        donation_id: String,
        item_index: usize,
        ngo_id: String,
    },
    ConfirmDelivery {
        donation_id: String,
        item_index: Option<usize>,
    },

    // -- Public --
    Stats,
    Partners,
    Ngos,
    PublicOrphanages,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DarkModeArg {
    On,
    Off,
    Toggle,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    #[arg(value_parser = parse_role)]
    role: Role,
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    address: String,
    #[arg(long)]
    city: String,
    #[arg(long)]
    donor_type: Option<String>,
    #[arg(long)]
    ngo_name: Option<String>,
    #[arg(long)]
    reg_number: Option<String>,
    #[arg(long)]
    orphanage_name: Option<String>,
    #[arg(long)]
    license_number: Option<String>,
    #[arg(long = "children")]
    children_count: Option<u32>,
}

impl RegisterArgs {
    pub fn into_request(self) -> RegisterRequest {
        RegisterRequest {
            role: self.role,
            name: self.name,
            email: self.email,
            password: self.password,
            phone: self.phone,
            address: self.address,
            city: self.city,
            donor_type: self.donor_type,
            ngo_name: self.ngo_name,
            reg_number: self.reg_number,
            orphanage_name: self.orphanage_name,
            license_number: self.license_number,
            children_count: self.children_count,
        }
    }
}

#[derive(Debug, Args)]
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
    donor_type: Option<String>,
    #[arg(long)]
    ngo_name: Option<String>,
    #[arg(long)]
    orphanage_name: Option<String>,
    /// Image file to upload as the profile picture
    #[arg(long)]
    pub picture: Option<PathBuf>,
}

impl ProfileArgs {
    pub fn update(&self) -> ProfileUpdate {
        ProfileUpdate {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            donor_type: self.donor_type.clone(),
            ngo_name: self.ngo_name.clone(),
            orphanage_name: self.orphanage_name.clone(),
        }
    }
}

#[derive(Debug, Args)]
pub struct DonateArgs {
    /// NAME:SERVES, repeatable
    #[arg(long = "item", value_name = "NAME:SERVES", value_parser = parse_food_item,
          action = ArgAction::Append, required = true)]
    items: Vec<(String, String)>,
    /// Best-before window in hours
    #[arg(long)]
    hours: String,
    #[arg(long)]
    location: String,
    #[arg(long)]
    city: String,
    #[arg(long, default_value = "")]
    instructions: String,
}

impl DonateArgs {
    pub fn into_form(self) -> DonationForm {
        DonationForm {
            items: self.items,
            best_before_hours: self.hours,
            location: self.location,
            city: self.city,
            instructions: self.instructions,
        }
    }
}

fn parse_role(raw: &str) -> Result<Role, String> {
    raw.parse::<Role>()
        .map_err(|e| format!("{e} (expected donor, ngo or orphanage)"))
}

/// `NAME:SERVES`. Serves are validated with the rest of the form.
fn parse_food_item(raw: &str) -> Result<(String, String), String> {
    raw.rsplit_once(':')
        .map(|(name, serves)| (name.to_string(), serves.to_string()))
        .ok_or_else(|| format!("expected NAME:SERVES, got {raw:?}"))
}
