// ABOUTME: Administrative command-line tool for bootstrapping users, tokens, and plans
// ABOUTME: Operates directly on the configured database with the server's signing secret
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Usage:
//! ```bash
//! # Create an administrator and print a token for it
//! cargo run --bin phasewise-admin -- create-user --email ops@example.com --role admin
//! cargo run --bin phasewise-admin -- issue-token --email ops@example.com
//!
//! # Add a plan allowing all three phases for 90 days
//! cargo run --bin phasewise-admin -- create-plan --name Gold --amount 49 --allowed-phases 3 --duration-days 90
//!
//! # Settle a pending subscription by hand
//! cargo run --bin phasewise-admin -- record-payment --reference pay_abc --outcome succeeded
//! ```

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use phasewise_server::{
    auth::AuthManager,
    clock::{Clock, SystemClock},
    config::{DatabaseUrl, ServerConfig},
    database::Database,
    logging,
    models::{PaymentOutcome, User, UserRole},
    services::{BillingService, CreatePlanRequest},
};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "phasewise-admin",
    about = "Phasewise administration",
    long_about = "Bootstrap users, issue tokens, and manage plans and payments without going through the HTTP API."
)]
struct AdminArgs {
    #[command(subcommand)]
    command: AdminCommand,

    /// Database URL override
    #[arg(long)]
    database_url: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    User,
    Admin,
    SuperAdmin,
}

impl From<RoleArg> for UserRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::User => Self::User,
            RoleArg::Admin => Self::Admin,
            RoleArg::SuperAdmin => Self::SuperAdmin,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutcomeArg {
    Succeeded,
    Failed,
}

impl From<OutcomeArg> for PaymentOutcome {
    fn from(outcome: OutcomeArg) -> Self {
        match outcome {
            OutcomeArg::Succeeded => Self::Succeeded,
            OutcomeArg::Failed => Self::Failed,
        }
    }
}

#[derive(Subcommand)]
enum AdminCommand {
    /// Create a user account
    CreateUser {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, value_enum, default_value = "user")]
        role: RoleArg,
        /// Body weight used for calorie estimates
        #[arg(long)]
        weight_kg: Option<f64>,
    },
    /// Print a bearer token for an existing user
    IssueToken {
        #[arg(long)]
        email: String,
    },
    /// Add a plan to the catalogue
    CreatePlan {
        #[arg(long)]
        name: String,
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        allowed_phases: i64,
        #[arg(long)]
        duration_days: Option<i64>,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Repeat for each facility
        #[arg(long = "facility")]
        facilities: Vec<String>,
    },
    /// Settle a pending subscription
    RecordPayment {
        #[arg(long)]
        reference: String,
        #[arg(long, value_enum)]
        outcome: OutcomeArg,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = AdminArgs::parse();
    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(url) = args.database_url {
        config.database.url = DatabaseUrl::parse_url(&url).context("Invalid --database-url")?;
    }

    let database = Arc::new(Database::new(&config.database.url.to_connection_string()).await?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    match args.command {
        AdminCommand::CreateUser {
            email,
            name,
            role,
            weight_kg,
        } => {
            let user = User::new(email.trim().to_lowercase(), name, role.into());
            database.users().create(&user).await?;
            if let Some(weight_kg) = weight_kg {
                database.users().update_weight(user.id, weight_kg).await?;
            }
            info!(user_id = %user.id, role = %user.role, "Created user");
            println!("Created {} {} ({})", user.role, user.email, user.id);
        }
        AdminCommand::IssueToken { email } => {
            let user = database
                .users()
                .get_by_email(&email.trim().to_lowercase())
                .await?
                .ok_or_else(|| anyhow!("No user with email {email}"))?;
            let auth = AuthManager::new(
                config.auth.jwt_secret.as_bytes(),
                config.auth.jwt_expiry_hours,
            );
            let token = auth.generate_token(&user)?;
            println!("{token}");
        }
        AdminCommand::CreatePlan {
            name,
            amount,
            allowed_phases,
            duration_days,
            currency,
            description,
            facilities,
        } => {
            let billing = BillingService::new(database.clone(), clock);
            let plan = billing
                .create_plan(CreatePlanRequest {
                    plan_name: Some(name),
                    amount: Some(amount),
                    currency,
                    description,
                    allowed_phases: Some(allowed_phases),
                    duration_days,
                    facilities,
                })
                .await?;
            println!("Created plan {} ({})", plan.plan_name, plan.id);
        }
        AdminCommand::RecordPayment { reference, outcome } => {
            let billing = BillingService::new(database.clone(), clock);
            let subscription = billing
                .record_payment_outcome(&reference, outcome.into())
                .await?;
            println!(
                "Subscription {} is now {}",
                subscription.id, subscription.payment_status
            );
        }
    }

    Ok(())
}
