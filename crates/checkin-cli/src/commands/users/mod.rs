//! User management subcommands (admin).

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use checkin_core::{NewUser, Role, UserUpdate};

use crate::cli::GlobalArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct UsersCommand {
    #[command(subcommand)]
    pub command: UsersSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum UsersSubcommand {
    /// List all users
    List(ListArgs),

    /// Create a verified user
    Create(CreateArgs),

    /// Update a user's role, territory or status
    Update(UpdateArgs),

    /// List a user's check-ins
    Checkins(CheckinsArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Print users as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long, env = "CHECKIN_NEW_USER_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// rep, supervisor or admin [default: rep]
    #[arg(long)]
    pub role: Option<Role>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub region: Option<String>,

    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// User ID
    pub id: String,

    #[arg(long)]
    pub role: Option<Role>,

    #[arg(long)]
    pub region: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub verified: Option<bool>,

    #[arg(long)]
    pub active: Option<bool>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub email: Option<String>,
}

#[derive(Args, Debug)]
pub struct CheckinsArgs {
    /// User ID
    pub id: String,

    /// Print check-ins as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn handle(global: &GlobalArgs, cmd: UsersCommand) -> Result<()> {
    let api = session::connect_logged_in(global).await?;

    match cmd.command {
        UsersSubcommand::List(args) => {
            let users = api.list_users().await.context("Failed to list users")?;
            if args.json {
                return output::json_pretty(&users);
            }
            for user in &users {
                output::user_line(user);
            }
            Ok(())
        }
        UsersSubcommand::Create(args) => {
            let new_user = NewUser {
                name: args.name,
                email: args.email,
                password: args.password,
                phone: args.phone,
                role: args.role,
                region: args.region,
                category: args.category,
            };
            let user = api
                .create_user(&new_user)
                .await
                .context("Failed to create user")?;
            output::success("User created");
            output::user(&user);
            Ok(())
        }
        UsersSubcommand::Update(args) => {
            let update = UserUpdate {
                role: args.role,
                region: args.region,
                category: args.category,
                verified: args.verified,
                active: args.active,
                phone: args.phone,
                email: args.email,
            };
            let user = api
                .update_user(&args.id, &update)
                .await
                .context("Failed to update user")?;
            output::success("User updated");
            output::user(&user);
            Ok(())
        }
        UsersSubcommand::Checkins(args) => {
            let checkins = api
                .user_checkins(&args.id)
                .await
                .context("Failed to list check-ins")?;
            output::checkins(&checkins, args.json)
        }
    }
}
