//! Subcommand implementations.

pub mod check_in;
pub mod checkins;
pub mod delete_checkin;
pub mod forgot_password;
pub mod login;
pub mod logout;
pub mod my_checkins;
pub mod refresh_token;
pub mod register;
pub mod report;
pub mod reset_password;
pub mod users;
pub mod verify_email;
pub mod whoami;

use anyhow::Result;

use crate::cli::{Commands, GlobalArgs};

pub async fn handle(global: GlobalArgs, command: Commands) -> Result<()> {
    match command {
        Commands::Login(args) => login::run(&global, args).await,
        Commands::Logout(args) => logout::run(&global, args).await,
        Commands::Whoami(args) => whoami::run(&global, args).await,
        Commands::RefreshToken(args) => refresh_token::run(&global, args).await,
        Commands::Register(args) => register::run(&global, args).await,
        Commands::VerifyEmail(args) => verify_email::run(&global, args).await,
        Commands::ForgotPassword(args) => forgot_password::run(&global, args).await,
        Commands::ResetPassword(args) => reset_password::run(&global, args).await,
        Commands::CheckIn(args) => check_in::run(&global, args).await,
        Commands::MyCheckins(args) => my_checkins::run(&global, args).await,
        Commands::Checkins(args) => checkins::run(&global, args).await,
        Commands::DeleteCheckin(args) => delete_checkin::run(&global, args).await,
        Commands::Report(args) => report::run(&global, args).await,
        Commands::Users(cmd) => users::handle(&global, cmd).await,
    }
}
