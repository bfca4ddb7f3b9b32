//! CLI argument definitions.

use clap::{Args, Parser, Subcommand};

use crate::commands::{
    check_in, checkins, delete_checkin, forgot_password, login, logout, my_checkins,
    refresh_token, register, report, reset_password, users, verify_email, whoami,
};

/// Backend used when neither `--api-url` nor a stored session names one.
pub const DEFAULT_API_URL: &str = "http://localhost:3001";

/// Field check-in command-line client.
#[derive(Parser, Debug)]
#[command(name = "checkin")]
#[command(author, version = env!("CHECKIN_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Connection options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Backend base URL [default: stored session URL, then http://localhost:3001]
    #[arg(long, env = "CHECKIN_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "CHECKIN_TIMEOUT_SECS", global = true)]
    pub timeout_secs: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the session
    Login(login::LoginArgs),

    /// Log out and forget the stored session
    Logout(logout::LogoutArgs),

    /// Display the logged-in user
    Whoami(whoami::WhoamiArgs),

    /// Refresh the access token now
    RefreshToken(refresh_token::RefreshTokenArgs),

    /// Create an account (requires email verification)
    Register(register::RegisterArgs),

    /// Confirm an email address with the token from the verification link
    VerifyEmail(verify_email::VerifyEmailArgs),

    /// Email a password reset link
    ForgotPassword(forgot_password::ForgotPasswordArgs),

    /// Set a new password with the token from the reset link
    ResetPassword(reset_password::ResetPasswordArgs),

    /// Record a visit
    CheckIn(check_in::CheckInArgs),

    /// List your own check-ins
    MyCheckins(my_checkins::MyCheckinsArgs),

    /// List every rep's check-ins (supervisor or admin)
    Checkins(checkins::CheckinsArgs),

    /// Delete a check-in (admin)
    DeleteCheckin(delete_checkin::DeleteCheckinArgs),

    /// Summarise check-ins over a date range (supervisor or admin)
    Report(report::ReportArgs),

    /// Manage users (admin)
    Users(users::UsersCommand),
}
