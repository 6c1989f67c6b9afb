//! # dbready-provision
//!
//! Creates the application database through the server's database manager:
//! - **master_password** — read `admin_passwd` from the server config file
//! - **create** — POST the creation form and classify the response

pub mod create;
pub mod error;
pub mod master_password;

pub use create::{CreateDatabase, CreateOutcome, DatabaseCreator};
pub use error::{ProvisionError, Result};
pub use master_password::read_master_password;
