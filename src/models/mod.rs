// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod token;
pub mod user;

pub use token::{RefreshToken, TokenPair};
pub use user::{PrivateProfile, PublicProfile, User, UserUpdate};
