// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod auth;
pub mod images;
pub mod mailer;
pub mod oauth;
pub mod user;

pub use auth::AuthService;
pub use images::ImageService;
pub use mailer::Mailer;
pub use user::UserService;
