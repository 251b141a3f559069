// SPDX-License-Identifier: MIT

//! TrackGeek backend: multi-provider login (email magic link, Google,
//! Discord, GitHub) and profile/media management.

pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::Db;
use services::oauth::{DiscordProvider, GithubProvider, GoogleProvider};
use services::{AuthService, ImageService, Mailer, UserService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Db,
    pub users: UserService,
    pub auth: AuthService,
    pub google: GoogleProvider,
    pub discord: DiscordProvider,
    pub github: GithubProvider,
}

impl AppState {
    /// Wire up all services from a config and database handle.
    pub fn new(config: Config, db: Db) -> Self {
        let images = ImageService::new(config.imgbb_api_key.clone());
        let users = UserService::new(db.clone(), images);
        let mailer = Mailer::new(config.resend_api_key.clone(), config.email_from.clone());

        let auth = AuthService::new(
            db.clone(),
            users.clone(),
            mailer,
            config.api_url.clone(),
            config.jwt_access_secret.clone(),
            config.jwt_refresh_secret.clone(),
            config.jwt_email_secret.clone(),
        );

        Self {
            google: GoogleProvider::new(config.google.clone()),
            discord: DiscordProvider::new(config.discord.clone()),
            github: GithubProvider::new(config.github.clone()),
            config,
            db,
            users,
            auth,
        }
    }
}
