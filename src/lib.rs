//! Account signup, login and session-gated access for a small members site.

pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod state;

pub mod crypto {
    pub mod password;
    pub mod session_cipher;
    pub mod token;
}

pub mod models {
    pub mod session;
    pub mod user;
}

pub mod repositories {
    pub mod memory;
    pub mod session;
    pub mod user;
}

pub mod services {
    pub mod access;
    pub mod auth;
    pub mod session;
}

pub mod handlers {
    pub mod auth;
    pub mod members;
}

pub mod middleware_layer {
    pub mod auth;
}

pub mod validation {
    pub mod auth;
}
