#![allow(dead_code)]

use std::sync::Arc;
use tokengate::server::Server;
use tokengate::settings::{Auth, Environment, Http, Log, Settings, User};

pub fn test_settings() -> Settings {
    Settings {
        environment: Environment::Development,
        auth: Auth {
            issuer: "tokengate".to_string(),
            audience: "tokengate-api".to_string(),
            access_ttl_minutes: 15,
            refresh_ttl_days: 7,
            access_secret: "it-access-secret".to_string(),
            refresh_secret: "it-refresh-secret".to_string(),
            leeway_secs: 0,
        },
        http: Http {
            address: "127.0.0.1:0".to_string(),
        },
        log: Log {
            filter: "debug".to_string(),
        },
        user: User::default(),
    }
}

pub fn test_server() -> Arc<Server> {
    Arc::new(Server::try_new(&test_settings()).expect("server from test settings"))
}
