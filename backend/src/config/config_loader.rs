use anyhow::{Ok, Result};

use super::config_model::{AuthSecret, Database, DotEnvyConfig, Mail, Paystack, Server};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let server = Server {
        port: std::env::var("SERVER_PORT")
            .expect("SERVER_PORT is invalid")
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .expect("SERVER_BODY_LIMIT is invalid")
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .expect("SERVER_TIMEOUT is invalid")
            .parse()?,
    };

    let database = Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
    };

    let paystack = Paystack {
        secret_key: std::env::var("PAYSTACK_SECRET_KEY").expect("PAYSTACK_SECRET_KEY is invalid"),
        public_key: std::env::var("PAYSTACK_PUBLIC_KEY").expect("PAYSTACK_PUBLIC_KEY is invalid"),
    };

    let mail = Mail {
        server: std::env::var("MAIL_SERVER").expect("MAIL_SERVER is invalid"),
        port: std::env::var("MAIL_PORT")
            .expect("MAIL_PORT is invalid")
            .parse()?,
        username: std::env::var("MAIL_USERNAME").expect("MAIL_USERNAME is invalid"),
        password: std::env::var("MAIL_PASSWORD").expect("MAIL_PASSWORD is invalid"),
        from_address: std::env::var("MAIL_FROM")
            .unwrap_or_else(|_| "noreply@localhost".to_string()),
        contact_email: std::env::var("CONTACT_EMAIL").expect("CONTACT_EMAIL is invalid"),
    };

    let base_url =
        std::env::var("BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string());

    Ok(DotEnvyConfig {
        server,
        database,
        paystack,
        mail,
        base_url,
    })
}

pub fn get_auth_secret() -> Result<AuthSecret> {
    dotenvy::dotenv().ok();

    Ok(AuthSecret {
        jwt_secret: std::env::var("JWT_USER_SECRET").expect("JWT_USER_SECRET is invalid"),
        token_ttl_hours: std::env::var("JWT_TOKEN_TTL_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse()?,
    })
}
