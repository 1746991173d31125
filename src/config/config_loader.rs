use anyhow::{Ok, Result};

use super::config_model::{BillingWebhookSecret, DotEnvyConfig, IdentitySecret, Server};

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

    Ok(DotEnvyConfig { server })
}

pub fn get_identity_secret() -> Result<IdentitySecret> {
    dotenvy::dotenv().ok();

    Ok(IdentitySecret {
        jwt_secret: std::env::var("IDENTITY_JWT_SECRET").expect("IDENTITY_JWT_SECRET is invalid"),
    })
}

pub fn get_billing_webhook_secret() -> Result<BillingWebhookSecret> {
    dotenvy::dotenv().ok();

    Ok(BillingWebhookSecret {
        secret: std::env::var("BILLING_WEBHOOK_SECRET")
            .expect("BILLING_WEBHOOK_SECRET is invalid"),
    })
}
