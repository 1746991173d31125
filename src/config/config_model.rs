#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub server: Server,
}

#[derive(Debug, Clone)]
pub struct Server {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct IdentitySecret {
    pub jwt_secret: String,
}

#[derive(Debug, Clone)]
pub struct BillingWebhookSecret {
    pub secret: String,
}
