use jsonwebtoken::Algorithm;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub expire_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: String,
    pub database_url: String,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "local".to_string());

        // The environment selects the database; DATABASE_URL works as a fallback.
        let url_var = if environment == "production" {
            "PROD_DATABASE_URL"
        } else {
            "LOCAL_DATABASE_URL"
        };
        let database_url = std::env::var(url_var)
            .or_else(|_| std::env::var("DATABASE_URL"))
            .map_err(|_| anyhow::anyhow!("{} or DATABASE_URL must be set", url_var))?;

        // Token signing fails closed: no secret, no server.
        let secret = std::env::var("SECRET_KEY")
            .map_err(|_| anyhow::anyhow!("SECRET_KEY must be set"))?;
        let algorithm = std::env::var("ALGORITHM")
            .unwrap_or_else(|_| "HS256".to_string())
            .parse::<Algorithm>()
            .map_err(|_| anyhow::anyhow!("ALGORITHM is not a recognized JWT algorithm"))?;
        let expire_minutes = std::env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(30);

        Ok(Self {
            environment,
            database_url,
            jwt: JwtConfig {
                secret,
                algorithm,
                expire_minutes,
            },
        })
    }
}
