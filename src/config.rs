use std::net::IpAddr;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub max_body_size: usize,
    pub log_level: String,
    pub did: Option<DidConfig>,
    pub heygen: Option<HeyGenConfig>,
    pub storage: Option<StorageConfig>,
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone)]
pub struct DidConfig {
    /// Basic-auth credential for api.d-id.com.
    pub api_key: String,
    pub api_url: String,
}

#[derive(Debug, Clone)]
pub struct HeyGenConfig {
    pub api_key: String,
    pub api_url: String,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub endpoint_url: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
    pub region: String,
    /// Base of the public URLs the bucket serves objects under. Also the
    /// prefix that marks a URL as owned storage.
    pub public_base_url: String,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let jwt_secret = env_required("JWT_SECRET")?;

        let host: IpAddr = env_or("VOXVID_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid VOXVID_HOST: {e}"))?;

        let port: u16 = env_or("VOXVID_PORT", "8000")
            .parse()
            .map_err(|e| format!("Invalid VOXVID_PORT: {e}"))?;

        // 25 MiB default: source photos and background media arrive inline.
        let max_body_size: usize = env_or("VOXVID_MAX_BODY_SIZE", "26214400")
            .parse()
            .map_err(|e| format!("Invalid VOXVID_MAX_BODY_SIZE: {e}"))?;

        let log_level = env_or("VOXVID_LOG_LEVEL", "info");

        let did = std::env::var("DID_API_KEY").ok().map(|api_key| DidConfig {
            api_key,
            api_url: env_or("DID_API_URL", "https://api.d-id.com"),
        });

        let heygen = std::env::var("HEYGEN_API_KEY")
            .ok()
            .map(|api_key| HeyGenConfig {
                api_key,
                api_url: env_or("HEYGEN_API_URL", "https://api.heygen.com"),
            });

        let storage = match (
            std::env::var("VOXVID_S3_ENDPOINT").ok(),
            std::env::var("VOXVID_S3_ACCESS_KEY_ID").ok(),
            std::env::var("VOXVID_S3_SECRET_ACCESS_KEY").ok(),
            std::env::var("VOXVID_S3_BUCKET").ok(),
        ) {
            (Some(endpoint_url), Some(access_key_id), Some(secret_access_key), Some(bucket)) => {
                let public_base_url = env_or(
                    "VOXVID_S3_PUBLIC_URL",
                    &format!("{}/{}", endpoint_url.trim_end_matches('/'), bucket),
                );
                Some(StorageConfig {
                    endpoint_url,
                    access_key_id,
                    secret_access_key,
                    bucket,
                    region: env_or("VOXVID_S3_REGION", "auto"),
                    public_base_url,
                })
            }
            _ => None,
        };

        let smtp = match (
            std::env::var("VOXVID_SMTP_HOST").ok(),
            std::env::var("VOXVID_SMTP_PORT").ok(),
            std::env::var("VOXVID_SMTP_USER").ok(),
            std::env::var("VOXVID_SMTP_PASS").ok(),
            std::env::var("VOXVID_SMTP_FROM").ok(),
        ) {
            (Some(host), Some(port), Some(user), Some(pass), Some(from)) => Some(SmtpConfig {
                host,
                port: port
                    .parse()
                    .map_err(|e| format!("Invalid VOXVID_SMTP_PORT: {e}"))?,
                user,
                pass,
                from,
            }),
            _ => None,
        };

        Ok(Config {
            database_url,
            jwt_secret,
            host,
            port,
            max_body_size,
            log_level,
            did,
            heygen,
            storage,
            smtp,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
