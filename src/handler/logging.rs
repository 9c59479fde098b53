use axum::{
    extract::{ConnectInfo, Request},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Store request information
#[derive(Debug)]
pub struct RequestInfo {
    pub method: String,
    pub uri: String,
    pub remote_addr: Option<SocketAddr>,
    pub user_agent: Option<String>,
    pub content_length: Option<u64>,
}

impl RequestInfo {
    pub fn from_request(req: &Request) -> Self {
        let headers = req.headers();

        Self {
            method: req.method().to_string(),
            uri: req.uri().to_string(),
            remote_addr: req
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ci| ci.0),
            user_agent: headers
                .get("user-agent")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string()),
            content_length: headers
                .get("content-length")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok()),
        }
    }
}

/// Logs every request once it has been answered, at a level picked from
/// the status class: 2xx/3xx info, 4xx warn, 5xx error.
pub async fn request_logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_info = RequestInfo::from_request(&req);

    debug!(
        method = %request_info.method,
        uri = %request_info.uri,
        remote_addr = ?request_info.remote_addr,
        user_agent = ?request_info.user_agent,
        "Incoming request"
    );

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status().as_u16();
    let RequestInfo {
        method,
        uri,
        remote_addr,
        user_agent,
        content_length,
    } = request_info;

    match status {
        200..=399 => {
            info!(
                method = %method,
                uri = %uri,
                status = %status,
                duration_ms = %duration.as_millis(),
                remote_addr = ?remote_addr,
                content_length = ?content_length,
                "Request completed"
            );
        }
        // Client error, not ours to fix.
        400..=499 => {
            warn!(
                method = %method,
                uri = %uri,
                status = %status,
                duration_ms = %duration.as_millis(),
                remote_addr = ?remote_addr,
                user_agent = ?user_agent,
                "Client error"
            );
        }
        500..=599 => {
            error!(
                method = %method,
                uri = %uri,
                status = %status,
                duration_ms = %duration.as_millis(),
                remote_addr = ?remote_addr,
                user_agent = ?user_agent,
                "Server error occurred"
            );
        }
        _ => {
            debug!(
                method = %method,
                uri = %uri,
                status = %status,
                duration_ms = %duration.as_millis(),
                "Request completed with unusual status"
            );
        }
    }

    response
}

/// Config log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// INFO and above
    #[default]
    Info,
    /// Everything down to DEBUG
    Debug,
    /// Only ERROR
    Error,
    /// Only ERROR, tower_http silenced
    Critical,
}

impl LogLevel {
    pub fn to_filter_string(&self) -> String {
        match self {
            LogLevel::Info => "hbnb=info,tower_http=info".to_string(),
            LogLevel::Debug => "hbnb=debug,tower_http=debug".to_string(),
            LogLevel::Error => "hbnb=error,tower_http=error".to_string(),
            LogLevel::Critical => "hbnb=error,tower_http=off".to_string(),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "error" => Ok(LogLevel::Error),
            "critical" => Ok(LogLevel::Critical),
            other => Err(format!(
                "unknown log level '{other}' (expected info, debug, error or critical)"
            )),
        }
    }
}

/// Initialize logging system with specified level. `RUST_LOG` wins when set.
pub fn init_logging(log_level: LogLevel) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_filter_string()));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    info!("Logging initialized with level: {:?}", log_level);
}
