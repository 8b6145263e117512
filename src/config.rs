//! Runtime configuration
//!
//! Every setting can be given on the command line or through the matching
//! environment variable.

use crate::session::MissingOrderPolicy;
use crate::shipment::DEFAULT_BATCH_SIZE;
use crate::{DEFAULT_GRPC_PORT, DEFAULT_HTTP_PORT, DEFAULT_STREAM_BUFFER_SIZE};
use anyhow::bail;
use clap::Parser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Http,
    Grpc,
    Dual,
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" => Ok(Mode::Http),
            "grpc" => Ok(Mode::Grpc),
            "dual" => Ok(Mode::Dual),
            _ => Err(format!(
                "Invalid mode: {}. Must be one of: http, grpc, dual",
                s
            )),
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "ordermgmt", version)]
#[command(about = "Order and product management server with gRPC streaming and an HTTP gateway")]
pub struct CliArgs {
    /// Select which server(s) to start
    #[arg(long, env = "MODE", value_name = "MODE", default_value = "grpc")]
    pub mode: Mode,

    /// gRPC listen port
    #[arg(long, env = "GRPC_PORT", default_value_t = DEFAULT_GRPC_PORT)]
    pub grpc_port: u16,

    /// HTTP listen port
    #[arg(long, env = "HTTP_PORT", default_value_t = DEFAULT_HTTP_PORT)]
    pub http_port: u16,

    /// Number of admitted orders between two shipment flushes in
    /// ProcessOrders sessions.
    #[arg(long, env = "ORDER_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Capacity of the channel between a streaming handler and its response
    /// stream.
    #[arg(long, env = "STREAM_BUFFER_SIZE", default_value_t = DEFAULT_STREAM_BUFFER_SIZE)]
    pub stream_buffer_size: usize,

    /// What ProcessOrders does with unknown order ids: abort or skip
    #[arg(long, env = "MISSING_ORDER_POLICY", default_value = "abort")]
    pub missing_order_policy: MissingOrderPolicy,

    /// Load the sample orders 102-106 at startup
    #[arg(long, env = "SEED_SAMPLE_DATA", default_value_t = true, action = clap::ArgAction::Set)]
    pub seed: bool,
}

/// Settings consumed by the order service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceConfig {
    pub batch_size: usize,
    pub stream_buffer_size: usize,
    pub missing_order_policy: MissingOrderPolicy,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            stream_buffer_size: DEFAULT_STREAM_BUFFER_SIZE,
            missing_order_policy: MissingOrderPolicy::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub mode: Mode,
    pub grpc_port: u16,
    pub http_port: u16,
    pub seed: bool,
    pub service: ServiceConfig,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.batch_size == 0 {
            bail!("ORDER_BATCH_SIZE must be greater than 0");
        }

        if args.stream_buffer_size == 0 {
            bail!("STREAM_BUFFER_SIZE must be greater than 0");
        }

        if args.mode == Mode::Dual && args.grpc_port == args.http_port {
            bail!(
                "GRPC_PORT and HTTP_PORT must differ in dual mode (both {})",
                args.grpc_port
            );
        }

        Ok(Self {
            mode: args.mode,
            grpc_port: args.grpc_port,
            http_port: args.http_port,
            seed: args.seed,
            service: ServiceConfig {
                batch_size: args.batch_size,
                stream_buffer_size: args.stream_buffer_size,
                missing_order_policy: args.missing_order_policy,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("ordermgmt").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("http".parse::<Mode>().unwrap(), Mode::Http);
        assert_eq!("grpc".parse::<Mode>().unwrap(), Mode::Grpc);
        assert_eq!("dual".parse::<Mode>().unwrap(), Mode::Dual);
        assert!("invalid".parse::<Mode>().is_err());
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::try_from(parse(&[])).unwrap();
        assert_eq!(config.mode, Mode::Grpc);
        assert_eq!(config.grpc_port, DEFAULT_GRPC_PORT);
        assert!(config.seed);
        assert_eq!(config.service, ServiceConfig::default());
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = ServerConfig::try_from(parse(&[
            "--mode",
            "dual",
            "--batch-size",
            "5",
            "--missing-order-policy",
            "skip",
            "--seed",
            "false",
        ]))
        .unwrap();
        assert_eq!(config.mode, Mode::Dual);
        assert_eq!(config.service.batch_size, 5);
        assert_eq!(config.service.missing_order_policy, MissingOrderPolicy::Skip);
        assert!(!config.seed);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        assert!(ServerConfig::try_from(parse(&["--batch-size", "0"])).is_err());
    }

    #[test]
    fn test_dual_mode_port_clash_rejected() {
        let args = parse(&["--mode", "dual", "--grpc-port", "4000", "--http-port", "4000"]);
        assert!(ServerConfig::try_from(args).is_err());
    }
}
