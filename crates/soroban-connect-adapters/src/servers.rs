use std::sync::Arc;
use std::time::Duration;

use soroban_connect_core::{
    HorizonServer, NetworkDetails, PortError, ServerFactory, SorobanServer,
};

use crate::{ConnectConfig, HorizonClient, SorobanRpcClient};

/// Builds HTTP-backed server handles for a network binding.
#[derive(Debug, Clone)]
pub struct HttpServerFactory {
    timeout: Duration,
}

impl HttpServerFactory {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn with_config(config: &ConnectConfig) -> Self {
        Self::new(config.request_timeout())
    }
}

impl ServerFactory for HttpServerFactory {
    fn soroban(&self, details: &NetworkDetails) -> Result<Arc<dyn SorobanServer>, PortError> {
        Ok(Arc::new(SorobanRpcClient::new(
            details.soroban_rpc_url.clone(),
            self.timeout,
        )?))
    }

    fn horizon(&self, details: &NetworkDetails) -> Result<Arc<dyn HorizonServer>, PortError> {
        Ok(Arc::new(HorizonClient::new(
            details.horizon_url.clone(),
            self.timeout,
        )?))
    }
}
