use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{InvokeArgs, InvokeOutcome, SourceAccount};
use crate::keys::{public_key_from_secret, KeyError};
use crate::ports::{PortError, SignAndSubmit, Signer, SorobanServer, TransactionBuilder};
use crate::retry::{simulate_with_retry, RetryExhausted, RetryPolicy};
use crate::session::WalletSessionManager;
use crate::state::ConnectionState;

#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("no wallet address connected")]
    NoAddress,
    #[error("failed to fetch source account {account}: {source}")]
    AccountFetchFailed { account: String, source: PortError },
    #[error(transparent)]
    InvalidSecretKey(#[from] KeyError),
    #[error("transaction build failed: {0}")]
    Build(PortError),
    #[error(transparent)]
    RetryExhausted(#[from] RetryExhausted),
    #[error("simulation failed: {0}")]
    SimulationFailed(String),
    #[error("simulation succeeded without a result")]
    InvalidSimulation,
    #[error("submission failed: {0}")]
    Submit(PortError),
}

/// Runs contract calls against the session's active network: resolve the
/// source account, build, simulate, then either return the simulated value
/// or hand the transaction to the submitter.
pub struct Invoker {
    session: Arc<WalletSessionManager>,
    builder: Arc<dyn TransactionBuilder>,
    submitter: Arc<dyn SignAndSubmit>,
    retry: RetryPolicy,
}

impl Invoker {
    pub fn new(
        session: Arc<WalletSessionManager>,
        builder: Arc<dyn TransactionBuilder>,
        submitter: Arc<dyn SignAndSubmit>,
    ) -> Self {
        Self {
            session,
            builder,
            submitter,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[tracing::instrument(
        skip(self, args),
        fields(contract = %args.contract_address, method = %args.method, sign_and_send = args.sign_and_send)
    )]
    pub async fn invoke(&self, args: InvokeArgs) -> Result<InvokeOutcome, InvokeError> {
        let state = self.session.state();
        let binding = state.binding().clone();
        let soroban = binding.soroban().as_ref();

        let (source, signer) = resolve_source(&state, soroban, &args).await?;
        debug!(source = %source.account_id, sequence = source.sequence, "source account resolved");

        let tx = self
            .builder
            .build(
                &source,
                binding.network(),
                &args.contract_address,
                &args.method,
                &args.args,
                args.fee,
            )
            .map_err(InvokeError::Build)?;

        let simulation = simulate_with_retry(soroban, &tx, self.retry).await?;
        if let Some(error) = simulation.error {
            return Err(InvokeError::SimulationFailed(error));
        }
        let value = simulation.result.ok_or(InvokeError::InvalidSimulation)?;

        let Some(signer) = signer else {
            return Ok(InvokeOutcome::Simulated(value));
        };

        let submission = self
            .submitter
            .submit(&tx, &signer, soroban, args.timeout_seconds)
            .await
            .map_err(InvokeError::Submit)?;
        info!(hash = %submission.hash, status = ?submission.status, "transaction submitted");

        if args.reconnect_after_tx {
            if let Err(e) = self.session.connect().await {
                warn!(error = %e, "reconnect after transaction failed");
            }
        }

        Ok(InvokeOutcome::Submitted(submission))
    }
}

async fn resolve_source(
    state: &ConnectionState,
    soroban: &dyn SorobanServer,
    args: &InvokeArgs,
) -> Result<(SourceAccount, Option<Signer>), InvokeError> {
    if !args.sign_and_send {
        return Ok((SourceAccount::placeholder(), None));
    }

    let (account, signer) = match &args.secret_key {
        Some(secret) => (
            public_key_from_secret(secret)?,
            Signer::SecretKey(secret.clone()),
        ),
        None => {
            let wallet = state.wallet().ok_or(InvokeError::NoAddress)?;
            let address = wallet.address.clone().ok_or(InvokeError::NoAddress)?;
            (
                address.clone(),
                Signer::Wallet {
                    address,
                    kit: Arc::clone(&wallet.kit),
                },
            )
        }
    };

    let source = soroban
        .get_account(&account)
        .await
        .map_err(|source| InvokeError::AccountFetchFailed {
            account: account.clone(),
            source,
        })?;
    Ok((source, Some(signer)))
}
