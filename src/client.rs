//! The client facade: one method per API command.
//!
//! Option-bag commands take [`Params`] so any optional API field can be
//! passed through; commands with a single argument take it directly.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::broadcast;

use crate::api::Dispatcher;
use crate::auth::Credentials;
use crate::commands::catalog::UnknownCommand;
use crate::commands::{mass_withdrawal, Command, Params, WithdrawalEntry};
use crate::config::validation::{validate_config, ValidationError};
use crate::config::{ClientConfig, TrackingConfig};
use crate::error::{ClientError, ClientResult};
use crate::tracking::{ClientEvent, EventBus, Poller};

/// Client for the CoinPayments v1 API.
///
/// Each instance owns its signer, transaction tracker, poller and event
/// channel. Dropping the client stops its poller.
#[derive(Debug)]
pub struct CoinPayments {
    dispatcher: Arc<Dispatcher>,
    poller: Poller,
    events: EventBus,
    tracking: TrackingConfig,
}

impl CoinPayments {
    /// Client with default settings (auto-tracking off, 30 s interval).
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> ClientResult<Self> {
        let mut config = ClientConfig::default();
        config.credentials.key = key.into();
        config.credentials.secret = secret.into();
        Self::from_config(config)
    }

    /// Client from a full configuration.
    ///
    /// Fails with [`ClientError::MissingCredentials`] if key or secret is
    /// empty, and with [`ClientError::Config`] for any other invalid setting.
    pub fn from_config(config: ClientConfig) -> ClientResult<Self> {
        if let Err(errors) = validate_config(&config) {
            let missing_credentials = errors
                .iter()
                .any(|e| matches!(e, ValidationError::EmptyKey | ValidationError::EmptySecret));
            return Err(if missing_credentials {
                ClientError::MissingCredentials
            } else {
                ClientError::Config(errors)
            });
        }
        let credentials = Credentials::new(config.credentials.key, config.credentials.secret);

        let dispatcher = Arc::new(Dispatcher::new(credentials, &config.api)?);
        let events = EventBus::new(config.tracking.event_capacity);
        let poller = Poller::new(
            Arc::clone(&dispatcher),
            events.clone(),
            Duration::from_secs(config.tracking.poll_interval_secs),
        );

        tracing::debug!(
            endpoint = %dispatcher.endpoint(),
            auto_track = config.tracking.auto_track,
            "Client created"
        );

        Ok(Self {
            dispatcher,
            poller,
            events,
            tracking: config.tracking,
        })
    }

    /// Subscribe to client events. Drop the receiver to unsubscribe.
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub fn tracking_config(&self) -> &TrackingConfig {
        &self.tracking
    }

    /// True while the status poller is running.
    pub fn is_polling(&self) -> bool {
        self.poller.is_polling()
    }

    /// Tracked transaction ids, oldest first.
    pub fn pending_transactions(&self) -> Vec<String> {
        self.poller.pending()
    }

    /// Track a transaction's status until it is terminal.
    ///
    /// Returns false if the id was already tracked. Fails with
    /// [`ClientError::NoRuntime`] outside a Tokio runtime.
    pub fn track(&self, txn_id: impl Into<String>) -> ClientResult<bool> {
        self.poller.track(txn_id)
    }

    /// Stop tracking a transaction.
    pub fn untrack(&self, txn_id: &str) -> bool {
        self.poller.untrack(txn_id)
    }

    /// Send any catalog command by name.
    pub async fn request(&self, cmd: &str, params: Params) -> ClientResult<Value> {
        let command = cmd
            .parse::<Command>()
            .map_err(|UnknownCommand(name)| ClientError::UnknownCommand(name))?;
        self.dispatch(command, params).await
    }

    async fn dispatch(&self, command: Command, mut params: Params) -> ClientResult<Value> {
        if command.forces_auto_confirm() {
            params.insert("auto_confirm", 1);
        }

        let result = self.dispatcher.send(command, &params).await?;

        if command == Command::CreateTransaction && self.tracking.auto_track {
            match result.get("txn_id").and_then(Value::as_str) {
                Some(txn_id) => {
                    self.poller.track(txn_id)?;
                }
                None => tracing::warn!("create_transaction result has no txn_id; not tracking"),
            }
        }
        Ok(result)
    }

    /// `create_transaction`: requires `amount`, `currency1`, `currency2`.
    pub async fn create_transaction(&self, params: Params) -> ClientResult<Value> {
        self.dispatch(Command::CreateTransaction, params).await
    }

    /// `rates`; optional `short`, `accepted`.
    pub async fn rates(&self, params: Params) -> ClientResult<Value> {
        self.dispatch(Command::Rates, params).await
    }

    /// `balances`; optional `all`.
    pub async fn balances(&self, params: Params) -> ClientResult<Value> {
        self.dispatch(Command::Balances, params).await
    }

    /// `create_withdrawal` with `auto_confirm=1`: requires `amount`, `currency`, `address`.
    pub async fn create_withdrawal(&self, params: Params) -> ClientResult<Value> {
        self.dispatch(Command::CreateWithdrawal, params).await
    }

    /// `create_mass_withdrawal`. Entries missing amount, address or currency
    /// are skipped; with none left this returns `[]` without a network call.
    pub async fn create_mass_withdrawal(&self, entries: &[WithdrawalEntry]) -> ClientResult<Value> {
        let params = mass_withdrawal::encode(entries);
        if params.is_empty() {
            tracing::debug!("No complete withdrawal entries; skipping request");
            return Ok(Value::Array(Vec::new()));
        }
        self.dispatch(Command::CreateMassWithdrawal, params).await
    }

    /// `get_tx_info` for one transaction.
    pub async fn get_tx(&self, txid: &str) -> ClientResult<Value> {
        self.dispatch(Command::GetTxInfo, Params::new().with("txid", txid)).await
    }

    /// `get_tx_info_multi` for several transactions in one call.
    pub async fn get_tx_multi<S: AsRef<str>>(&self, txids: &[S]) -> ClientResult<Value> {
        let joined = txids.iter().map(|id| id.as_ref()).collect::<Vec<&str>>().join("|");
        self.dispatch(Command::GetTxInfoMulti, Params::new().with("txid", joined)).await
    }

    /// `get_tx_ids`; optional `limit`, `start`, `newer`, `all`.
    pub async fn get_tx_list(&self, params: Params) -> ClientResult<Value> {
        self.dispatch(Command::GetTxIds, params).await
    }

    pub async fn get_withdrawal_info(&self, id: &str) -> ClientResult<Value> {
        self.dispatch(Command::GetWithdrawalInfo, Params::new().with("id", id)).await
    }

    pub async fn get_basic_info(&self) -> ClientResult<Value> {
        self.dispatch(Command::GetBasicInfo, Params::new()).await
    }

    pub async fn get_deposit_address(&self, currency: &str) -> ClientResult<Value> {
        self.dispatch(Command::GetDepositAddress, Params::new().with("currency", currency))
            .await
    }

    pub async fn get_callback_address(&self, currency: &str) -> ClientResult<Value> {
        self.dispatch(Command::GetCallbackAddress, Params::new().with("currency", currency))
            .await
    }

    /// `create_transfer` with `auto_confirm=1`: requires `amount`, `currency`
    /// and one of `merchant` or `pbntag`.
    pub async fn create_transfer(&self, params: Params) -> ClientResult<Value> {
        self.dispatch(Command::CreateTransfer, params).await
    }

    /// `convert`: requires `amount`, `from`, `to`.
    pub async fn convert_coins(&self, params: Params) -> ClientResult<Value> {
        self.dispatch(Command::Convert, params).await
    }

    /// `get_withdrawal_history`; optional `limit`, `start`, `newer`.
    pub async fn get_withdrawal_history(&self, params: Params) -> ClientResult<Value> {
        self.dispatch(Command::GetWithdrawalHistory, params).await
    }

    pub async fn get_conversion_info(&self, id: &str) -> ClientResult<Value> {
        self.dispatch(Command::GetConversionInfo, Params::new().with("id", id)).await
    }

    /// `get_pbn_info` for a $PayByName tag.
    pub async fn get_profile(&self, pbntag: &str) -> ClientResult<Value> {
        self.dispatch(Command::GetPbnInfo, Params::new().with("pbntag", pbntag)).await
    }

    /// `get_pbn_list`.
    pub async fn tag_list(&self) -> ClientResult<Value> {
        self.dispatch(Command::GetPbnList, Params::new()).await
    }

    /// `update_pbn_tag`: requires `tagid`.
    pub async fn update_tag_profile(&self, params: Params) -> ClientResult<Value> {
        self.dispatch(Command::UpdatePbnTag, params).await
    }

    /// `claim_pbn_tag`: requires `tagid`, `name`.
    pub async fn claim_tag(&self, params: Params) -> ClientResult<Value> {
        self.dispatch(Command::ClaimPbnTag, params).await
    }
}
