//! The remote command catalog and each command's required fields.

use std::fmt;
use std::str::FromStr;

/// A required-field rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    /// The named field must be present.
    Field(&'static str),
    /// At least one of the named fields must be present.
    AnyOf(&'static [&'static str]),
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequiredField::Field(name) => f.write_str(name),
            RequiredField::AnyOf(names) => f.write_str(&names.join("|")),
        }
    }
}

use RequiredField::{AnyOf, Field};

/// Every command the API accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    GetBasicInfo,
    GetTxIds,
    GetDepositAddress,
    GetCallbackAddress,
    CreateTransfer,
    Convert,
    GetWithdrawalHistory,
    GetConversionInfo,
    GetPbnInfo,
    GetPbnList,
    UpdatePbnTag,
    ClaimPbnTag,
    GetWithdrawalInfo,
    GetTxInfo,
    GetTxInfoMulti,
    CreateWithdrawal,
    CreateMassWithdrawal,
    CreateTransaction,
    Rates,
    Balances,
}

impl Command {
    pub const ALL: [Command; 20] = [
        Command::GetBasicInfo,
        Command::GetTxIds,
        Command::GetDepositAddress,
        Command::GetCallbackAddress,
        Command::CreateTransfer,
        Command::Convert,
        Command::GetWithdrawalHistory,
        Command::GetConversionInfo,
        Command::GetPbnInfo,
        Command::GetPbnList,
        Command::UpdatePbnTag,
        Command::ClaimPbnTag,
        Command::GetWithdrawalInfo,
        Command::GetTxInfo,
        Command::GetTxInfoMulti,
        Command::CreateWithdrawal,
        Command::CreateMassWithdrawal,
        Command::CreateTransaction,
        Command::Rates,
        Command::Balances,
    ];

    /// The `cmd` value sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::GetBasicInfo => "get_basic_info",
            Command::GetTxIds => "get_tx_ids",
            Command::GetDepositAddress => "get_deposit_address",
            Command::GetCallbackAddress => "get_callback_address",
            Command::CreateTransfer => "create_transfer",
            Command::Convert => "convert",
            Command::GetWithdrawalHistory => "get_withdrawal_history",
            Command::GetConversionInfo => "get_conversion_info",
            Command::GetPbnInfo => "get_pbn_info",
            Command::GetPbnList => "get_pbn_list",
            Command::UpdatePbnTag => "update_pbn_tag",
            Command::ClaimPbnTag => "claim_pbn_tag",
            Command::GetWithdrawalInfo => "get_withdrawal_info",
            Command::GetTxInfo => "get_tx_info",
            Command::GetTxInfoMulti => "get_tx_info_multi",
            Command::CreateWithdrawal => "create_withdrawal",
            Command::CreateMassWithdrawal => "create_mass_withdrawal",
            Command::CreateTransaction => "create_transaction",
            Command::Rates => "rates",
            Command::Balances => "balances",
        }
    }

    /// Fields the caller must supply, checked before `cmd` and `version` are added.
    pub fn required_fields(&self) -> &'static [RequiredField] {
        match self {
            Command::GetBasicInfo
            | Command::GetTxIds
            | Command::GetWithdrawalHistory
            | Command::GetPbnList
            | Command::CreateMassWithdrawal
            | Command::Rates
            | Command::Balances => &[],
            Command::GetDepositAddress | Command::GetCallbackAddress => &[Field("currency")],
            Command::CreateTransfer => &[
                Field("amount"),
                Field("currency"),
                AnyOf(&["merchant", "pbntag"]),
            ],
            Command::Convert => &[Field("amount"), Field("from"), Field("to")],
            Command::GetConversionInfo | Command::GetWithdrawalInfo => &[Field("id")],
            Command::GetPbnInfo => &[Field("pbntag")],
            Command::UpdatePbnTag => &[Field("tagid")],
            Command::ClaimPbnTag => &[Field("tagid"), Field("name")],
            Command::GetTxInfo | Command::GetTxInfoMulti => &[Field("txid")],
            Command::CreateWithdrawal => &[Field("amount"), Field("currency"), Field("address")],
            Command::CreateTransaction => {
                &[Field("amount"), Field("currency1"), Field("currency2")]
            }
        }
    }

    /// Commands for which `auto_confirm=1` is always sent.
    pub fn forces_auto_confirm(&self) -> bool {
        matches!(self, Command::CreateWithdrawal | Command::CreateTransfer)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a command name is not in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCommand(pub String);

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::ALL
            .into_iter()
            .find(|cmd| cmd.as_str() == s)
            .ok_or_else(|| UnknownCommand(s.to_string()))
    }
}

/// Required fields for a command name, or `None` if the name is unknown.
pub fn required_fields(name: &str) -> Option<&'static [RequiredField]> {
    name.parse::<Command>().ok().map(|cmd| cmd.required_fields())
}
