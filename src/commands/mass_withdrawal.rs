//! Field layout for `create_mass_withdrawal`.
//!
//! Each complete entry `n` (1-indexed, counted after incomplete entries are
//! dropped) becomes three fields: `wd[wd{n}][amount]`, `wd[wd{n}][address]`
//! and `wd[wd{n}][currency]`.

use crate::commands::params::Params;

const SUB_FIELDS: [&str; 3] = ["amount", "address", "currency"];

/// One withdrawal inside a mass withdrawal request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WithdrawalEntry {
    pub amount: Option<String>,
    pub address: Option<String>,
    pub currency: Option<String>,
}

impl WithdrawalEntry {
    pub fn new(amount: impl ToString, address: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            amount: Some(amount.to_string()),
            address: Some(address.into()),
            currency: Some(currency.into()),
        }
    }

    /// Amount, address and currency, if all three are present and non-empty.
    fn complete(&self) -> Option<[&str; 3]> {
        Some([
            non_empty(&self.amount)?,
            non_empty(&self.address)?,
            non_empty(&self.currency)?,
        ])
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|v| !v.is_empty())
}

fn field_name(index: usize, sub_field: &str) -> String {
    format!("wd[wd{index}][{sub_field}]")
}

/// Encode the complete entries. Returns empty params when none are complete.
pub fn encode(entries: &[WithdrawalEntry]) -> Params {
    let mut params = Params::new();
    for (i, values) in entries.iter().filter_map(WithdrawalEntry::complete).enumerate() {
        for (sub_field, value) in SUB_FIELDS.iter().zip(values) {
            params.insert(field_name(i + 1, sub_field), value);
        }
    }
    params
}

/// Recover entries from encoded params, in index order.
///
/// Decoding stops at the first index with no fields at all.
pub fn decode(params: &Params) -> Vec<WithdrawalEntry> {
    let mut entries = Vec::new();
    for index in 1.. {
        let [amount, address, currency] =
            SUB_FIELDS.map(|sub_field| params.get(&field_name(index, sub_field)).map(str::to_string));
        if amount.is_none() && address.is_none() && currency.is_none() {
            break;
        }
        entries.push(WithdrawalEntry {
            amount,
            address,
            currency,
        });
    }
    entries
}
