//! Required-field validation for outgoing requests.

use crate::commands::catalog::RequiredField;
use crate::commands::params::Params;
use crate::error::MissingFields;

/// Check `params` against a command's required fields.
///
/// Collects every missing field and every alternative group with no member
/// present; a group passes as soon as one of its members is supplied.
pub fn validate(params: &Params, required: &[RequiredField]) -> Result<(), MissingFields> {
    let fields: Vec<String> = required
        .iter()
        .filter(|rule| !is_satisfied(params, rule))
        .map(ToString::to_string)
        .collect();

    if fields.is_empty() {
        Ok(())
    } else {
        Err(MissingFields { fields })
    }
}

fn is_satisfied(params: &Params, rule: &RequiredField) -> bool {
    match rule {
        RequiredField::Field(name) => params.contains(name),
        RequiredField::AnyOf(names) => names.iter().any(|name| params.contains(name)),
    }
}
