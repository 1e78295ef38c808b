//! Per-request lookup workflows shared by the HTTP handlers.
//!
//! Each workflow:
//! 1. Validates the query (no outbound call on invalid input)
//! 2. Fetches the upstream report
//! 3. Parses it into records
//! 4. Completes missing data (CPF lookups only)
//! 5. Schedules the webhook notification

use crate::errors::{AppError, ResultExt};
use crate::handlers::AppState;
use crate::lookup_client::LookupKind;
use crate::models::{PersonRecord, PhoneRecord};
use crate::notifier::LookupNotification;
use crate::report_parser::{parse_name_report, parse_person_report, parse_phone_report};
use crate::validation::{validate_cpf_query, validate_name_query, validate_phone_query};

/// CPF lookup: person report, completed with the first phone registered to
/// the CPF when the report has none.
pub async fn consult_cpf(state: &AppState, query: Option<&str>) -> Result<PersonRecord, AppError> {
    let cpf = validate_cpf_query(query)?;

    tracing::info!("Starting CPF lookup");
    let report = state
        .lookup_client
        .consult_cpf(&cpf)
        .await
        .context("CPF lookup")?;

    let mut record = parse_person_report(&report);
    if record.tax_id.is_none() {
        record.tax_id = Some(cpf.clone());
    }

    if record.phone.is_none() && state.config.phone_enrichment {
        complete_phone(state, &cpf, &mut record).await;
    }

    tracing::info!(
        "✓ CPF lookup finished (name found: {}, phone found: {})",
        record.name.is_some(),
        record.phone.is_some()
    );

    notify(
        state,
        LookupNotification::Person {
            kind: LookupKind::Cpf,
            query: cpf,
            record: record.clone(),
        },
    );

    Ok(record)
}

/// Fills phone and carrier from the phones-by-CPF lookup. Failures only warn.
async fn complete_phone(state: &AppState, cpf: &str, record: &mut PersonRecord) {
    let report = match state.lookup_client.consult_phones_by_cpf(cpf).await {
        Ok(report) => report,
        Err(e) => {
            tracing::warn!("⚠️ Supplementary phone lookup failed, continuing: {}", e);
            return;
        }
    };

    match parse_phone_report(&report).into_iter().next() {
        Some(phone) => {
            tracing::debug!("Phone completed from supplementary lookup");
            record.phone = phone.number;
            if phone.carrier.is_some() {
                record.carrier = phone.carrier;
            }
        }
        None => tracing::debug!("Supplementary lookup returned no phone"),
    }
}

/// Phone lookup: every line listed for the number, with its owner.
pub async fn consult_phone(
    state: &AppState,
    query: Option<&str>,
) -> Result<Vec<PhoneRecord>, AppError> {
    let phone = validate_phone_query(query)?;

    tracing::info!("Starting phone lookup");
    let report = state
        .lookup_client
        .consult_phone(&phone)
        .await
        .context("Phone lookup")?;

    let records = parse_phone_report(&report);
    tracing::info!("✓ Phone lookup finished ({} records)", records.len());

    notify(
        state,
        LookupNotification::Phones {
            query: phone,
            records: records.clone(),
        },
    );

    Ok(records)
}

/// Full-name lookup.
pub async fn consult_name(state: &AppState, query: Option<&str>) -> Result<PersonRecord, AppError> {
    let name = validate_name_query(query)?;

    tracing::info!("Starting name lookup");
    let report = state
        .lookup_client
        .consult_name(&name)
        .await
        .context("Name lookup")?;

    let record = parse_name_report(&report);
    tracing::info!("✓ Name lookup finished (CPF found: {})", record.tax_id.is_some());

    notify(
        state,
        LookupNotification::Person {
            kind: LookupKind::Name,
            query: name,
            record: record.clone(),
        },
    );

    Ok(record)
}

fn notify(state: &AppState, notification: LookupNotification) {
    match &state.notifier {
        Some(notifier) => {
            notifier.dispatch(notification);
        }
        None => tracing::debug!("Webhook not configured, skipping notification"),
    }
}
