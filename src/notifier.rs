//! Chat webhook notifications for completed lookups.
//!
//! The payload follows the Discord webhook format (`username` + `embeds`).
//! Notifications are best effort: [`WebhookNotifier::dispatch`] runs the
//! delivery on a detached task and only logs failures.

use crate::config::{redact_url, Config};
use crate::errors::AppError;
use crate::lookup_client::LookupKind;
use crate::models::{PersonRecord, PhoneRecord};
use crate::validation::format_cpf;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const PLACEHOLDER: &str = "N/A";
/// Discord rejects embed field values longer than this.
const MAX_FIELD_CHARS: usize = 1024;
const EMBED_COLOR: u32 = 5_763_719;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookMessage {
    pub username: String,
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    pub footer: EmbedFooter,
    /// RFC 3339 timestamp of the lookup.
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedFooter {
    pub text: String,
}

fn field(name: &str, value: Option<&str>, inline: bool) -> EmbedField {
    let value = value.filter(|v| !v.trim().is_empty()).unwrap_or(PLACEHOLDER);
    EmbedField {
        name: name.to_string(),
        value: value.chars().take(MAX_FIELD_CHARS).collect(),
        inline,
    }
}

/// One completed lookup, as reported to the webhook.
#[derive(Debug, Clone)]
pub enum LookupNotification {
    /// CPF or name lookup.
    Person {
        kind: LookupKind,
        query: String,
        record: PersonRecord,
    },
    /// Phone lookup.
    Phones {
        query: String,
        records: Vec<PhoneRecord>,
    },
}

impl LookupNotification {
    /// Builds the webhook payload. `now` is the lookup time.
    pub fn to_message(&self, username: &str, now: DateTime<Local>) -> WebhookMessage {
        let queried_at = now.format("%H:%M:%S - %d/%m/%Y").to_string();

        let (title, description, mut fields) = match self {
            LookupNotification::Person {
                kind: LookupKind::Name,
                query,
                record,
            } => (
                "✅ Nova Consulta por Nome",
                "Uma nova consulta de nome foi registrada no sistema",
                vec![
                    field("🔎 Nome consultado", Some(query.as_str()), false),
                    field("👤 Nome", record.name.as_deref(), false),
                    field(
                        "🆔 CPF",
                        record.tax_id.as_deref().map(format_cpf).as_deref(),
                        false,
                    ),
                    field("📅 Data de Nascimento", record.birth_date.as_deref(), true),
                    field("🎂 Idade", record.age.as_deref(), true),
                    field("👪 Mãe", record.mother_name.as_deref(), true),
                ],
            ),
            LookupNotification::Person { query, record, .. } => {
                let phone = format!(
                    "{} ({})",
                    record.phone.as_deref().unwrap_or(PLACEHOLDER),
                    record.carrier.as_deref().unwrap_or(PLACEHOLDER)
                );
                let cpf = record.tax_id.as_deref().unwrap_or(query);
                (
                    "✅ Nova Consulta Realizada",
                    "Uma nova consulta de CPF foi registrada no sistema",
                    vec![
                        field("👤 Nome", record.name.as_deref(), false),
                        field("🆔 CPF", Some(format_cpf(cpf).as_str()), false),
                        field("📅 Data de Nascimento", record.birth_date.as_deref(), true),
                        field("⚧️ Sexo", record.sex.as_deref(), true),
                        field("👪 Mãe", record.mother_name.as_deref(), true),
                        field("📍 Naturalidade", record.birthplace.as_deref(), true),
                        field(
                            "✅ Situação Cadastral",
                            record.registration_status.as_deref(),
                            true,
                        ),
                        field("📱 Telefone", Some(phone.as_str()), true),
                    ],
                )
            }
            LookupNotification::Phones { query, records } => {
                let first = records.first();
                (
                    "✅ Nova Consulta de Telefone",
                    "Uma nova consulta de telefone foi registrada no sistema",
                    vec![
                        field("📱 Telefone consultado", Some(query.as_str()), false),
                        field("🔢 Registros", Some(records.len().to_string().as_str()), true),
                        field("👤 Nome", first.and_then(|r| r.name.as_deref()), true),
                        field(
                            "🆔 CPF",
                            first
                                .and_then(|r| r.tax_id.as_deref())
                                .map(format_cpf)
                                .as_deref(),
                            true,
                        ),
                        field("📡 Operadora", first.and_then(|r| r.carrier.as_deref()), true),
                    ],
                )
            }
        };

        fields.push(field("⏰ Horário da Consulta", Some(queried_at.as_str()), false));

        WebhookMessage {
            username: username.to_string(),
            embeds: vec![Embed {
                title: title.to_string(),
                description: description.to_string(),
                color: EMBED_COLOR,
                fields,
                footer: EmbedFooter {
                    text: "Sistema de Consultas".to_string(),
                },
                timestamp: now.with_timezone(&Utc).to_rfc3339(),
            }],
        }
    }
}

/// Posts lookup notifications to a chat webhook.
#[derive(Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    username: String,
}

impl WebhookNotifier {
    pub fn new(url: String, username: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                tracing::error!("Failed to create webhook client: {}", e);
                AppError::InternalError("Falha ao iniciar cliente de webhook.".to_string())
            })?;

        Ok(Self {
            client,
            url,
            username,
        })
    }

    /// Returns `None` when no webhook is configured.
    pub fn from_config(config: &Config) -> Result<Option<Self>, AppError> {
        config
            .webhook_url
            .clone()
            .map(|url| Self::new(url, config.webhook_username.clone()))
            .transpose()
    }

    /// Sends one notification and waits for the webhook's answer.
    pub async fn send(&self, notification: &LookupNotification) -> Result<(), AppError> {
        let message = notification.to_message(&self.username, Local::now());

        let response = self
            .client
            .post(&self.url)
            .json(&message)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Webhook returned {}: {}",
                status, error_text
            )));
        }

        Ok(())
    }

    /// Fire-and-forget delivery; failures are logged and swallowed.
    pub fn dispatch(&self, notification: LookupNotification) -> tokio::task::JoinHandle<()> {
        let notifier = self.clone();
        tokio::spawn(async move {
            match notifier.send(&notification).await {
                Ok(()) => tracing::info!("✓ Webhook notification sent"),
                Err(e) => tracing::error!(
                    "❌ Failed to send webhook notification to {}: {}",
                    redact_url(&notifier.url),
                    e
                ),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 5, 9, 7, 1).unwrap()
    }

    fn field_value<'a>(message: &'a WebhookMessage, name: &str) -> &'a str {
        &message.embeds[0]
            .fields
            .iter()
            .find(|f| f.name == name)
            .unwrap()
            .value
    }

    #[test]
    fn test_cpf_message_formats_cpf_and_placeholders() {
        let record = PersonRecord {
            name: Some("Maria Silva".to_string()),
            tax_id: Some("11144477735".to_string()),
            phone: Some("11987654321".to_string()),
            ..Default::default()
        };
        let notification = LookupNotification::Person {
            kind: LookupKind::Cpf,
            query: "11144477735".to_string(),
            record,
        };
        let message = notification.to_message("Bot", fixed_time());

        assert_eq!(message.username, "Bot");
        assert_eq!(field_value(&message, "👤 Nome"), "Maria Silva");
        assert_eq!(field_value(&message, "🆔 CPF"), "111.444.777-35");
        assert_eq!(field_value(&message, "👪 Mãe"), "N/A");
        assert_eq!(field_value(&message, "📱 Telefone"), "11987654321 (N/A)");
        assert_eq!(
            field_value(&message, "⏰ Horário da Consulta"),
            "09:07:01 - 05/03/2024"
        );
    }

    #[test]
    fn test_cpf_message_falls_back_to_query() {
        let notification = LookupNotification::Person {
            kind: LookupKind::Cpf,
            query: "52998224725".to_string(),
            record: PersonRecord::default(),
        };
        let message = notification.to_message("Bot", fixed_time());
        assert_eq!(field_value(&message, "🆔 CPF"), "529.982.247-25");
    }

    #[test]
    fn test_phone_message_counts_records() {
        let notification = LookupNotification::Phones {
            query: "11987654321".to_string(),
            records: vec![PhoneRecord::default(), PhoneRecord::default()],
        };
        let message = notification.to_message("Bot", fixed_time());
        assert_eq!(field_value(&message, "🔢 Registros"), "2");
        assert_eq!(field_value(&message, "👤 Nome"), "N/A");
    }

    #[test]
    fn test_long_values_truncated() {
        let long = "x".repeat(2000);
        assert_eq!(field("a", Some(&long), false).value.len(), MAX_FIELD_CHARS);
    }
}
