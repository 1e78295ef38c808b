use crate::config::Config;
use crate::errors::AppError;
use reqwest::StatusCode;
use std::fmt;
use std::time::Duration;

/// Fixed upstream timeout; the lookup API is slow on cold starts.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The upstream lookups this relay performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Cpf,
    Phone,
    Name,
    /// Phones registered to a CPF, used to complete CPF lookups.
    PhonesByCpf,
}

impl LookupKind {
    /// Endpoint path below the base URL.
    pub fn path(self) -> &'static str {
        match self {
            LookupKind::Cpf => "consultarcpf",
            LookupKind::Phone | LookupKind::PhonesByCpf => "numero",
            LookupKind::Name => "nome-completo",
        }
    }

    /// Query-string parameter carrying the searched value.
    pub fn param(self) -> &'static str {
        match self {
            LookupKind::Cpf | LookupKind::PhonesByCpf => "cpf",
            LookupKind::Phone | LookupKind::Name => "q",
        }
    }

    fn subject(self) -> &'static str {
        match self {
            LookupKind::Cpf => "CPF",
            LookupKind::Phone | LookupKind::PhonesByCpf => "Telefone",
            LookupKind::Name => "Nome",
        }
    }

    pub fn not_found_message(self) -> String {
        format!("{} não localizado na base de dados.", self.subject())
    }

    pub fn failure_message(self) -> String {
        let subject = match self {
            LookupKind::Cpf => "CPF",
            LookupKind::Phone | LookupKind::PhonesByCpf => "telefone",
            LookupKind::Name => "nome",
        };
        format!("Erro ao consultar {}.", subject)
    }
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LookupKind::Cpf => "cpf",
            LookupKind::Phone => "phone",
            LookupKind::Name => "name",
            LookupKind::PhonesByCpf => "phones-by-cpf",
        };
        f.write_str(name)
    }
}

/// Client for the upstream lookup API.
///
/// Every lookup is a `GET` returning a plain-text report; parsing is left
/// to [`crate::report_parser`].
#[derive(Clone)]
pub struct LookupClient {
    client: reqwest::Client,
    base_url: String,
}

impl LookupClient {
    /// Creates a new `LookupClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the lookup API, without trailing slash.
    pub fn new(base_url: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to create lookup client: {}", e);
                AppError::InternalError("Falha ao iniciar cliente de consulta.".to_string())
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(config.lookup_base_url.clone())
    }

    /// Fetches the raw report for `value`.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The report body on a 2xx answer.
    /// * `Err(AppError::NotFound)` - Upstream answered 404.
    /// * `Err(AppError::RateLimited)` - Upstream answered 429.
    /// * `Err(AppError::ExternalApiError)` - Any other failure.
    pub async fn fetch_report(&self, kind: LookupKind, value: &str) -> Result<String, AppError> {
        // Build URL with proper parameter encoding (names carry spaces and accents)
        let url = reqwest::Url::parse_with_params(
            &format!("{}/{}", self.base_url, kind.path()),
            &[(kind.param(), value)],
        )
        .map_err(|e| {
            tracing::error!("Failed to build {} lookup URL: {}", kind, e);
            AppError::InternalError(kind.failure_message())
        })?;

        tracing::info!("Fetching {} report for: {}", kind, value);

        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::error!("{} lookup request failed: {}", kind, e);
            AppError::ExternalApiError(kind.failure_message())
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status {
                StatusCode::NOT_FOUND => AppError::NotFound(kind.not_found_message()),
                StatusCode::TOO_MANY_REQUESTS => AppError::RateLimited(
                    "Limite de requisições excedido. Aguarde 1 minuto.".to_string(),
                ),
                _ => {
                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    tracing::error!(
                        "Lookup API returned {} for {} lookup: {}",
                        status,
                        kind,
                        error_text
                    );
                    AppError::ExternalApiError(kind.failure_message())
                }
            });
        }

        let text = response.text().await.map_err(|e| {
            tracing::error!("Failed to read {} report body: {}", kind, e);
            AppError::ExternalApiError(kind.failure_message())
        })?;

        tracing::debug!("✓ {} report received ({} bytes)", kind, text.len());
        Ok(text)
    }

    pub async fn consult_cpf(&self, cpf: &str) -> Result<String, AppError> {
        self.fetch_report(LookupKind::Cpf, cpf).await
    }

    pub async fn consult_phone(&self, phone: &str) -> Result<String, AppError> {
        self.fetch_report(LookupKind::Phone, phone).await
    }

    pub async fn consult_name(&self, name: &str) -> Result<String, AppError> {
        self.fetch_report(LookupKind::Name, name).await
    }

    pub async fn consult_phones_by_cpf(&self, cpf: &str) -> Result<String, AppError> {
        self.fetch_report(LookupKind::PhonesByCpf, cpf).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_creation() {
        let client = LookupClient::new("https://example.com/api/".to_string());
        assert!(client.is_ok());
    }

    #[test]
    fn test_lookup_endpoints() {
        assert_eq!(LookupKind::Cpf.path(), "consultarcpf");
        assert_eq!(LookupKind::Cpf.param(), "cpf");
        assert_eq!(LookupKind::Phone.path(), "numero");
        assert_eq!(LookupKind::Phone.param(), "q");
        assert_eq!(LookupKind::PhonesByCpf.path(), "numero");
        assert_eq!(LookupKind::PhonesByCpf.param(), "cpf");
        assert_eq!(LookupKind::Name.path(), "nome-completo");
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            LookupKind::Cpf.not_found_message(),
            "CPF não localizado na base de dados."
        );
        assert_eq!(LookupKind::Cpf.failure_message(), "Erro ao consultar CPF.");
        assert_eq!(LookupKind::Name.failure_message(), "Erro ao consultar nome.");
    }
}
