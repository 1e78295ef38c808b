use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============ Parsed Records ============

/// Fields a person report can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersonField {
    Name,
    TaxId,
    BirthDate,
    Age,
    Sex,
    MotherName,
    RegistrationStatus,
    Income,
    Phone,
    Carrier,
    Email,
    Birthplace,
}

/// Person data extracted from a CPF or name report.
///
/// Absent fields stay `None` and are omitted from the JSON output; the
/// frontend renders its own placeholder for them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PersonRecord {
    /// Full name.
    #[serde(rename = "nome", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// CPF, digits only.
    #[serde(rename = "cpf", skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    /// Birth date as printed by the upstream (`DD/MM/YYYY`).
    #[serde(rename = "data_nascimento", skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    /// Age in years.
    #[serde(rename = "idade", skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    #[serde(rename = "sexo", skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(rename = "mae", skip_serializing_if = "Option::is_none")]
    pub mother_name: Option<String>,
    /// Receita Federal registration status.
    #[serde(rename = "situacao_cadastral", skip_serializing_if = "Option::is_none")]
    pub registration_status: Option<String>,
    #[serde(rename = "renda", skip_serializing_if = "Option::is_none")]
    pub income: Option<String>,
    #[serde(rename = "telefone", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "operadora", skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,
    #[serde(rename = "email", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "naturalidade", skip_serializing_if = "Option::is_none")]
    pub birthplace: Option<String>,
}

impl PersonRecord {
    fn slot(&mut self, field: PersonField) -> &mut Option<String> {
        match field {
            PersonField::Name => &mut self.name,
            PersonField::TaxId => &mut self.tax_id,
            PersonField::BirthDate => &mut self.birth_date,
            PersonField::Age => &mut self.age,
            PersonField::Sex => &mut self.sex,
            PersonField::MotherName => &mut self.mother_name,
            PersonField::RegistrationStatus => &mut self.registration_status,
            PersonField::Income => &mut self.income,
            PersonField::Phone => &mut self.phone,
            PersonField::Carrier => &mut self.carrier,
            PersonField::Email => &mut self.email,
            PersonField::Birthplace => &mut self.birthplace,
        }
    }

    /// Overwrites a field; later matches win.
    pub fn set(&mut self, field: PersonField, value: String) {
        *self.slot(field) = Some(value);
    }

    /// True when no field was extracted.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Fields a phone report can fill. Owner fields come from `PESSOA` blocks,
/// line fields from `TELEFONE` blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhoneField {
    OwnerTaxId,
    OwnerName,
    Number,
    Status,
    LineType,
    Carrier,
}

impl PhoneField {
    pub fn is_owner_field(self) -> bool {
        matches!(self, PhoneField::OwnerTaxId | PhoneField::OwnerName)
    }
}

/// One phone line and its owner, as listed by a phone report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PhoneRecord {
    /// Owner CPF (or CNPJ), digits only.
    #[serde(rename = "cpf", skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(rename = "nome", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "numero", skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(rename = "status", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "tipo", skip_serializing_if = "Option::is_none")]
    pub line_type: Option<String>,
    #[serde(rename = "operadora", skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,
}

impl PhoneRecord {
    pub fn set(&mut self, field: PhoneField, value: String) {
        let slot = match field {
            PhoneField::OwnerTaxId => &mut self.tax_id,
            PhoneField::OwnerName => &mut self.name,
            PhoneField::Number => &mut self.number,
            PhoneField::Status => &mut self.status,
            PhoneField::LineType => &mut self.line_type,
            PhoneField::Carrier => &mut self.carrier,
        };
        *slot = Some(value);
    }
}

// ============ API Request Models ============

/// Body of `POST /api/cpf` and `POST /api/consultar`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CpfQuery {
    #[serde(default, alias = "query_value")]
    pub cpf: Option<String>,
}

/// Body of `POST /api/telefone`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PhoneQuery {
    #[serde(default, alias = "query_value")]
    pub telefone: Option<String>,
}

/// Body of `POST /api/nome`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct NameQuery {
    #[serde(default, alias = "query_value")]
    pub nome: Option<String>,
}

// ============ API Response Models ============

/// Envelope returned by every lookup endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[aliases(PersonResponse = ApiResponse<PersonRecord>, PhoneListResponse = ApiResponse<Vec<PhoneRecord>>)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Error body, as produced by `AppError`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}
