/// Report fixture tests
/// Full upstream-shaped reports run through the public parsers
use rust_consulta_api::models::{PersonRecord, PhoneRecord};
use rust_consulta_api::report_parser::{
    parse_name_report, parse_person_report, parse_phone_report,
};

const FULL_CPF_REPORT: &str = "\
╔══════════════════════════════╗
   🔍 CONSULTA COMPLETA DE CPF
╚══════════════════════════════╝

👤 DADOS PESSOAIS
• Nome: JOÃO PEREIRA DOS SANTOS
• CPF: 529.982.247-25
• Data de Nascimento: 02/11/1978 (45 anos)
• Sexo: M - Masculino
• Nome da Mãe: TEREZA PEREIRA
• Naturalidade: RECIFE - PE

📋 SITUAÇÃO
• Situação Cadastral: REGULAR
• Renda: R$ 3.250,00

📱 TELEFONES
Telefone 1
• Número: (81) 99876-5432
• Operadora: CLARO
Telefone 2
• Número: (81) 3333-4444
• Operadora: OI

📧 E-MAILS
E-MAIL 1 - E-mail: joao.santos@example.com
E-MAIL 2 - E-mail: jps@example.org
";

#[test]
fn test_full_cpf_report() {
    let record = parse_person_report(FULL_CPF_REPORT);

    assert_eq!(
        record,
        PersonRecord {
            name: Some("JOÃO PEREIRA DOS SANTOS".to_string()),
            tax_id: Some("52998224725".to_string()),
            birth_date: Some("02/11/1978".to_string()),
            age: Some("45".to_string()),
            sex: Some("M".to_string()),
            mother_name: Some("TEREZA PEREIRA".to_string()),
            registration_status: Some("REGULAR".to_string()),
            income: Some("R$ 3.250,00".to_string()),
            phone: Some("81998765432".to_string()),
            carrier: Some("CLARO".to_string()),
            email: Some("joao.santos@example.com".to_string()),
            birthplace: Some("RECIFE - PE".to_string()),
        }
    );
}

const CPF_REPORT_WITH_ADDRESS: &str = "\
👤 DADOS PESSOAIS
• Nome: JOÃO PEREIRA DOS SANTOS
• CPF: 529.982.247-25 (02/11/1978)
• Idade: 45 (02/11/1978)

📱 TELEFONES
Telefone 1
• Número: (81) 99876-5432 / (81) 3333-4444
• Operadora: CLARO

🏠 ENDEREÇOS
Endereço 1
• Logradouro: RUA DAS FLORES
• Número: 45
• Bairro: BOA VISTA
";

#[test]
fn test_address_block_does_not_touch_phone() {
    let record = parse_person_report(CPF_REPORT_WITH_ADDRESS);

    assert_eq!(record.tax_id.as_deref(), Some("52998224725"));
    assert_eq!(record.age.as_deref(), Some("45"));
    assert_eq!(record.phone.as_deref(), Some("81998765432"));
    assert_eq!(record.carrier.as_deref(), Some("CLARO"));
}

#[test]
fn test_cpf_report_with_missing_sections() {
    let text = "Nome: ANA LIMA\nCPF: 11144477735\nIdade: 30\n";
    let record = parse_person_report(text);

    assert_eq!(record.name.as_deref(), Some("ANA LIMA"));
    assert_eq!(record.age.as_deref(), Some("30"));
    assert!(record.phone.is_none());
    assert!(record.carrier.is_none());
    assert!(record.email.is_none());
    assert!(record.birth_date.is_none());

    // absent fields are omitted, never empty strings
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json.as_object().unwrap().len(), 3);
}

#[test]
fn test_gender_label_fills_sex() {
    let record = parse_person_report("Gênero: Feminino");
    assert_eq!(record.sex.as_deref(), Some("Feminino"));
}

#[test]
fn test_name_report_keeps_name_fields_only() {
    let record = parse_name_report(FULL_CPF_REPORT);

    assert_eq!(record.name.as_deref(), Some("JOÃO PEREIRA DOS SANTOS"));
    assert_eq!(record.tax_id.as_deref(), Some("52998224725"));
    assert_eq!(record.birth_date.as_deref(), Some("02/11/1978"));
    assert_eq!(record.age.as_deref(), Some("45"));
    assert_eq!(record.mother_name.as_deref(), Some("TEREZA PEREIRA"));
    assert!(record.sex.is_none());
    assert!(record.income.is_none());
    assert!(record.phone.is_none());
    assert!(record.email.is_none());
}

const PHONE_REPORT: &str = "\
📞 CONSULTA DE TELEFONE

PESSOA
CPF/CNPJ: 529.982.247-25
Nome: JOÃO PEREIRA DOS SANTOS

TELEFONE
Número: (81) 99876-5432
Status: ATIVO
Tipo: MOVEL
Operadora: CLARO

TELEFONE
Número: (81) 3333-4444
Status: INATIVO
Tipo: FIXO
Operadora: OI
";

#[test]
fn test_phone_report_with_owner() {
    let phones = parse_phone_report(PHONE_REPORT);

    assert_eq!(
        phones,
        vec![
            PhoneRecord {
                tax_id: Some("52998224725".to_string()),
                name: Some("JOÃO PEREIRA DOS SANTOS".to_string()),
                number: Some("81998765432".to_string()),
                status: Some("ATIVO".to_string()),
                line_type: Some("MOVEL".to_string()),
                carrier: Some("CLARO".to_string()),
            },
            PhoneRecord {
                tax_id: Some("52998224725".to_string()),
                name: Some("JOÃO PEREIRA DOS SANTOS".to_string()),
                number: Some("8133334444".to_string()),
                status: Some("INATIVO".to_string()),
                line_type: Some("FIXO".to_string()),
                carrier: Some("OI".to_string()),
            },
        ]
    );
}

#[test]
fn test_phone_report_owner_after_phones() {
    let text = "\
TELEFONE
Número: 11987654321
Operadora: VIVO
TELEFONE
Número: 11911112222
PESSOA
Nome: MARIA SOUZA
CPF: 111.444.777-35
";
    let phones = parse_phone_report(text);

    assert_eq!(phones.len(), 2);
    for phone in &phones {
        assert_eq!(phone.name.as_deref(), Some("MARIA SOUZA"));
        assert_eq!(phone.tax_id.as_deref(), Some("11144477735"));
    }
    assert_eq!(phones[0].carrier.as_deref(), Some("VIVO"));
    assert!(phones[1].carrier.is_none());
}

#[test]
fn test_phone_report_without_owner() {
    let phones = parse_phone_report("TELEFONE\nNúmero: 11987654321\nStatus: ATIVO");

    assert_eq!(phones.len(), 1);
    assert!(phones[0].name.is_none());
    assert!(phones[0].tax_id.is_none());
}

#[test]
fn test_empty_and_unrelated_input() {
    assert!(parse_person_report("").is_empty());
    assert!(parse_name_report("").is_empty());
    assert!(parse_phone_report("").is_empty());

    let noise = "Erro interno\n<html>502 Bad Gateway</html>\n:::";
    assert!(parse_person_report(noise).is_empty());
    assert!(parse_phone_report(noise).is_empty());
}
