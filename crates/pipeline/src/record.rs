//! Flattening of wizard form data into a registration row.

use onboard_core::form::FormData;
use onboard_core::registration::RegistrationStatus;
use onboard_db::models::registration::NewRegistration;

/// Build the row to insert for `form`.
///
/// Currency strings go through `parse_currency`; only the columns of the
/// chosen contract model are populated. The reminder flag is kept only for
/// monthly contracts.
pub fn build_registration(form: &FormData, origin: &str) -> NewRegistration {
    let identity = &form.identity;
    let agreement = &form.agreement;
    let assistant = &form.assistant;
    let digital = &form.digital;
    let amounts = agreement.amounts();

    NewRegistration {
        responsible_name: identity.responsible_name.trim().to_string(),
        company_name: identity.company_name.trim().to_string(),
        segment: identity.segment.trim().to_string(),
        tax_id: identity.tax_id.clone(),
        email: identity.email.trim().to_string(),
        phone: identity.phone.clone(),
        services: agreement.services.clone(),
        contract_model: agreement.contract_model_str().to_string(),
        setup_value: amounts.setup,
        monthly_value: amounts.monthly,
        single_value: amounts.single,
        payment_methods: agreement.payment_methods.clone(),
        recurring_reminder: agreement.effective_reminder(),
        main_functions: assistant.main_functions.clone(),
        top_questions: assistant.top_questions.clone(),
        communication_tone: assistant.communication_tone_str().to_string(),
        existing_solutions: assistant.existing_solutions.clone(),
        contact_phones: digital.contact_phones.clone(),
        payment_methods_accepted: digital.payment_methods_accepted.clone(),
        address: digital.address.clone(),
        instagram: digital.instagram.clone(),
        website: digital.website.clone(),
        restricted_topics: digital.restricted_topics.clone(),
        additional_info: form.materials.additional_info.clone(),
        uploaded_files: form.materials.uploaded_files.clone(),
        status: RegistrationStatus::New,
        origin: origin.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use onboard_core::form::{CommunicationTone, ContractModel, FileDescriptor};

    use super::*;

    fn form(model: ContractModel) -> FormData {
        let mut form = FormData::default();
        form.identity.responsible_name = " Maria Souza ".into();
        form.identity.company_name = "Acme LLC".into();
        form.agreement.contract_model = Some(model);
        form.agreement.setup_value = "R$ 1.500,00".into();
        form.agreement.monthly_value = "R$ 299,90".into();
        form.agreement.single_value = "R$ 1.000,00".into();
        form.agreement.recurring_reminder = Some(false);
        form.assistant.communication_tone = Some(CommunicationTone::Technical);
        form
    }

    #[test]
    fn monthly_contract_populates_setup_and_monthly() {
        let record = build_registration(&form(ContractModel::Monthly), "formulario_cadastro");
        assert_eq!(record.setup_value, Some(1500.0));
        assert_eq!(record.monthly_value, Some(299.9));
        assert_eq!(record.single_value, None);
        assert_eq!(record.recurring_reminder, Some(false));
        assert_eq!(record.contract_model, "monthly");
    }

    #[test]
    fn single_contract_populates_only_single() {
        let record = build_registration(&form(ContractModel::Single), "formulario_cadastro");
        assert_eq!(record.single_value, Some(1000.0));
        assert_eq!(record.setup_value, None);
        assert_eq!(record.monthly_value, None);
        assert_eq!(record.recurring_reminder, None);
    }

    #[test]
    fn record_defaults_and_flattening() {
        let mut form = form(ContractModel::Single);
        form.materials.uploaded_files.push(FileDescriptor {
            name: "logo.png".into(),
            size: 512,
            mime_type: "image/png".into(),
        });

        let record = build_registration(&form, "importacao");
        assert_eq!(record.responsible_name, "Maria Souza");
        assert_eq!(record.status, RegistrationStatus::New);
        assert_eq!(record.origin, "importacao");
        assert_eq!(record.communication_tone, "technical");
        assert_eq!(record.uploaded_files.len(), 1);
    }
}
