use crate::infra::{InfraClients, InfraError};
use crate::module::portal::model::PolicyDocumentRecord;
use crate::service::text_extraction_service::{ExtractionError, SourceDocument, extract_all};
use std::cmp::Ordering;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ChecklistError {
    #[error("no policy documents stored")]
    NoPolicies,

    #[error("policy listing failed: {0}")]
    Listing(InfraError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("generation failed: {0}")]
    Generation(InfraError),
}

/// Upload time ascending, undated rows last, then name and url as tie breakers.
pub fn order_policies(mut policies: Vec<PolicyDocumentRecord>) -> Vec<PolicyDocumentRecord> {
    policies.sort_by(|a, b| {
        let by_time = match (&a.created_at, &b.created_at) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_time
            .then_with(|| a.policy_name.cmp(&b.policy_name))
            .then_with(|| a.file_url.cmp(&b.file_url))
    });
    policies
}

pub fn build_prompt(policy_text: &str) -> String {
    format!(
        "You are an assistant helping college students understand official campus policies.\n\
         \n\
         Read the policy documents below and write a checklist for students.\n\
         \n\
         Rules:\n\
         - Format the checklist as bullet points.\n\
         - Focus on mandatory actions students must take.\n\
         - Call out every deadline and date explicitly.\n\
         - Use simple, plain language a first-year student understands.\n\
         \n\
         Policy documents:\n\
         {policy_text}\n"
    )
}

/// Lists every stored policy, extracts their text in upload order and asks the
/// generator for a checklist. The generator's text is returned untouched.
pub async fn generate_checklist(infra: &InfraClients) -> Result<String, ChecklistError> {
    let policies = infra
        .tables
        .list_policies()
        .await
        .map_err(ChecklistError::Listing)?;
    if policies.is_empty() {
        return Err(ChecklistError::NoPolicies);
    }

    let documents = order_policies(policies)
        .into_iter()
        .map(|p| SourceDocument {
            name: p.policy_name,
            url: p.file_url,
        })
        .collect::<Vec<_>>();

    let combined = extract_all(infra.fetcher.as_ref(), &documents).await?;
    let prompt = build_prompt(&combined);
    info!(
        policy_count = documents.len(),
        prompt_chars = prompt.len(),
        "requesting checklist generation"
    );

    infra
        .generator
        .generate(&prompt)
        .await
        .map_err(ChecklistError::Generation)
}
