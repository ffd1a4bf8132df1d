pub mod checklist_service;
pub mod credential_service;
pub mod policy_store_service;
pub mod text_extraction_service;
