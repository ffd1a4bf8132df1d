use crate::infra::{ADMIN_LOGIN_TABLE, InfraError, STUDENT_LOGIN_TABLE, TableStore};
use crate::module::portal::model::{CredentialRecord, Role};

/// Tables consulted in order; the first table holding the email decides the role.
/// Admin ahead of student is a product decision carried over from the portal's
/// first backend and still awaits confirmation.
pub const ROLE_PRIORITY: [(Role, &str); 2] = [
    (Role::Admin, ADMIN_LOGIN_TABLE),
    (Role::Student, STUDENT_LOGIN_TABLE),
];

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Returns `Ok(None)` when no table knows the email.
pub async fn classify(
    tables: &dyn TableStore,
    raw_email: &str,
) -> Result<Option<CredentialRecord>, InfraError> {
    let email = normalize_email(raw_email);
    for (role, table) in ROLE_PRIORITY {
        if tables.email_exists(table, &email).await? {
            return Ok(Some(CredentialRecord { email, role }));
        }
    }
    Ok(None)
}
