use serde::Serialize;

use crate::utils::fields::ContactFields;

#[derive(Debug, Clone, Serialize)]
pub struct UploadResumeResponse {
    pub ok: bool,
    pub fields: ContactFields,
    pub text: String,
    pub file_id: String,
}
