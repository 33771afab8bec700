// Domain layer modules
pub mod form_record;
pub mod user_profile;

// Re-exports
pub use form_record::{
    CreateFormData, FormDataValidationError, FormRecord, NewFormRecord, UpdateFormData,
};
pub use user_profile::UserProfile;
