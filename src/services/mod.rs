pub mod ai_service;
pub mod question_service;
pub mod resume_service;
pub mod scoring;
pub mod session_service;
