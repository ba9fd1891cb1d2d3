pub mod gemini_client;
pub mod google_calendar_client;
pub mod monday_client;
