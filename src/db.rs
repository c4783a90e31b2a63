pub mod user_repo;
pub use user_repo::UserRepository;
pub mod cash_repo;
pub use cash_repo::CashRepository;
pub mod slot_repo;
pub use slot_repo::SlotRepository;
pub mod inquiry_repo;
pub use inquiry_repo::InquiryRepository;
pub mod announcement_repo;
pub use announcement_repo::AnnouncementRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;
pub mod activity_repo;
pub use activity_repo::ActivityRepository;
