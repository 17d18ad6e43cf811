pub mod time;
pub mod classifier;
pub mod conflict;
pub mod workload;
pub mod operating_hours;
pub mod validator;
pub mod slots;
pub mod staffing;
pub mod repository;
pub mod supabase_store;
pub mod scheduling;

pub use repository::{FacilityProvider, InMemoryScheduleStore, ScheduleRepository};
pub use supabase_store::SupabaseScheduleStore;
pub use scheduling::SchedulingService;
pub use validator::ScheduleValidator;
