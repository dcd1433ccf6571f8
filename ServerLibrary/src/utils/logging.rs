pub use Common::utils::logging::*;
pub use Common::{debug_entry, information_entry, warning_entry, error_entry, critical_entry, emergency_entry};
pub use Common::{logging_debug, logging_information, logging_warning, logging_error, logging_critical, logging_emergency};
