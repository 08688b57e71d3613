// UI and formatting module

pub mod formatters;

// Re-export commonly used items for cleaner imports
pub use formatters::{
    format_bytes, print_alerts, print_connections, print_notifications, print_overview,
    print_processes, print_sample, usage_bar,
};
