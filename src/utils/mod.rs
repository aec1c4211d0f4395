pub mod format;
pub mod time;

// Re-export time utilities
pub use time::{current_time, format_time_diff, format_time_remaining, format_timestamp, time_since, time_until};

// Re-export formatting utilities
pub use format::{format_file_size, format_token_amount, parse_token_amount, shorten_address};
