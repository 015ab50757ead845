use once_cell::sync::Lazy;
use regex::Regex;

// Counter targets as authors write them: "100", "1,200", "1 200+", "+50"
static COUNT_TARGET_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\+?\s*(\d{1,3}(?:[, ]\d{3})+|\d+)\s*\+?\s*$").unwrap());

/// Normalize a requested slide index into `0..len`.
///
/// Anything past the end lands on the first item and anything before the
/// start lands on the last one. Returns `None` when there is nothing to index.
pub fn wrap_index(index: isize, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    if index < 0 {
        Some(len - 1)
    } else if index as usize >= len {
        Some(0)
    } else {
        Some(index as usize)
    }
}

/// Counter target parsing error types
#[derive(Debug, PartialEq)]
pub enum CountParseError {
    EmptyInput,
    InvalidFormat(String),
    Overflow,
}

impl std::fmt::Display for CountParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CountParseError::EmptyInput => write!(f, "Counter target cannot be empty"),
            CountParseError::InvalidFormat(raw) => {
                write!(f, "Invalid counter target {:?}. Use: 100, 1,200 or 500+", raw)
            }
            CountParseError::Overflow => write!(f, "Counter target is too large"),
        }
    }
}

impl std::error::Error for CountParseError {}

/// Parse the numeric target carried by a counter element's data attribute.
///
/// # Examples
/// ```
/// use site_ui::utils::parse_count_target;
/// assert_eq!(parse_count_target("100"), Ok(100));
/// assert_eq!(parse_count_target("1,200+"), Ok(1200));
/// ```
pub fn parse_count_target(input: &str) -> Result<u64, CountParseError> {
    if input.trim().is_empty() {
        return Err(CountParseError::EmptyInput);
    }
    let captures = COUNT_TARGET_REGEX
        .captures(input)
        .ok_or_else(|| CountParseError::InvalidFormat(input.to_string()))?;
    let digits: String = captures[1].chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse::<u64>().map_err(|_| CountParseError::Overflow)
}

/// Generic numeric input validation
pub fn validate_numeric_input<T>(
    input: &str,
    min: Option<T>,
    max: Option<T>,
    field_name: &str,
) -> Result<T, String>
where
    T: std::str::FromStr + std::fmt::Display + PartialOrd,
{
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(format!("{} cannot be empty", field_name));
    }

    match trimmed.parse::<T>() {
        Ok(val) => {
            if let Some(min_val) = min {
                if val < min_val {
                    return Err(format!("{} must be at least {}", field_name, min_val));
                }
            }
            if let Some(max_val) = max {
                if val > max_val {
                    return Err(format!("{} cannot exceed {}", field_name, max_val));
                }
            }
            Ok(val)
        }
        Err(_) => Err(format!("{} must be a valid number", field_name)),
    }
}

/// Validate a per-region `data-interval` override
pub fn validate_interval_ms(input: &str) -> Result<u32, String> {
    use crate::config::{MAX_INTERVAL_MS, MIN_INTERVAL_MS};
    validate_numeric_input(
        input,
        Some(MIN_INTERVAL_MS),
        Some(MAX_INTERVAL_MS),
        "Carousel interval",
    )
}
