/// Parse the leading whitespace-delimited token of a catalog runtime ("142 min") into minutes.
///
/// Returns `None` for an empty field, "N/A", or any leading token that is not a number.
pub fn parse_runtime_minutes(runtime: &str) -> Option<u32> {
    runtime.split_whitespace().next()?.parse().ok()
}
