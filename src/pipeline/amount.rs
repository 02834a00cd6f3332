/// Parse a currency-formatted input like "Rp. 1.000.000" into rupiah.
///
/// Every non-digit character is stripped before parsing, so grouping dots,
/// the "Rp." prefix and stray whitespace are all tolerated. Input with no
/// digits at all parses to 0 rather than erroring; the frontend relies on
/// this leniency, see the tests.
pub fn parse_amount(input: &str) -> i64 {
    let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}
