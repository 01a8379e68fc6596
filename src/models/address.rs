/// Regex fragment capturing the digit/dot run that should hold an address.
/// Punctuation after it (`,` `:` `;` or a sentence-ending `.`) is left out of
/// the capture; the run itself still has to pass [`is_dotted_quad`].
pub const DOTTED_QUAD_TOKEN: &str = r"([0-9.]+)\b";

/// Check that `s` is a dotted quad: four 1-3 digit decimal octets, each 0-255
pub fn is_dotted_quad(s: &str) -> bool {
    let mut octets = 0;
    for part in s.split('.') {
        octets += 1;
        if octets > 4
            || part.is_empty()
            || part.len() > 3
            || !part.bytes().all(|b| b.is_ascii_digit())
            || part.parse::<u8>().is_err()
        {
            return false;
        }
    }
    octets == 4
}
