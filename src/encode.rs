//! RFC 3986 percent-encoding as required by RFC 5849 section 3.6.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything except the unreserved set `A-Z a-z 0-9 - . _ ~`.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode `input` byte-by-byte over its UTF-8 representation,
/// using uppercase hex digits.
///
/// ```
/// assert_eq!(reqwest_oauth1a::percent_encode("Ā"), "%C4%80");
/// assert_eq!(reqwest_oauth1a::percent_encode("a b+c"), "a%20b%2Bc");
/// ```
pub fn percent_encode(input: &str) -> String {
    utf8_percent_encode(input, OAUTH_ENCODE_SET).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multibyte_code_points() {
        for (raw, expected) in &[("Ā", "%C4%80"), ("㤹", "%E3%A4%B9"), ("少女", "%E5%B0%91%E5%A5%B3")] {
            assert_eq!(percent_encode(raw), *expected);
        }
    }

    #[test]
    fn unreserved_untouched() {
        let unreserved = "ABCXYZabcxyz0189-._~";
        assert_eq!(percent_encode(unreserved), unreserved);
        assert_eq!(percent_encode(&percent_encode(unreserved)), unreserved);
        assert_eq!(percent_encode(""), "");
    }

    #[test]
    fn reserved_and_space() {
        assert_eq!(
            percent_encode("Hello Ladies + Gentlemen, a signed OAuth request!"),
            "Hello%20Ladies%20%2B%20Gentlemen%2C%20a%20signed%20OAuth%20request%21"
        );
        assert_eq!(percent_encode("a=b&c/d?e*"), "a%3Db%26c%2Fd%3Fe%2A");
        assert_eq!(percent_encode("%"), "%25");
    }
}
