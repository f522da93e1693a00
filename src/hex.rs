//! A single address/value parser shared by the debugger REPL and the CLI's
//! `--dump`/`--memory` flags, so `0x`-prefixed and bare hex both work
//! everywhere an address or word value is accepted.

/// Parses `token` as a 16-bit hex value, with or without a leading `0x`.
pub fn parse_u16(token: &str) -> Option<u16> {
    let digits = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")).unwrap_or(token);
    u16::from_str_radix(digits, 16).ok()
}
