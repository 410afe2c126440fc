// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Phone number normalization for provider sender ids.
//!
//! Providers report senders as JIDs (`5215550001111@s.whatsapp.net`,
//! `5215550001111@c.us`) or formatted numbers. The canonical `number` is
//! digits only, so one conversation key matches across providers.

/// Normalize an opaque sender id to a digits-only phone number.
///
/// Strips the JID domain suffix and every non-digit character. Returns an
/// empty string when no digits remain (the caller treats that as
/// unattributable).
pub fn normalize_number(raw: &str) -> String {
    let local = raw.split('@').next().unwrap_or(raw);
    local.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// True when the JID names a group chat rather than a person.
pub fn is_group_jid(jid: &str) -> bool {
    jid.ends_with("@g.us")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_whatsapp_jid_suffix() {
        assert_eq!(normalize_number("5215550001111@s.whatsapp.net"), "5215550001111");
        assert_eq!(normalize_number("5215550001111@c.us"), "5215550001111");
    }

    #[test]
    fn strips_formatting_characters() {
        assert_eq!(normalize_number("+52 1 555 000-1111"), "5215550001111");
    }

    #[test]
    fn plain_digits_pass_through() {
        assert_eq!(normalize_number("5215550001111"), "5215550001111");
    }

    #[test]
    fn no_digits_yields_empty() {
        assert_eq!(normalize_number("status@broadcast".split('@').next().unwrap()), "");
    }

    #[test]
    fn group_jids_are_detected() {
        assert!(is_group_jid("1203630000000000@g.us"));
        assert!(!is_group_jid("5215550001111@c.us"));
    }
}
