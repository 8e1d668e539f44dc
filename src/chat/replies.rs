/// Driver reply when nothing in the canned table matches.
pub const FALLBACK_REPLY: &str = "Got it, thanks for letting me know!";

const CANNED: [(&str, &str); 4] = [
    ("I'm on my way down", "Great! I'll be waiting outside."),
    ("Please call when you arrive", "Will do! I'll call you when I'm here."),
    ("Running 2 minutes late", "No problem, take your time."),
    ("Thank you!", "You're welcome! Have a great day!"),
];

/// One-tap messages offered to the rider.
pub fn quick_messages() -> Vec<&'static str> {
    CANNED.iter().map(|(prompt, _)| *prompt).collect()
}

/// The driver's answer to `content`, matched exactly.
pub fn reply_for(content: &str) -> &'static str {
    CANNED
        .iter()
        .find(|(prompt, _)| *prompt == content)
        .map(|(_, reply)| *reply)
        .unwrap_or(FALLBACK_REPLY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_quick_message_has_a_canned_reply() {
        for prompt in quick_messages() {
            assert_ne!(reply_for(prompt), FALLBACK_REPLY, "{prompt}");
        }
    }

    #[test]
    fn unknown_message_gets_fallback() {
        assert_eq!(reply_for("where are you?"), FALLBACK_REPLY);
        assert_eq!(reply_for("thank you!"), FALLBACK_REPLY);
    }
}
