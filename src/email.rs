//! Formal email formatting around a summary.

/// Maximum length of the subject fragment, in characters.
pub const SUBJECT_MAX_CHARS: usize = 60;

const SALUTATION: &str = "Dear Sir/Madam,";
const SIGN_OFF: &str = "Regards,";
const SIGNATURE: &str = "Multi-Agent Research System";

/// Text before the first period, cut to [`SUBJECT_MAX_CHARS`].
pub fn subject_fragment(body: &str) -> String {
    let first = body.split('.').next().unwrap_or_default();
    first.chars().take(SUBJECT_MAX_CHARS).collect()
}

/// The full subject line.
pub fn subject_line(body: &str) -> String {
    format!("Subject: Overview on {}", subject_fragment(body))
}

/// Wrap a body in the subject, salutation and signature.
pub fn format_email(body: &str) -> String {
    format!(
        "\n{}\n\n{}\n\n{}\n\n{}\n{}\n",
        subject_line(body),
        SALUTATION,
        body,
        SIGN_OFF,
        SIGNATURE
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_from_first_sentence() {
        let body = "Quantum computing enables new cryptography. It has risks.";
        assert_eq!(
            subject_line(body),
            "Subject: Overview on Quantum computing enables new cryptography"
        );
    }

    #[test]
    fn test_subject_truncated() {
        let body = "a".repeat(100);
        let fragment = subject_fragment(&body);
        assert_eq!(fragment.chars().count(), SUBJECT_MAX_CHARS);
    }

    #[test]
    fn test_subject_truncates_by_character() {
        let body = "é".repeat(80) + ". tail";
        assert_eq!(subject_fragment(&body), "é".repeat(60));
    }

    #[test]
    fn test_empty_and_leading_period() {
        assert_eq!(subject_line(""), "Subject: Overview on ");
        assert_eq!(subject_fragment(".hidden"), "");
    }

    #[test]
    fn test_layout() {
        let body = "Line one. Line two.";
        let email = format_email(body);
        assert_eq!(
            email,
            "\nSubject: Overview on Line one\n\nDear Sir/Madam,\n\nLine one. Line two.\n\nRegards,\nMulti-Agent Research System\n"
        );
    }

    #[test]
    fn test_body_verbatim_between_salutation_and_signature() {
        let body = "No period here\n\n  with odd spacing  ";
        let email = format_email(body);
        let start = email.find(SALUTATION).unwrap() + SALUTATION.len() + 2;
        let end = email.rfind(&format!("\n\n{}", SIGN_OFF)).unwrap();
        assert_eq!(&email[start..end], body);
        assert!(!subject_fragment(body).contains('.'));
    }
}
