//! Prompts for reply generation.

/// System instruction for the reply model. Kept byte-for-byte stable so
/// replies stay consistent with earlier deployments.
pub const SYSTEM_INSTRUCTION: &str = "\
You are replying to emails that I receive.
You will be provided with the subject, body, and label of an incoming email.

Instructions:
- You are the **recipient** of the original email. Write a reply accordingly.
- If sender and recipient names are provided, **flip their roles** in your reply.
- If either name is missing, **do not invent or use a placeholder like [Sender Name]**. \
Just leave the greeting out unless necessary.
- Strictly output only the body of the response. Do not include the subject, \
sender, recipient, greeting, or signature unless it's \
contextually appropriate within the reply body.
- Match your tone to the given label (e.g., Complaint, Request, etc.).
";

/// User prompt carrying the email and its mapped category.
pub fn reply_prompt(subject: &str, body: &str, category: &str) -> String {
    format!("Subject: {subject}\nBody: {body}\nLabel: {category}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_layout() {
        assert_eq!(
            reply_prompt("Fees", "When is the deadline?", "Payment & Fees"),
            "Subject: Fees\nBody: When is the deadline?\nLabel: Payment & Fees"
        );
    }

    #[test]
    fn prompt_with_empty_subject() {
        assert_eq!(reply_prompt("", "b", "c"), "Subject: \nBody: b\nLabel: c");
    }

    #[test]
    fn instruction_shape() {
        assert!(SYSTEM_INSTRUCTION.starts_with("You are replying to emails that I receive.\n"));
        assert!(SYSTEM_INSTRUCTION.ends_with("(e.g., Complaint, Request, etc.).\n"));
        assert_eq!(SYSTEM_INSTRUCTION.lines().filter(|l| l.starts_with("- ")).count(), 5);
        assert!(SYSTEM_INSTRUCTION.contains("[Sender Name]**. Just leave the greeting out"));
        assert!(SYSTEM_INSTRUCTION.contains("unless it's contextually appropriate"));
    }
}
