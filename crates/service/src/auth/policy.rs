//! Password strength rules applied after the field checks pass.
//!
//! Rules: minimum length, not entirely numeric, not a well-known password, and
//! not too similar to the account's own attributes. Every failing rule
//! contributes one message.

use std::collections::HashSet;

use once_cell::sync::Lazy;

/// Well-known passwords, one per line, lowercase.
static COMMON_PASSWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    include_str!("common_passwords.txt")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
});

/// Maximum similarity ratio tolerated between the password and an attribute.
const MAX_SIMILARITY: f64 = 0.7;

#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self { min_length: 8 }
    }
}

/// Account attributes the password is compared against, as `(name, value)`.
pub type UserAttributes<'a> = [(&'a str, &'a str)];

impl PasswordPolicy {
    /// Return every rule violation; an empty vector means the password passes.
    pub fn check(&self, password: &str, attributes: &UserAttributes<'_>) -> Vec<String> {
        let mut problems = Vec::new();
        if let Some(msg) = self.similarity_problem(password, attributes) {
            problems.push(msg);
        }
        if password.chars().count() < self.min_length {
            problems.push(format!(
                "This password is too short. It must contain at least {} characters.",
                self.min_length
            ));
        }
        let lowered = password.trim().to_lowercase();
        if COMMON_PASSWORDS.contains(lowered.as_str()) {
            problems.push("This password is too common.".to_string());
        }
        if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
            problems.push("This password is entirely numeric.".to_string());
        }
        problems
    }

    fn similarity_problem(&self, password: &str, attributes: &UserAttributes<'_>) -> Option<String> {
        let password = password.to_lowercase();
        for (name, value) in attributes {
            let value = value.to_lowercase();
            if value.is_empty() || exceeds_length_ratio(&password, &value) {
                continue;
            }
            let mut parts: Vec<&str> = value
                .split(|c: char| !c.is_alphanumeric())
                .filter(|p| !p.is_empty())
                .collect();
            parts.push(&value);
            if parts.iter().any(|part| similarity(&password, part) >= MAX_SIMILARITY) {
                return Some(format!("The password is too similar to the {}.", label(name)));
            }
        }
        None
    }
}

/// Human-readable name of an account attribute.
fn label(attribute: &str) -> String {
    match attribute {
        "email" => "email address".to_string(),
        other => other.replace('_', " "),
    }
}

/// Very long passwords cannot be "too similar" to a short attribute.
fn exceeds_length_ratio(password: &str, value: &str) -> bool {
    let pwd_len = password.chars().count() as f64;
    let value_len = value.chars().count() as f64;
    pwd_len >= 10.0 * value_len && value_len < MAX_SIMILARITY / 2.0 * pwd_len
}

/// `2 * lcs / (len(a) + len(b))`, in `[0, 1]`.
fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];
    for &ca in &a {
        for (j, &cb) in b.iter().enumerate() {
            cur[j + 1] = if ca == cb { prev[j] + 1 } else { prev[j + 1].max(cur[j]) };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    2.0 * prev[b.len()] as f64 / total as f64
}
