use askama::Template;

use super::MailError;

#[derive(Template, Debug)]
#[template(path = "emails/users/account_verification.html")]
pub struct AccountVerificationEmail<'a> {
    pub username: &'a str,
    pub first_name: &'a str,
    pub token: &'a str,
    /// Token lifetime, as stated in the message.
    pub valid_days: i64,
}

impl AccountVerificationEmail<'_> {
    pub fn subject(&self) -> String {
        format!("Welcome @{}: Verify your account to start using this App", self.username)
    }

    pub fn render_html(&self) -> Result<String, MailError> {
        self.render().map_err(|e| MailError::Template(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_token_and_greeting() {
        let email = AccountVerificationEmail { username: "pablo", first_name: "Pablo", token: "abc.def.ghi", valid_days: 3 };
        let html = email.render_html().unwrap();
        assert!(html.contains("abc.def.ghi"));
        assert!(html.contains("Pablo"));
        assert!(html.contains("valid for 3 days"));
        assert_eq!(email.subject(), "Welcome @pablo: Verify your account to start using this App");
    }

    #[test]
    fn escapes_names() {
        let email = AccountVerificationEmail { username: "x", first_name: "<b>Eve</b>", token: "t", valid_days: 1 };
        let html = email.render_html().unwrap();
        assert!(!html.contains("<b>Eve</b>"));
    }
}
